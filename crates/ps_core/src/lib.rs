pub mod error;
pub mod schema;
pub mod storage;
pub mod types;

pub use error::{Error, GraphqlError, GraphqlLocation};
pub use schema::{FieldSchema, FieldType, NodeSchema};
pub use storage::{NodeModel, SyncCache};
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
