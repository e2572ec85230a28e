pub mod cli;
pub mod connector;
pub mod fetcher;
pub mod flatten;
pub mod graphql;
pub mod logging;
pub mod manager;
pub mod transform;

pub use connector::{Connector, ConnectorConfig, EventOutcome, LifecycleEvent, WebhookEvent};
pub use fetcher::ArticleFetcher;
pub use graphql::{GraphqlRequest, GraphqlTransport, HttpTransport};
pub use manager::{SyncManager, SyncMode, SyncReport};

pub mod prelude {
    pub use super::connector::{Connector, ConnectorConfig, LifecycleEvent};
    pub use ps_core::{Article, ArticleNode, Error, Result};
}
