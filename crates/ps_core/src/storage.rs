use async_trait::async_trait;
use crate::types::ArticleNode;
use crate::Result;

/// The content engine's node store.
#[async_trait]
pub trait NodeModel: Send + Sync {
    /// Create or replace every node, keyed by id
    async fn create(&self, nodes: Vec<ArticleNode>) -> Result<()>;

    /// Delete a single node
    async fn delete(&self, id: &str) -> Result<()>;
}

/// The content engine's key/value build cache.
#[async_trait]
pub trait SyncCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
