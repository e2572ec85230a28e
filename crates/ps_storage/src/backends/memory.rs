use async_trait::async_trait;
use ps_core::{ArticleNode, NodeModel, Result, SyncCache};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<BTreeMap<String, ArticleNode>>,
    cache: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node(&self, id: &str) -> Option<ArticleNode> {
        self.nodes.read().await.get(id).cloned()
    }

    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }
}

#[async_trait]
impl NodeModel for MemoryStore {
    async fn create(&self, nodes: Vec<ArticleNode>) -> Result<()> {
        let mut store = self.nodes.write().await;
        for node in nodes {
            store.insert(node.id.clone(), node);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.nodes.write().await.remove(id).is_none() {
            tracing::debug!("Node {} was not stored, nothing to delete", id);
        }
        Ok(())
    }
}

#[async_trait]
impl SyncCache for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.cache.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_nodes(&self) -> Result<Vec<ArticleNode>> {
        Ok(self.nodes.read().await.values().cloned().collect())
    }
}
