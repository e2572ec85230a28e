use async_trait::async_trait;
use ps_core::{ArticleNode, Error, NodeModel, Result, SyncCache};
use std::path::Path;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// A node store that also serves as the sync cache.
#[async_trait]
pub trait StorageBackend: NodeModel + SyncCache {
    fn name(&self) -> &'static str;

    /// All stored nodes, ordered by id
    async fn list_nodes(&self) -> Result<Vec<ArticleNode>>;
}

/// Shared handles onto one backend, one per host-API role.
#[derive(Clone)]
pub struct Storage {
    pub model: Arc<dyn NodeModel>,
    pub cache: Arc<dyn SyncCache>,
    pub backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn new<T: StorageBackend + 'static>(backend: T) -> Self {
        let backend = Arc::new(backend);
        Self {
            model: backend.clone(),
            cache: backend.clone(),
            backend,
        }
    }
}

/// Opens the backend named `kind`. `path` is only used by file-backed stores.
pub async fn create_storage(kind: &str, path: &Path) -> Result<Storage> {
    match kind {
        "memory" => Ok(Storage::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Storage::new(SqliteStore::open(path).await?)),
        other => {
            let _ = path;
            Err(Error::Config(format!("Unsupported storage backend: {}", other)))
        }
    }
}
