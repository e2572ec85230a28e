use chrono::{DateTime, Duration, SecondsFormat, Utc};
use ps_core::{NodeModel, Result, SyncCache};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};
use crate::fetcher::ArticleFetcher;
use crate::transform::transform_articles;

/// Cache key holding the timestamp of the last successful sync.
pub const LAST_SYNC_KEY: &str = "lastSync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Full,
    Incremental,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => write!(f, "full"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub fetched: usize,
    pub stored: usize,
    pub previous_cursor: Option<String>,
    pub cursor: String,
}

/// Runs fetch, transform and persist against the host's node model and cache.
pub struct SyncManager {
    fetcher: ArticleFetcher,
    model: Arc<dyn NodeModel>,
    cache: Arc<dyn SyncCache>,
}

impl SyncManager {
    pub fn new(fetcher: ArticleFetcher, model: Arc<dyn NodeModel>, cache: Arc<dyn SyncCache>) -> Self {
        Self { fetcher, model, cache }
    }

    /// Fetches every article and creates or replaces all nodes.
    #[instrument(level = "info", skip(self))]
    pub async fn full_sync(&self) -> Result<SyncReport> {
        let previous_cursor = self.cache.get(LAST_SYNC_KEY).await?;
        self.sync(SyncMode::Full, None, previous_cursor).await
    }

    /// Fetches articles changed since the cached cursor and replaces those nodes.
    #[instrument(level = "info", skip(self))]
    pub async fn incremental_sync(&self) -> Result<SyncReport> {
        let previous_cursor = self.cache.get(LAST_SYNC_KEY).await?;
        let since = previous_cursor.clone();
        self.sync(SyncMode::Incremental, since.as_deref(), previous_cursor).await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn delete_node(&self, id: &str) -> Result<()> {
        self.model.delete(id).await?;
        info!("🗑️ Deleted node {}", id);
        Ok(())
    }

    pub async fn last_sync(&self) -> Result<Option<String>> {
        self.cache.get(LAST_SYNC_KEY).await
    }

    async fn sync(&self, mode: SyncMode, since: Option<&str>, previous_cursor: Option<String>) -> Result<SyncReport> {
        info!("🔄 Starting {} sync (since {:?})", mode, since);
        let articles = self.fetcher.fetch_articles(since).await?;
        let fetched = articles.len();

        let nodes = transform_articles(articles);
        let stored = nodes.len();
        self.model.create(nodes).await?;

        let cursor = next_cursor(Utc::now(), previous_cursor.as_deref());
        self.cache.set(LAST_SYNC_KEY, &cursor).await?;
        info!("✅ {} sync stored {} nodes, cursor now {}", mode, stored, cursor);

        Ok(SyncReport {
            mode,
            fetched,
            stored,
            previous_cursor,
            cursor,
        })
    }
}

/// The cursor to store after a sync, always strictly later than `previous`.
fn next_cursor(now: DateTime<Utc>, previous: Option<&str>) -> String {
    let previous = previous
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
        .map(|p| p.with_timezone(&Utc));
    let cursor = match previous {
        Some(previous) if now <= previous => previous + Duration::milliseconds(1),
        _ => now,
    };
    cursor.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_cursor_is_now_when_later() {
        let now = at("2024-03-01T12:00:00.250Z");
        assert_eq!(next_cursor(now, Some("2024-01-01T00:00:00.000Z")), "2024-03-01T12:00:00.250Z");
        assert_eq!(next_cursor(now, None), "2024-03-01T12:00:00.250Z");
    }

    #[test]
    fn test_cursor_advances_within_same_millisecond() {
        let now = at("2024-03-01T12:00:00.250Z");
        assert_eq!(next_cursor(now, Some("2024-03-01T12:00:00.250Z")), "2024-03-01T12:00:00.251Z");
        assert_eq!(next_cursor(now, Some("2024-03-01T12:00:05.000Z")), "2024-03-01T12:00:05.001Z");
    }

    #[test]
    fn test_unparseable_previous_cursor_is_ignored() {
        let now = at("2024-03-01T12:00:00.250Z");
        assert_eq!(next_cursor(now, Some("yesterday")), "2024-03-01T12:00:00.250Z");
    }
}
