use async_trait::async_trait;
use ps_core::{ArticleNode, Error, NodeModel, Result, SyncCache};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::path::{Path, PathBuf};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS nodes (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        authors TEXT NOT NULL,
        categories TEXT NOT NULL,
        updated TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cache (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

fn storage_error(action: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("Failed to {}: {}", action, e))
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("run migration {}", i), e))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl NodeModel for SqliteStore {
    async fn create(&self, nodes: Vec<ArticleNode>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| storage_error("begin transaction", e))?;
        for node in &nodes {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO nodes
                (id, slug, title, body, authors, categories, updated)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&node.id)
            .bind(&node.slug)
            .bind(&node.title)
            .bind(&node.body)
            .bind(serde_json::to_string(&node.authors)?)
            .bind(serde_json::to_string(&node.categories)?)
            .bind(&node.updated)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("store node", e))?;
        }
        tx.commit().await.map_err(|e| storage_error("commit nodes", e))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM nodes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete node", e))?;
        Ok(())
    }
}

#[async_trait]
impl SyncCache for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("read cache", e))?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("write cache", e))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_nodes(&self) -> Result<Vec<ArticleNode>> {
        let rows = sqlx::query("SELECT * FROM nodes ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("list nodes", e))?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let authors: String = row.get("authors");
            let categories: String = row.get("categories");
            nodes.push(ArticleNode {
                id: row.get("id"),
                slug: row.get("slug"),
                title: row.get("title"),
                body: row.get("body"),
                authors: serde_json::from_str(&authors)?,
                categories: serde_json::from_str(&categories)?,
                updated: row.get("updated"),
            });
        }
        Ok(nodes)
    }
}
