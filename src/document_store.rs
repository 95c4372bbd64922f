//! # Document Store Module
//!
//! Generic key-path persistence used underneath the nutrient cache. A path such
//! as `users/42/standardNutrients/Idli` addresses one JSON document. Two backends
//! are provided: an in-memory map and a PostgreSQL table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key-path document persistence
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`; `Ok(None)` when nothing is stored there
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Write the document at `path`, replacing any previous value
    async fn set(&self, path: &str, value: Value) -> Result<()>;
}

/// Process-local document store
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.documents.write().await.insert(path.to_string(), value);
        Ok(())
    }
}

/// PostgreSQL-backed document store
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Initialize the documents table
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing document store schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                body JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        info!("Document store schema initialized successfully");
        Ok(())
    }

    /// Delete the document at `path`, reporting whether one existed
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT body::text AS body FROM documents WHERE path = $1")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to read document")?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body").context("Failed to read document body")?;
                let value = serde_json::from_str(&body)
                    .with_context(|| format!("Stored document at {path} is not valid JSON"))?;
                Ok(Some(value))
            }
            None => {
                debug!("No document stored at {path}");
                Ok(None)
            }
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (path, body, updated_at) VALUES ($1, $2::jsonb, NOW())
             ON CONFLICT (path) DO UPDATE SET body = EXCLUDED.body, updated_at = EXCLUDED.updated_at",
        )
        .bind(path)
        .bind(value.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to write document")?;

        debug!("Stored document at {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_get_missing_is_none() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.get("users/1/standardNutrients/Rice").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_in_memory_set_overwrites() {
        let store = InMemoryDocumentStore::new();
        store.set("a/b", json!({ "v": 1 })).await.unwrap();
        store.set("a/b", json!({ "v": 2 })).await.unwrap();

        assert_eq!(store.get("a/b").await.unwrap(), Some(json!({ "v": 2 })));
        assert_eq!(store.len().await, 1);
    }
}
