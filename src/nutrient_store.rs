//! # Standard Nutrient Store Module
//!
//! Per-user cache of standard nutrient tables, one per food name, layered over a
//! generic [`DocumentStore`]. Food names are used verbatim as keys: "Rice" and
//! "rice " are different entries. Path separators inside a user id or food
//! name are percent-encoded so every (user, food) pair owns a distinct path.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::document_store::DocumentStore;
use crate::nutrient_model::NutrientTable;

/// Document persisted for each (user, food name) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardNutrientRecord {
    pub food_name: String,
    pub nutrients: NutrientTable,
    pub created_at: DateTime<Utc>,
}

/// Per-user standard nutrient cache
#[derive(Clone)]
pub struct StandardNutrientStore {
    documents: Arc<dyn DocumentStore>,
}

impl StandardNutrientStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Document path for a user's standard table of a food
    pub fn document_path(user_id: &str, food_name: &str) -> String {
        format!(
            "users/{}/standardNutrients/{}",
            encode_path_segment(user_id),
            encode_path_segment(food_name)
        )
    }

    /// Read the stored record, if a valid one exists
    ///
    /// Records that cannot be decoded or break the table invariant are
    /// reported as absent so they are never served.
    pub async fn get_record(
        &self,
        user_id: &str,
        food_name: &str,
    ) -> Result<Option<StandardNutrientRecord>> {
        let path = Self::document_path(user_id, food_name);
        let Some(value) = self
            .documents
            .get(&path)
            .await
            .with_context(|| format!("Failed to read standard nutrients at {path}"))?
        else {
            debug!("No standard nutrients cached for '{food_name}'");
            return Ok(None);
        };

        match serde_json::from_value::<StandardNutrientRecord>(value) {
            Ok(record) if record.nutrients.is_valid() => Ok(Some(record)),
            Ok(_) => {
                warn!("Ignoring cached nutrients for '{food_name}' with invalid values");
                Ok(None)
            }
            Err(e) => {
                warn!("Ignoring malformed cached nutrients for '{food_name}': {e}");
                Ok(None)
            }
        }
    }

    /// Read the standard table for a food
    pub async fn get(&self, user_id: &str, food_name: &str) -> Result<Option<NutrientTable>> {
        Ok(self
            .get_record(user_id, food_name)
            .await?
            .map(|record| record.nutrients))
    }

    /// Store the standard table for a food, replacing any previous one
    ///
    /// # Errors
    ///
    /// Refuses tables that break the non-negative finite invariant, and
    /// propagates document store failures.
    pub async fn put(&self, user_id: &str, food_name: &str, table: &NutrientTable) -> Result<()> {
        if !table.is_valid() {
            anyhow::bail!("Refusing to store invalid nutrient table for '{food_name}'");
        }

        let record = StandardNutrientRecord {
            food_name: food_name.to_string(),
            nutrients: table.clone(),
            created_at: Utc::now(),
        };
        let path = Self::document_path(user_id, food_name);
        let value = serde_json::to_value(&record).context("Failed to encode nutrient record")?;

        self.documents
            .set(&path, value)
            .await
            .with_context(|| format!("Failed to write standard nutrients at {path}"))?;

        info!("Stored standard nutrients for '{food_name}'");
        Ok(())
    }
}

/// Escape `%` and `/` so a segment can never introduce another path level
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            '/' => encoded.push_str("%2F"),
            _ => encoded.push(c),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use crate::nutrient_model::NutrientProfile;
    use serde_json::json;

    fn store_with_documents() -> (StandardNutrientStore, Arc<InMemoryDocumentStore>) {
        let documents = Arc::new(InMemoryDocumentStore::new());
        (StandardNutrientStore::new(documents.clone()), documents)
    }

    fn sample_table() -> NutrientTable {
        NutrientTable {
            per_piece: NutrientProfile {
                energy: 40.0,
                protein: 1.2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_document_path_is_literal() {
        assert_eq!(
            StandardNutrientStore::document_path("u1", "Rice "),
            "users/u1/standardNutrients/Rice "
        );
    }

    #[test]
    fn test_document_path_escapes_separators() {
        assert_eq!(
            StandardNutrientStore::document_path("a/b", "50% Dark/Milk"),
            "users/a%2Fb/standardNutrients/50%25 Dark%2FMilk"
        );
        assert_ne!(
            StandardNutrientStore::document_path("a/standardNutrients/b", "c"),
            StandardNutrientStore::document_path("a", "b/standardNutrients/c")
        );
        assert_ne!(
            StandardNutrientStore::document_path("u1", "%2F"),
            StandardNutrientStore::document_path("u1", "/")
        );
    }

    #[tokio::test]
    async fn test_slashes_cannot_reach_another_users_table() {
        let (store, documents) = store_with_documents();
        let mut table = sample_table();
        table.per_piece.energy = 999.0;

        store
            .put("a/standardNutrients/b", "c", &table)
            .await
            .unwrap();

        assert_eq!(store.get("a", "b/standardNutrients/c").await.unwrap(), None);
        assert_eq!(
            store.get("a/standardNutrients/b", "c").await.unwrap(),
            Some(table)
        );
        assert_eq!(documents.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (store, _) = store_with_documents();
        store.put("u1", "Idli", &sample_table()).await.unwrap();

        assert_eq!(store.get("u1", "Idli").await.unwrap(), Some(sample_table()));
        assert_eq!(store.get("u2", "Idli").await.unwrap(), None);
        assert_eq!(store.get("u1", "idli").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_record_carries_metadata() {
        let (store, _) = store_with_documents();
        store.put("u1", "Idli", &sample_table()).await.unwrap();

        let record = store.get_record("u1", "Idli").await.unwrap().unwrap();
        assert_eq!(record.food_name, "Idli");
        assert!(record.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_put_rejects_invalid_table() {
        let (store, documents) = store_with_documents();
        let mut table = sample_table();
        table.per_pack.sodium = -3.0;

        assert!(store.put("u1", "Idli", &table).await.is_err());
        assert!(documents.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_document_reads_as_absent() {
        let (store, documents) = store_with_documents();
        documents
            .set(
                &StandardNutrientStore::document_path("u1", "Idli"),
                json!({ "foodName": "Idli", "nutrients": { "perPiece": {} } }),
            )
            .await
            .unwrap();

        assert_eq!(store.get("u1", "Idli").await.unwrap(), None);
    }
}
