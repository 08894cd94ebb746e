//! Persistent store boundary.
//!
//! The rest of the application talks to a [`Store`] trait object carrying the
//! minimal document-store capability set it consumes: full-collection reads,
//! lookups by id, inserts with store-assigned ids and timestamps, a filtered
//! analysis read, plus partial update and delete for restaurants.
//!
//! [`StoreHandle`] owns the connect-once discipline: the backend is opened
//! lazily on first use, and racing first callers converge on the same
//! fully-initialized handle instead of each opening their own.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    FoodAnalysis, FoodAnalysisInput, Restaurant, RestaurantInput, RestaurantPatch,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

/// Failure of the backing store to complete a read or write.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document-store capability set consumed by the application.
///
/// Inserts assign the id and both timestamps; reads return owned snapshots,
/// so an aggregation over the result reflects the committed state at the
/// moment of the read and never blocks writers.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, StoreError>;

    async fn restaurant(&self, id: &str) -> Result<Option<Restaurant>, StoreError>;

    async fn insert_restaurant(&self, input: RestaurantInput) -> Result<Restaurant, StoreError>;

    /// Merges only the supplied fields and refreshes `updated_at`. Returns
    /// the updated document, or `None` when the id is unknown.
    async fn update_restaurant(
        &self,
        id: &str,
        patch: RestaurantPatch,
    ) -> Result<Option<Restaurant>, StoreError>;

    /// Returns whether a document was removed. Deleting an absent id is not
    /// an error.
    async fn delete_restaurant(&self, id: &str) -> Result<bool, StoreError>;

    async fn insert_analysis(&self, input: FoodAnalysisInput) -> Result<FoodAnalysis, StoreError>;

    /// All analyses, or exactly those referencing `restaurant_id`.
    async fn analyses(
        &self,
        restaurant_id: Option<&str>,
    ) -> Result<Vec<FoodAnalysis>, StoreError>;

    async fn analysis(&self, id: &str) -> Result<Option<FoodAnalysis>, StoreError>;
}

/// Which backing store to open.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: String,
}

/// Lazily-opened, shared store connection.
///
/// Created once at startup and passed to every component that needs the
/// store. The first `get` opens the backend; concurrent first callers all
/// wait on the same initialization rather than opening independent
/// connections.
pub struct StoreHandle {
    config: StoreConfig,
    cell: OnceCell<Arc<dyn Store>>,
}

impl StoreHandle {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared store, opening it on first use.
    pub async fn get(&self) -> Result<Arc<dyn Store>, StoreError> {
        self.cell
            .get_or_try_init(|| async { open_backend(&self.config) })
            .await
            .cloned()
    }
}

fn open_backend(config: &StoreConfig) -> Result<Arc<dyn Store>, StoreError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Opening in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(StoreError::Unavailable(format!(
            "unknown store backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_restaurant_input;

    #[tokio::test]
    async fn test_handle_opens_once() {
        let handle = StoreHandle::new(StoreConfig {
            backend: "memory".to_string(),
        });

        let first = handle.get().await.unwrap();
        first
            .insert_restaurant(sample_restaurant_input())
            .await
            .unwrap();

        // A later get returns the same store, not a fresh empty one.
        let second = handle.get().await.unwrap();
        assert_eq!(second.restaurants().await.unwrap().len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_racing_first_callers_share_one_store() {
        let handle = Arc::new(StoreHandle::new(StoreConfig {
            backend: "memory".to_string(),
        }));

        let gets = (0..8).map(|_| {
            let handle = Arc::clone(&handle);
            tokio::spawn(async move { handle.get().await.unwrap() })
        });
        let stores = futures::future::join_all(gets).await;

        let first = stores[0].as_ref().unwrap();
        for store in &stores {
            assert!(Arc::ptr_eq(first, store.as_ref().unwrap()));
        }
    }

    #[tokio::test]
    async fn test_unknown_backend_is_unavailable() {
        let handle = StoreHandle::new(StoreConfig {
            backend: "cloud".to_string(),
        });
        let err = handle.get().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
