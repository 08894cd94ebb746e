//! Food-analysis record keeping.
//!
//! Validates, persists, and retrieves [`FoodAnalysis`] records. Validation
//! completes before any write is attempted; a rejected input never leaves a
//! partial record behind. Concurrent adds are independent writes, each
//! targeting its own new record.

use crate::error::AppError;
use crate::models::{FoodAnalysis, FoodAnalysisInput};
use crate::store::Store;
use std::sync::Arc;
use tracing::{debug, info};

/// Stateless request-scoped recorder over a shared store handle.
pub struct AnalysisRecorder {
    store: Arc<dyn Store>,
}

impl AnalysisRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate and persist a new food analysis.
    ///
    /// On success the stored record comes back with its assigned id and
    /// `created_at == updated_at`. The restaurant reference is accepted
    /// without an existence check; dangling references are stored silently.
    pub async fn add(&self, input: FoodAnalysisInput) -> Result<FoodAnalysis, AppError> {
        input.validate()?;
        let stored = self.store.insert_analysis(input).await?;
        info!(
            "Recorded food analysis {} for restaurant {}",
            stored.id, stored.restaurant_id
        );
        Ok(stored)
    }

    /// All stored analyses, or exactly those referencing `restaurant_id`.
    /// No matches is an empty list, not an error.
    pub async fn by_restaurant(
        &self,
        restaurant_id: Option<&str>,
    ) -> Result<Vec<FoodAnalysis>, AppError> {
        let analyses = self.store.analyses(restaurant_id).await?;
        debug!("Found {} analyses", analyses.len());
        Ok(analyses)
    }

    /// A single analysis by id, or the NotFound signal.
    pub async fn by_id(&self, id: &str) -> Result<FoodAnalysis, AppError> {
        self.store
            .analysis(id)
            .await?
            .ok_or(AppError::NotFound("food analysis"))
    }
}
