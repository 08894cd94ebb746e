//! In-memory document store.
//!
//! Backs the service in development and tests. Documents live in two
//! RwLock-guarded maps; reads clone out a snapshot so aggregation never holds
//! the lock while it reduces.

use super::{Store, StoreError};
use crate::models::{
    FoodAnalysis, FoodAnalysisInput, Restaurant, RestaurantInput, RestaurantPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collections {
    restaurants: HashMap<String, Restaurant>,
    analyses: HashMap<String, FoodAnalysis>,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    /// Startup-derived prefix keeping ids opaque and distinct across runs.
    id_prefix: String,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self {
            inner: RwLock::new(Collections::default()),
            id_prefix: format!("{:014x}", nanos & 0x00ff_ffff_ffff_ffff),
            next_id: AtomicU64::new(1),
        }
    }

    /// 24-char lowercase hex id, unique for the lifetime of the store.
    fn assign_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}{:010x}", self.id_prefix, n)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.restaurants.values().cloned().collect())
    }

    async fn restaurant(&self, id: &str) -> Result<Option<Restaurant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.restaurants.get(id).cloned())
    }

    async fn insert_restaurant(&self, input: RestaurantInput) -> Result<Restaurant, StoreError> {
        let restaurant = Restaurant::from_input(self.assign_id(), input, Utc::now());
        let mut inner = self.inner.write().await;
        inner
            .restaurants
            .insert(restaurant.id.clone(), restaurant.clone());
        Ok(restaurant)
    }

    async fn update_restaurant(
        &self,
        id: &str,
        patch: RestaurantPatch,
    ) -> Result<Option<Restaurant>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(restaurant) = inner.restaurants.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            restaurant.name = name;
        }
        if let Some(description) = patch.description {
            restaurant.description = description;
        }
        if let Some(address) = patch.address {
            restaurant.address = address;
        }
        if let Some(location) = patch.location {
            restaurant.location = location;
        }
        if let Some(rating) = patch.rating {
            restaurant.rating = Some(rating);
        }
        if let Some(price_range) = patch.price_range {
            restaurant.price_range = price_range;
        }
        if let Some(categories) = patch.categories {
            restaurant.categories = categories;
        }
        if let Some(photos) = patch.photos {
            restaurant.photos = photos;
        }
        if let Some(opening_hours) = patch.opening_hours {
            restaurant.opening_hours = opening_hours;
        }
        restaurant.updated_at = Utc::now();

        Ok(Some(restaurant.clone()))
    }

    async fn delete_restaurant(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.restaurants.remove(id).is_some())
    }

    async fn insert_analysis(&self, input: FoodAnalysisInput) -> Result<FoodAnalysis, StoreError> {
        let analysis = FoodAnalysis::from_input(self.assign_id(), input, Utc::now());
        let mut inner = self.inner.write().await;
        inner.analyses.insert(analysis.id.clone(), analysis.clone());
        Ok(analysis)
    }

    async fn analyses(
        &self,
        restaurant_id: Option<&str>,
    ) -> Result<Vec<FoodAnalysis>, StoreError> {
        let inner = self.inner.read().await;
        let matching = inner
            .analyses
            .values()
            .filter(|a| restaurant_id.map_or(true, |rid| a.restaurant_id == rid))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn analysis(&self, id: &str) -> Result<Option<FoodAnalysis>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.analyses.get(id).cloned())
    }
}
