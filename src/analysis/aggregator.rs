//! Restaurant aggregation and statistics.
//!
//! This module reduces the live restaurant collection into a point-in-time
//! [`AnalysisSummary`]: total count, per-category counts, price-tier
//! distribution, and average rating.

use crate::error::AppError;
use crate::models::{AnalysisSummary, Restaurant};
use crate::store::Store;
use tracing::debug;

/// Reduce a restaurant snapshot into summary statistics.
///
/// Single pass. A restaurant with N category labels contributes N category
/// increments, one price-tier increment, and (when rated) one term to the
/// average. Restaurants without a rating are excluded from both the rating
/// sum and the divisor; an empty or entirely-unrated collection averages 0.
pub fn summarize(restaurants: &[Restaurant]) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        total_restaurants: restaurants.len(),
        ..AnalysisSummary::default()
    };

    let mut rating_sum = 0.0;
    let mut rated_count = 0usize;

    for restaurant in restaurants {
        for category in &restaurant.categories {
            *summary.categories.entry(category.clone()).or_default() += 1;
        }

        *summary
            .price_distribution
            .entry(restaurant.price_range.symbol().to_string())
            .or_default() += 1;

        if let Some(rating) = restaurant.rating {
            rating_sum += rating;
            rated_count += 1;
        }
    }

    if rated_count > 0 {
        summary.average_rating = rating_sum / rated_count as f64;
    }

    summary
}

/// Snapshot the restaurant collection and summarize it.
///
/// Read-only; reflects whatever committed state existed at the moment of the
/// read. Surfaces a store failure whole, never a partial summary.
pub async fn compute_summary(store: &dyn Store) -> Result<AnalysisSummary, AppError> {
    let restaurants = store.restaurants().await?;
    debug!("Summarizing {} restaurants", restaurants.len());
    Ok(summarize(&restaurants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_restaurant_input;
    use crate::models::{GeoPoint, OpeningHours, PriceTier, RestaurantInput};
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn restaurant(
        name: &str,
        rating: Option<f64>,
        tier: PriceTier,
        categories: &[&str],
    ) -> Restaurant {
        let now = Utc::now();
        Restaurant {
            id: format!("id-{name}"),
            name: name.to_string(),
            description: "test".to_string(),
            address: "test".to_string(),
            location: GeoPoint::new(121.19, 24.96),
            rating,
            price_range: tier,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            photos: vec![],
            opening_hours: OpeningHours::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_collection() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_restaurants, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert!(summary.categories.is_empty());
        assert!(summary.price_distribution.is_empty());
    }

    #[test]
    fn test_total_matches_collection_size() {
        let restaurants = vec![
            restaurant("a", Some(4.0), PriceTier::Budget, &["ramen"]),
            restaurant("b", Some(3.0), PriceTier::Budget, &[]),
            restaurant("c", None, PriceTier::Luxury, &["sushi"]),
        ];
        assert_eq!(summarize(&restaurants).total_restaurants, 3);
    }

    #[test]
    fn test_categories_count_memberships_not_restaurants() {
        let restaurants = vec![
            restaurant("a", None, PriceTier::Budget, &["ramen", "noodles"]),
            restaurant("b", None, PriceTier::Budget, &["ramen"]),
        ];
        let summary = summarize(&restaurants);

        assert_eq!(summary.categories.get("ramen"), Some(&2));
        assert_eq!(summary.categories.get("noodles"), Some(&1));
        // Sum over counters equals (restaurant, category) memberships, not |C|.
        let memberships: usize = summary.categories.values().sum();
        assert_eq!(memberships, 3);
    }

    #[test]
    fn test_empty_category_list_counts_only_toward_total() {
        let restaurants = vec![restaurant("a", None, PriceTier::Moderate, &[])];
        let summary = summarize(&restaurants);
        assert_eq!(summary.total_restaurants, 1);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_no_preseeded_zero_entries() {
        let restaurants = vec![restaurant("a", None, PriceTier::Moderate, &["cafe"])];
        let summary = summarize(&restaurants);
        assert_eq!(summary.price_distribution.len(), 1);
        assert_eq!(summary.categories.len(), 1);
        assert!(!summary.price_distribution.contains_key("$"));
    }

    #[test]
    fn test_unrated_restaurants_excluded_from_average() {
        let restaurants = vec![
            restaurant("a", Some(4.0), PriceTier::Budget, &[]),
            restaurant("b", Some(5.0), PriceTier::Budget, &[]),
            restaurant("c", None, PriceTier::Budget, &[]),
        ];
        // Rated-only rule: (4 + 5) / 2, the unrated restaurant contributes
        // to neither the sum nor the divisor.
        assert_eq!(summarize(&restaurants).average_rating, 4.5);
    }

    #[test]
    fn test_entirely_unrated_collection_averages_zero() {
        let restaurants = vec![restaurant("a", None, PriceTier::Budget, &[])];
        assert_eq!(summarize(&restaurants).average_rating, 0.0);
    }

    #[test]
    fn test_price_distribution() {
        let restaurants = vec![
            restaurant("a", None, PriceTier::Moderate, &[]),
            restaurant("b", None, PriceTier::Moderate, &[]),
            restaurant("c", None, PriceTier::Luxury, &[]),
        ];
        let summary = summarize(&restaurants);
        assert_eq!(summary.price_distribution.get("$$"), Some(&2));
        assert_eq!(summary.price_distribution.get("$$$$"), Some(&1));
    }

    #[tokio::test]
    async fn test_round_trip_through_store() {
        let store = MemoryStore::new();
        store
            .insert_restaurant(sample_restaurant_input())
            .await
            .unwrap();
        store
            .insert_restaurant(RestaurantInput {
                categories: vec![],
                rating: None,
                price_range: PriceTier::Budget,
                ..sample_restaurant_input()
            })
            .await
            .unwrap();

        let summary = compute_summary(&store).await.unwrap();
        assert_eq!(summary.total_restaurants, 2);
        assert!(summary.price_distribution.get("$$").copied().unwrap_or(0) >= 1);
        assert_eq!(summary.categories.get("中式料理"), Some(&1));
        assert_eq!(summary.categories.get("學生餐廳"), Some(&1));
        assert_eq!(summary.average_rating, 4.5);
    }
}
