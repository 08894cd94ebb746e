//! HTTP surface of the service.
//!
//! Thin axum handlers over the core components: every handler validates,
//! performs one logical read-or-write against the shared store, and maps the
//! outcome through [`AppError`]. Method routing yields 405 for unsupported
//! methods on a bound path.

use crate::ai::{AiAnalysis, NutritionAnalyzer, RestaurantSuggestion};
use crate::analysis::{compute_summary, AnalysisRecorder};
use crate::error::AppError;
use crate::models::{
    AnalysisSummary, FoodAnalysis, FoodAnalysisInput, Restaurant, RestaurantInput,
    RestaurantPatch,
};
use crate::store::Store;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub analyzer: NutritionAnalyzer,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/restaurant-stats", get(restaurant_stats))
        .route("/food-analysis", post(add_food_analysis).get(list_food_analyses))
        .route("/food-analysis/{id}", get(get_food_analysis))
        .route("/restaurants", get(list_restaurants).post(add_restaurant))
        .route(
            "/restaurants/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/analyze", post(analyze_food))
        .route("/recommendations", post(recommend_restaurants))
        .with_state(state)
}

async fn restaurant_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisSummary>, AppError> {
    let summary = compute_summary(state.store.as_ref()).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
struct AnalysisListQuery {
    #[serde(rename = "restaurantId")]
    restaurant_id: Option<String>,
}

async fn add_food_analysis(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FoodAnalysisInput>,
) -> Result<(StatusCode, Json<FoodAnalysis>), AppError> {
    let recorder = AnalysisRecorder::new(Arc::clone(&state.store));
    let stored = recorder.add(input).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn list_food_analyses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisListQuery>,
) -> Result<Json<Vec<FoodAnalysis>>, AppError> {
    let recorder = AnalysisRecorder::new(Arc::clone(&state.store));
    let analyses = recorder.by_restaurant(query.restaurant_id.as_deref()).await?;
    Ok(Json(analyses))
}

async fn get_food_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FoodAnalysis>, AppError> {
    let recorder = AnalysisRecorder::new(Arc::clone(&state.store));
    Ok(Json(recorder.by_id(&id).await?))
}

async fn list_restaurants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    Ok(Json(state.store.restaurants().await?))
}

async fn add_restaurant(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RestaurantInput>,
) -> Result<(StatusCode, Json<Restaurant>), AppError> {
    input.validate()?;
    let stored = state.store.insert_restaurant(input).await?;
    info!("Added restaurant {} ({})", stored.name, stored.id);
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, AppError> {
    state
        .store
        .restaurant(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("restaurant"))
}

async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<RestaurantPatch>,
) -> Result<Json<Restaurant>, AppError> {
    patch.validate()?;
    state
        .store
        .update_restaurant(&id, patch)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("restaurant"))
}

async fn delete_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_restaurant(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("restaurant"))
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    description: String,
}

async fn analyze_food(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AiAnalysis>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::validation("description", "must not be empty"));
    }
    let analysis = state
        .analyzer
        .analyze(&request.description)
        .await
        .map_err(AppError::Ai)?;
    Ok(Json(analysis))
}

#[derive(Deserialize)]
struct RecommendRequest {
    preferences: String,
}

async fn recommend_restaurants(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Vec<RestaurantSuggestion>>, AppError> {
    if request.preferences.trim().is_empty() {
        return Err(AppError::validation("preferences", "must not be empty"));
    }
    let suggestions = state
        .analyzer
        .recommend(&request.preferences)
        .await
        .map_err(AppError::Ai)?;
    Ok(Json(suggestions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiConfig;
    use crate::models::tests::{sample_analysis_input, sample_restaurant_input};
    use crate::models::PriceTier;
    use crate::store::MemoryStore;

    fn test_state() -> Arc<AppState> {
        let analyzer = NutritionAnalyzer::new(AiConfig {
            api_url: "http://127.0.0.1:0".to_string(),
            model: "test".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 100,
            timeout_seconds: 1,
        })
        .unwrap();
        Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            analyzer,
        })
    }

    #[tokio::test]
    async fn test_add_food_analysis_created() {
        let state = test_state();
        let (status, Json(stored)) =
            add_food_analysis(State(state), Json(sample_analysis_input("r1")))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(!stored.id.is_empty());
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_add_food_analysis_rejects_bad_score() {
        let state = test_state();
        let mut input = sample_analysis_input("r1");
        input.health_score = -1;

        let err = add_food_analysis(State(Arc::clone(&state)), Json(input))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        // Nothing was written.
        let Json(all) = list_food_analyses(
            State(state),
            Query(AnalysisListQuery {
                restaurant_id: None,
            }),
        )
        .await
        .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_list_food_analyses_filters() {
        let state = test_state();
        add_food_analysis(State(Arc::clone(&state)), Json(sample_analysis_input("r1")))
            .await
            .unwrap();
        add_food_analysis(State(Arc::clone(&state)), Json(sample_analysis_input("r2")))
            .await
            .unwrap();

        let Json(matching) = list_food_analyses(
            State(state),
            Query(AnalysisListQuery {
                restaurant_id: Some("r2".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].restaurant_id, "r2");
    }

    #[tokio::test]
    async fn test_get_food_analysis_not_found() {
        let state = test_state();
        let err = get_food_analysis(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_restaurant_crud_round_trip() {
        let state = test_state();

        let (status, Json(stored)) =
            add_restaurant(State(Arc::clone(&state)), Json(sample_restaurant_input()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_restaurant(State(Arc::clone(&state)), Path(stored.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.name, stored.name);

        let patch = RestaurantPatch {
            price_range: Some(PriceTier::Luxury),
            ..RestaurantPatch::default()
        };
        let Json(updated) = update_restaurant(
            State(Arc::clone(&state)),
            Path(stored.id.clone()),
            Json(patch),
        )
        .await
        .unwrap();
        assert_eq!(updated.price_range, PriceTier::Luxury);

        let status = delete_restaurant(State(Arc::clone(&state)), Path(stored.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Second delete reports not-found, not a fault.
        let err = delete_restaurant(State(state), Path(stored.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_restaurant_rejects_invalid_input() {
        let state = test_state();
        let mut input = sample_restaurant_input();
        input.name = String::new();

        let err = add_restaurant(State(state), Json(input)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));
    }

    #[tokio::test]
    async fn test_stats_reflect_inserted_restaurants() {
        let state = test_state();
        add_restaurant(State(Arc::clone(&state)), Json(sample_restaurant_input()))
            .await
            .unwrap();

        let Json(summary) = restaurant_stats(State(state)).await.unwrap();
        assert_eq!(summary.total_restaurants, 1);
        assert_eq!(summary.price_distribution.get("$$"), Some(&1));
        assert_eq!(summary.categories.get("中式料理"), Some(&1));
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_description() {
        let state = test_state();
        let err = analyze_food(
            State(state),
            Json(AnalyzeRequest {
                description: "  ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation {
                field: "description",
                ..
            }
        ));
    }
}
