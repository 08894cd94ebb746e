//! Data models for the foodmap service.
//!
//! This module contains the core data structures used throughout the
//! application for representing restaurants, food analyses, and the derived
//! collection summary, plus the input types accepted at the HTTP boundary.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Relative cost level of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    /// Cheap eats, street food.
    #[serde(rename = "$")]
    Budget,
    /// Everyday sit-down meals.
    #[serde(rename = "$$")]
    Moderate,
    /// Special-occasion dining.
    #[serde(rename = "$$$")]
    Upscale,
    /// Fine dining.
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceTier {
    /// Returns the dollar-sign symbol used on the wire and in summaries.
    pub fn symbol(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Upscale => "$$$",
            PriceTier::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// GeoJSON-style point location. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

fn point_type() -> String {
    "Point".to_string()
}

impl GeoPoint {
    #[allow(dead_code)] // Constructor for seeding and tests
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: point_type(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Open/close times for a single day, as "HH:MM" strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

/// Weekly opening-hours table. A `None` day means closed / unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

/// A restaurant document as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Store-assigned opaque id.
    pub id: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub location: GeoPoint,
    /// Average user rating in [1, 5]; absent until the first review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub price_range: PriceTier,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub opening_hours: OpeningHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Materializes a validated input into a stored document.
    pub fn from_input(id: String, input: RestaurantInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            address: input.address,
            location: input.location,
            rating: input.rating,
            price_range: input.price_range,
            categories: input.categories,
            photos: input.photos,
            opening_hours: input.opening_hours,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller-supplied restaurant fields; id and timestamps are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInput {
    pub name: String,
    pub description: String,
    pub address: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub price_range: PriceTier,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub opening_hours: OpeningHours,
}

impl RestaurantInput {
    /// Checks field constraints, reporting the first violation.
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("name", &self.name)?;
        require_max_len("name", &self.name, 60)?;
        require_non_empty("description", &self.description)?;
        require_max_len("description", &self.description, 1000)?;
        require_non_empty("address", &self.address)?;
        validate_location("location", &self.location)?;
        if let Some(rating) = self.rating {
            validate_rating("rating", rating)?;
        }
        Ok(())
    }
}

/// Partial update for a restaurant: only supplied fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
}

impl RestaurantPatch {
    /// Checks constraints on every supplied field, reporting the first violation.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
            require_max_len("name", name, 60)?;
        }
        if let Some(description) = &self.description {
            require_non_empty("description", description)?;
            require_max_len("description", description, 1000)?;
        }
        if let Some(address) = &self.address {
            require_non_empty("address", address)?;
        }
        if let Some(location) = &self.location {
            validate_location("location", location)?;
        }
        if let Some(rating) = self.rating {
            validate_rating("rating", rating)?;
        }
        Ok(())
    }
}

/// Per-dish nutrition facts. All fields required and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl NutritionFacts {
    /// Field name / value pairs, in declaration order, for validation.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("nutritionFacts.calories", self.calories),
            ("nutritionFacts.protein", self.protein),
            ("nutritionFacts.carbohydrates", self.carbohydrates),
            ("nutritionFacts.fat", self.fat),
            ("nutritionFacts.fiber", self.fiber),
            ("nutritionFacts.sugar", self.sugar),
            ("nutritionFacts.sodium", self.sodium),
        ]
    }
}

/// A stored AI-derived food analysis, tied to a restaurant by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub id: String,
    /// Reference to a restaurant. Not verified against the restaurant
    /// collection at write time; a dangling reference is stored as-is.
    pub restaurant_id: String,
    pub dish: String,
    pub nutrition_facts: NutritionFacts,
    /// Overall nutritional quality, 0-100.
    pub health_score: i32,
    /// Free-text analysis narrative.
    pub analysis: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodAnalysis {
    /// Materializes a validated input into a stored document.
    /// `created_at` and `updated_at` are equal at creation.
    pub fn from_input(id: String, input: FoodAnalysisInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            restaurant_id: input.restaurant_id,
            dish: input.dish,
            nutrition_facts: input.nutrition_facts,
            health_score: input.health_score,
            analysis: input.analysis,
            recommendations: input.recommendations,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller-supplied food analysis; id and timestamps are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysisInput {
    pub restaurant_id: String,
    pub dish: String,
    pub nutrition_facts: NutritionFacts,
    pub health_score: i32,
    pub analysis: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl FoodAnalysisInput {
    /// Checks field constraints, reporting the first violation.
    ///
    /// The restaurant reference is only checked for syntactic plausibility;
    /// whether it names a live restaurant is deliberately not verified here.
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("restaurantId", &self.restaurant_id)?;
        require_non_empty("dish", &self.dish)?;
        require_max_len("dish", &self.dish, 100)?;
        for (field, value) in self.nutrition_facts.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::validation(field, "must be a non-negative number"));
            }
        }
        if !(0..=100).contains(&self.health_score) {
            return Err(AppError::validation(
                "healthScore",
                "must be an integer between 0 and 100",
            ));
        }
        require_non_empty("analysis", &self.analysis)?;
        require_max_len("analysis", &self.analysis, 2000)?;
        for recommendation in &self.recommendations {
            require_max_len("recommendations", recommendation, 500)?;
        }
        Ok(())
    }
}

/// Point-in-time statistics over the restaurant collection.
///
/// Derived on demand, never persisted. Mapping keys are exactly the distinct
/// category labels and price-tier symbols observed in the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_restaurants: usize,
    pub categories: HashMap<String, usize>,
    pub average_rating: f64,
    pub price_distribution: HashMap<String, usize>,
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn validate_rating(field: &'static str, rating: f64) -> Result<(), AppError> {
    if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
        return Err(AppError::validation(field, "must be between 1 and 5"));
    }
    Ok(())
}

fn validate_location(field: &'static str, location: &GeoPoint) -> Result<(), AppError> {
    let (lon, lat) = (location.longitude(), location.latitude());
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::validation(field, "longitude out of range"));
    }
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::validation(field, "latitude out of range"));
    }
    Ok(())
}
