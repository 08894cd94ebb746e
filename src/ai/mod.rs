//! AI nutrition analysis client.
//!
//! Talks to an OpenAI-style chat-completions endpoint and shapes the model's
//! free-text reply. The model is asked for JSON but not trusted to produce
//! it: the reply is parsed into a tagged [`AiAnalysis`] — `Structured` when
//! the JSON parses, `Unstructured` carrying the raw text when it does not —
//! and the caller decides how to degrade.
//!
//! Normalization policy for structured replies: an absent numeric nutrition
//! field defaults to 0, an absent health score to 50, absent lists to empty.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const ANALYZE_SYSTEM_PROMPT: &str = r#"You are a professional nutrition analyst. Given a food description, reply with JSON in exactly this shape:
{
    "recommendation": "detailed dietary advice",
    "healthScore": <integer 0-100>,
    "nutritionInfo": {
        "calories": <estimated kcal>,
        "protein": <grams>,
        "carbs": <grams>,
        "fat": <grams>
    },
    "tags": ["relevant tags"],
    "healthyAlternatives": ["healthier substitutions"]
}
Reply with valid JSON only."#;

const RECOMMEND_SYSTEM_PROMPT: &str = r#"You are an expert on restaurants around the university campus. Given the user's preferences, reply with a JSON array of 3-5 suggestions:
[{
    "name": "restaurant name",
    "description": "what makes it a fit",
    "rating": <1-5>,
    "tags": ["relevant tags"],
    "location": "where it is",
    "priceRange": "relative cost"
}]
Reply with valid JSON only."#;

/// Configuration for the chat-completions client.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
}

/// Result of shaping the model's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum AiAnalysis {
    /// The reply parsed as JSON; fields are normalized per the module policy.
    Structured(StructuredAnalysis),
    /// The reply was not JSON; the raw text is carried through untouched.
    Unstructured(String),
}

/// Normalized fields extracted from a structured reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    pub recommendation: String,
    pub health_score: i32,
    pub nutrition_info: NutritionEstimate,
    pub tags: Vec<String>,
    pub healthy_alternatives: Vec<String>,
}

/// Coarse nutrition estimate from the model, in kcal and grams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A restaurant suggestion from the recommendation prompt. Free-form except
/// for the rating; the model's output is not held to the stored-data schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price_range: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the nutrition-analysis and recommendation prompts.
pub struct NutritionAnalyzer {
    http_client: reqwest::Client,
    config: AiConfig,
}

impl NutritionAnalyzer {
    pub fn new(config: AiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Analyze a free-text food description.
    pub async fn analyze(&self, description: &str) -> Result<AiAnalysis> {
        let reply = self.chat(ANALYZE_SYSTEM_PROMPT, description).await?;
        Ok(parse_analysis(&reply))
    }

    /// Generate restaurant suggestions for the given preferences.
    pub async fn recommend(&self, preferences: &str) -> Result<Vec<RestaurantSuggestion>> {
        let reply = self.chat(RECOMMEND_SYSTEM_PROMPT, preferences).await?;
        Ok(parse_suggestions(&reply))
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self.http_client.post(&self.config.api_url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
            } else if e.is_connect() {
                anyhow::anyhow!("Cannot connect to AI backend at {}", self.config.api_url)
            } else {
                anyhow::anyhow!("Failed to send request: {}", e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("AI API error {}: {}", status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat-completions response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("AI reply contained no choices")?;
        debug!("AI reply: {} chars", content.len());
        Ok(content)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    recommendation: Option<String>,
    health_score: Option<i32>,
    nutrition_info: Option<RawNutrition>,
    tags: Option<Vec<String>>,
    healthy_alternatives: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct RawNutrition {
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
}

/// Shape a model reply into the tagged analysis result.
pub fn parse_analysis(reply: &str) -> AiAnalysis {
    let candidate = strip_code_fence(reply);
    match serde_json::from_str::<RawAnalysis>(candidate) {
        Ok(raw) => {
            let nutrition = raw.nutrition_info.unwrap_or_default();
            AiAnalysis::Structured(StructuredAnalysis {
                recommendation: raw.recommendation.unwrap_or_default(),
                health_score: raw.health_score.unwrap_or(50),
                nutrition_info: NutritionEstimate {
                    calories: nutrition.calories.unwrap_or(0.0),
                    protein: nutrition.protein.unwrap_or(0.0),
                    carbs: nutrition.carbs.unwrap_or(0.0),
                    fat: nutrition.fat.unwrap_or(0.0),
                },
                tags: raw.tags.unwrap_or_default(),
                healthy_alternatives: raw.healthy_alternatives.unwrap_or_default(),
            })
        }
        Err(_) => AiAnalysis::Unstructured(reply.to_string()),
    }
}

/// Shape a model reply into suggestions; a non-array reply yields an empty
/// list rather than an error.
pub fn parse_suggestions(reply: &str) -> Vec<RestaurantSuggestion> {
    let candidate = strip_code_fence(reply);
    match serde_json::from_str::<Vec<RestaurantSuggestion>>(candidate) {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("Recommendation reply was not a JSON array: {}", e);
            Vec::new()
        }
    }
}

/// Models often wrap JSON in a markdown code fence; strip it before parsing.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
