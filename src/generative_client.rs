//! # Generative Nutrient Client Module
//!
//! This module wraps the single external call that turns a food name into
//! free-form text believed to contain a JSON nutrient table. Failures of any
//! kind (network, quota, timeouts, empty replies) are logged and reported as
//! absence; they never propagate as errors to the resolution pipeline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::nutrient_model::{ServingBase, NUTRIENT_FIELDS};
use crate::nutrition_config::GenerationConfig;

/// Source of raw nutrient text for a food name
#[async_trait]
pub trait NutrientGenerator: Send + Sync {
    /// Ask the service for a nutrient table; `None` when no text is available
    async fn generate(&self, food_name: &str) -> Option<String>;
}

/// Build the prompt sent to the generative service for a food
pub fn build_nutrient_prompt(food_name: &str) -> String {
    let fields = NUTRIENT_FIELDS
        .iter()
        .map(|field| format!("\"{field}\": 0"))
        .collect::<Vec<_>>()
        .join(", ");
    let template = ServingBase::ALL
        .iter()
        .map(|base| format!("  \"{}\": {{ {} }}", base.key(), fields))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "Provide the standard nutritional values for the food \"{food_name}\".\n\
         Respond with ONLY a JSON object. Do not add explanations, prose, markdown or code fences.\n\
         The object must contain exactly these four keys: \"per100Grams\" (per 100 g), \
         \"per100Milliliters\" (per 100 ml), \"perPiece\" (per single piece) and \"perPack\" (per typical pack).\n\
         Each key maps to an object with exactly these twelve numeric fields: \
         energy (kcal), protein (g), carbohydrates (g), fat (g), fiber (g), sugar (g), \
         sodium (mg), cholesterol (mg), vitaminA (mcg), vitaminC (mg), calcium (mg), iron (mg).\n\
         Use plain numbers without units or quotes. If a serving base does not apply to this food \
         (for example milliliters for a solid food), set every field of that base to 0.\n\
         Follow this shape exactly:\n{{\n{template}\n}}"
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationSettings {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pull the reply text out of a `generateContent` response body
///
/// Text parts of the first candidate are concatenated.
pub fn parse_generate_response(body: &str) -> Result<String> {
    let response: GeminiResponse =
        serde_json::from_str(body).context("Failed to decode Gemini response")?;

    let text = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        anyhow::bail!("No text in Gemini response");
    }

    Ok(text)
}

/// Gemini-backed nutrient generator guarded by a circuit breaker
pub struct GeminiNutrientClient {
    client: reqwest::Client,
    api_key: String,
    config: GenerationConfig,
    circuit_breaker: CircuitBreaker,
}

impl GeminiNutrientClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error when no API key is configured or the HTTP client cannot be built.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("GEMINI_API_KEY must be set to generate nutrient tables")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        info!("Initialized Gemini nutrient client with model: {}", config.model);

        Ok(Self {
            client,
            api_key,
            circuit_breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
        })
    }

    /// Circuit breaker guarding this client
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            self.api_key
        )
    }

    async fn request_text(&self, prompt: String) -> Result<String> {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationSettings {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request_body)
            .send()
            .await
            // The URL carries the API key
            .map_err(reqwest::Error::without_url)
            .context("Gemini request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read Gemini response body")?;

        if !status.is_success() {
            anyhow::bail!("Gemini API request failed: {status} - {body}");
        }

        parse_generate_response(&body)
    }
}

#[async_trait]
impl NutrientGenerator for GeminiNutrientClient {
    async fn generate(&self, food_name: &str) -> Option<String> {
        if self.circuit_breaker.is_open() {
            warn!("Circuit breaker open, skipping nutrient generation for '{food_name}'");
            return None;
        }

        debug!("Requesting nutrient table for '{food_name}'");

        match self.request_text(build_nutrient_prompt(food_name)).await {
            Ok(text) => {
                self.circuit_breaker.record_success();
                info!(
                    "Received {} characters of nutrient text for '{food_name}'",
                    text.len()
                );
                Some(text)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                warn!("Nutrient generation failed for '{food_name}': {e:#}");
                None
            }
        }
    }
}

/// Generator used when no API key is configured; cached foods still resolve
#[derive(Debug, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl NutrientGenerator for DisabledGenerator {
    async fn generate(&self, food_name: &str) -> Option<String> {
        warn!("Nutrient generation disabled (no API key), cannot generate '{food_name}'");
        None
    }
}

/// Build the generator for a configuration
///
/// Returns a [`DisabledGenerator`] when `api_key` is absent.
pub fn generator_from_config(config: GenerationConfig) -> Result<Arc<dyn NutrientGenerator>> {
    if config.api_key.is_none() {
        warn!("GEMINI_API_KEY not set, only cached nutrient tables can be resolved");
        return Ok(Arc::new(DisabledGenerator));
    }
    Ok(Arc::new(GeminiNutrientClient::new(config)?))
}
