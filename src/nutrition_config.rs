//! # Nutrition Configuration Module
//!
//! This module defines configuration structures for nutrient resolution,
//! including the generative service settings, circuit breaker recovery
//! settings, and storage/logging options read from the environment.

use anyhow::{Context, Result};

// Constants for nutrition configuration
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_FOOD_NAME_LENGTH: usize = 255;

/// Recovery configuration for the generative service
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryConfig {
    /// Consecutive failures before the circuit opens
    pub circuit_breaker_threshold: u32,
    /// Seconds after the last failure before the circuit closes again
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Settings for the generative content service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// API key; without one only cached tables resolve
    pub api_key: Option<String>,
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,
    /// Base URL of the generateContent API
    pub api_base: String,
    /// Sampling temperature, kept low for stable tables
    pub temperature: f32,
    /// Timeout for a single generation request in seconds
    pub request_timeout_secs: u64,
    /// Circuit breaker settings
    pub recovery: RecoveryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Log output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionConfig {
    /// Generative service configuration
    pub generation: GenerationConfig,
    /// PostgreSQL connection string; in-memory storage when absent
    pub database_url: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

impl NutritionConfig {
    /// Load configuration from process environment variables
    ///
    /// Recognized variables: `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_API_BASE`,
    /// `GEMINI_TIMEOUT_SECS`, `CIRCUIT_BREAKER_THRESHOLD`, `CIRCUIT_BREAKER_RESET_SECS`,
    /// `DATABASE_URL`, `LOG_FORMAT` (`plain` or `json`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset and empty values fall back to defaults; malformed numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = GenerationConfig::default();

        let request_timeout_secs = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid GEMINI_TIMEOUT_SECS: {raw}"))?,
            None => defaults.request_timeout_secs,
        };

        let circuit_breaker_threshold = match get("CIRCUIT_BREAKER_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid CIRCUIT_BREAKER_THRESHOLD: {raw}"))?,
            None => defaults.recovery.circuit_breaker_threshold,
        };

        let circuit_breaker_reset_secs = match get("CIRCUIT_BREAKER_RESET_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid CIRCUIT_BREAKER_RESET_SECS: {raw}"))?,
            None => defaults.recovery.circuit_breaker_reset_secs,
        };

        let log_format = match get("LOG_FORMAT").map(|f| f.trim().to_lowercase()) {
            None => LogFormat::Plain,
            Some(format) if format == "plain" => LogFormat::Plain,
            Some(format) if format == "json" => LogFormat::Json,
            Some(other) => anyhow::bail!("Invalid LOG_FORMAT: {other} (expected plain or json)"),
        };

        Ok(Self {
            generation: GenerationConfig {
                api_key: get("GEMINI_API_KEY"),
                model: get("GEMINI_MODEL").unwrap_or(defaults.model),
                api_base: get("GEMINI_API_BASE").unwrap_or(defaults.api_base),
                temperature: defaults.temperature,
                request_timeout_secs,
                recovery: RecoveryConfig {
                    circuit_breaker_threshold,
                    circuit_breaker_reset_secs,
                },
            },
            database_url: get("DATABASE_URL"),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = NutritionConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, NutritionConfig::default());
        assert_eq!(config.generation.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.generation.request_timeout_secs, 30);
        assert_eq!(config.generation.recovery.circuit_breaker_threshold, 5);
        assert_eq!(config.generation.recovery.circuit_breaker_reset_secs, 60);
        assert!(config.generation.api_key.is_none());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = NutritionConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("CIRCUIT_BREAKER_THRESHOLD", "2"),
            ("CIRCUIT_BREAKER_RESET_SECS", "10"),
            ("DATABASE_URL", "postgres://localhost/nutrients"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.generation.api_key.as_deref(), Some("secret"));
        assert_eq!(config.generation.model, "gemini-1.5-pro");
        assert_eq!(config.generation.request_timeout_secs, 5);
        assert_eq!(config.generation.recovery.circuit_breaker_threshold, 2);
        assert_eq!(config.generation.recovery.circuit_breaker_reset_secs, 10);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/nutrients")
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_values_fall_back() {
        let config =
            NutritionConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  "), ("DATABASE_URL", "")]))
                .unwrap();
        assert!(config.generation.api_key.is_none());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_malformed_numbers_are_errors() {
        assert!(NutritionConfig::from_lookup(lookup_from(&[("GEMINI_TIMEOUT_SECS", "soon")])).is_err());
        assert!(NutritionConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
