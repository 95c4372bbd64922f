//! # Nutrition Error Types Module
//!
//! This module defines the error types used by the nutrient resolution pipeline.
//! Operational failures (service down, garbage replies, store I/O) never surface
//! as these errors; they become `Resolution::Unavailable`. What remains here are
//! caller contract violations and extraction diagnostics.

use crate::nutrient_model::ServingBase;

/// Caller contract violations rejected by the resolution service
#[derive(Debug, Clone, PartialEq)]
pub enum NutritionError {
    /// Food name is empty or whitespace
    EmptyFoodName,
    /// Food name exceeds the maximum length in bytes
    FoodNameTooLong(usize),
    /// User identifier is empty
    EmptyUserId,
    /// Quantity is zero, negative, or not finite
    InvalidQuantity(f64),
    /// Unit string does not name a supported unit
    InvalidUnit(String),
}

impl std::fmt::Display for NutritionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutritionError::EmptyFoodName => write!(f, "Food name must not be empty"),
            NutritionError::FoodNameTooLong(len) => {
                write!(f, "Food name is too long: {len} bytes")
            }
            NutritionError::EmptyUserId => write!(f, "User id must not be empty"),
            NutritionError::InvalidQuantity(quantity) => {
                write!(f, "Quantity must be a positive number, got {quantity}")
            }
            NutritionError::InvalidUnit(unit) => write!(
                f,
                "Unsupported unit: {unit} (expected grams, milliliters, pieces or pack)"
            ),
        }
    }
}

impl std::error::Error for NutritionError {}

/// Reasons a model reply could not be turned into a nutrient table
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// No `{ ... }` block found in the text
    NoJsonObject,
    /// A candidate block was found but is not valid JSON
    Parse(String),
    /// Parsed JSON is not an object
    NotAnObject,
    /// A serving base key is absent or not an object
    MissingBase(ServingBase),
    /// A required nutrient field is absent from a base
    MissingField {
        base: ServingBase,
        field: &'static str,
    },
    /// A required nutrient field is present but not a number
    NonNumericField {
        base: ServingBase,
        field: &'static str,
    },
    /// A required nutrient field is negative
    NegativeField {
        base: ServingBase,
        field: &'static str,
    },
    /// A required nutrient field is infinite or NaN
    NonFiniteField {
        base: ServingBase,
        field: &'static str,
    },
}

impl ExtractionError {
    /// Whether the failure happened before any JSON could be parsed
    pub fn is_syntactic(&self) -> bool {
        matches!(self, ExtractionError::NoJsonObject | ExtractionError::Parse(_))
    }
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::NoJsonObject => write!(f, "No JSON object found in response"),
            ExtractionError::Parse(msg) => write!(f, "JSON parse error: {msg}"),
            ExtractionError::NotAnObject => write!(f, "Response JSON is not an object"),
            ExtractionError::MissingBase(base) => write!(f, "Missing serving base: {base}"),
            ExtractionError::MissingField { base, field } => {
                write!(f, "Missing field {field} in {base}")
            }
            ExtractionError::NonNumericField { base, field } => {
                write!(f, "Field {field} in {base} is not numeric")
            }
            ExtractionError::NegativeField { base, field } => {
                write!(f, "Field {field} in {base} is negative")
            }
            ExtractionError::NonFiniteField { base, field } => {
                write!(f, "Field {field} in {base} is not a finite number")
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Parse(err.to_string())
    }
}
