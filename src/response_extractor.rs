//! # Response Extractor Module
//!
//! Turns the free-form text returned by the generative service into a validated
//! [`NutrientTable`]. The service is asked for bare JSON but routinely wraps it in
//! prose or code fences, so extraction runs an ordered list of strategies and
//! stops at the first one that yields a complete table:
//!
//! 1. **Direct greedy match**: first `{` through last `}`
//! 2. **Fence-stripped retry**: drop leading/trailing code-fence markers, then 1
//! 3. **Brace-balanced scan**: line-by-line brace counting from the first `{` line
//!
//! Every parsed candidate goes through the same all-or-nothing validation: all four
//! serving bases, each with all twelve numeric, non-negative fields. A table with a
//! single missing field is rejected outright.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::nutrient_model::{NutrientTable, ServingBase, NUTRIENT_FIELDS};
use crate::nutrition_errors::ExtractionError;

/// First `{` through the last `}` (greedy, spans newlines)
static GREEDY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("greedy object pattern should be valid"));

/// Opening fence plus its language tag or info string
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[^\n]*\n?").expect("leading fence pattern should be valid"));

/// Closing fence at the very end
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("trailing fence pattern should be valid"));

/// Extraction strategies, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    DirectGreedy,
    FenceStripped,
    BraceBalanced,
}

impl ExtractionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::DirectGreedy => "direct_greedy",
            ExtractionStrategy::FenceStripped => "fence_stripped",
            ExtractionStrategy::BraceBalanced => "brace_balanced",
        }
    }
}

type StrategyFn = fn(&str) -> Result<NutrientTable, ExtractionError>;

const STRATEGIES: [(ExtractionStrategy, StrategyFn); 3] = [
    (ExtractionStrategy::DirectGreedy, direct_greedy_match),
    (ExtractionStrategy::FenceStripped, fence_stripped_match),
    (ExtractionStrategy::BraceBalanced, brace_balanced_scan),
];

/// Extract a validated nutrient table from a model reply
///
/// # Errors
///
/// Returns the most informative failure when no strategy produces a complete
/// table: a validation error if any candidate parsed, otherwise the last
/// syntactic error.
///
/// # Examples
///
/// ```rust
/// use nutrients::response_extractor::extract;
///
/// let reply = "Sure! Here you go:\n{\"per100Grams\": {\"energy\": 52}}";
/// // Incomplete tables are rejected as a whole
/// assert!(extract(reply).is_err());
/// ```
pub fn extract(raw_text: &str) -> Result<NutrientTable, ExtractionError> {
    extract_with_strategy(raw_text).map(|(table, _)| table)
}

/// Same as [`extract`], also reporting which strategy succeeded
pub fn extract_with_strategy(
    raw_text: &str,
) -> Result<(NutrientTable, ExtractionStrategy), ExtractionError> {
    let mut reported: Option<ExtractionError> = None;

    for (strategy, attempt) in STRATEGIES {
        match attempt(raw_text) {
            Ok(table) => {
                debug!("Extracted nutrient table using {} strategy", strategy.name());
                return Ok((table, strategy));
            }
            Err(err) => {
                debug!("Strategy {} failed: {}", strategy.name(), err);
                if reported.as_ref().map_or(true, ExtractionError::is_syntactic) {
                    reported = Some(err);
                }
            }
        }
    }

    Err(reported.unwrap_or(ExtractionError::NoJsonObject))
}

/// Strategy 1: parse the largest `{ ... }` span in the text
pub fn direct_greedy_match(text: &str) -> Result<NutrientTable, ExtractionError> {
    let candidate = GREEDY_OBJECT
        .find(text)
        .ok_or(ExtractionError::NoJsonObject)?;
    parse_table(candidate.as_str())
}

/// Strategy 2: strip code-fence markers, then apply strategy 1
pub fn fence_stripped_match(text: &str) -> Result<NutrientTable, ExtractionError> {
    direct_greedy_match(&strip_code_fences(text))
}

/// Strategy 3: accumulate lines from the first `{` until braces balance
pub fn brace_balanced_scan(text: &str) -> Result<NutrientTable, ExtractionError> {
    let mut block: Vec<&str> = Vec::new();
    let mut depth: i64 = 0;

    for line in text.lines() {
        if block.is_empty() && !line.contains('{') {
            continue;
        }

        block.push(line);
        depth += line.matches('{').count() as i64;
        depth -= line.matches('}').count() as i64;

        if depth <= 0 {
            break;
        }
    }

    if block.is_empty() {
        return Err(ExtractionError::NoJsonObject);
    }

    // Trim text sharing the first and last lines with the braces
    let joined = block.join("\n");
    let start = joined.find('{').ok_or(ExtractionError::NoJsonObject)?;
    let end = joined.rfind('}').ok_or(ExtractionError::NoJsonObject)?;
    if end < start {
        return Err(ExtractionError::NoJsonObject);
    }

    parse_table(&joined[start..=end])
}

/// Remove a leading fence (with any language tag) and a trailing fence
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let without_leading = LEADING_FENCE.replace(trimmed, "");
    let without_trailing = TRAILING_FENCE.replace(&without_leading, "");
    without_trailing.trim().to_string()
}

fn parse_table(candidate: &str) -> Result<NutrientTable, ExtractionError> {
    let value: Value = serde_json::from_str(candidate)?;
    validate_table_value(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Check that a parsed value carries every base and every field as a number
pub fn validate_table_value(value: &Value) -> Result<(), ExtractionError> {
    let object = value.as_object().ok_or(ExtractionError::NotAnObject)?;

    for base in ServingBase::ALL {
        let profile = object
            .get(base.key())
            .and_then(Value::as_object)
            .ok_or(ExtractionError::MissingBase(base))?;

        for field in NUTRIENT_FIELDS {
            let number = profile
                .get(field)
                .ok_or(ExtractionError::MissingField { base, field })?
                .as_f64()
                .ok_or(ExtractionError::NonNumericField { base, field })?;

            if !number.is_finite() {
                return Err(ExtractionError::NonFiniteField { base, field });
            }
            if number < 0.0 {
                return Err(ExtractionError::NegativeField { base, field });
            }
        }
    }

    Ok(())
}
