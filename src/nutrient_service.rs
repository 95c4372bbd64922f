//! # Nutrient Resolution Service
//!
//! Single entry point of the pipeline: cache lookup, then on a miss one
//! generation call, extraction and validation, cache write-back, and finally
//! quantity scaling.
//!
//! ```text
//! CacheLookup ─ hit ──────────────────────────────────────────▶ Scale ─▶ Done
//!      └─ miss ─▶ Generate ─ ok ─▶ Extract ─ valid ─▶ Persist ─▶ Scale ─▶ Done
//!                    └ fail ─▶ Unavailable   └ invalid ─▶ Unavailable
//! ```
//!
//! Operational failures (store I/O, service errors, unusable replies) end in
//! [`Resolution::Unavailable`]. Only caller contract violations are returned as
//! errors.

use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::generative_client::NutrientGenerator;
use crate::nutrient_model::{NutrientSource, Resolution, ServingUnit};
use crate::nutrient_store::StandardNutrientStore;
use crate::nutrition_config::MAX_FOOD_NAME_LENGTH;
use crate::nutrition_errors::NutritionError;
use crate::quantity_calculator;
use crate::response_extractor;

/// Validates a food name input
///
/// The name itself is returned unchanged; it is used verbatim as the cache key.
pub fn validate_food_name(name: &str) -> Result<&str, NutritionError> {
    if name.trim().is_empty() {
        return Err(NutritionError::EmptyFoodName);
    }

    if name.len() > MAX_FOOD_NAME_LENGTH {
        return Err(NutritionError::FoodNameTooLong(name.len()));
    }

    Ok(name)
}

/// Validates a consumed quantity
pub fn validate_quantity(quantity: f64) -> Result<f64, NutritionError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(NutritionError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

/// Resolves food entries into scaled nutrient values
#[derive(Clone)]
pub struct NutrientResolutionService {
    store: StandardNutrientStore,
    generator: Arc<dyn NutrientGenerator>,
}

impl NutrientResolutionService {
    pub fn new(store: StandardNutrientStore, generator: Arc<dyn NutrientGenerator>) -> Self {
        Self { store, generator }
    }

    /// Resolve nutrient values for `quantity` of `unit` of `food_name`
    ///
    /// # Errors
    ///
    /// Returns [`NutritionError`] for an empty user id, an empty or overlong
    /// food name, or a quantity that is not a positive finite number or is too
    /// large to scale the food's table without overflowing. Store and
    /// generation failures are not errors; they yield `Resolution::Unavailable`.
    pub async fn resolve(
        &self,
        user_id: &str,
        food_name: &str,
        quantity: f64,
        unit: ServingUnit,
    ) -> Result<Resolution, NutritionError> {
        if user_id.trim().is_empty() {
            return Err(NutritionError::EmptyUserId);
        }
        let food_name = validate_food_name(food_name)?;
        let quantity = validate_quantity(quantity)?;

        let cached = match self.store.get(user_id, food_name).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Nutrient cache lookup failed for '{food_name}': {e:#}");
                return Ok(Resolution::Unavailable);
            }
        };

        if let Some(table) = cached {
            info!("Nutrient cache hit for '{food_name}'");
            return Ok(Resolution::Resolved {
                serving: quantity_calculator::scale(&table, quantity, unit)?,
                source: NutrientSource::Cache,
            });
        }

        info!("Nutrient cache miss for '{food_name}', generating standard table");

        let Some(raw_text) = self.generator.generate(food_name).await else {
            warn!("No nutrient data generated for '{food_name}'");
            return Ok(Resolution::Unavailable);
        };

        let table = match response_extractor::extract_with_strategy(&raw_text) {
            Ok((table, strategy)) => {
                debug!(
                    "Nutrient table for '{food_name}' extracted via {}",
                    strategy.name()
                );
                table
            }
            Err(e) => {
                warn!("Unusable nutrient response for '{food_name}': {e}");
                return Ok(Resolution::Unavailable);
            }
        };

        let serving = quantity_calculator::scale(&table, quantity, unit)?;

        if let Err(e) = self.store.put(user_id, food_name, &table).await {
            warn!("Failed to cache nutrients for '{food_name}': {e:#}");
            return Ok(Resolution::Unavailable);
        }

        Ok(Resolution::Resolved {
            serving,
            source: NutrientSource::Generated,
        })
    }

    /// Same as [`resolve`](Self::resolve) with a unit given as text (e.g. "g", "pcs")
    pub async fn resolve_unit_str(
        &self,
        user_id: &str,
        food_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<Resolution, NutritionError> {
        let unit = ServingUnit::from_str(unit)?;
        self.resolve(user_id, food_name, quantity, unit).await
    }
}
