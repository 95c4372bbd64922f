//! # Quantity Calculator Module
//!
//! Scales a standard nutrient table to the quantity a user entered. Tables are
//! stored per 100 g, per 100 ml, per piece and per pack, so gram and milliliter
//! quantities are divided by 100 while piece and pack counts multiply directly.

use crate::nutrient_model::{NutrientProfile, NutrientTable, ResolvedServing, ServingUnit};
use crate::nutrition_errors::NutritionError;

/// Factor applied to the base profile for a quantity in `unit`
pub fn multiplier(quantity: f64, unit: ServingUnit) -> f64 {
    match unit {
        ServingUnit::Grams | ServingUnit::Milliliters => quantity / 100.0,
        ServingUnit::Pieces | ServingUnit::Pack => quantity,
    }
}

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scale the matching base profile of `table` to `quantity` of `unit`
///
/// An all-zero base (e.g. milliliters of a solid food) yields zeros.
///
/// # Errors
///
/// Returns [`NutritionError::InvalidQuantity`] when the quantity is so large
/// that a scaled value is no longer a finite number.
///
/// # Examples
///
/// ```rust
/// use nutrients::nutrient_model::{NutrientProfile, NutrientTable, ServingUnit};
/// use nutrients::quantity_calculator::scale;
///
/// let table = NutrientTable {
///     per_100_grams: NutrientProfile { energy: 200.0, ..Default::default() },
///     ..Default::default()
/// };
/// assert_eq!(scale(&table, 150.0, ServingUnit::Grams).unwrap().energy, 300.0);
/// ```
pub fn scale(
    table: &NutrientTable,
    quantity: f64,
    unit: ServingUnit,
) -> Result<ResolvedServing, NutritionError> {
    let serving = scale_profile(table.profile(unit.base()), multiplier(quantity, unit));
    if serving.values().iter().all(|value| value.is_finite()) {
        Ok(serving)
    } else {
        Err(NutritionError::InvalidQuantity(quantity))
    }
}

fn scale_profile(profile: &NutrientProfile, factor: f64) -> ResolvedServing {
    ResolvedServing {
        energy: (profile.energy * factor).round(),
        protein: round_to_tenth(profile.protein * factor),
        carbohydrates: round_to_tenth(profile.carbohydrates * factor),
        fat: round_to_tenth(profile.fat * factor),
        fiber: round_to_tenth(profile.fiber * factor),
        sugar: round_to_tenth(profile.sugar * factor),
        sodium: (profile.sodium * factor).round(),
        cholesterol: (profile.cholesterol * factor).round(),
        vitamin_a: (profile.vitamin_a * factor).round(),
        vitamin_c: (profile.vitamin_c * factor).round(),
        calcium: (profile.calcium * factor).round(),
        iron: (profile.iron * factor).round(),
    }
}
