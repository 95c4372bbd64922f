//! # Nutrient Data Model
//!
//! This module defines the data structures that flow through the nutrient
//! resolution pipeline: the standard per-food nutrient table, the serving
//! bases it is keyed by, the units a user can enter, and the scaled serving
//! returned to the caller.
//!
//! ## Core Concepts
//!
//! - **Serving base**: a fixed reference quantity (100 g, 100 ml, 1 piece, 1 pack)
//! - **NutrientProfile**: twelve nutrient amounts for one serving base
//! - **NutrientTable**: one profile per serving base, all four always present
//! - **ResolvedServing**: a profile scaled to what the user actually ate
//!
//! ## Usage
//!
//! ```rust
//! use nutrients::nutrient_model::{NutrientProfile, NutrientTable, ServingBase, ServingUnit};
//!
//! let mut table = NutrientTable::default();
//! table.per_piece = NutrientProfile { energy: 40.0, protein: 1.2, ..Default::default() };
//!
//! let unit: ServingUnit = "pcs".parse().unwrap();
//! assert_eq!(unit.base(), ServingBase::PerPiece);
//! assert_eq!(table.profile(unit.base()).energy, 40.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::nutrition_errors::NutritionError;

/// Reference quantity a nutrient profile is expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServingBase {
    /// Per 100 grams
    #[serde(rename = "per100Grams")]
    Per100Grams,
    /// Per 100 milliliters
    #[serde(rename = "per100Milliliters")]
    Per100Milliliters,
    /// Per single piece
    #[serde(rename = "perPiece")]
    PerPiece,
    /// Per pack
    #[serde(rename = "perPack")]
    PerPack,
}

impl ServingBase {
    /// All serving bases, in table order
    pub const ALL: [ServingBase; 4] = [
        ServingBase::Per100Grams,
        ServingBase::Per100Milliliters,
        ServingBase::PerPiece,
        ServingBase::PerPack,
    ];

    /// JSON key used for this base in a nutrient table
    pub fn key(&self) -> &'static str {
        match self {
            ServingBase::Per100Grams => "per100Grams",
            ServingBase::Per100Milliliters => "per100Milliliters",
            ServingBase::PerPiece => "perPiece",
            ServingBase::PerPack => "perPack",
        }
    }
}

impl fmt::Display for ServingBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// JSON keys of the twelve fields every profile carries, in declaration order
pub const NUTRIENT_FIELDS: [&str; 12] = [
    "energy",
    "protein",
    "carbohydrates",
    "fat",
    "fiber",
    "sugar",
    "sodium",
    "cholesterol",
    "vitaminA",
    "vitaminC",
    "calcium",
    "iron",
];

/// Nutrient amounts for one serving base
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientProfile {
    /// Energy in kcal
    pub energy: f64,
    /// Protein in grams
    pub protein: f64,
    /// Carbohydrates in grams
    pub carbohydrates: f64,
    /// Fat in grams
    pub fat: f64,
    /// Dietary fiber in grams
    pub fiber: f64,
    /// Sugar in grams
    pub sugar: f64,
    /// Sodium in milligrams
    pub sodium: f64,
    /// Cholesterol in milligrams
    pub cholesterol: f64,
    /// Vitamin A
    pub vitamin_a: f64,
    /// Vitamin C
    pub vitamin_c: f64,
    /// Calcium
    pub calcium: f64,
    /// Iron
    pub iron: f64,
}

impl NutrientProfile {
    /// Field values in the same order as [`NUTRIENT_FIELDS`]
    pub fn values(&self) -> [f64; 12] {
        [
            self.energy,
            self.protein,
            self.carbohydrates,
            self.fat,
            self.fiber,
            self.sugar,
            self.sodium,
            self.cholesterol,
            self.vitamin_a,
            self.vitamin_c,
            self.calcium,
            self.iron,
        ]
    }

    /// Every field is a finite, non-negative number
    pub fn is_valid(&self) -> bool {
        self.values().iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// The food does not apply to this base (all fields zero)
    pub fn is_zero(&self) -> bool {
        self.values().iter().all(|v| *v == 0.0)
    }
}

/// Standard nutrient table for one food, one profile per serving base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTable {
    #[serde(rename = "per100Grams")]
    pub per_100_grams: NutrientProfile,
    #[serde(rename = "per100Milliliters")]
    pub per_100_milliliters: NutrientProfile,
    #[serde(rename = "perPiece")]
    pub per_piece: NutrientProfile,
    #[serde(rename = "perPack")]
    pub per_pack: NutrientProfile,
}

impl NutrientTable {
    /// Profile stored for the given serving base
    pub fn profile(&self, base: ServingBase) -> &NutrientProfile {
        match base {
            ServingBase::Per100Grams => &self.per_100_grams,
            ServingBase::Per100Milliliters => &self.per_100_milliliters,
            ServingBase::PerPiece => &self.per_piece,
            ServingBase::PerPack => &self.per_pack,
        }
    }

    /// Every profile satisfies the profile invariant
    pub fn is_valid(&self) -> bool {
        ServingBase::ALL
            .iter()
            .all(|base| self.profile(*base).is_valid())
    }
}

/// Unit a user enters a consumed quantity in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingUnit {
    Grams,
    Milliliters,
    Pieces,
    Pack,
}

impl ServingUnit {
    /// Serving base the stored table is read from for this unit
    pub fn base(&self) -> ServingBase {
        match self {
            ServingUnit::Grams => ServingBase::Per100Grams,
            ServingUnit::Milliliters => ServingBase::Per100Milliliters,
            ServingUnit::Pieces => ServingBase::PerPiece,
            ServingUnit::Pack => ServingBase::PerPack,
        }
    }

    /// Canonical lowercase name
    pub fn display_name(&self) -> &'static str {
        match self {
            ServingUnit::Grams => "grams",
            ServingUnit::Milliliters => "milliliters",
            ServingUnit::Pieces => "pieces",
            ServingUnit::Pack => "pack",
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ServingUnit {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit_str = s.trim().to_lowercase();

        match unit_str.as_str() {
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Ok(ServingUnit::Grams),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Ok(ServingUnit::Milliliters)
            }
            "piece" | "pieces" | "pc" | "pcs" => Ok(ServingUnit::Pieces),
            "pack" | "packs" | "packet" | "packets" => Ok(ServingUnit::Pack),
            _ => Err(NutritionError::InvalidUnit(s.to_string())),
        }
    }
}

/// Nutrient values for the quantity a user actually consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedServing {
    pub energy: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub cholesterol: f64,
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub calcium: f64,
    pub iron: f64,
}

impl ResolvedServing {
    /// Scaled values in [`NUTRIENT_FIELDS`] order
    pub fn values(&self) -> [f64; 12] {
        [
            self.energy,
            self.protein,
            self.carbohydrates,
            self.fat,
            self.fiber,
            self.sugar,
            self.sodium,
            self.cholesterol,
            self.vitamin_a,
            self.vitamin_c,
            self.calcium,
            self.iron,
        ]
    }
}

/// Where the standard table behind a resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientSource {
    /// Read from the per-user store
    Cache,
    /// Produced by the generative service during this resolution
    Generated,
}

/// Outcome of a nutrient resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Resolution {
    /// Nutrient values are available for the entry
    Resolved {
        serving: ResolvedServing,
        source: NutrientSource,
    },
    /// No nutrient data could be produced for this request
    Unavailable,
}

impl Resolution {
    /// The resolved serving, if any
    pub fn serving(&self) -> Option<&ResolvedServing> {
        match self {
            Resolution::Resolved { serving, .. } => Some(serving),
            Resolution::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Resolution::Unavailable)
    }
}
