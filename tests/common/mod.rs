//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use nutrients::document_store::{DocumentStore, InMemoryDocumentStore};
use nutrients::generative_client::NutrientGenerator;
use nutrients::nutrient_model::{NutrientProfile, NutrientTable};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Generator returning a canned reply and counting calls
pub struct FakeGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl NutrientGenerator for FakeGenerator {
    async fn generate(&self, food_name: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(food_name.to_string());
        self.reply.clone()
    }
}

/// In-memory document store that counts operations and can fail on demand
#[derive(Default)]
pub struct RecordingDocumentStore {
    inner: InMemoryDocumentStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    fail_get: bool,
    fail_set: bool,
}

impl RecordingDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_get: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_set: true,
            ..Self::default()
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            anyhow::bail!("store unreachable");
        }
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set {
            anyhow::bail!("store unreachable");
        }
        self.inner.set(path, value).await
    }
}

/// Profile JSON with every field set to `value`
pub fn uniform_profile(value: f64) -> Value {
    json!({
        "energy": value, "protein": value, "carbohydrates": value, "fat": value,
        "fiber": value, "sugar": value, "sodium": value, "cholesterol": value,
        "vitaminA": value, "vitaminC": value, "calcium": value, "iron": value
    })
}

/// A complete, realistic table for cooked white rice
pub fn rice_table_json() -> Value {
    json!({
        "per100Grams": {
            "energy": 130, "protein": 2.7, "carbohydrates": 28.2, "fat": 0.3,
            "fiber": 0.4, "sugar": 0.1, "sodium": 1, "cholesterol": 0,
            "vitaminA": 0, "vitaminC": 0, "calcium": 10, "iron": 1.2
        },
        "per100Milliliters": uniform_profile(0.0),
        "perPiece": uniform_profile(0.0),
        "perPack": {
            "energy": 325, "protein": 6.8, "carbohydrates": 70.5, "fat": 0.8,
            "fiber": 1.0, "sugar": 0.3, "sodium": 3, "cholesterol": 0,
            "vitaminA": 0, "vitaminC": 0, "calcium": 25, "iron": 3
        }
    })
}

/// Table for idli, one piece being the useful base
pub fn idli_table() -> NutrientTable {
    NutrientTable {
        per_100_grams: NutrientProfile {
            energy: 130.0,
            protein: 3.9,
            carbohydrates: 26.0,
            fat: 0.4,
            fiber: 1.0,
            sugar: 0.2,
            sodium: 220.0,
            cholesterol: 0.0,
            vitamin_a: 0.0,
            vitamin_c: 0.0,
            calcium: 12.0,
            iron: 1.0,
        },
        per_100_milliliters: NutrientProfile::default(),
        per_piece: NutrientProfile {
            energy: 40.0,
            protein: 1.2,
            carbohydrates: 8.0,
            fat: 0.1,
            fiber: 0.3,
            sugar: 0.05,
            sodium: 65.0,
            cholesterol: 0.0,
            vitamin_a: 0.0,
            vitamin_c: 0.0,
            calcium: 4.0,
            iron: 0.3,
        },
        per_pack: NutrientProfile::default(),
    }
}
