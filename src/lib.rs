//! # Nutrients
//!
//! Resolves free-text food entries into per-serving nutrient values. Standard
//! nutrient tables are cached per user and food name; on a cache miss a
//! generative language model is asked for one, its loosely structured reply is
//! extracted and validated, and the table is scaled to the entered quantity.

pub mod circuit_breaker;
pub mod document_store;
pub mod generative_client;
pub mod logging;
pub mod nutrient_model;
pub mod nutrient_service;
pub mod nutrient_store;
pub mod nutrition_config;
pub mod nutrition_errors;
pub mod quantity_calculator;
pub mod response_extractor;
