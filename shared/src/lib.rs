//! Shared types, models and the credit scoring engine for AgriScore
//!
//! This crate contains everything that has to behave identically on the
//! backend and in the browser (via WASM): the evaluation parser, the scoring
//! functions and the records exchanged with the API.

pub mod models;
pub mod scoring;
pub mod types;
pub mod validation;

pub use models::*;
pub use scoring::*;
pub use types::*;
pub use validation::*;
