//! SummitLens Core
//!
//! Core types and utilities shared across SummitLens components.
//!
//! This crate provides:
//! - The error taxonomy for the inference request pipeline
//! - Probability vectors produced by classifiers
//! - Prediction records and their wire representation
//! - Request stages used for structured logging

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Prediction, PredictionResponse, ProbabilityVector, RequestStage, NO_MOUNTAIN_DESCRIPTION,
    NO_MOUNTAIN_LABEL,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Prediction, PredictionResponse, ProbabilityVector, RequestStage};
}
