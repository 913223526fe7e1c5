//! Core types for SummitLens

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label reported when no class reaches the confidence threshold
pub const NO_MOUNTAIN_LABEL: &str = "No mountain detected";

/// Description paired with [`NO_MOUNTAIN_LABEL`]
pub const NO_MOUNTAIN_DESCRIPTION: &str = "The image does not contain a recognized mountain.";

/// Per-class confidence scores produced by a classifier.
///
/// Position `i` scores catalog entry `i`. Scores are not required to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    /// Wrap raw classifier scores
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    /// Number of scores
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector holds no scores
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw scores in class order
    pub fn scores(&self) -> &[f32] {
        &self.0
    }

    /// Highest score and its index.
    ///
    /// Ties resolve to the first index holding the maximum.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &score) in self.0.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((idx, score)),
            }
        }
        best
    }

    /// Check that the vector can be mapped onto a catalog of `expected` classes.
    pub fn validate(&self, expected: usize) -> Result<()> {
        if self.0.len() != expected {
            return Err(Error::inference(format!(
                "classifier returned {} scores, expected {}",
                self.0.len(),
                expected
            )));
        }
        if let Some(idx) = self.0.iter().position(|s| !s.is_finite()) {
            return Err(Error::inference(format!(
                "classifier returned a non-finite score at index {idx}"
            )));
        }
        Ok(())
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(scores: Vec<f32>) -> Self {
        Self::new(scores)
    }
}

/// Outcome of a successful classification.
///
/// Falling below the threshold is a valid decision, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// A catalog landmark was recognized
    Detected {
        index: usize,
        label: String,
        description: String,
        confidence: f32,
    },

    /// The best score was below the configured threshold
    NoMountain { confidence: f32 },
}

impl Prediction {
    /// Label as reported to callers
    pub fn label(&self) -> &str {
        match self {
            Self::Detected { label, .. } => label,
            Self::NoMountain { .. } => NO_MOUNTAIN_LABEL,
        }
    }

    /// Description as reported to callers
    pub fn description(&self) -> &str {
        match self {
            Self::Detected { description, .. } => description,
            Self::NoMountain { .. } => NO_MOUNTAIN_DESCRIPTION,
        }
    }

    /// Highest classifier score behind this decision
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Detected { confidence, .. } | Self::NoMountain { confidence } => *confidence,
        }
    }

    /// Whether a landmark was recognized
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }

    /// Metrics label for this outcome
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Detected { .. } => "detected",
            Self::NoMountain { .. } => "no_mountain",
        }
    }
}

/// Wire shape of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Landmark label, or "No mountain detected"
    pub prediction: String,

    /// Landmark description, or a fixed explanatory sentence
    pub description: String,
}

impl From<&Prediction> for PredictionResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            prediction: prediction.label().to_string(),
            description: prediction.description().to_string(),
        }
    }
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self::from(&prediction)
    }
}

/// Stages a single request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Decoding,
    Preprocessed,
    Inferring,
    Decided,
    Responded,
    Failed,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Decoding => "decoding",
            Self::Preprocessed => "preprocessed",
            Self::Inferring => "inferring",
            Self::Decided => "decided",
            Self::Responded => "responded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
