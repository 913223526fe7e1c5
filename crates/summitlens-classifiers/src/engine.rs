//! Inference decision engine
//!
//! Runs the classifier on a preprocessed tensor and turns its scores into a
//! [`Prediction`] using a confidence threshold. A maximum score strictly below
//! the threshold yields [`Prediction::NoMountain`]; otherwise the first class
//! holding the maximum is looked up in the catalog.

use crate::catalog::ClassCatalog;
use crate::classifier::ImageClassifier;
use crate::preprocess::{ImageTensor, Preprocessor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use summitlens_core::{Error, Prediction, ProbabilityVector, RequestStage, Result};
use tracing::{debug, info};

/// Threshold used when none is configured
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Upper bound on a single classifier call when none is configured
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply the confidence policy to a probability vector
pub fn apply_threshold(
    probs: &ProbabilityVector,
    catalog: &ClassCatalog,
    threshold: f32,
) -> Result<Prediction> {
    probs.validate(catalog.len())?;

    let (index, confidence) = probs
        .argmax()
        .ok_or_else(|| Error::inference("classifier returned no scores"))?;

    if confidence < threshold {
        return Ok(Prediction::NoMountain { confidence });
    }

    let entry = catalog.get(index).ok_or_else(|| {
        Error::inference(format!("class index {} has no catalog entry", index))
    })?;

    Ok(Prediction::Detected {
        index,
        label: entry.label.clone(),
        description: entry.description.clone(),
        confidence,
    })
}

/// Invoke the classifier and decide on a prediction.
///
/// Every classifier failure is reported as [`Error::Inference`].
pub async fn decide(
    tensor: &ImageTensor,
    classifier: &dyn ImageClassifier,
    catalog: &ClassCatalog,
    threshold: f32,
) -> Result<Prediction> {
    let probs = classifier.infer(tensor).await.map_err(|e| match e {
        Error::Inference(_) => e,
        other => Error::inference(other.to_string()),
    })?;
    apply_threshold(&probs, catalog, threshold)
}

/// Shared, read-only pipeline: preprocessing, classification, and decision
#[derive(Clone)]
pub struct InferenceEngine {
    classifier: Arc<dyn ImageClassifier>,
    catalog: Arc<ClassCatalog>,
    preprocessor: Preprocessor,
    threshold: f32,
    timeout: Duration,
}

impl InferenceEngine {
    /// Create an engine, checking the threshold and catalog alignment
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        catalog: Arc<ClassCatalog>,
        threshold: f32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::config(format!(
                "confidence threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        catalog.ensure_aligned(classifier.num_classes())?;

        info!(
            classifier = classifier.name(),
            classes = catalog.len(),
            threshold,
            "inference engine ready"
        );

        Ok(Self {
            classifier,
            catalog,
            preprocessor: Preprocessor::default(),
            threshold,
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        })
    }

    /// Bound each classifier call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preprocessor targeting a specific device
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Run the full pipeline on raw upload bytes
    pub async fn predict(&self, bytes: Vec<u8>) -> Result<Prediction> {
        debug!(stage = %RequestStage::Received, size = bytes.len(), "request received");

        debug!(stage = %RequestStage::Decoding, "decoding image");
        let preprocessor = self.preprocessor.clone();
        let tensor = tokio::task::spawn_blocking(move || preprocessor.preprocess(&bytes))
            .await
            .map_err(|e| Error::decode(format!("image decoding aborted: {}", e)))??;
        debug!(stage = %RequestStage::Preprocessed, "image preprocessed");

        self.decide(&tensor).await
    }

    /// Classify a preprocessed tensor, bounded by the configured timeout
    pub async fn decide(&self, tensor: &ImageTensor) -> Result<Prediction> {
        debug!(stage = %RequestStage::Inferring, classifier = self.classifier.name(), "running classifier");
        let start = Instant::now();

        let outcome = tokio::time::timeout(
            self.timeout,
            decide(tensor, self.classifier.as_ref(), &self.catalog, self.threshold),
        )
        .await
        .map_err(|_| {
            Error::inference(format!("classifier timed out after {:?}", self.timeout))
        })?;

        let prediction = outcome?;
        debug!(
            stage = %RequestStage::Decided,
            outcome = prediction.outcome(),
            confidence = prediction.confidence(),
            latency_us = start.elapsed().as_micros() as u64,
            "decision made"
        );
        Ok(prediction)
    }
}
