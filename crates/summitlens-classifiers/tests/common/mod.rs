//! Mock classifiers and image fixtures for testing
//!
//! Provides configurable mock implementations of the ImageClassifier trait
//! for testing decisions, timeouts, serialization, and error handling.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use summitlens_classifiers::{ImageClassifier, ImageTensor, Preprocessor};
use summitlens_core::{Error, ProbabilityVector, Result};

/// A classifier that always returns the same scores
pub struct FixedClassifier {
    name: String,
    scores: Vec<f32>,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl FixedClassifier {
    /// Create a new fixed classifier returning `scores`
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            name: "fixed".to_string(),
            scores,
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Ten classes with `score` at `index` and zero elsewhere
    pub fn one_hot(index: usize, score: f32) -> Self {
        let mut scores = vec![0.0; 10];
        scores[index] = score;
        Self::new(scores)
    }

    /// Set simulated latency for this classifier
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times infer was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ImageClassifier for FixedClassifier {
    async fn infer(&self, _tensor: &ImageTensor) -> Result<ProbabilityVector> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        Ok(ProbabilityVector::new(self.scores.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn num_classes(&self) -> usize {
        10
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier {
    error: fn() -> Error,
}

impl FailingClassifier {
    /// Fails with an inference error
    pub fn new() -> Self {
        Self {
            error: || Error::inference("Simulated classifier failure"),
        }
    }

    /// Fails with a non-inference error kind
    pub fn with_io_error() -> Self {
        Self {
            error: || {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "weights unreadable",
                ))
            },
        }
    }
}

#[async_trait]
impl ImageClassifier for FailingClassifier {
    async fn infer(&self, _tensor: &ImageTensor) -> Result<ProbabilityVector> {
        Err((self.error)())
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn num_classes(&self) -> usize {
        10
    }
}

/// A classifier that records overlapping calls, standing in for a
/// backend that must never run twice at once
pub struct ExclusiveClassifier {
    busy: AtomicBool,
    overlaps: AtomicU32,
    calls: AtomicU32,
    hold: Duration,
}

impl ExclusiveClassifier {
    pub fn new(hold: Duration) -> Self {
        Self {
            busy: AtomicBool::new(false),
            overlaps: AtomicU32::new(0),
            calls: AtomicU32::new(0),
            hold,
        }
    }

    /// Number of calls that started while another was running
    pub fn overlaps(&self) -> u32 {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageClassifier for ExclusiveClassifier {
    async fn infer(&self, _tensor: &ImageTensor) -> Result<ProbabilityVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let was_busy = self.busy.swap(true, Ordering::SeqCst);
        if was_busy {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        tokio::time::sleep(self.hold).await;

        if !was_busy {
            self.busy.store(false, Ordering::SeqCst);
        }

        let mut scores = vec![0.0; 10];
        scores[7] = 0.95;
        Ok(ProbabilityVector::new(scores))
    }

    fn name(&self) -> &str {
        "exclusive"
    }

    fn num_classes(&self) -> usize {
        10
    }
}

/// Encode an image as PNG bytes
pub fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A solid-colour RGBA image encoded as PNG
pub fn solid_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    png_bytes(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba(pixel),
    )))
}

/// A preprocessed tensor from a small solid image
pub fn sample_tensor() -> ImageTensor {
    Preprocessor::default()
        .preprocess(&solid_png(64, 48, [40, 80, 120, 255]))
        .unwrap()
}
