//! SummitLens Classifiers
//!
//! The landmark inference pipeline:
//! - Preprocessing of uploaded bytes into a fixed `(1, 224, 224, 3)` tensor
//! - The [`ImageClassifier`] seam behind which any model backend plugs in
//! - Confidence-threshold decisions and catalog lookup
//! - A Candle CNN backend loaded from safetensors (local or Hugging Face Hub)

pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod model_loader;
pub mod mountain_net;
pub mod preprocess;

pub use catalog::{CatalogEntry, ClassCatalog, DescriptionStyle};
pub use classifier::{ImageClassifier, SerializedClassifier};
pub use engine::{
    apply_threshold, decide, InferenceEngine, DEFAULT_INFERENCE_TIMEOUT, DEFAULT_THRESHOLD,
};
pub use model_loader::{load_classifier, DeviceType, ModelConfig, ModelSource};
pub use mountain_net::MountainNet;
pub use preprocess::{preprocess, ImageTensor, Preprocessor, INPUT_CHANNELS, INPUT_SIZE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{ClassCatalog, DescriptionStyle};
    pub use crate::classifier::{ImageClassifier, SerializedClassifier};
    pub use crate::engine::InferenceEngine;
    pub use crate::model_loader::{DeviceType, ModelConfig, ModelSource};
    pub use crate::preprocess::{ImageTensor, Preprocessor};
}
