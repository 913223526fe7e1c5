//! Model loading for Candle-based image classifiers

use crate::classifier::{ImageClassifier, SerializedClassifier};
use crate::mountain_net::MountainNet;
use candle_core::Device;
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use summitlens_core::{Error, Result};
use tracing::info;

/// Configuration for loading a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Source of the model weights
    pub source: ModelSource,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceType,

    /// Whether the backend tolerates concurrent calls.
    /// When false, calls are queued one at a time.
    #[serde(default = "default_true")]
    pub reentrant: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::Local {
                path: PathBuf::from("./models/mountains.safetensors"),
            },
            device: DeviceType::Cpu,
            reentrant: true,
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Create a new model configuration from Hugging Face
    pub fn from_hf(repo: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo: repo.into(),
                revision: default_revision(),
                filename: filename.into(),
            },
            ..Default::default()
        }
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    /// Mark the backend as non-reentrant
    pub fn serialized(mut self) -> Self {
        self.reentrant = false;
        self
    }
}

/// Source location for model weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from local file system
    Local { path: PathBuf },

    /// Download from Hugging Face Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
        #[serde(default = "default_filename")]
        filename: String,
    },
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_filename() -> String {
    "model.safetensors".to_string()
}

fn default_true() -> bool {
    true
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, index) = match s.split_once(':') {
            Some((kind, idx)) => {
                let idx = idx
                    .parse()
                    .map_err(|_| Error::config(format!("invalid device index in '{}'", s)))?;
                (kind, idx)
            }
            None => (s, 0),
        };
        match kind.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            other => Err(Error::config(format!("unknown device '{}'", other))),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(idx) => write!(f, "cuda:{}", idx),
            Self::Metal(idx) => write!(f, "metal:{}", idx),
        }
    }
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::config(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::config(format!("Failed to create Metal device: {}", e))),
    }
}

/// Resolve the weights file, downloading it from the Hub if needed
pub fn resolve_weights_path(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Model file not found: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo,
            revision,
            filename,
        } => {
            info!("Downloading model from HuggingFace: {} @ {}", repo, revision);
            let api = Api::new()
                .map_err(|e| Error::config(format!("Failed to initialize HF API: {}", e)))?;

            let repo = api.repo(Repo::with_revision(
                repo.clone(),
                RepoType::Model,
                revision.clone(),
            ));

            repo.get(filename)
                .map_err(|e| Error::config(format!("Failed to download model from HF: {}", e)))
        }
    }
}

/// Load the configured classifier for a catalog of `num_classes` landmarks.
///
/// `device` should be the same handle the preprocessor allocates on, so input
/// tensors are never copied between devices.
pub fn load_classifier(
    config: &ModelConfig,
    num_classes: usize,
    device: &Device,
) -> Result<Arc<dyn ImageClassifier>> {
    let weights_path = resolve_weights_path(&config.source)?;

    info!(
        "Loading classifier weights from {} on {}",
        weights_path.display(),
        config.device
    );
    let model = MountainNet::load(&weights_path, num_classes, device)?;

    if config.reentrant {
        Ok(Arc::new(model))
    } else {
        info!("Classifier marked non-reentrant; inference calls will be serialized");
        Ok(Arc::new(SerializedClassifier::new(model)))
    }
}
