//! Convolutional landmark classifier built on Candle
//!
//! Architecture (NHWC input, converted to NCHW internally):
//! three 3x3 conv + ReLU blocks (16, 32, 64 channels; the first two followed
//! by 2x2 max pooling), global average pooling, and a linear head with
//! softmax over the landmark classes.
//!
//! Weights are read from a safetensors file with tensors named
//! `conv1.*`, `conv2.*`, `conv3.*`, and `head.*`.
//!
//! The weights must be trained for exactly this layout. Checkpoints from
//! other architectures (for example an exported Keras model) will not load.

use crate::classifier::ImageClassifier;
use crate::preprocess::{ImageTensor, INPUT_CHANNELS};
use async_trait::async_trait;
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};
use std::path::Path;
use std::sync::Arc;
use summitlens_core::{Error, ProbabilityVector, Result};

const CONV_CHANNELS: [usize; 3] = [16, 32, 64];

struct Layers {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    head: Linear,
}

impl Layers {
    fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        let x = input.permute((0, 3, 1, 2))?.contiguous()?;
        let x = self.conv1.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv2.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv3.forward(&x)?.relu()?;
        let pooled = x.mean((2, 3))?;
        let logits = self.head.forward(&pooled)?;
        candle_nn::ops::softmax(&logits, D::Minus1)
    }

    fn scores(&self, input: &Tensor, device: &Device) -> candle_core::Result<Vec<f32>> {
        let input = input.to_device(device)?;
        self.forward(&input)?
            .squeeze(0)?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()
    }
}

/// Candle CNN scoring the landmark classes
pub struct MountainNet {
    layers: Arc<Layers>,
    device: Device,
    num_classes: usize,
}

impl MountainNet {
    /// Build the network from a variable builder
    pub fn new(vb: VarBuilder, num_classes: usize) -> Result<Self> {
        let device = vb.device().clone();
        let layers = Self::build_layers(vb, num_classes)
            .map_err(|e| Error::config(format!("Failed to build classifier: {}", e)))?;

        Ok(Self {
            layers: Arc::new(layers),
            device,
            num_classes,
        })
    }

    /// Load weights from a safetensors file
    pub fn load(path: impl AsRef<Path>, num_classes: usize, device: &Device) -> Result<Self> {
        let path = path.as_ref();
        // SAFETY: the weights file is treated as read-only for the lifetime of the process.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) }
            .map_err(|e| {
                Error::config(format!("Failed to load SafeTensors {}: {}", path.display(), e))
            })?;
        Self::new(vb, num_classes)
    }

    fn build_layers(vb: VarBuilder, num_classes: usize) -> candle_core::Result<Layers> {
        let cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let [c1, c2, c3] = CONV_CHANNELS;
        Ok(Layers {
            conv1: conv2d(INPUT_CHANNELS, c1, 3, cfg, vb.pp("conv1"))?,
            conv2: conv2d(c1, c2, 3, cfg, vb.pp("conv2"))?,
            conv3: conv2d(c2, c3, 3, cfg, vb.pp("conv3"))?,
            head: linear(c3, num_classes, vb.pp("head"))?,
        })
    }
}

#[async_trait]
impl ImageClassifier for MountainNet {
    async fn infer(&self, tensor: &ImageTensor) -> Result<ProbabilityVector> {
        let layers = Arc::clone(&self.layers);
        let device = self.device.clone();
        let input = tensor.as_tensor().clone();

        let scores = tokio::task::spawn_blocking(move || layers.scores(&input, &device))
            .await
            .map_err(|e| Error::inference(format!("inference task failed: {}", e)))?
            .map_err(|e| Error::inference(e.to_string()))?;

        Ok(ProbabilityVector::new(scores))
    }

    fn name(&self) -> &str {
        "mountain-net"
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::Preprocessor;
    use candle_nn::VarMap;
    use image::{DynamicImage, Rgb, RgbImage};

    fn sample_tensor() -> ImageTensor {
        let image = RgbImage::from_pixel(300, 200, Rgb([90, 120, 200]));
        Preprocessor::default()
            .preprocess_image(&DynamicImage::ImageRgb8(image))
            .unwrap()
    }

    #[tokio::test]
    async fn test_zero_weights_give_uniform_scores() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = MountainNet::new(vb, 10).unwrap();

        let probs = model.infer(&sample_tensor()).await.unwrap();
        assert_eq!(probs.len(), 10);
        for &score in probs.scores() {
            assert!((score - 0.1).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn test_random_weights_give_distribution() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = MountainNet::new(vb, 10).unwrap();

        let probs = model.infer(&sample_tensor()).await.unwrap();
        let total: f32 = probs.scores().iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert!(probs.scores().iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn test_safetensors_round_trip() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let original = MountainNet::new(vb, 10).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mountains.safetensors");
        varmap.save(&path).unwrap();

        let loaded = MountainNet::load(&path, 10, &Device::Cpu).unwrap();
        let tensor = sample_tensor();
        let a = original.infer(&tensor).await.unwrap();
        let b = loaded.infer(&tensor).await.unwrap();
        for (x, y) in a.scores().iter().zip(b.scores()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_weights_file() {
        let result = MountainNet::load("/nonexistent/weights.safetensors", 10, &Device::Cpu);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
