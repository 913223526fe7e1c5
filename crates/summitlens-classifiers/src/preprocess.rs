//! Image preprocessing
//!
//! Turns uploaded bytes into the fixed `(1, 224, 224, 3)` NHWC tensor the
//! landmark classifiers were trained on:
//!
//! 1. decode (format guessed from content)
//! 2. drop alpha by plain channel removal, expanding gray/palette to RGB
//! 3. stretch to 224x224 with a Catmull-Rom filter (aspect ratio not kept)
//! 4. scale every channel value by 1/255
//! 5. add the leading batch dimension
//!
//! No mean/variance normalization is applied.

use candle_core::{Device, Tensor};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use summitlens_core::{Error, Result};

/// Input height and width expected by the classifiers
pub const INPUT_SIZE: usize = 224;

/// Number of colour channels in the input tensor
pub const INPUT_CHANNELS: usize = 3;

/// Resampling filter used for the resize step
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Preprocessed classifier input of shape `(1, 224, 224, 3)`, values in `[0, 1]`.
///
/// Only [`Preprocessor`] builds these, so the shape invariant always holds.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    tensor: Tensor,
}

impl ImageTensor {
    /// Shape as `(batch, height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        let dims = self.tensor.dims();
        (dims[0], dims[1], dims[2], dims[3])
    }

    /// Underlying Candle tensor (NHWC, f32)
    pub fn as_tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Device the tensor lives on
    pub fn device(&self) -> &Device {
        self.tensor.device()
    }

    /// Flatten into a row-major `Vec<f32>`
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        self.tensor
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::inference(format!("failed to read input tensor: {}", e)))
    }
}

/// Builds [`ImageTensor`]s on a fixed device
#[derive(Debug, Clone)]
pub struct Preprocessor {
    device: Device,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(Device::Cpu)
    }
}

impl Preprocessor {
    /// Create a preprocessor placing tensors on `device`
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Decode raw upload bytes and preprocess them
    pub fn preprocess(&self, bytes: &[u8]) -> Result<ImageTensor> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::decode(e.to_string()))?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "decoded image"
        );
        self.preprocess_image(&image)
    }

    /// Preprocess an already decoded image
    pub fn preprocess_image(&self, image: &DynamicImage) -> Result<ImageTensor> {
        let rgb = image.to_rgb8();
        let resized = resize_exact(&rgb);

        let data: Vec<f32> = resized
            .as_raw()
            .iter()
            .map(|&v| f32::from(v) / 255.0)
            .collect();

        let tensor = Tensor::from_vec(
            data,
            (1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS),
            &self.device,
        )
        .map_err(|e| Error::inference(format!("failed to build input tensor: {}", e)))?;

        Ok(ImageTensor { tensor })
    }
}

fn resize_exact(rgb: &RgbImage) -> RgbImage {
    let size = INPUT_SIZE as u32;
    if rgb.width() == size && rgb.height() == size {
        return rgb.clone();
    }
    image::imageops::resize(rgb, size, size, RESIZE_FILTER)
}

/// Preprocess raw bytes onto the CPU
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor> {
    Preprocessor::default().preprocess(bytes)
}
