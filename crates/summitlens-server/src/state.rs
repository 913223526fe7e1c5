//! Shared application state

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use summitlens_classifiers::model_loader::{create_device, load_classifier};
use summitlens_classifiers::{InferenceEngine, Preprocessor};
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Preprocessing, classifier, catalog, and threshold
    pub engine: InferenceEngine,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Initialize application state from configuration
    pub async fn new(config: ServerConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        info!("Initializing application state");

        let catalog = config.catalog.load()?;
        info!("Loaded catalog with {} landmarks", catalog.len());

        // One device handle shared by the classifier and the preprocessor
        let device = create_device(config.model.device)?;

        // Weight loading may download from the Hub, so keep it off the runtime threads.
        let model_config = config.model.clone();
        let num_classes = catalog.len();
        let model_device = device.clone();
        let classifier = tokio::task::spawn_blocking(move || {
            load_classifier(&model_config, num_classes, &model_device)
        })
        .await
        .context("Classifier loading task failed")?
        .context("Failed to load classifier")?;

        let engine = InferenceEngine::new(classifier, Arc::new(catalog), config.threshold)?
            .with_timeout(config.inference_timeout())
            .with_preprocessor(Preprocessor::new(device));

        Ok(Self::from_engine(config, engine, metrics_handle))
    }

    /// Assemble state around an already built engine
    pub fn from_engine(
        config: ServerConfig,
        engine: InferenceEngine,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            metrics_handle,
        }
    }
}
