//! Server configuration

use anyhow::{bail, Context};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use summitlens_classifiers::{
    ClassCatalog, DescriptionStyle, ModelConfig, ModelSource, DEFAULT_THRESHOLD,
};

use crate::cli::Cli;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum best-class score required to report a landmark
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Upper bound on a single classifier call
    #[serde(default = "default_timeout_ms")]
    pub inference_timeout_ms: u64,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Origins allowed to call `/predict`; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Classifier model
    #[serde(default)]
    pub model: ModelConfig,

    /// Landmark catalog
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path))?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(model) = &cli.model {
            config.model.source = ModelSource::Local {
                path: PathBuf::from(model),
            };
        }

        if let Some(threshold) = cli.threshold {
            config.threshold = threshold;
        }

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(timeout_ms) = cli.timeout_ms {
            config.inference_timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            bail!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            );
        }
        if self.inference_timeout_ms == 0 {
            bail!("inference_timeout_ms must be greater than zero");
        }
        if self.max_body_bytes == 0 {
            bail!("max_body_bytes must be greater than zero");
        }
        for origin in &self.cors_origins {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin '{}'", origin))?;
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address the server binds to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.listen, self.port))
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            threshold: default_threshold(),
            inference_timeout_ms: default_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            cors_origins: Vec::new(),
            model: ModelConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

/// Landmark catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Built-in description set
    #[serde(default)]
    pub descriptions: DescriptionStyle,

    /// YAML catalog file replacing the built-in landmarks
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Build the catalog this configuration describes
    pub fn load(&self) -> anyhow::Result<ClassCatalog> {
        match &self.path {
            Some(path) => ClassCatalog::from_file(path)
                .with_context(|| format!("Failed to load catalog {}", path.display())),
            None => Ok(ClassCatalog::sri_lanka(self.descriptions)),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}
