//! Error types for SummitLens

/// Result type alias using SummitLens's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SummitLens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request carried no `image` part
    #[error("No image part in the request")]
    MissingImage,

    /// The `image` part was present but its filename was empty
    #[error("No selected file")]
    EmptyFilename,

    /// The uploaded bytes could not be parsed as an image
    #[error("Error processing image: {0}")]
    Decode(String),

    /// The classifier failed, timed out, or returned unusable scores
    #[error("Prediction error: {0}")]
    Inference(String),

    /// Catalog construction or alignment errors
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller is at fault (malformed upload) rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingImage | Self::EmptyFilename | Self::Decode(_))
    }

    /// Short, stable name used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingImage => "missing_image",
            Self::EmptyFilename => "empty_filename",
            Self::Decode(_) => "decode",
            Self::Inference(_) => "inference",
            Self::Catalog(_) => "catalog",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
