//! SummitLens Server
//!
//! HTTP front end for the landmark inference pipeline. Accepts a single
//! `multipart/form-data` upload on `/predict` and answers with the recognized
//! landmark, "No mountain detected", or an error record.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{CatalogConfig, ServerConfig};
pub use routes::create_router;
pub use state::AppState;
