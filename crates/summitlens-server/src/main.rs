//! SummitLens Server
//!
//! Recognizes Sri Lankan mountain landmarks in uploaded photographs.
//!
//! A single `POST /predict` endpoint accepts a multipart upload, runs it
//! through the preprocessing and classification pipeline, and answers with
//! the landmark's name and description or "No mountain detected".

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use summitlens_server::{create_router, AppState, Cli, ServerConfig};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting SummitLens inference server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {:?} on {}", config.model.source, config.model.device);
    info!("Confidence threshold: {}", config.threshold);
    info!("Inference timeout: {:?}", config.inference_timeout());

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Initialize application state (load catalog and classifier)
    let state = AppState::new(config, Some(metrics_handle)).await?;
    info!("Application state initialized successfully");

    let addr = state.config.socket_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, stopping server...");
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("summitlens=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("summitlens=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "summitlens_requests_total",
        "Total number of prediction requests received"
    );
    metrics::describe_counter!(
        "summitlens_predictions_total",
        "Successful predictions by outcome (detected, no_mountain)"
    );
    metrics::describe_counter!("summitlens_errors_total", "Failed requests by error kind");
    metrics::describe_histogram!(
        "summitlens_inference_latency_us",
        metrics::Unit::Microseconds,
        "Preprocessing and classification latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
