//! HTTP routes and handlers

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::time::Instant;
use summitlens_classifiers::CatalogEntry;
use summitlens_core::{Error, Prediction, PredictionResponse, RequestStage};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Multipart field carrying the uploaded photograph
pub const IMAGE_FIELD: &str = "image";

pub fn create_router(state: AppState) -> Router {
    let predict_routes = Router::new()
        .route("/predict", post(predict))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/classes", get(classes))
        .merge(predict_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn classes(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(state.engine.catalog().entries().to_vec())
}

/// Uploaded image part
struct ImageUpload {
    filename: String,
    bytes: Vec<u8>,
}

/// Main prediction handler
async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    info!("Received prediction request");
    metrics::counter!("summitlens_requests_total").increment(1);

    // A body that is not multipart has no image part either.
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Multipart rejected: {}", rejection);
        Error::MissingImage
    })?;

    let upload = read_image_upload(&mut multipart).await?;
    debug!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        "Image upload received"
    );

    let start = Instant::now();
    let prediction = state.engine.predict(upload.bytes).await?;
    metrics::histogram!("summitlens_inference_latency_us")
        .record(start.elapsed().as_micros() as f64);
    metrics::counter!("summitlens_predictions_total", "outcome" => prediction.outcome())
        .increment(1);

    match &prediction {
        Prediction::Detected {
            label, confidence, ..
        } => info!("Prediction successful: {} with confidence {:.2}", label, confidence),
        Prediction::NoMountain { confidence } => {
            info!("No mountain detected (best confidence {:.2})", confidence)
        }
    }
    debug!(stage = %RequestStage::Responded, "Prediction returned");

    Ok(Json(PredictionResponse::from(prediction)))
}

/// Find the `image` part, rejecting a missing part or an empty filename
async fn read_image_upload(multipart: &mut Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(Error::EmptyFilename.into());
        }

        let bytes = field.bytes().await?;
        return Ok(ImageUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(Error::MissingImage.into())
}

async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Error handling
#[derive(Debug)]
pub enum ApiError {
    /// Failure raised by the inference pipeline
    Pipeline(Error),
    /// Malformed or oversized multipart body
    Upload(MultipartError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Upload(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, kind) = match self {
            ApiError::Pipeline(err) => {
                let status = if err.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, err.to_string(), err.kind())
            }
            ApiError::Upload(err) => (err.status(), err.body_text(), "upload"),
        };

        if status.is_server_error() {
            error!(stage = %RequestStage::Failed, kind, "{}", message);
        } else {
            warn!(stage = %RequestStage::Failed, kind, "{}", message);
        }
        metrics::counter!("summitlens_errors_total", "kind" => kind).increment(1);

        (status, Json(json!({ "error": message }))).into_response()
    }
}
