//! HTTP server.
//!
//! Exposes document comparison as a JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/calculate_similarity` | Score two documents (`0`–`100`) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Request / Response
//!
//! ```json
//! { "document1": "The cat sat on the mat.", "document2": "A cat sat on a mat." }
//! ```
//!
//! ```json
//! { "similarityScore": 100.0 }
//! ```
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "missing_input", "message": "document2 is required" } }
//! ```
//!
//! Error codes: `missing_input` (400), `embedding_failed` (502),
//! `resource_unavailable` (503), `internal` (500). Malformed JSON bodies are
//! rejected by the extractor before reaching the handler.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use docsim_core::compare::DocumentComparer;
use docsim_core::error::ScoreError;

use crate::config::Config;
use crate::pipeline::build_comparer_blocking;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    comparer: Arc<DocumentComparer>,
}

/// Starts the HTTP server.
///
/// Loads language resources and the embedding backend, binds to
/// `[server].bind`, and serves until the process is terminated.
///
/// # Returns
///
/// Returns `Ok(())` when the server shuts down, or an error if resources
/// cannot be loaded or binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let comparer = build_comparer_blocking(config).await?;
    run_server_with_comparer(&config.server.bind, comparer).await
}

/// Starts the HTTP server with an already-built comparer.
///
/// Useful for embedding the service with custom language resources or a
/// custom [`Embedder`](docsim_core::embedding::Embedder).
pub async fn run_server_with_comparer(
    bind_addr: &str,
    comparer: Arc<DocumentComparer>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "docsim server listening");

    axum::serve(listener, router(comparer)).await?;

    Ok(())
}

/// The application router.
pub fn router(comparer: Arc<DocumentComparer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/calculate_similarity", post(handle_calculate_similarity))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { comparer })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"missing_input"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn missing_input(field: &str) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "missing_input".to_string(),
        message: format!("{} is required", field),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        let (status, code) = match &err {
            ScoreError::ResourceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "resource_unavailable")
            }
            ScoreError::Embedding { .. } => (StatusCode::BAD_GATEWAY, "embedding_failed"),
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /calculate_similarity ============

/// Both fields are optional at the type level so an absent field becomes a
/// `missing_input` error instead of an extractor rejection.
#[derive(Deserialize)]
struct SimilarityRequest {
    document1: Option<String>,
    document2: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimilarityResponse {
    /// Fraction of similar chunk pairs, times 100.
    similarity_score: f64,
}

/// Handler for `POST /calculate_similarity`.
///
/// Runs normalization and scoring on a blocking thread; the embedder may
/// block on local inference or a remote call.
async fn handle_calculate_similarity(
    State(state): State<AppState>,
    Json(request): Json<SimilarityRequest>,
) -> Result<Json<SimilarityResponse>, AppError> {
    let document1 = request.document1.ok_or_else(|| missing_input("document1"))?;
    let document2 = request.document2.ok_or_else(|| missing_input("document2"))?;

    let comparer = state.comparer.clone();
    let result = tokio::task::spawn_blocking(move || comparer.compare(&document1, &document2))
        .await
        .map_err(|e| internal(format!("comparison task failed: {}", e)))?
        .map_err(|e| {
            warn!(error = %e, "similarity calculation failed");
            AppError::from(e)
        })?;

    info!(
        chunks_a = result.comparison.chunks_a,
        chunks_b = result.comparison.chunks_b,
        similar_pairs = result.comparison.similar_pairs,
        score = result.percentage(),
        "similarity calculated"
    );

    Ok(Json(SimilarityResponse {
        similarity_score: result.percentage(),
    }))
}
