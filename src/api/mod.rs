//! REST API endpoints.
//!
//! Axum-based read-only HTTP API serving head-to-head standings,
//! leaderboards and match views from the snapshot store.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::calculate::AggregateError;
use crate::models::InvalidTagError;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Snapshot or roster data on disk failed validation. The request was
    /// fine; the server's data is not.
    pub(crate) fn corrupt_data(e: impl std::fmt::Display) -> Self {
        error!("Stored data failed validation: {}", e);
        ApiError::Internal(e.to_string())
    }
}

/// Only for tags supplied by the caller.
impl From<InvalidTagError> for ApiError {
    fn from(e: InvalidTagError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Aggregation only sees stored data, so every failure is internal.
impl From<AggregateError> for ApiError {
    fn from(e: AggregateError) -> Self {
        ApiError::corrupt_data(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        error!("Storage error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/players/:tag/standings",
            get(routes::players::standings),
        )
        .route(
            "/api/players/:tag/leaderboard",
            get(routes::players::leaderboard),
        )
        .route("/api/players/:tag/matches", get(routes::players::matches))
        .route("/api/players/:tag/feed", get(routes::players::feed))
        .route("/api/players/:tag/summary", get(routes::players::summary))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new().allow_origin(value),
        Err(e) => {
            warn!("Invalid CORS origin {:?} ({}), allowing any origin", origin, e);
            CorsLayer::permissive()
        }
    }
}
