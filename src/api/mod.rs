//! HTTP API layer - axum routers, handlers, and error mapping.
//!
//! All handler state lives in [`AppState`], which holds the database
//! connection constructed in `main`. Business errors are translated into
//! structured JSON responses here; internal errors are logged and surface
//! as a generic 500 body.

/// License pool endpoints
pub mod licenses;
/// Order fulfillment endpoints
pub mod orders;
/// Software catalog endpoints
pub mod software;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::Error;

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    /// Creates a new `AppState` with the given database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(licenses::router())
        .merge(software::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Confirmation body for mutating endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::SoftwareNotFound { .. }
            | Error::VersionNotFound { .. }
            | Error::LicenseNotFound { .. }
            | Error::OrderNotFound { .. } => {
                (StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
            Error::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            Error::InsufficientStock { .. } => (
                StatusCode::BAD_REQUEST,
                "insufficient_stock",
                self.to_string(),
            ),
            Error::Validation { .. }
            | Error::InvalidQuantity { .. }
            | Error::LicenseNotRequired { .. }
            | Error::LicenseAlreadyUsed { .. } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
                // Log internal errors without exposing detail to the caller
                tracing::error!(error = %self, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
