//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Invalid user id header")]
    InvalidUserId,

    // Business rule errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Store errors, passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Status code, stable error code and optional client-safe details
    fn classify(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::MissingHeader(header) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                Some(header.clone()),
            ),
            AppError::InvalidUserId => (StatusCode::BAD_REQUEST, "invalid_user_id", None),

            AppError::Domain(err) => match err {
                DomainError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_input", Some(msg.clone()))
                }
                DomainError::ProductNotFound(id) => {
                    (StatusCode::BAD_REQUEST, "product_not_found", Some(id.clone()))
                }
                DomainError::PermissionDenied { .. } => {
                    (StatusCode::FORBIDDEN, "permission_denied", None)
                }
                DomainError::InvalidStateTransition { .. } => (
                    StatusCode::CONFLICT,
                    "invalid_state_transition",
                    Some(err.to_string()),
                ),
            },

            AppError::Store(err) => match err {
                StoreError::NotFound { entity, id } => {
                    let code = if *entity == "order" {
                        "order_not_found"
                    } else {
                        "not_found"
                    };
                    (StatusCode::NOT_FOUND, code, Some(id.to_string()))
                }
                StoreError::VersionConflict { .. } => {
                    (StatusCode::CONFLICT, "version_conflict", None)
                }
                StoreError::Timeout(_) => {
                    tracing::error!("Store timeout: {}", err);
                    (StatusCode::SERVICE_UNAVAILABLE, "store_timeout", None)
                }
                StoreError::Database(e) => {
                    tracing::error!("Database error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
                StoreError::InvalidRow(msg) => {
                    tracing::error!("Invalid stored row: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            },
        }
    }

    /// Message shown to clients; persistence details stay in the logs
    fn public_message(&self) -> String {
        match self {
            AppError::Store(StoreError::NotFound { .. })
            | AppError::Store(StoreError::VersionConflict { .. }) => self.to_string(),
            AppError::Store(StoreError::Timeout(_)) => "Service temporarily unavailable".to_string(),
            AppError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.classify();

        let body = ErrorResponse {
            error: self.public_message(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
