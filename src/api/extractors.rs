//! Request extraction helpers
//!
//! Map axum's body and query rejections onto `AppError`, so malformed
//! input gets the same error envelope as every other failure.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::domain::DomainError;
use crate::error::AppError;

/// Unwrap a JSON body, turning deserialization failures into `InvalidInput`.
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| DomainError::invalid_input(err.body_text()).into())
}

/// Unwrap a query string, turning deserialization failures into `InvalidInput`.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| DomainError::invalid_input(err.body_text()).into())
}
