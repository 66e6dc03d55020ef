//! API Middleware
//!
//! Caller identification and request logging.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the caller's user id, set by the authenticating gateway
pub const USER_ID_HEADER: &str = "X-Request-User-Id";

/// Header carrying the request correlation id
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Authenticated caller, trusted as supplied by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

// =========================================================================
// Authentication context
// =========================================================================

/// Turn the gateway's user header into an `AuthenticatedUser` extension
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::MissingHeader(USER_ID_HEADER.to_string()))?;

    let user_id = raw
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or(AppError::InvalidUserId)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Correlation id from the request header, or a fresh one
pub fn correlation_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Request logging middleware
///
/// Everything logged while handling the request, down to the store, runs
/// inside a span carrying the correlation id.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let correlation_id = correlation_id(request.headers());

    let headers = mask_headers_for_logging(request.headers());
    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = %correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = %correlation_id,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret".parse().unwrap());
        headers.insert("x-request-user-id", "user-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let user_id = masked.iter().find(|(k, _)| k == "x-request-user-id");

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(user_id.unwrap().1, "user-123");
    }

    #[test]
    fn test_correlation_id_from_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, id.to_string().parse().unwrap());
        assert_eq!(correlation_id(&headers), id);

        headers.insert(CORRELATION_ID_HEADER, "garbage".parse().unwrap());
        assert_ne!(correlation_id(&headers), id);
    }

    #[test]
    fn test_sensitive_headers_list() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(!SENSITIVE_HEADERS.contains(&"content-type"));
    }
}
