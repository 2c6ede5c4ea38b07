use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these —
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const NEED_AUTH: &str = "NEED_AUTH";
    pub const POINTS_EXHAUSTED: &str = "POINTS_EXHAUSTED";
    pub const GONE: &str = "GONE";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "NOT_FOUND", "message": "property 'abc' not found"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacks required permission. HTTP 403.
    #[error("{0}")]
    PermissionDenied(String),

    /// The e-signature provider rejected the stored token; the client
    /// must re-run the authorization flow. HTTP 401, code NEED_AUTH.
    #[error("{0}")]
    NeedAuth(String),

    /// The e-signature provider account has no signing points left.
    /// HTTP 402.
    #[error("{0}")]
    PointsExhausted(String),

    /// Resource existed but is no longer available (expired share
    /// link). HTTP 410.
    #[error("{0}")]
    Gone(String),

    /// Upstream provider call failed; the provider's message is
    /// embedded. HTTP 500.
    #[error("{0}")]
    Upstream(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ServiceError::NeedAuth(_) => error_code::NEED_AUTH,
            ServiceError::PointsExhausted(_) => error_code::POINTS_EXHAUSTED,
            ServiceError::Gone(_) => error_code::GONE,
            ServiceError::Upstream(_) => error_code::UPSTREAM_ERROR,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::NeedAuth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::PointsExhausted(_) => StatusCode::PAYMENT_REQUIRED,
            ServiceError::Gone(_) => StatusCode::GONE,
            ServiceError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::NeedAuth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::PointsExhausted("x".into()).status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(ServiceError::Gone("x".into()).status_code(), StatusCode::GONE);
        assert_eq!(ServiceError::Upstream("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "ALREADY_EXISTS");
        assert_eq!(ServiceError::NeedAuth("x".into()).error_code(), "NEED_AUTH");
        assert_eq!(ServiceError::PointsExhausted("x".into()).error_code(), "POINTS_EXHAUSTED");
        assert_eq!(ServiceError::Gone("x".into()).error_code(), "GONE");
        assert_eq!(ServiceError::Upstream("x".into()).error_code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn json_response_format() {
        let err = ServiceError::Gone("link expired".into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::GONE);
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("property 123".into()).to_string(), "property 123");
        assert_eq!(ServiceError::NeedAuth("reconnect".into()).to_string(), "reconnect");
    }
}
