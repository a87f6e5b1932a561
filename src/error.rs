use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The request-level error taxonomy. Every failure a handler can produce is
/// one of these variants, and each maps to exactly one HTTP status:
///
/// | Variant      | Status | Meaning |
/// |--------------|--------|---------|
/// | `Validation` | 400    | Malformed or missing input fields |
/// | `Conflict`   | 400    | Duplicate email / duplicate application |
/// | `Auth`       | 401    | Missing, invalid, or expired credentials |
/// | `Permission` | 403    | Authenticated, but role/ownership check failed |
/// | `NotFound`   | 404    | Referenced entity absent |
/// | `Internal`   | 500    | Persistence failure outside the taxonomy |
///
/// All variants serialize to a `{"detail": "<message>"}` JSON body. There is
/// no retry path anywhere: every error is terminal for its request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

/// Shorthand result type used by handlers and the auth extractor.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        ApiError::Auth(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        ApiError::Permission(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// The HTTP status this variant maps to. Conflicts intentionally share
    /// 400 with validation failures; the upstream API contract treats both
    /// duplicate email and duplicate application as bad requests.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Permission(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are logged, not leaked to the caller.
        if let ApiError::Internal(detail) = &self {
            tracing::error!("internal error: {detail}");
            return (status, Json(json!({ "detail": "Internal server error" }))).into_response();
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
