//! Unified error types for the issue API.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::JwtError;
use crate::issues::IssueId;

/// Top-level error type for startup and tooling.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token signing or validation error.
    #[error("token error: {0}")]
    Jwt(#[from] JwtError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by an [`IssueService`](crate::service::IssueService).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Referenced issue does not exist.
    #[error("issue {0} does not exist")]
    IssueNotFound(IssueId),

    /// Status value outside the accepted set.
    #[error("invalid status value: {0:?}")]
    InvalidStatus(String),

    /// Backing store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned to HTTP callers.
///
/// Every variant renders as `{ "message": ... }`. Internal failures carry their
/// source for logging only.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No credentials supplied (401).
    #[error("authentication required")]
    Unauthorized,

    /// Credentials present but unusable (401).
    #[error("invalid token")]
    InvalidToken,

    /// Token past its expiry (401).
    #[error("token expired")]
    TokenExpired,

    /// Caller's role is not allowed (403).
    #[error("permission denied")]
    Forbidden,

    /// Input failed a business check (400).
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// Request could not be decoded (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Requested resource is absent (404).
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Service failure (500). Only `message` reaches the caller.
    #[error("{message}: {source}")]
    Internal {
        /// Public message.
        message: &'static str,
        /// Underlying cause.
        source: ServiceError,
    },
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    /// Wrap a service failure behind a fixed public message.
    pub fn internal(message: &'static str) -> impl FnOnce(ServiceError) -> Self {
        move |source| ApiError::Internal { message, source }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidToken | ApiError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Authentication required".to_string(),
            ApiError::InvalidToken => "Invalid token".to_string(),
            ApiError::TokenExpired => "Token expired".to_string(),
            ApiError::Forbidden => "Permission denied".to_string(),
            ApiError::Validation(msg) | ApiError::NotFound(msg) => msg.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal { message, .. } => message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { message, source } => {
                error!(error = %source, "{}", message);
            }
            ApiError::BadRequest(reason) => {
                warn!(reason = %reason, "rejected malformed request");
            }
            _ => {}
        }

        let body = Json(ErrorBody {
            message: self.public_message(),
        });
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_source() {
        let err = ApiError::internal("Error fetching issues")(ServiceError::Unavailable(
            "connection refused on 10.0.0.5".to_string(),
        ));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": "Error fetching issues" }));
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let response = ApiError::Validation("Invalid status").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid status");
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("Issue not found").status(), StatusCode::NOT_FOUND);
    }
}
