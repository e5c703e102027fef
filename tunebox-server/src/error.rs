//! Error types for tunebox-server
//!
//! Every service error is converted into `ApiError` at the handler boundary
//! and rendered as `{"error": {"code": ..., "message": ...}}`. Store and I/O
//! faults are logged in full and answered with a generic 500.

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::services::{
    AuthorizationError, CatalogError, IdentityError, LibraryError,
};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No session (401)
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Session present but lacks the role (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. duplicate username
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upload body over the configured limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500); detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<tunebox_common::Error> for ApiError {
    fn from(err: tunebox_common::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::DuplicateUsername => ApiError::Conflict(err.to_string()),
            IdentityError::InvalidCredentials => ApiError::Unauthenticated(err.to_string()),
            IdentityError::NotFound(_) => ApiError::NotFound(err.to_string()),
            IdentityError::Store(e) => e.into(),
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            AuthorizationError::Forbidden => ApiError::Forbidden(err.to_string()),
            AuthorizationError::Store(e) => e.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::MissingFile
            | LibraryError::InvalidDuration
            | LibraryError::UnsupportedFormat(_) => ApiError::BadRequest(err.to_string()),
            LibraryError::NotFound(_) | LibraryError::BlobMissing(_) => {
                ApiError::NotFound(err.to_string())
            }
            LibraryError::Authorization(e) => e.into(),
            LibraryError::Store(e) => e.into(),
            LibraryError::Io(e) => ApiError::Internal(format!("Song directory error: {}", e)),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected JSON body: {}", rejection.body_text());
        ApiError::BadRequest("Request body must be a JSON object".to_string())
    }
}

/// An id segment that does not parse names no resource, so it is a 404
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                debug!("Rejected path: {}", e.body_text());
                ApiError::NotFound("No such resource".to_string())
            }
            other => ApiError::Internal(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_kinds_map_to_status_codes() {
        let cases = [
            (ApiError::from(LibraryError::InvalidDuration), StatusCode::BAD_REQUEST),
            (ApiError::from(AuthorizationError::Unauthenticated), StatusCode::UNAUTHORIZED),
            (ApiError::from(AuthorizationError::Forbidden), StatusCode::FORBIDDEN),
            (ApiError::from(LibraryError::NotFound(1)), StatusCode::NOT_FOUND),
            (ApiError::from(IdentityError::DuplicateUsername), StatusCode::CONFLICT),
            (ApiError::from(IdentityError::InvalidCredentials), StatusCode::UNAUTHORIZED),
        ];

        for (err, expected) in cases {
            let (status, _) = render(err).await;
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_detail() {
        let err = ApiError::from(tunebox_common::Error::Internal("disk /dev/sda1 on fire".into()));

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
