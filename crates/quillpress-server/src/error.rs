//! HTTP error boundary.
//!
//! Typed errors raised anywhere in the core are translated to
//! `{status, statusCode, message}` JSON exactly once, here. Server-side
//! defects (database, crypto, configuration) are logged with their
//! detail and surfaced with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quillpress_core::error::CoreError;
use serde::Serialize;

/// Wrapper turning [`CoreError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CoreError::Identification { .. }
            | CoreError::Validation { .. }
            | CoreError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,
            CoreError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            CoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::Configuration(_)
            | CoreError::Database(_)
            | CoreError::Crypto(_)
            | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal detail stays in the logs.
            "internal server error".to_string()
        } else {
            self.0.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            status: "error",
            status_code: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (
                CoreError::Identification {
                    reason: "x".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Validation {
                    message: "x".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::AlreadyExists { entity: "x".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Unauthenticated {
                    reason: "x".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                CoreError::Forbidden {
                    reason: "x".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                CoreError::NotFound {
                    entity: "x".into(),
                    id: "y".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Configuration("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CoreError::Database("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status_code(), expected);
        }
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = ApiError(CoreError::Database("connection refused at 10.0.0.5".into()));
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError(CoreError::Validation {
            message: "password must contain a number".into(),
        });
        assert!(err.message().contains("password must contain a number"));
    }
}
