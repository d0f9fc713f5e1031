//! HTTP error responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use signpost::RegistryError;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The request body was not the JSON the endpoint expects.
    #[error("invalid body: {0}")]
    Body(#[from] JsonRejection),

    /// A path segment did not parse.
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),

    /// A header the endpoint depends on was absent or unreadable.
    #[error("missing or unreadable header {0}")]
    MissingHeader(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Registry(e) => match e {
                RegistryError::Unauthenticated | RegistryError::Token(_) => {
                    StatusCode::UNAUTHORIZED
                }
                RegistryError::Disabled(_) | RegistryError::Forbidden(_) => StatusCode::FORBIDDEN,
                RegistryError::Validation(_) | RegistryError::InvalidSubject(_) => {
                    StatusCode::BAD_REQUEST
                }
                RegistryError::Core(_) | RegistryError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            // Oversized bodies keep their 413.
            ApiError::Body(JsonRejection::BytesRejection(e)) => e.status(),
            ApiError::Body(_) | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingHeader(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Registry(e) => e.code(),
            ApiError::Body(_) | ApiError::Path(_) => "invalid",
            ApiError::MissingHeader(_) => "missing_header",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = json!({
            "err": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
