//! Error types for Signpost core.

use thiserror::Error;

/// Core errors raised while parsing identifiers or encoding records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid subject id {0:?}: expected domain\\name")]
    InvalidSubject(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a bearer token is rejected.
///
/// Every variant terminates the request before any handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token expired at {expires_at}")]
    Expired { expires_at: i64 },

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Field-level validation failures for registry records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must not contain '/': {value:?}")]
    IllegalCharacter { field: &'static str, value: String },

    #[error("timings has {timings} entries but urls has {urls}")]
    TimingsMismatch { urls: usize, timings: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
