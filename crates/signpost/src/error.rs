//! Error types for the registry.

use signpost_core::{CoreError, SubjectId, TokenError, ValidationError};
use signpost_perms::PermsError;
use signpost_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No token accompanied the request.
    #[error("no token provided")]
    Unauthenticated,

    /// The token failed verification.
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    /// The account exists but is disabled.
    #[error("user {0} is disabled")]
    Disabled(SubjectId),

    /// The permission rules denied the request.
    #[error("forbidden: {0}")]
    Forbidden(#[from] PermsError),

    /// The request body or path failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A path or header named a malformed subject.
    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    /// Encoding or decoding failed.
    #[error("core error: {0}")]
    Core(CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl RegistryError {
    /// Stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Unauthenticated => "missing_token",
            RegistryError::Token(TokenError::Expired { .. }) => "expired_token",
            RegistryError::Token(TokenError::InvalidSignature) => "invalid_token",
            RegistryError::Token(TokenError::Malformed(_)) => "malformed_token",
            RegistryError::Disabled(_) => "disabled",
            RegistryError::Forbidden(_) => "forbidden",
            RegistryError::Validation(_) | RegistryError::InvalidSubject(_) => "invalid",
            RegistryError::Core(_) | RegistryError::Store(_) => "storage",
        }
    }

    /// Whether the request failed before reaching a resource handler.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            RegistryError::Unauthenticated
                | RegistryError::Token(_)
                | RegistryError::Disabled(_)
                | RegistryError::Forbidden(_)
        )
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => RegistryError::Validation(e),
            CoreError::InvalidSubject(s) => RegistryError::InvalidSubject(s),
            other => RegistryError::Core(other),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Record(e) => e.into(),
            other => RegistryError::Store(other),
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
