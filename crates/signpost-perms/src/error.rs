//! Error types for the permissions module.

use thiserror::Error;

use signpost_core::Method;

use crate::rule::PathClass;

/// Errors that can occur during permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// The governing rule rejected the requester.
    #[error("{method} on {class} is not permitted")]
    Forbidden { method: Method, class: PathClass },
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
