//! Field validation for records arriving from clients.

use crate::error::ValidationError;
use crate::record::{Location, View};

/// Check a natural key used in URL paths.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.contains('/') {
        return Err(ValidationError::IllegalCharacter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validate a location before it is written.
pub fn validate_location(location: &Location) -> Result<(), ValidationError> {
    validate_name("name", &location.name)?;
    for view in &location.views {
        validate_name("views", view)?;
    }
    Ok(())
}

/// Validate a view before it is written.
///
/// `timings` may be left empty; otherwise it must pair up with `urls`.
pub fn validate_view(view: &View) -> Result<(), ValidationError> {
    validate_name("name", &view.name)?;
    if !view.timings.is_empty() && view.timings.len() != view.urls.len() {
        return Err(ValidationError::TimingsMismatch {
            urls: view.urls.len(),
            timings: view.timings.len(),
        });
    }
    Ok(())
}
