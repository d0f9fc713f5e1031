//! Request extractors for the token and the upstream identity header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use signpost::core::{Principal, SubjectId};
use signpost::RegistryError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the bearer token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Header the fronting authentication layer sets to the caller's subject.
pub const AUTH_USER_HEADER: &str = "auth-user";

/// A request whose token verified.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        let principal = state.registry.authenticate(token)?;
        Ok(Authenticated(principal))
    }
}

/// The subject named by the `auth-user` header.
pub struct AuthUser(pub SubjectId);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTH_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingHeader(AUTH_USER_HEADER))?;
        let subject =
            SubjectId::parse(raw).map_err(|e| ApiError::from(RegistryError::from(e)))?;
        Ok(AuthUser(subject))
    }
}
