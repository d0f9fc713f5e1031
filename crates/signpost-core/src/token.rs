//! The claims codec: issues and verifies signed bearer tokens.
//!
//! Tokens are HS256 JSON Web Tokens keyed by the shared secret, so clients
//! of the HTTP service can inspect them with any JWT library.
//!
//! Verification is a pure function of the token, the key and the clock. The
//! codec keeps no record of issued tokens, so a token stays valid until it
//! expires regardless of what happens to the account afterwards.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{Claims, Principal};
use crate::error::{CoreError, TokenError};
use crate::types::{RoleSet, SubjectId};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Signing algorithm for every token.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Configuration for the claims codec.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// How long an issued token stays valid.
    pub ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

/// An issued bearer token together with the claims it carries.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    encoded: String,
    claims: Claims,
}

impl Token {
    /// The opaque string handed to the client.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.expires_at
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("subject_id", &self.claims.subject_id)
            .field("expires_at", &self.claims.expires_at)
            .finish_non_exhaustive()
    }
}

/// Issues and verifies bearer tokens with a shared secret.
///
/// Stateless and `Clone`; share it freely across request tasks.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    /// Create a codec from a shared secret.
    pub fn new(secret: &[u8], config: TokenConfig) -> Self {
        // Expiry is checked against our own clock in `verify_at`.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(config.ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token with no roles.
    pub fn issue(&self, subject: SubjectId) -> Result<Token, CoreError> {
        self.issue_with_roles(subject, RoleSet::new())
    }

    /// Issue a token carrying the given roles, valid from now.
    pub fn issue_with_roles(&self, subject: SubjectId, roles: RoleSet) -> Result<Token, CoreError> {
        self.issue_at(subject, roles, now_secs())
    }

    /// Issue a token as of an explicit clock reading (Unix seconds).
    pub fn issue_at(&self, subject: SubjectId, roles: RoleSet, now: i64) -> Result<Token, CoreError> {
        let claims = Claims {
            subject_id: subject,
            roles,
            issued_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
        };

        let encoded = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(Token { encoded, claims })
    }

    /// Verify a token against the current clock.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_at(token, now_secs())
    }

    /// Verify a token as of an explicit clock reading (Unix seconds).
    ///
    /// The signature is checked before the claims are decoded, so a forged
    /// token never reaches the decoder.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Principal, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?
            .claims;

        if !claims.is_live(now) {
            return Err(TokenError::Expired {
                expires_at: claims.expires_at,
            });
        }

        Ok(Principal::new(claims))
    }
}

// Keys are secret material.
impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Get current time in seconds.
pub fn now_secs() -> i64 {
    now_millis() / 1_000
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
