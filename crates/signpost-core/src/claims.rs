//! Identity claims carried by bearer tokens.

use serde::{Deserialize, Serialize};

use crate::types::{Role, RoleSet, SubjectId};

/// The decoded content of a bearer token.
///
/// Claims are immutable once issued. A request re-derives them by verifying
/// its token; nothing mutates them afterwards.
///
/// Serialized with the registered JWT claim names (`sub`, `iat`, `exp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Who the token was issued to.
    #[serde(rename = "sub")]
    pub subject_id: SubjectId,

    /// Roles granted at issuance.
    #[serde(default)]
    pub roles: RoleSet,

    /// Issuance time (Unix seconds).
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiry time (Unix seconds). The token is rejected at or after this instant.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Whether the claims are still inside their validity window.
    pub fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

/// An authenticated requester.
///
/// Only [`TokenCodec::verify`](crate::TokenCodec::verify) hands these out, so
/// holding one proves the request passed authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    claims: Claims,
}

impl Principal {
    pub(crate) fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.claims.subject_id
    }

    pub fn roles(&self) -> &RoleSet {
        &self.claims.roles
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::roles;

    #[test]
    fn test_claims_window() {
        let claims = Claims {
            subject_id: SubjectId::parse("corp\\alice").unwrap(),
            roles: roles(["user"]),
            issued_at: 1_000,
            expires_at: 2_000,
        };

        assert!(claims.is_live(1_999));
        assert!(!claims.is_live(2_000));
        assert!(claims.has_role(&Role::user()));
        assert!(!claims.has_role(&Role::admin()));
    }

    #[test]
    fn test_claims_wire_field_names() {
        let claims = Claims {
            subject_id: SubjectId::parse("corp\\alice").unwrap(),
            roles: roles(["admin"]),
            issued_at: 1,
            expires_at: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], "corp\\alice");
        assert_eq!(json["iat"], 1);
        assert_eq!(json["exp"], 2);
        assert_eq!(json["roles"], serde_json::json!(["admin"]));
    }
}
