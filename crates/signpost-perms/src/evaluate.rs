//! The permission evaluator.
//!
//! A pure decision function over a request's method, the path class's rule
//! group, and the requester's identity. Unmatched methods are allowed: the
//! rules are a restriction overlay on top of a default-allow base.
//! Authentication is separate and always required.

use signpost_core::{Method, Principal, Role, RoleSet, SubjectId};

use crate::error::{PermsError, Result};
use crate::rule::RuleGroup;

/// Why a request was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grounds {
    /// No rule in the group governs the method.
    Unrestricted,
    /// The requester holds a role the governing rule accepts.
    Role(Role),
    /// The governing rule has an ownership exception and the requester owns the resource.
    Owner,
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Grounds),
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Decide whether a requester may perform `method` under `group`.
///
/// `owner` is the subject owning the addressed resource, when the path names
/// one. It only matters for rules with an ownership exception.
pub fn evaluate(
    method: Method,
    group: &RuleGroup,
    roles: &RoleSet,
    requester: &SubjectId,
    owner: Option<&SubjectId>,
) -> Decision {
    let Some(rule) = group.governing_rule(method) else {
        return Decision::Allow(Grounds::Unrestricted);
    };

    if let Some(role) = rule.allowed_roles.intersection(roles).next() {
        return Decision::Allow(Grounds::Role(role.clone()));
    }

    if rule.ownership_exception && owner == Some(requester) {
        return Decision::Allow(Grounds::Owner);
    }

    Decision::Deny
}

/// Evaluate for an authenticated principal, turning a denial into an error.
pub fn authorize(
    method: Method,
    group: &RuleGroup,
    principal: &Principal,
    owner: Option<&SubjectId>,
) -> Result<Grounds> {
    match evaluate(method, group, principal.roles(), principal.subject(), owner) {
        Decision::Allow(grounds) => {
            tracing::debug!(%method, class = %group.class, subject = %principal.subject(), ?grounds, "allowed");
            Ok(grounds)
        }
        Decision::Deny => {
            tracing::debug!(%method, class = %group.class, subject = %principal.subject(), "denied");
            Err(PermsError::Forbidden {
                method,
                class: group.class,
            })
        }
    }
}
