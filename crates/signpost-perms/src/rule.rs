//! Permission rules and rule groups.
//!
//! A rule restricts a set of methods to a set of roles, optionally letting the
//! owner of the addressed resource through as well. Rules are grouped per
//! path class and scanned in declared order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use signpost_core::{Method, Role};

/// One restriction inside a [`RuleGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Methods this rule governs.
    pub methods: BTreeSet<Method>,

    /// Roles that satisfy the rule.
    pub allowed_roles: BTreeSet<Role>,

    /// Whether the resource owner satisfies the rule without a listed role.
    pub ownership_exception: bool,
}

impl PermissionRule {
    /// Restrict `methods` to holders of any of `roles`.
    pub fn restrict<M, R>(methods: M, roles: R) -> Self
    where
        M: IntoIterator<Item = Method>,
        R: IntoIterator<Item = Role>,
    {
        Self {
            methods: methods.into_iter().collect(),
            allowed_roles: roles.into_iter().collect(),
            ownership_exception: false,
        }
    }

    /// Also let the owner of the addressed resource through.
    pub fn or_owner(mut self) -> Self {
        self.ownership_exception = true;
        self
    }

    /// Whether this rule governs `method`.
    pub fn governs(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

/// The path classes that carry rule groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathClass {
    Locations,
    Views,
    Users,
}

impl PathClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PathClass::Locations => "locations",
            PathClass::Views => "views",
            PathClass::Users => "users",
        }
    }
}

impl fmt::Display for PathClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered list of rules governing one path class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub class: PathClass,
    rules: Vec<PermissionRule>,
}

impl RuleGroup {
    /// An empty group: every method is unrestricted.
    pub fn new(class: PathClass) -> Self {
        Self {
            class,
            rules: Vec::new(),
        }
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn rule(mut self, rule: PermissionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    /// The first rule whose method set contains `method`, if any.
    pub fn governing_rule(&self, method: Method) -> Option<&PermissionRule> {
        self.rules.iter().find(|rule| rule.governs(method))
    }
}
