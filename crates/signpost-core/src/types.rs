//! Strong type definitions for Signpost.
//!
//! Identifiers and verbs are newtypes or closed enums so that a role can
//! never be passed where a subject is expected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Separator between the domain and account parts of a subject id.
pub const SUBJECT_SEPARATOR: char = '\\';

/// A globally unique subject identifier of the form `domain\name`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Parse a `domain\name` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let Some((domain, name)) = s.split_once(SUBJECT_SEPARATOR) else {
            return Err(CoreError::InvalidSubject(s.to_string()));
        };
        if domain.is_empty() || name.is_empty() || name.contains(SUBJECT_SEPARATOR) {
            return Err(CoreError::InvalidSubject(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Build a subject id from its two path segments.
    pub fn from_parts(domain: &str, name: &str) -> Result<Self, CoreError> {
        Self::parse(&format!("{domain}{SUBJECT_SEPARATOR}{name}"))
    }

    /// The domain part.
    pub fn domain(&self) -> &str {
        self.0
            .split_once(SUBJECT_SEPARATOR)
            .map(|(domain, _)| domain)
            .unwrap_or_default()
    }

    /// The account part.
    pub fn account(&self) -> &str {
        self.0
            .split_once(SUBJECT_SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or_default()
    }

    /// The full `domain\name` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubjectId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A role name carried in identity claims.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a role from any name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The administrator role.
    pub fn admin() -> Self {
        Self::new("admin")
    }

    /// The ordinary user role.
    pub fn user() -> Self {
        Self::new("user")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An order-irrelevant set of roles.
pub type RoleSet = BTreeSet<Role>;

/// Build a [`RoleSet`] from role names.
pub fn roles<I, S>(names: I) -> RoleSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Role::new).collect()
}

/// HTTP verbs the permission layer reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownMethod(s.to_string()))
    }
}

/// The kinds of named record held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Location,
    View,
    User,
}

impl ResourceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceClass::Location => "location",
            ResourceClass::View => "view",
            ResourceClass::User => "user",
        }
    }

    /// Parse the storage tag back into a class.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "location" => Some(ResourceClass::Location),
            "view" => Some(ResourceClass::View),
            "user" => Some(ResourceClass::User),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_parse() {
        let id = SubjectId::parse("corp\\alice").unwrap();
        assert_eq!(id.domain(), "corp");
        assert_eq!(id.account(), "alice");
        assert_eq!(id.to_string(), "corp\\alice");
    }

    #[test]
    fn test_subject_rejects_bad_shapes() {
        assert!(SubjectId::parse("alice").is_err());
        assert!(SubjectId::parse("\\alice").is_err());
        assert!(SubjectId::parse("corp\\").is_err());
        assert!(SubjectId::parse("corp\\a\\b").is_err());
    }

    #[test]
    fn test_subject_from_parts() {
        let id = SubjectId::from_parts("corp", "bob").unwrap();
        assert_eq!(id, SubjectId::parse("corp\\bob").unwrap());
    }

    #[test]
    fn test_subject_serde_validates() {
        let json = serde_json::to_string(&SubjectId::parse("corp\\alice").unwrap()).unwrap();
        assert_eq!(json, "\"corp\\\\alice\"");
        assert!(serde_json::from_str::<SubjectId>("\"nobackslash\"").is_err());
    }

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_role_set_ignores_order() {
        assert_eq!(roles(["user", "admin"]), roles(["admin", "user"]));
    }
}
