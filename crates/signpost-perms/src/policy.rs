//! The rule table shipped with the registry.

use signpost_core::{Method, Role};

use crate::rule::{PathClass, PermissionRule, RuleGroup};

/// One rule group per [`PathClass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    locations: RuleGroup,
    views: RuleGroup,
    users: RuleGroup,
}

impl Policy {
    /// Build a policy from explicit groups.
    pub fn new(locations: RuleGroup, views: RuleGroup, users: RuleGroup) -> Self {
        Self {
            locations,
            views,
            users,
        }
    }

    /// The registry's standard rules.
    ///
    /// | class     | methods      | roles | owner |
    /// |-----------|--------------|-------|-------|
    /// | locations | DELETE       | admin | no    |
    /// | locations | GET          | user  | no    |
    /// | views     | DELETE       | admin | no    |
    /// | views     | GET          | user  | no    |
    /// | users     | PATCH, PUT   | admin | yes   |
    /// | users     | DELETE       | admin | no    |
    ///
    /// Anything not listed is unrestricted.
    pub fn standard() -> Self {
        let registry = |class| {
            RuleGroup::new(class)
                .rule(PermissionRule::restrict([Method::Delete], [Role::admin()]))
                .rule(PermissionRule::restrict([Method::Get], [Role::user()]))
        };

        let users = RuleGroup::new(PathClass::Users)
            .rule(
                PermissionRule::restrict([Method::Patch, Method::Put], [Role::admin()])
                    .or_owner(),
            )
            .rule(PermissionRule::restrict([Method::Delete], [Role::admin()]));

        Self::new(registry(PathClass::Locations), registry(PathClass::Views), users)
    }

    pub fn group(&self, class: PathClass) -> &RuleGroup {
        match class {
            PathClass::Locations => &self.locations,
            PathClass::Views => &self.views,
            PathClass::Users => &self.users,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_tagged_with_their_class() {
        let policy = Policy::standard();
        for class in [PathClass::Locations, PathClass::Views, PathClass::Users] {
            assert_eq!(policy.group(class).class, class);
        }
    }

    #[test]
    fn test_post_unrestricted_everywhere() {
        let policy = Policy::default();
        for class in [PathClass::Locations, PathClass::Views, PathClass::Users] {
            assert!(policy.group(class).governing_rule(Method::Post).is_none());
        }
    }

    #[test]
    fn test_users_owner_exception_only_on_edits() {
        let users = Policy::standard().group(PathClass::Users).clone();
        assert!(users.governing_rule(Method::Put).unwrap().ownership_exception);
        assert!(!users.governing_rule(Method::Delete).unwrap().ownership_exception);
    }
}
