//! # Signpost Permissions
//!
//! Ordered, per-path rules on top of a default-allow base.
//!
//! ## Overview
//!
//! Each path class (locations, views, users) owns a [`RuleGroup`]. For a
//! request, the first rule whose method set contains the request method
//! governs it. The request passes if the requester holds any of that rule's
//! roles, or if the rule carries an ownership exception and the requester
//! owns the addressed resource. Methods no rule mentions are allowed.
//!
//! Evaluation never performs I/O and never fails; [`authorize`] only turns a
//! [`Decision::Deny`] into a [`PermsError::Forbidden`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signpost_perms::{evaluate, PathClass, Policy};
//! use signpost_core::{roles, Method, SubjectId};
//!
//! let policy = Policy::standard();
//! let me = SubjectId::parse("corp\\alice").unwrap();
//! let decision = evaluate(
//!     Method::Patch,
//!     policy.group(PathClass::Users),
//!     &roles(["user"]),
//!     &me,
//!     Some(&me),
//! );
//! assert!(decision.is_allowed());
//! ```

pub mod error;
pub mod evaluate;
pub mod policy;
pub mod rule;

pub use error::{PermsError, Result};
pub use evaluate::{authorize, evaluate, Decision, Grounds};
pub use policy::Policy;
pub use rule::{PathClass, PermissionRule, RuleGroup};
