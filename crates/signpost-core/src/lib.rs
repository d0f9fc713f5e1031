//! # Signpost Core
//!
//! Pure primitives for Signpost: identity claims, the bearer-token codec, and
//! the records the registry stores.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! safe to share across request tasks without locking.
//!
//! ## Key Types
//!
//! - [`TokenCodec`] - Issues and verifies signed bearer tokens
//! - [`Claims`] - The verified content of a token
//! - [`Principal`] - Proof that a request passed authentication
//! - [`Location`], [`View`], [`User`] - Registry records, keyed by [`Record::key`]
//!
//! ## Token lifecycle
//!
//! ```text
//! Issued ──verify──► Verified(Principal) ──► permission evaluation
//!    └──────────────► Rejected(InvalidSignature | Expired | Malformed)
//! ```
//!
//! Both outcomes are terminal for the request; nothing is persisted.

pub mod claims;
pub mod crypto;
pub mod error;
pub mod record;
pub mod token;
pub mod types;
pub mod validation;

pub use claims::{Claims, Principal};
pub use crypto::secret_fragment;
pub use error::{CoreError, Result, TokenError, ValidationError};
pub use record::{
    Location, LocationDetail, LocationPatch, NewUser, Record, User, UserPatch, View, ViewPatch,
};
pub use token::{now_millis, now_secs, Token, TokenCodec, TokenConfig, DEFAULT_TOKEN_TTL};
pub use types::{roles, Method, ResourceClass, Role, RoleSet, SubjectId};
pub use validation::{validate_location, validate_name, validate_view};
