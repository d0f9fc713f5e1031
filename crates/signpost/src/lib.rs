//! # Signpost
//!
//! A registry of display locations and the views they cycle through, guarded
//! by bearer tokens and per-path permission rules, with change notifications
//! fanned out to live observers.
//!
//! ## Overview
//!
//! Every request flows through the same pipeline:
//!
//! ```text
//! token ──verify──► Principal ──authorize──► store ──(ok)──► broadcast
//!   │                   │                      │
//!   └─ 401              └─ 403                 └─ duplicate name: reconcile, no event
//! ```
//!
//! - **Authentication** is mandatory and happens first. Resource operations
//!   take a [`Principal`](core::Principal), which only the token codec can
//!   produce.
//! - **Authorization** follows the first matching rule for the method, and
//!   allows anything no rule mentions.
//! - **Creation** is idempotent under concurrency: the store's uniqueness
//!   constraint picks one winner, and every other creator gets its record back.
//! - **Broadcast** happens only after a successful write and never fails it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signpost::{Registry, RegistryConfig};
//! use signpost::broadcast::Hub;
//! use signpost::core::{Location, SubjectId};
//! use signpost::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("signpost.db").unwrap();
//!     let registry = Registry::new(b"secret", store, Hub::default(), RegistryConfig::default());
//!
//!     let token = registry
//!         .issue_token(SubjectId::parse("corp\\alice").unwrap())
//!         .await
//!         .unwrap();
//!     let principal = registry.authenticate(Some(token.as_str())).unwrap();
//!
//!     let outcome = registry
//!         .create_location(&principal, Location::new("lobby"))
//!         .await
//!         .unwrap();
//!     assert!(outcome.was_created());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `signpost::core` - Claims, tokens and records
//! - `signpost::perms` - Permission rules and evaluation
//! - `signpost::store` - Storage abstraction and SQLite
//! - `signpost::broadcast` - Mutation events and the fan-out hub

pub mod error;
pub mod registry;

// Re-export component crates
pub use signpost_broadcast as broadcast;
pub use signpost_core as core;
pub use signpost_perms as perms;
pub use signpost_store as store;

// Re-export main types for convenience
pub use error::{RegistryError, Result};
pub use registry::{Bootstrap, Creation, Registry, RegistryConfig};
