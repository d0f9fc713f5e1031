//! # Signpost Testkit
//!
//! Testing utilities for Signpost.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a shared secret plus ready-made principals
//! - **Generators**: Proptest strategies for records, subjects and roles
//! - **Test doubles**: a [`RecordingBroadcaster`] that captures events in
//!   order, and a [`FailingStore`] that rejects writes on demand
//!
//! ## Test Fixtures
//!
//! ```rust
//! use signpost_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let admin = fixture.admin();
//! assert_eq!(admin.subject().as_str(), "corp\\root");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use signpost_testkit::generators::location;
//!
//! proptest! {
//!     #[test]
//!     fn locations_roundtrip(location in location()) {
//!         // ...
//!     }
//! }
//! ```

pub mod failing;
pub mod fixtures;
pub mod generators;
pub mod recording;

pub use failing::FailingStore;
pub use fixtures::{multi_party_principals, subject_id, TestFixture};
pub use recording::RecordingBroadcaster;
