//! # Signpost Store
//!
//! Storage abstraction for Signpost. Provides a trait-based interface for
//! record persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts record storage behind the [`Store`] trait,
//! allowing the registry to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait over encoded record bodies
//! - [`StoreExt`] - Typed access for [`Record`](signpost_core::Record) types
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`create_or_reconcile`] - Idempotent creation under a unique key
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signpost_core::Location;
//! use signpost_store::{create_or_reconcile, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("signpost.db").unwrap();
//!     let outcome = create_or_reconcile(&store, Location::new("lobby")).await.unwrap();
//!     println!("created: {}", outcome.was_created);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unique keys**: at most one record per class and natural key
//! - **No pre-checks**: duplicate detection is the insert itself
//! - **Atomic updates**: edits run as read-modify-write under the backend's lock

pub mod conciliate;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use conciliate::{create_or_reconcile, Reconciled};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Mutation, Store, StoreExt};
