//! # Signpost Broadcast
//!
//! Fan-out of registry mutation events to connected observers.
//!
//! ## Key Properties
//!
//! - **Best-effort**: no acknowledgment, no retry, no persistence
//! - **Live only**: a subscriber never sees events published before it connected
//! - **Per-writer order**: one writer's events arrive in the order it published them
//! - **Infallible publish**: publishing never blocks or fails the caller
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signpost_broadcast::{Broadcaster, EventTopic, Hub, MutationEvent};
//!
//! async fn example() {
//!     let hub = Hub::default();
//!     let mut feed = hub.subscribe();
//!
//!     hub.publish(MutationEvent::deleted(EventTopic::Location, "lobby"));
//!
//!     let event = feed.recv().await.unwrap();
//!     assert_eq!(event.name(), "location:delete");
//! }
//! ```

pub mod broadcaster;
pub mod event;
pub mod hub;

pub use broadcaster::Broadcaster;
pub use event::{EventKind, EventTopic, MutationEvent};
pub use hub::{Hub, HubConfig, Subscription, DEFAULT_CAPACITY, MAX_CAPACITY};
