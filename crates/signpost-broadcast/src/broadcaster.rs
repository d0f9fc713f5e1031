//! The publishing side of the fan-out.

use std::sync::Arc;

use crate::event::MutationEvent;

/// Publishes mutation events to whoever is listening.
///
/// Publishing is infallible and must not block: delivery is best-effort, and
/// callers publish only after their write is durable.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, event: MutationEvent);
}

impl<B: Broadcaster + ?Sized> Broadcaster for Arc<B> {
    fn publish(&self, event: MutationEvent) {
        (**self).publish(event)
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for &B {
    fn publish(&self, event: MutationEvent) {
        (**self).publish(event)
    }
}
