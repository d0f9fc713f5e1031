//! Channel-backed fan-out hub.
//!
//! The subscriber set lives inside a `tokio::sync::broadcast` channel, so
//! connecting, disconnecting and publishing need no locking of our own.

use tokio::sync::broadcast;

use crate::broadcaster::Broadcaster;
use crate::event::MutationEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Largest buffer a hub will allocate. Larger requests are clamped.
pub const MAX_CAPACITY: usize = 1 << 16;

/// Hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Events a slow subscriber may fall behind before it starts losing them.
    pub capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Fans each published event out to every live [`Subscription`].
#[derive(Debug, Clone)]
pub struct Hub {
    sender: broadcast::Sender<MutationEvent>,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.clamp(1, MAX_CAPACITY));
        Self { sender }
    }

    /// Start receiving events published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl Broadcaster for Hub {
    fn publish(&self, event: MutationEvent) {
        let name = event.name();
        // No subscribers is not an error.
        match self.sender.send(event) {
            Ok(delivered) => tracing::debug!(event = %name, delivered, "published"),
            Err(_) => tracing::trace!(event = %name, "published to nobody"),
        }
    }
}

/// One subscriber's view of the hub.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<MutationEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Events lost because this subscriber fell behind are skipped. Returns
    /// `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<MutationEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<MutationEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, events dropped");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventTopic};
    use proptest::prelude::*;
    use serde_json::json;

    fn event(n: u64) -> MutationEvent {
        MutationEvent::new(EventKind::Update, EventTopic::Location, json!({ "n": n }))
    }

    #[tokio::test]
    async fn test_capacity_clamped() {
        for capacity in [0, usize::MAX] {
            let hub = Hub::new(HubConfig { capacity });
            let mut feed = hub.subscribe();
            hub.publish(MutationEvent::deleted(EventTopic::View, "loop"));
            assert_eq!(feed.recv().await.unwrap().name(), "view:delete");
        }
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let hub = Hub::default();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(event(1));

        assert_eq!(a.recv().await.unwrap(), event(1));
        assert_eq!(b.recv().await.unwrap(), event(1));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let hub = Hub::default();
        hub.publish(event(1));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let hub = Hub::default();
        hub.publish(event(1));

        let mut late = hub.subscribe();
        hub.publish(event(2));

        assert_eq!(late.recv().await.unwrap(), event(2));
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_leaves_set() {
        let hub = Hub::default();
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
        hub.publish(event(1));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let hub = Hub::new(HubConfig { capacity: 2 });
        let mut slow = hub.subscribe();

        for n in 0..5 {
            hub.publish(event(n));
        }

        // Only the newest `capacity` events survive.
        assert_eq!(slow.recv().await.unwrap(), event(3));
        assert_eq!(slow.recv().await.unwrap(), event(4));
    }

    #[tokio::test]
    async fn test_closed_hub_ends_subscription() {
        let hub = Hub::default();
        let mut sub = hub.subscribe();
        drop(hub);
        assert!(sub.recv().await.is_none());
    }

    proptest! {
        #[test]
        fn single_writer_order_preserved(count in 1u64..64) {
            let hub = Hub::new(HubConfig { capacity: 64 });
            let mut sub = hub.subscribe();

            for n in 0..count {
                hub.publish(event(n));
            }

            for n in 0..count {
                prop_assert_eq!(sub.try_recv(), Some(event(n)));
            }
            prop_assert_eq!(sub.try_recv(), None);
        }
    }
}
