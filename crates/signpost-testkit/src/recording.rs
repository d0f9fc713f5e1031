//! A broadcaster that remembers what it was asked to publish.

use std::sync::{Arc, Mutex};

use signpost_broadcast::{Broadcaster, MutationEvent};

/// Captures published events in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroadcaster {
    events: Arc<Mutex<Vec<MutationEvent>>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far.
    pub fn events(&self) -> Vec<MutationEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Wire names of everything published so far, e.g. `location:create`.
    pub fn names(&self) -> Vec<String> {
        self.events().iter().map(MutationEvent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, event: MutationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
