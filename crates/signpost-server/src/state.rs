//! Shared handler state.

use std::sync::Arc;

use signpost::broadcast::Hub;
use signpost::store::SqliteStore;
use signpost::Registry;

/// The registry as served over HTTP.
pub type ServedRegistry = Registry<SqliteStore, Hub>;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServedRegistry>,
}

impl AppState {
    pub fn new(registry: ServedRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
