use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::analytics::models::AnalyticsEvent;
use crate::analytics::store::EventStore;

/// Fire-and-forget event writer. Delivery is at most once: a failed append is
/// logged and dropped, never surfaced to the request that produced it.
#[derive(Clone)]
pub struct EventDispatcher {
    store: Arc<dyn EventStore>,
}

impl EventDispatcher {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Spawns the append and returns immediately. The handle is only useful
    /// to callers that want to wait (tests); dropping it does not cancel.
    pub fn dispatch(&self, event: AnalyticsEvent) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.append(&event).await {
                Ok(receipt) => debug!("Dispatched event {}", receipt.event_id),
                Err(err) => warn!(
                    "Dropped {} event for user {}: {err}",
                    event.action, event.user_id
                ),
            }
        })
    }
}
