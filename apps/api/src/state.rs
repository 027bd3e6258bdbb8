use std::sync::Arc;

use crate::analytics::dispatch::EventDispatcher;
use crate::analytics::store::EventStore;
use crate::scoring::adapter::ScoringAdapter;
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external client is built once in `main` and shared from here.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub storage: Arc<dyn ObjectStore>,
    pub scoring: Arc<ScoringAdapter>,
    /// Fire-and-forget writer over `events`.
    pub dispatcher: EventDispatcher,
}
