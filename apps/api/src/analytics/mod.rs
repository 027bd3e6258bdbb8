pub mod dashboards;
pub mod dispatch;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod store;
pub mod validation;

use serde_json::Value;

use crate::analytics::models::EventReceipt;
use crate::analytics::store::EventStore;
use crate::analytics::validation::{sanitize_input, validate_event};
use crate::errors::AppError;

/// Sanitizes, validates, then appends. An invalid event never reaches the store.
pub async fn submit_event(store: &dyn EventStore, raw: Value) -> Result<EventReceipt, AppError> {
    let event = validate_event(&sanitize_input(raw))?;
    Ok(store.append(&event).await?)
}
