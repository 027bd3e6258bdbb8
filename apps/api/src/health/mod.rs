//! Health Aggregator: probes each external collaborator concurrently and
//! folds the results into one status. Probe failures are data, never errors.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::store::EventStore;
use crate::scoring::adapter::ScoringAdapter;
use crate::state::AppState;
use crate::storage::ObjectStore;

pub const EVENTS_SERVICE: &str = "events";
pub const SCORING_SERVICE: &str = "scoring";
pub const STORAGE_SERVICE: &str = "storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub message: String,
}

impl ServiceHealth {
    fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub overall_health: OverallHealth,
    pub services: BTreeMap<&'static str, ServiceHealth>,
    pub timestamp: DateTime<Utc>,
}

/// Runs the sink's full provisioning path.
pub async fn probe_events(store: &dyn EventStore) -> ServiceHealth {
    match store.ensure_ready().await {
        Ok(table) => ServiceHealth::healthy(format!("Event table {table} is ready")),
        Err(err) => ServiceHealth::unhealthy(err.to_string()),
    }
}

pub fn probe_scoring(scoring: &ScoringAdapter) -> ServiceHealth {
    match scoring.probe() {
        Ok(model) => ServiceHealth::healthy(format!("Model {model} is configured")),
        Err(err) => ServiceHealth::unhealthy(err.to_string()),
    }
}

pub async fn probe_storage(storage: &dyn ObjectStore) -> ServiceHealth {
    match storage.ensure_ready().await {
        Ok(bucket) => ServiceHealth::healthy(format!("Bucket {bucket} is ready")),
        Err(err) => ServiceHealth::unhealthy(err.to_string()),
    }
}

pub fn overall(services: &BTreeMap<&'static str, ServiceHealth>) -> OverallHealth {
    if services.values().all(|s| s.status == HealthStatus::Healthy) {
        OverallHealth::Healthy
    } else {
        OverallHealth::Degraded
    }
}

pub async fn check_health(
    events: &dyn EventStore,
    scoring: &ScoringAdapter,
    storage: &dyn ObjectStore,
) -> SystemHealth {
    let (events_health, scoring_health, storage_health) = tokio::join!(
        probe_events(events),
        async { probe_scoring(scoring) },
        probe_storage(storage),
    );

    let services = BTreeMap::from([
        (EVENTS_SERVICE, events_health),
        (SCORING_SERVICE, scoring_health),
        (STORAGE_SERVICE, storage_health),
    ]);

    SystemHealth {
        overall_health: overall(&services),
        services,
        timestamp: Utc::now(),
    }
}

/// GET /api/admin/system/health
pub async fn handle_system_health(State(state): State<AppState>) -> Json<SystemHealth> {
    Json(check_health(state.events.as_ref(), &state.scoring, state.storage.as_ref()).await)
}
