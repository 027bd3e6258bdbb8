//! Axum route handlers for the analytics API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

use crate::analytics::dashboards::DashboardMetrics;
use crate::analytics::metrics::compute_metrics;
use crate::analytics::submit_event;
use crate::errors::AppError;
use crate::health::{probe_events, HealthStatus, ServiceHealth};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEventResponse {
    pub success: bool,
    pub message: &'static str,
    pub event_id: String,
}

/// POST /api/analytics/events
pub async fn handle_submit_event(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<SubmitEventResponse>), AppError> {
    let receipt = submit_event(state.events.as_ref(), raw).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitEventResponse {
            success: true,
            message: "Event logged successfully",
            event_id: receipt.event_id,
        }),
    ))
}

/// GET /api/analytics/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardMetrics> {
    let bundle = compute_metrics(state.events.as_ref()).await;
    Json(DashboardMetrics::from_bundle(&bundle))
}

/// GET /api/analytics/health
pub async fn handle_analytics_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ServiceHealth>) {
    let health = probe_events(state.events.as_ref()).await;
    let status = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}
