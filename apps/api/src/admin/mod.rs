//! Axum route handlers for the admin API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::dashboards::AdminDashboard;
use crate::analytics::metrics::{compute_metrics_at, user_analytics};
use crate::analytics::models::UserActionSummary;
use crate::analytics::validation::is_valid_identifier;
use crate::errors::AppError;
use crate::health::check_health;
use crate::state::AppState;
use crate::storage::{compute_storage_stats, StorageStats};

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub success: bool,
    pub data: AdminDashboard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalyticsResponse {
    pub success: bool,
    pub user_id: String,
    pub analytics: Vec<UserActionSummary>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StorageStatsResponse {
    pub success: bool,
    pub stats: StorageStats,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/admin/dashboard
pub async fn handle_admin_dashboard(State(state): State<AppState>) -> Json<AdminDashboardResponse> {
    let now = Utc::now();
    let (bundle, health) = tokio::join!(
        compute_metrics_at(state.events.as_ref(), now),
        check_health(state.events.as_ref(), &state.scoring, state.storage.as_ref()),
    );
    Json(AdminDashboardResponse {
        success: true,
        data: AdminDashboard::from_bundle(&bundle, health.overall_health),
    })
}

/// GET /api/admin/users/:user_id/analytics
pub async fn handle_user_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserAnalyticsResponse>, AppError> {
    let user_id = user_id.trim().to_string();
    if !is_valid_identifier(&user_id) {
        return Err(AppError::Validation("A valid user ID is required".to_string()));
    }

    let now = Utc::now();
    let analytics = user_analytics(state.events.as_ref(), &user_id, now).await?;
    Ok(Json(UserAnalyticsResponse {
        success: true,
        user_id,
        analytics,
        timestamp: now,
    }))
}

/// GET /api/admin/storage/stats
pub async fn handle_storage_stats(
    State(state): State<AppState>,
) -> Result<Json<StorageStatsResponse>, AppError> {
    let files = state.storage.list_files().await?;
    Ok(Json(StorageStatsResponse {
        success: true,
        stats: compute_storage_stats(files),
        timestamp: Utc::now(),
    }))
}
