pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::admin;
use crate::analytics::handlers as analytics;
use crate::health::handle_system_health;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analytics API
        .route("/api/analytics/events", post(analytics::handle_submit_event))
        .route("/api/analytics/health", get(analytics::handle_analytics_health))
        .route("/api/analytics/dashboard", get(analytics::handle_dashboard))
        // Admin API
        .route("/api/admin/dashboard", get(admin::handle_admin_dashboard))
        .route(
            "/api/admin/users/:user_id/analytics",
            get(admin::handle_user_analytics),
        )
        .route("/api/admin/storage/stats", get(admin::handle_storage_stats))
        .route("/api/admin/system/health", get(handle_system_health))
        // AI API
        .route("/api/ai/analyze-resume", post(scoring::handle_analyze_resume))
        .route("/api/ai/batch-analyze", post(scoring::handle_batch_analyze))
        .route("/api/ai/insights", post(scoring::handle_insights))
        .route("/api/ai/health", get(scoring::handle_ai_health))
        .with_state(state)
}
