use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Process liveness only; dependency checks live under /api/admin/system/health.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screening-api"
    }))
}
