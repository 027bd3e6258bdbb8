//! Axum route handlers for the AI scoring API.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::analytics::validation::sanitize_input;
use crate::errors::AppError;
use crate::health::HealthStatus;
use crate::scoring::models::{Insights, ScoreResult};
use crate::scoring::{validate_analysis_request, validate_insights_request};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: ScoreResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub resume_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    fn failed(resume_id: String, error: &str) -> Self {
        Self {
            resume_id,
            success: false,
            analysis: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<BatchItem>,
    pub summary: BatchSummary,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub insights: Insights,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AiHealthResponse {
    pub status: HealthStatus,
    pub service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/ai/analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = validate_analysis_request(&sanitize_input(raw))?;

    info!(
        "Scoring resume ({} bytes) against job ({} bytes)",
        request.resume.len(),
        request.job.len()
    );
    let analysis = state.scoring.score(&request.resume, &request.job).await;

    let now = Utc::now();
    if let Some(event) = request.outcome_event(&analysis, now) {
        state.dispatcher.dispatch(event);
    }

    Ok(Json(AnalysisResponse {
        success: true,
        analysis,
        timestamp: now,
    }))
}

/// POST /api/ai/batch-analyze
pub async fn handle_batch_analyze(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<BatchResponse>, AppError> {
    let body = sanitize_input(raw);

    let resumes = match body.get("resumes").and_then(Value::as_array) {
        Some(resumes) if !resumes.is_empty() => resumes.clone(),
        _ => {
            return Err(AppError::Validation(
                "Please provide an array of resumes".to_string(),
            ))
        }
    };
    let job: Arc<str> = match body.get("job").and_then(Value::as_str) {
        Some(job) if !job.is_empty() => Arc::from(job),
        _ => {
            return Err(AppError::Validation(
                "Please provide job requirements".to_string(),
            ))
        }
    };

    info!("Starting batch analysis of {} resumes", resumes.len());

    let mut pending = JoinSet::new();
    let mut results: Vec<BatchItem> = Vec::with_capacity(resumes.len());
    for (index, resume) in resumes.iter().enumerate() {
        let resume_id = resume
            .get("id")
            .and_then(|id| match id {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("resume_{index}"));

        let Some(content) = resume.get("content").and_then(Value::as_str).map(str::to_owned) else {
            results.push(BatchItem::failed(resume_id, "Resume content must be a string"));
            continue;
        };

        results.push(BatchItem::failed(resume_id, "Scoring task did not complete"));
        let scoring = Arc::clone(&state.scoring);
        let job = Arc::clone(&job);
        pending.spawn(async move {
            let analysis = scoring.score(&content, &job).await;
            (index, analysis)
        });
    }

    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((index, analysis)) => {
                let item = &mut results[index];
                item.success = true;
                item.analysis = Some(analysis);
                item.error = None;
            }
            Err(err) => warn!("Batch scoring task failed: {err}"),
        }
    }

    let successful = results.iter().filter(|item| item.success).count();
    let summary = BatchSummary {
        total: results.len(),
        successful,
        failed: results.len() - successful,
    };

    Ok(Json(BatchResponse {
        success: true,
        message: format!("Analyzed {successful} resumes successfully"),
        results,
        summary,
        timestamp: Utc::now(),
    }))
}

/// POST /api/ai/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<InsightsResponse>, AppError> {
    let resume = validate_insights_request(&sanitize_input(raw))?;
    let insights = state.scoring.generate_insights(&resume).await;
    Ok(Json(InsightsResponse {
        success: true,
        insights,
        timestamp: Utc::now(),
    }))
}

/// GET /api/ai/health
pub async fn handle_ai_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<AiHealthResponse>) {
    let (status, body) = match state.scoring.probe() {
        Ok(model) => (
            StatusCode::OK,
            AiHealthResponse {
                status: HealthStatus::Healthy,
                service: "ai",
                model: Some(model),
                error: None,
                timestamp: Utc::now(),
            },
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            AiHealthResponse {
                status: HealthStatus::Unhealthy,
                service: "ai",
                model: None,
                error: Some(err.to_string()),
                timestamp: Utc::now(),
            },
        ),
    };
    (status, Json(body))
}
