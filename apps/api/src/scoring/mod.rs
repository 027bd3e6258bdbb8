//! Scoring Adapter: resume-vs-job scoring and resume insights through the
//! generative model, with local fallbacks so callers always get an answer.

pub mod adapter;
pub mod fallback;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod prompts;

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::analytics::models::{Action, AnalyticsEvent, Metadata};
use crate::analytics::validation::{is_valid_identifier, FieldViolation, ValidationErrors};
use crate::scoring::models::ScoreResult;

pub const RESUME_LENGTH: RangeInclusive<usize> = 10..=50_000;
pub const JOB_LENGTH: RangeInclusive<usize> = 10..=10_000;

const ANALYSIS_FIELDS: &[&str] = &["resume", "job", "userId", "resumeId", "jobId"];
const INSIGHT_FIELDS: &[&str] = &["resume"];

/// A sanitized, length-checked analyze-resume body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub resume: String,
    pub job: String,
    pub user_id: Option<String>,
    pub resume_id: Option<String>,
    pub job_id: Option<String>,
}

impl AnalysisRequest {
    /// The `ai_analysis` event recording this request's outcome, if the caller
    /// identified themselves.
    pub fn outcome_event(&self, result: &ScoreResult, at: DateTime<Utc>) -> Option<AnalyticsEvent> {
        let user_id = self.user_id.clone()?;
        let mut metadata = Map::new();
        metadata.insert("score".to_string(), json!(result.score));
        metadata.insert("skills".to_string(), json!(result.key_skills));
        Some(AnalyticsEvent {
            action: Action::AiAnalysis,
            user_id,
            resume_id: self.resume_id.clone(),
            job_id: self.job_id.clone(),
            timestamp: at,
            metadata: Some(Metadata::new(metadata)),
        })
    }
}

/// Expects an already-sanitized body.
pub fn validate_analysis_request(raw: &Value) -> Result<AnalysisRequest, ValidationErrors> {
    let fields = object_fields(raw)?;
    let mut violations = unknown_keys(fields, ANALYSIS_FIELDS);

    let resume = bounded_text(fields, "resume", &RESUME_LENGTH, &mut violations);
    let job = bounded_text(fields, "job", &JOB_LENGTH, &mut violations);
    let user_id = optional_identifier(fields, "userId", &mut violations);
    let resume_id = optional_identifier(fields, "resumeId", &mut violations);
    let job_id = optional_identifier(fields, "jobId", &mut violations);

    match (resume, job) {
        (Some(resume), Some(job)) if violations.is_empty() => Ok(AnalysisRequest {
            resume,
            job,
            user_id,
            resume_id,
            job_id,
        }),
        _ => Err(ValidationErrors(violations)),
    }
}

/// Returns the resume text of an insights body.
pub fn validate_insights_request(raw: &Value) -> Result<String, ValidationErrors> {
    let fields = object_fields(raw)?;
    let mut violations = unknown_keys(fields, INSIGHT_FIELDS);
    let resume = bounded_text(fields, "resume", &RESUME_LENGTH, &mut violations);
    match resume {
        Some(resume) if violations.is_empty() => Ok(resume),
        _ => Err(ValidationErrors(violations)),
    }
}

fn object_fields(raw: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    raw.as_object().ok_or_else(|| {
        ValidationErrors(vec![FieldViolation::new("body", "body must be a JSON object")])
    })
}

fn unknown_keys(fields: &Map<String, Value>, allowed: &[&str]) -> Vec<FieldViolation> {
    fields
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .map(|key| FieldViolation::new(key, format!("\"{key}\" is not allowed")))
        .collect()
}

fn bounded_text(
    fields: &Map<String, Value>,
    name: &str,
    length: &RangeInclusive<usize>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let Some(value) = fields.get(name) else {
        violations.push(FieldViolation::new(name, format!("\"{name}\" is required")));
        return None;
    };
    let Some(text) = value.as_str() else {
        violations.push(FieldViolation::new(name, format!("\"{name}\" must be a string")));
        return None;
    };
    let chars = text.chars().count();
    if !length.contains(&chars) {
        violations.push(FieldViolation::new(
            name,
            format!(
                "\"{name}\" length must be between {} and {} characters",
                length.start(),
                length.end()
            ),
        ));
        return None;
    }
    Some(text.to_string())
}

fn optional_identifier(
    fields: &Map<String, Value>,
    name: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match fields.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) if is_valid_identifier(id) => Some(id.clone()),
        Some(_) => {
            violations.push(FieldViolation::new(
                name,
                format!("\"{name}\" must be a valid identifier"),
            ));
            None
        }
    }
}
