//! Structural checks applied to every event before it may reach the sink,
//! plus the narrow input sanitizer shared by all boundary handlers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analytics::models::{Action, AnalyticsEvent, Metadata};

const KNOWN_FIELDS: &[&str] = &["action", "userId", "resumeId", "jobId", "timestamp", "metadata"];
const MAX_IDENTIFIER_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldViolation>);

/// Validates a raw event document, collecting every violation rather than
/// stopping at the first. Pure: no I/O, no clock.
pub fn validate_event(raw: &Value) -> Result<AnalyticsEvent, ValidationErrors> {
    let Some(fields) = raw.as_object() else {
        return Err(ValidationErrors(vec![FieldViolation::new(
            "event",
            "event must be a JSON object",
        )]));
    };

    let mut violations = Vec::new();

    for key in fields.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            violations.push(FieldViolation::new(key, format!("\"{key}\" is not allowed")));
        }
    }

    let action = required_str(fields, "action", &mut violations).and_then(|name| {
        match name.parse::<Action>() {
            Ok(action) => Some(action),
            Err(_) => {
                let allowed: Vec<&str> = Action::ALL.iter().map(|a| a.as_str()).collect();
                violations.push(FieldViolation::new(
                    "action",
                    format!("action must be one of [{}]", allowed.join(", ")),
                ));
                None
            }
        }
    });

    let user_id = required_str(fields, "userId", &mut violations)
        .and_then(|id| identifier("userId", id, &mut violations));

    let resume_id = optional_identifier(fields, "resumeId", &mut violations);
    let job_id = optional_identifier(fields, "jobId", &mut violations);

    let timestamp = required_str(fields, "timestamp", &mut violations).and_then(|text| {
        let parsed = parse_timestamp(text);
        if parsed.is_none() {
            violations.push(FieldViolation::new(
                "timestamp",
                "timestamp must be a valid ISO-8601 date",
            ));
        }
        parsed
    });

    let metadata = match fields.get("metadata") {
        None => None,
        Some(Value::Object(map)) => Some(Metadata::new(map.clone())),
        Some(_) => {
            violations.push(FieldViolation::new("metadata", "metadata must be an object"));
            None
        }
    };

    match (action, user_id, timestamp) {
        (Some(action), Some(user_id), Some(timestamp)) if violations.is_empty() => {
            Ok(AnalyticsEvent {
                action,
                user_id,
                resume_id,
                job_id,
                timestamp,
                metadata,
            })
        }
        _ => Err(ValidationErrors(violations)),
    }
}

fn required_str<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<&'a str> {
    match fields.get(key) {
        None => {
            violations.push(FieldViolation::new(key, format!("{key} is required")));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            violations.push(FieldViolation::new(key, format!("{key} must be a string")));
            None
        }
    }
}

fn optional_identifier(
    fields: &Map<String, Value>,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match fields.get(key) {
        None => None,
        Some(Value::String(s)) => identifier(key, s, violations),
        Some(_) => {
            violations.push(FieldViolation::new(key, format!("{key} must be a string")));
            None
        }
    }
}

fn identifier(key: &str, value: &str, violations: &mut Vec<FieldViolation>) -> Option<String> {
    if is_valid_identifier(value) {
        Some(value.to_string())
    } else {
        violations.push(FieldViolation::new(
            key,
            format!(
                "{key} must be a non-empty identifier of at most {MAX_IDENTIFIER_LEN} characters"
            ),
        ));
        None
    }
}

/// Opaque caller-scoped identifier: UUIDs qualify, as do short tokens like `u1`.
pub fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_IDENTIFIER_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '@'))
}

/// RFC 3339 instants, plus offset-less date-times and bare dates read as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trims strings and strips `<` / `>` throughout a JSON graph. Nothing else
/// is touched, so ordinary punctuation survives.
pub fn sanitize_input(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_input).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_input(value)))
                .collect(),
        ),
        other => other,
    }
}

pub fn sanitize_text(text: &str) -> String {
    text.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect()
}
