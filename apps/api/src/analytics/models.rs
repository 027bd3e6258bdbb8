use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of recognized event kinds. Extending it is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    DashboardView,
    ResumeUpload,
    ResumeUploadError,
    ResumeView,
    JobRequirementCreate,
    JobRequirementCreateError,
    CandidateShortlist,
    AiAnalysis,
    UserLogin,
    UserSignup,
    AdminDashboardView,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::DashboardView,
        Action::ResumeUpload,
        Action::ResumeUploadError,
        Action::ResumeView,
        Action::JobRequirementCreate,
        Action::JobRequirementCreateError,
        Action::CandidateShortlist,
        Action::AiAnalysis,
        Action::UserLogin,
        Action::UserSignup,
        Action::AdminDashboardView,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::DashboardView => "dashboard_view",
            Action::ResumeUpload => "resume_upload",
            Action::ResumeUploadError => "resume_upload_error",
            Action::ResumeView => "resume_view",
            Action::JobRequirementCreate => "job_requirement_create",
            Action::JobRequirementCreateError => "job_requirement_create_error",
            Action::CandidateShortlist => "candidate_shortlist",
            Action::AiAnalysis => "ai_analysis",
            Action::UserLogin => "user_login",
            Action::UserSignup => "user_signup",
            Action::AdminDashboardView => "admin_dashboard_view",
        }
    }

    /// Actions whose metadata may carry a match score.
    pub fn is_scoring_related(self) -> bool {
        matches!(self, Action::AiAnalysis | Action::CandidateShortlist)
    }

    /// Human-readable label shown in activity feeds.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Action::ResumeUpload => Some("Resume uploaded"),
            Action::JobRequirementCreate => Some("Job requirement created"),
            Action::CandidateShortlist => Some("Candidate shortlisted"),
            Action::AiAnalysis => Some("AI analysis performed"),
            Action::DashboardView => Some("Dashboard viewed"),
            Action::ResumeView => Some("Resume viewed"),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Open key/value document attached to an event.
///
/// No shape is enforced on write; readers go through the `Option`-returning
/// accessors and skip anything that does not look the way they expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accepts a JSON object, or a string holding a JSON object (older rows
    /// were written with the document serialized to text).
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            Value::String(text) => match serde_json::from_str(&text) {
                Ok(Value::Object(map)) => Some(Self(map)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String entries of `metadata.skills`, if it is an array.
    pub fn skills(&self) -> Option<impl Iterator<Item = &str>> {
        self.get("skills")
            .and_then(Value::as_array)
            .map(|skills| skills.iter().filter_map(Value::as_str))
    }

    /// `matchScore`, falling back to `score`.
    pub fn match_score(&self) -> Option<f64> {
        self.number("matchScore").or_else(|| self.number("score"))
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A validated event as accepted from a caller, before the sink assigns
/// `event_id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub action: Action,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AnalyticsEvent {
    /// `<user>_<action>_<write millis>`. Two identical actions by the same user
    /// within one millisecond share an id; rows are never deduplicated on it.
    pub fn event_id(&self, created_at: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}",
            self.user_id,
            self.action,
            created_at.timestamp_millis()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReceipt {
    pub event_id: String,
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub metadata: Option<Metadata>,
}

impl ActivityRecord {
    pub fn known_action(&self) -> Option<Action> {
        self.action.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionSummary {
    pub action: String,
    pub count: u64,
    #[serde(rename = "lastActionTimestamp")]
    pub last_action: DateTime<Utc>,
}

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Same bounds as the store's `"timestamp" >= $1 AND "timestamp" <= $2` filter.
    #[cfg(test)]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
