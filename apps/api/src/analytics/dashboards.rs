//! Consumer-shaped views of a `MetricsBundle`. These only relabel and slice;
//! every number comes from the bundle's projections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::metrics::{
    active_user_count, average_match_score, event_count_for, top_skills, unique_user_count,
    MetricsBundle, SkillCount, DEFAULT_TOP_SKILLS,
};
use crate::analytics::models::{Action, ActionCount, DailyCount, Metadata};
use crate::health::OverallHealth;

const ADMIN_RECENT_ACTIVITY: usize = 20;
const ADMIN_TOP_ACTIONS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_resumes: u64,
    pub total_jobs: u64,
    pub total_shortlisted: u64,
    pub analysis_stats: AnalysisStats,
    pub recent_activity: Vec<ActivityLine>,
    pub top_skills: Vec<SkillCount>,
    pub average_match_score: u32,
    pub unique_users: usize,
    pub active_users: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub analyzed: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityLine {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl DashboardMetrics {
    pub fn from_bundle(bundle: &MetricsBundle) -> Self {
        let count = |action| event_count_for(&bundle.events_by_action, action);
        let uploaded = count(Action::ResumeUpload);
        let analyzed = count(Action::AiAnalysis);

        Self {
            total_resumes: uploaded,
            total_jobs: count(Action::JobRequirementCreate),
            total_shortlisted: count(Action::CandidateShortlist),
            analysis_stats: AnalysisStats {
                analyzed,
                pending: uploaded.saturating_sub(analyzed),
            },
            recent_activity: bundle
                .recent_activity
                .iter()
                .map(|record| ActivityLine {
                    action: record.action.clone(),
                    timestamp: record.timestamp,
                    details: record
                        .known_action()
                        .and_then(Action::label)
                        .map(str::to_string)
                        .unwrap_or_else(|| record.action.clone()),
                })
                .collect(),
            top_skills: top_skills(&bundle.recent_activity, DEFAULT_TOP_SKILLS),
            average_match_score: average_match_score(&bundle.recent_activity),
            unique_users: unique_user_count(&bundle.recent_activity),
            active_users: active_user_count(&bundle.recent_activity, bundle.computed_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub overview: AdminOverview,
    pub event_breakdown: Vec<EventShare>,
    pub recent_activity: Vec<AdminActivity>,
    pub daily_activity: Vec<DailyCount>,
    pub top_actions: Vec<ActionCount>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_events: u64,
    pub total_users: usize,
    pub active_users: usize,
    pub system_health: OverallHealth,
}

/// `percentage` is left at zero; clients derive it from the counts.
#[derive(Debug, Clone, Serialize)]
pub struct EventShare {
    pub action: String,
    pub count: u64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivity {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub metadata: Option<Metadata>,
}

impl AdminDashboard {
    pub fn from_bundle(bundle: &MetricsBundle, system_health: OverallHealth) -> Self {
        Self {
            overview: AdminOverview {
                total_events: bundle.total_events,
                total_users: unique_user_count(&bundle.recent_activity),
                active_users: active_user_count(&bundle.recent_activity, bundle.computed_at),
                system_health,
            },
            event_breakdown: bundle
                .events_by_action
                .iter()
                .map(|entry| EventShare {
                    action: entry.action.clone(),
                    count: entry.count,
                    percentage: 0,
                })
                .collect(),
            recent_activity: bundle
                .recent_activity
                .iter()
                .take(ADMIN_RECENT_ACTIVITY)
                .map(|record| AdminActivity {
                    action: record.action.clone(),
                    timestamp: record.timestamp,
                    user_id: record.user_id.clone(),
                    metadata: record.metadata.clone(),
                })
                .collect(),
            daily_activity: bundle.daily_activity.clone(),
            top_actions: bundle
                .events_by_action
                .iter()
                .take(ADMIN_TOP_ACTIONS)
                .cloned()
                .collect(),
            timestamp: bundle.computed_at,
        }
    }
}
