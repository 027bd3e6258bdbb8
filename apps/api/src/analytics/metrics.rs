//! Metrics Aggregator — four windowed reductions over the event store, run
//! concurrently and isolated from each other, plus the pure projections the
//! dashboards are built from.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::models::{
    Action, ActionCount, ActivityRecord, DailyCount, TimeWindow, UserActionSummary,
};
use crate::analytics::store::{EventStore, SinkError};

/// Window for counts, breakdowns and the daily series.
pub const COUNT_WINDOW_DAYS: i64 = 30;
/// Window for the recent-activity feed.
pub const RECENT_WINDOW_DAYS: i64 = 7;
pub const RECENT_ACTIVITY_LIMIT: usize = 50;
pub const DEFAULT_TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    pub total_events: u64,
    pub events_by_action: Vec<ActionCount>,
    pub recent_activity: Vec<ActivityRecord>,
    pub daily_activity: Vec<DailyCount>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

pub async fn compute_metrics(store: &dyn EventStore) -> MetricsBundle {
    compute_metrics_at(store, Utc::now()).await
}

/// Runs all four facets against windows anchored at `now`. A facet whose
/// query fails comes back empty; the bundle itself always succeeds.
pub async fn compute_metrics_at(store: &dyn EventStore, now: DateTime<Utc>) -> MetricsBundle {
    let counts = TimeWindow::trailing_days(now, COUNT_WINDOW_DAYS);
    let recent = TimeWindow::trailing_days(now, RECENT_WINDOW_DAYS);

    let (total, by_action, recent_activity, daily) = tokio::join!(
        store.count_events(&counts),
        store.count_by_action(&counts),
        store.recent_activity(&recent, RECENT_ACTIVITY_LIMIT),
        store.daily_activity(&counts),
    );

    let bundle = MetricsBundle {
        total_events: facet("totalEvents", total),
        events_by_action: facet("eventsByAction", by_action),
        recent_activity: facet("recentActivity", recent_activity),
        daily_activity: facet("dailyActivity", daily),
        computed_at: now,
    };
    debug!(
        "Computed metrics: {} events, {} action groups, {} recent rows",
        bundle.total_events,
        bundle.events_by_action.len(),
        bundle.recent_activity.len()
    );
    bundle
}

fn facet<T: Default>(name: &str, result: Result<T, SinkError>) -> T {
    result.unwrap_or_else(|err| {
        warn!("Metrics facet {name} failed, reporting it empty: {err}");
        T::default()
    })
}

/// Per-action counts for one user over the count window, with the latest
/// timestamp of each action.
pub async fn user_analytics(
    store: &dyn EventStore,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<UserActionSummary>, SinkError> {
    store
        .user_actions(user_id, &TimeWindow::trailing_days(now, COUNT_WINDOW_DAYS))
        .await
}

pub fn event_count_for(events_by_action: &[ActionCount], action: Action) -> u64 {
    events_by_action
        .iter()
        .find(|entry| entry.action == action.as_str())
        .map(|entry| entry.count)
        .unwrap_or(0)
}

pub fn unique_user_count(events: &[ActivityRecord]) -> usize {
    events
        .iter()
        .map(|event| event.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct users with an event strictly inside the last 24 hours.
pub fn active_user_count(events: &[ActivityRecord], now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::hours(24);
    events
        .iter()
        .filter(|event| event.timestamp > cutoff)
        .map(|event| event.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Rounded mean of positive match scores on scoring-related events, 0 when
/// there are none.
pub fn average_match_score(events: &[ActivityRecord]) -> u32 {
    let scores: Vec<f64> = events
        .iter()
        .filter(|event| event.known_action().is_some_and(Action::is_scoring_related))
        .filter_map(|event| event.metadata.as_ref()?.match_score())
        .filter(|score| *score > 0.0)
        .collect();

    if scores.is_empty() {
        return 0;
    }
    (scores.iter().sum::<f64>() / scores.len() as f64).round() as u32
}

/// Most frequent `metadata.skills` entries, ties kept in first-seen order.
pub fn top_skills(events: &[ActivityRecord], limit: usize) -> Vec<SkillCount> {
    let mut order: Vec<SkillCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let skills = events
        .iter()
        .filter_map(|event| event.metadata.as_ref()?.skills())
        .flatten();

    for skill in skills {
        match index.get(skill) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(skill, order.len());
                order.push(SkillCount {
                    skill: skill.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(limit);
    order
}
