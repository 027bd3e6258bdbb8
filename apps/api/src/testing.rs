//! In-memory fakes of the service's external seams, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::analytics::models::{
    Action, ActionCount, ActivityRecord, AnalyticsEvent, DailyCount, EventReceipt, Metadata,
    TimeWindow, UserActionSummary,
};
use crate::analytics::dispatch::EventDispatcher;
use crate::analytics::store::{EventStore, SinkError, TableRef};
use crate::config::Config;
use crate::llm_client::{GenerationParams, LlmError, TextGenerator};
use crate::scoring::adapter::ScoringAdapter;
use crate::state::AppState;
use crate::storage::{ObjectStore, StorageError, StoredFile};

pub fn config() -> Config {
    let vars = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/screening_test"),
        ("EVENTS_NAMESPACE", "analytics"),
        ("EVENTS_TABLE", "user_events"),
        ("S3_BUCKET", "resumes"),
        ("S3_ENDPOINT", "http://localhost:9000"),
        ("AWS_ACCESS_KEY_ID", "minio"),
        ("AWS_SECRET_ACCESS_KEY", "minio123"),
        ("ANTHROPIC_API_KEY", "sk-test"),
        ("FALLBACK_SEED", "7"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// State wired to in-memory fakes, the same way `main` wires the real clients.
pub fn app_state(
    events: Arc<MemoryEventStore>,
    storage: Arc<MemoryObjectStore>,
    generator: Arc<dyn TextGenerator>,
) -> AppState {
    let config = config();
    let scoring = ScoringAdapter::new(generator, config.scoring_params(), config.fallback_seed);
    AppState {
        dispatcher: EventDispatcher::new(events.clone()),
        events,
        storage,
        scoring: Arc::new(scoring),
    }
}

pub fn activity(
    action: &str,
    user_id: &str,
    timestamp: DateTime<Utc>,
    metadata: Option<Value>,
) -> ActivityRecord {
    ActivityRecord {
        action: action.to_string(),
        timestamp,
        user_id: user_id.to_string(),
        metadata: metadata.and_then(Metadata::from_value),
    }
}

#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event_id: String,
    pub event: AnalyticsEvent,
    pub created_at: DateTime<Utc>,
}

/// Mirrors the SQL reductions of `PgEventStore` over a vector of rows.
#[derive(Default)]
pub struct MemoryEventStore {
    rows: Mutex<Vec<StoredEvent>>,
    append_calls: AtomicUsize,
    fail_writes: AtomicBool,
    fail_ensure_ready: AtomicBool,
    fail_recent_activity: AtomicBool,
}

impl MemoryEventStore {
    pub fn push(
        &self,
        user_id: &str,
        action: &str,
        timestamp: DateTime<Utc>,
        metadata: Option<Value>,
    ) {
        let action: Action = action.parse().unwrap();
        let event = AnalyticsEvent {
            action,
            user_id: user_id.to_string(),
            resume_id: None,
            job_id: None,
            timestamp,
            metadata: metadata.and_then(Metadata::from_value),
        };
        self.insert(event);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_ensure_ready(&self) {
        self.fail_ensure_ready.store(true, Ordering::SeqCst);
    }

    pub fn fail_recent_activity(&self) {
        self.fail_recent_activity.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<StoredEvent> {
        self.rows.lock().unwrap().clone()
    }

    fn insert(&self, event: AnalyticsEvent) -> EventReceipt {
        let created_at = Utc::now();
        let event_id = event.event_id(created_at);
        self.rows.lock().unwrap().push(StoredEvent {
            event_id: event_id.clone(),
            event,
            created_at,
        });
        EventReceipt { event_id }
    }

    fn in_window(&self, window: &TimeWindow) -> Vec<StoredEvent> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| window.contains(row.event.timestamp))
            .cloned()
            .collect()
    }
}

fn unavailable() -> SinkError {
    SinkError::Unavailable("injected failure".to_string())
}

/// Groups by action; count desc, then earliest timestamp, then first insertion.
fn group_by_action(rows: &[StoredEvent]) -> Vec<(String, u64, DateTime<Utc>, DateTime<Utc>)> {
    let mut groups: Vec<(String, u64, DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for row in rows {
        let action = row.event.action.as_str();
        let ts = row.event.timestamp;
        match groups.iter_mut().find(|g| g.0 == action) {
            Some(group) => {
                group.1 += 1;
                group.2 = group.2.min(ts);
                group.3 = group.3.max(ts);
            }
            None => groups.push((action.to_string(), 1, ts, ts)),
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    groups
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn ensure_ready(&self) -> Result<TableRef, SinkError> {
        if self.fail_ensure_ready.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(TableRef::new("memory", "events"))
    }

    async fn append(&self, event: &AnalyticsEvent) -> Result<EventReceipt, SinkError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.insert(event.clone()))
    }

    async fn count_events(&self, window: &TimeWindow) -> Result<u64, SinkError> {
        Ok(self.in_window(window).len() as u64)
    }

    async fn count_by_action(&self, window: &TimeWindow) -> Result<Vec<ActionCount>, SinkError> {
        Ok(group_by_action(&self.in_window(window))
            .into_iter()
            .map(|(action, count, _, _)| ActionCount { action, count })
            .collect())
    }

    async fn recent_activity(
        &self,
        window: &TimeWindow,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, SinkError> {
        if self.fail_recent_activity.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut rows = self.in_window(window);
        rows.sort_by(|a, b| b.event.timestamp.cmp(&a.event.timestamp));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| ActivityRecord {
                action: row.event.action.as_str().to_string(),
                timestamp: row.event.timestamp,
                user_id: row.event.user_id,
                metadata: row.event.metadata,
            })
            .collect())
    }

    async fn daily_activity(&self, window: &TimeWindow) -> Result<Vec<DailyCount>, SinkError> {
        let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
        for row in self.in_window(window) {
            *per_day.entry(row.event.timestamp.date_naive()).or_default() += 1;
        }
        let mut days: Vec<DailyCount> = per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(days)
    }

    async fn user_actions(
        &self,
        user_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<UserActionSummary>, SinkError> {
        let rows: Vec<StoredEvent> = self
            .in_window(window)
            .into_iter()
            .filter(|row| row.event.user_id == user_id)
            .collect();
        Ok(group_by_action(&rows)
            .into_iter()
            .map(|(action, count, _, last_action)| UserActionSummary {
                action,
                count,
                last_action,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    files: Mutex<Vec<StoredFile>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn with_files(files: Vec<StoredFile>) -> Self {
        Self {
            files: Mutex::new(files),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn fail(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Request("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_ready(&self) -> Result<String, StorageError> {
        self.check()?;
        Ok("memory-bucket".to_string())
    }

    async fn list_files(&self) -> Result<Vec<StoredFile>, StorageError> {
        self.check()?;
        Ok(self.files.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: String,
    pub params: GenerationParams,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<String, LlmError>>,
    calls: Vec<RecordedCall>,
}

/// Replays canned replies in order and records every call. Clones share state.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: replies.into(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn ready(&self) -> Result<&str, LlmError> {
        Ok("scripted-model")
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(RecordedCall {
            prompt: prompt.to_string(),
            system: system.to_string(),
            params: params.clone(),
        });
        script.replies.pop_front().unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// A generator with no usable handle.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn ready(&self) -> Result<&str, LlmError> {
        Err(LlmError::NotConfigured("no credentials".to_string()))
    }

    async fn generate(
        &self,
        _prompt: &str,
        _system: &str,
        _params: &GenerationParams,
    ) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}
