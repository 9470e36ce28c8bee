use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::notify::NotificationRelay;
use crate::tasks::runner::{report, run_outbound, Liveness, TaskError};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Resolved { value: Value },
    Rejected { reason: String },
    TimedOut { after_ms: u64 },
    Cancelled,
}

impl TaskState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub label: String,
    #[serde(flatten)]
    pub state: TaskState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Finished tasks kept for polling. Pending tasks are never evicted.
pub const FINISHED_TASK_CAPACITY: usize = 256;

struct Entry {
    record: TaskRecord,
    liveness: Liveness,
}

#[derive(Default)]
struct Tasks {
    entries: HashMap<Uuid, Entry>,
    finished: VecDeque<Uuid>,
    capacity: usize,
}

impl Tasks {
    /// Records a task as finished and drops the oldest finished ones over
    /// capacity.
    fn retire(&mut self, id: Uuid) {
        self.finished.push_back(id);
        while self.finished.len() > self.capacity {
            if let Some(oldest) = self.finished.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Tracks background outbound tasks so clients can poll or cancel them.
/// Finished tasks publish their outcome through the relay.
#[derive(Clone)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<Tasks>>,
    relay: NotificationRelay,
    timeout: Duration,
}

impl TaskRegistry {
    pub fn new(relay: NotificationRelay, timeout: Duration) -> Self {
        Self::with_capacity(relay, timeout, FINISHED_TASK_CAPACITY)
    }

    pub fn with_capacity(relay: NotificationRelay, timeout: Duration, capacity: usize) -> Self {
        TaskRegistry {
            tasks: Arc::new(Mutex::new(Tasks {
                capacity,
                ..Default::default()
            })),
            relay,
            timeout,
        }
    }

    /// Starts `work` on the runtime and returns its id immediately.
    pub fn spawn<T, E, F>(&self, label: &str, success_message: &str, work: F) -> Uuid
    where
        T: Serialize + Send + 'static,
        E: Display + Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let liveness = Liveness::new();
        self.tasks.lock().entries.insert(
            id,
            Entry {
                record: TaskRecord {
                    id,
                    label: label.to_string(),
                    state: TaskState::Pending,
                    started_at: Utc::now(),
                    finished_at: None,
                },
                liveness: liveness.clone(),
            },
        );
        info!("Started task {id} ({label})");

        let registry = self.clone();
        let label = label.to_string();
        let success_message = success_message.to_string();
        tokio::spawn(async move {
            let result = run_outbound(&label, registry.timeout, &liveness, work).await;
            registry.finish(id, result, &success_message);
        });
        id
    }

    fn finish<T: Serialize>(&self, id: Uuid, result: Result<T, TaskError>, success_message: &str) {
        let state = match &result {
            Ok(value) => TaskState::Resolved {
                value: serde_json::to_value(value).unwrap_or(Value::Null),
            },
            Err(TaskError::Rejected { reason, .. }) => TaskState::Rejected {
                reason: reason.clone(),
            },
            Err(TaskError::TimedOut { after_ms, .. }) => TaskState::TimedOut {
                after_ms: *after_ms,
            },
            Err(TaskError::Cancelled { .. }) => TaskState::Cancelled,
        };

        {
            let mut tasks = self.tasks.lock();
            let Some(entry) = tasks.entries.get_mut(&id) else {
                return;
            };
            if !entry.record.state.is_pending() {
                return;
            }
            entry.record.state = state;
            entry.record.finished_at = Some(Utc::now());
            tasks.retire(id);
        }
        info!("Task {id} finished");
        report(&self.relay, &result, success_message);
    }

    pub fn get(&self, id: Uuid) -> Option<TaskRecord> {
        self.tasks.lock().entries.get(&id).map(|e| e.record.clone())
    }

    /// Cancels a pending task; its eventual result is discarded. Finished
    /// tasks are returned unchanged.
    pub fn cancel(&self, id: Uuid) -> Option<TaskRecord> {
        let mut tasks = self.tasks.lock();
        let entry = tasks.entries.get_mut(&id)?;
        if !entry.record.state.is_pending() {
            return Some(entry.record.clone());
        }
        entry.liveness.kill();
        entry.record.state = TaskState::Cancelled;
        entry.record.finished_at = Some(Utc::now());
        let record = entry.record.clone();
        tasks.retire(id);
        info!("Task {id} cancelled");
        Some(record)
    }
}
