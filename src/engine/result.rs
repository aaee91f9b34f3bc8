// ABOUTME: Task execution result and history record types
// ABOUTME: One TaskExecutionResult is produced per execution regardless of internal retries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of a single `execute_task` call. Immutable once appended to
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecutionResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub retry_count: u32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TaskExecutionResult {
    fn finish(
        task_id: String,
        status: TaskStatus,
        output: Option<serde_json::Value>,
        error: Option<String>,
        started_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Self {
        let completed_at = Utc::now();
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            task_id,
            status,
            output,
            error,
            started_at,
            completed_at,
            duration_ms,
            retry_count,
            metadata: HashMap::new(),
        }
    }

    pub fn completed(
        task_id: String,
        output: Option<serde_json::Value>,
        started_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Self {
        Self::finish(
            task_id,
            TaskStatus::Completed,
            output,
            None,
            started_at,
            retry_count,
        )
    }

    pub fn failed(
        task_id: String,
        error: String,
        started_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Self {
        Self::finish(
            task_id,
            TaskStatus::Failed,
            None,
            Some(error),
            started_at,
            retry_count,
        )
    }

    pub fn cancelled(
        task_id: String,
        error: String,
        started_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Self {
        Self::finish(
            task_id,
            TaskStatus::Cancelled,
            None,
            Some(error),
            started_at,
            retry_count,
        )
    }

    pub fn is_successful(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

/// A result as stored in the execution history, stamped at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub result: TaskExecutionResult,
    pub recorded_at: DateTime<Utc>,
}
