// ABOUTME: Capacity-bounded execution history with derived aggregate statistics
// ABOUTME: Stores records most-recent-first and evicts the oldest when full

use serde::Serialize;
use tokio::sync::RwLock;

use super::result::{TaskExecutionResult, TaskRecord, TaskStatus};

/// Default number of records returned when callers do not ask for a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Aggregate statistics over the current history contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Average duration in whole milliseconds, 0 when the history is empty.
    pub avg_duration_ms: u64,
    /// completed / total, rounded to two decimal places, 0 when empty.
    pub success_rate: f64,
}

/// In-memory, process-lifetime log of finished executions. Shared across
/// concurrently completing executions, so all access goes through a lock.
pub struct ExecutionHistory {
    records: RwLock<Vec<TaskRecord>>,
    capacity: usize,
}

impl ExecutionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stamp and append a result. The newest record sits at the front; the
    /// oldest records fall off the tail once capacity is reached.
    pub async fn add(&self, result: TaskExecutionResult) {
        let record = TaskRecord {
            result,
            recorded_at: chrono::Utc::now(),
        };
        let mut records = self.records.write().await;
        records.insert(0, record);
        records.truncate(self.capacity);
    }

    /// Up to `limit` most-recent records, newest first.
    pub async fn get_recent(&self, limit: usize) -> Vec<TaskRecord> {
        let records = self.records.read().await;
        records.iter().take(limit).cloned().collect()
    }

    /// Most recent record for the given task id, if any.
    pub async fn get_by_task_id(&self, task_id: &str) -> Option<TaskRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|record| record.result.task_id == task_id)
            .cloned()
    }

    /// Records with the given status, newest first, optionally limited.
    pub async fn get_by_status(&self, status: TaskStatus, limit: Option<usize>) -> Vec<TaskRecord> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|record| record.result.status == status)
            .cloned();
        match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    pub async fn stats(&self) -> HistoryStats {
        let records = self.records.read().await;
        let total = records.len();
        let completed = records
            .iter()
            .filter(|r| r.result.status == TaskStatus::Completed)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.result.status == TaskStatus::Failed)
            .count();
        let cancelled = records
            .iter()
            .filter(|r| r.result.status == TaskStatus::Cancelled)
            .count();

        let avg_duration_ms = if total > 0 {
            let sum: u64 = records.iter().map(|r| r.result.duration_ms).sum();
            (sum as f64 / total as f64).round() as u64
        } else {
            0
        };

        let success_rate = if total > 0 {
            (completed as f64 / total as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        HistoryStats {
            total,
            completed,
            failed,
            cancelled,
            avg_duration_ms,
            success_rate,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Defensive copy of every record, newest first.
    pub async fn all(&self) -> Vec<TaskRecord> {
        self.records.read().await.clone()
    }
}
