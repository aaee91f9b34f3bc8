// ABOUTME: Per-execution task context carrying ids, the cancellation signal, and progress reporting
// ABOUTME: Provides the cooperative helpers tasks use to observe cancellation and bound waits

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::{Result, TaskError};

/// Callback invoked for every progress report, in addition to logging.
pub type ProgressHook = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub task_id: String,
    pub request_id: String,
    /// 0-100.
    pub percent: u8,
    pub message: Option<String>,
}

/// Ephemeral context scoped to one execution attempt. Never persisted.
#[derive(Clone)]
pub struct TaskContext {
    pub task_id: String,
    pub request_id: String,
    pub cancellation: CancellationToken,
    progress_hook: Option<ProgressHook>,
}

impl TaskContext {
    pub fn new(
        task_id: impl Into<String>,
        request_id: impl Into<String>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            request_id: request_id.into(),
            cancellation,
            progress_hook: None,
        }
    }

    pub fn with_progress_hook(mut self, hook: ProgressHook) -> Self {
        self.progress_hook = Some(hook);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail fast if cancellation has already been requested. Tasks doing real
    /// work should call this between units of progress.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(TaskError::cancelled("cancellation requested"))
        } else {
            Ok(())
        }
    }

    /// Race a future against a timeout and the cancellation signal. Whichever
    /// fires first determines the outcome: the timeout yields `TimedOut`,
    /// cancellation yields `Cancelled`.
    pub async fn wait_bounded<F>(&self, fut: F, timeout: Duration) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            output = fut => Ok(output),
            _ = tokio::time::sleep(timeout) => Err(TaskError::TimedOut { timeout }),
            _ = self.cancellation.cancelled() => {
                Err(TaskError::cancelled("cancelled while waiting"))
            }
        }
    }

    /// Report 0-100 progress. Forwarded to the executor's hook when one is
    /// installed; never stored, only the final result is recorded.
    pub fn report_progress(&self, percent: u8, message: Option<String>) {
        let percent = percent.min(100);
        debug!(
            task_id = %self.task_id,
            request_id = %self.request_id,
            percent,
            message = message.as_deref().unwrap_or(""),
            "task progress"
        );
        if let Some(hook) = &self.progress_hook {
            hook(ProgressUpdate {
                task_id: self.task_id.clone(),
                request_id: self.request_id.clone(),
                percent,
                message,
            });
        }
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("task_id", &self.task_id)
            .field("request_id", &self.request_id)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
