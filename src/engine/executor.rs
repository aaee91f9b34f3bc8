// ABOUTME: Core executor orchestrating lookup, retries, timeout, cancellation, and recording
// ABOUTME: Every execute_task call terminates in exactly one TaskExecutionResult, never a fault

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::context::{ProgressHook, TaskContext};
use super::error::TaskError;
use super::history::{ExecutionHistory, HistoryStats, DEFAULT_RECENT_LIMIT};
use super::queue::TaskPriority;
use super::result::{TaskExecutionResult, TaskRecord};
use crate::tasks::{Task, TaskRegistry};

/// Executor configuration with documented defaults.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Advisory concurrency cap; enforced by the dispatcher, not the executor.
    pub max_concurrent: usize,
    /// Time budget spanning the whole retry sequence of one execution.
    pub default_timeout: Duration,
    pub default_retries: u32,
    pub queue_size: usize,
    pub history_size: usize,
    /// Backoff after the n-th failed attempt is `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            default_timeout: Duration::from_millis(60_000),
            default_retries: 3,
            queue_size: 100,
            history_size: 1000,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Per-call overrides for `execute_task`.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub priority: Option<TaskPriority>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

/// The core orchestrator. Owns the registry, the in-flight cancellation
/// controllers, and the execution history. A single instance may run many
/// executions concurrently; each owns its own token and timeout timer.
pub struct TaskExecutor {
    config: ExecutorConfig,
    registry: RwLock<TaskRegistry>,
    history: Arc<ExecutionHistory>,
    inflight: RwLock<HashMap<String, CancellationToken>>,
    progress_hook: Option<ProgressHook>,
}

impl TaskExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self::with_registry(config, TaskRegistry::new())
    }

    pub fn with_registry(config: ExecutorConfig, registry: TaskRegistry) -> Self {
        let history = Arc::new(ExecutionHistory::new(config.history_size));
        Self {
            config,
            registry: RwLock::new(registry),
            history,
            inflight: RwLock::new(HashMap::new()),
            progress_hook: None,
        }
    }

    /// Install an observability hook for task progress reports.
    pub fn with_progress_hook(mut self, hook: ProgressHook) -> Self {
        self.progress_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn history(&self) -> Arc<ExecutionHistory> {
        Arc::clone(&self.history)
    }

    /// Add or replace a type → task mapping. Replacement is allowed and
    /// logged by the registry.
    pub async fn register_task(&self, task: Arc<dyn Task>) {
        self.registry.write().await.register(task);
    }

    pub async fn registered_types(&self) -> Vec<String> {
        self.registry.read().await.task_types()
    }

    /// Up to `limit` most-recent records (default 50).
    pub async fn get_history(&self, limit: Option<usize>) -> Vec<TaskRecord> {
        self.history
            .get_recent(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
            .await
    }

    pub async fn stats(&self) -> HistoryStats {
        self.history.stats().await
    }

    /// Number of executions currently holding a cancellation controller.
    pub async fn active_executions(&self) -> usize {
        self.inflight.read().await.len()
    }

    /// Ids of the executions currently in flight.
    pub async fn active_task_ids(&self) -> Vec<String> {
        self.inflight.read().await.keys().cloned().collect()
    }

    /// Run one task to a final result. Never fails: unknown types, invalid
    /// input, exhausted retries, timeouts, and cancellations all come back as
    /// a recorded `TaskExecutionResult`.
    #[instrument(skip(self, params, options), fields(task_type = %task_type))]
    pub async fn execute_task(
        &self,
        task_type: &str,
        params: serde_json::Value,
        options: ExecuteOptions,
    ) -> TaskExecutionResult {
        let task_id = uuid::Uuid::new_v4().to_string();
        let request_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();

        let task = self.registry.read().await.get(task_type);
        let Some(task) = task else {
            warn!(task_type, "unknown task type");
            let mut result = TaskExecutionResult::failed(
                task_id,
                format!("Unknown task type: {task_type}"),
                started_at,
                0,
            );
            Self::stamp_priority(&mut result, options.priority);
            self.history.add(result.clone()).await;
            return result;
        };

        let timeout = options.timeout.unwrap_or(self.config.default_timeout);
        let max_retries = options.retries.unwrap_or(self.config.default_retries);

        let token = CancellationToken::new();
        self.inflight
            .write()
            .await
            .insert(task_id.clone(), token.clone());

        // One timer spans the whole retry sequence. Firing it trips the same
        // token as cancel_task, so tasks cannot tell the two apart.
        let timer_token = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            timer_token.cancel();
        });

        info!(task_id = %task_id, max_retries, ?timeout, "starting task execution");

        let mut result = self
            .run_attempts(
                task,
                &task_id,
                &request_id,
                params,
                &token,
                max_retries,
                started_at,
            )
            .await;
        Self::stamp_priority(&mut result, options.priority);

        timer.abort();
        self.inflight.write().await.remove(&task_id);
        self.history.add(result.clone()).await;

        info!(
            task_id = %result.task_id,
            status = %result.status,
            retry_count = result.retry_count,
            duration_ms = result.duration_ms,
            "task execution finished"
        );
        result
    }

    /// Attempt loop: sequential attempts, exponential backoff between them,
    /// every backoff racing the cancellation token.
    #[allow(clippy::too_many_arguments)]
    async fn run_attempts(
        &self,
        task: Arc<dyn Task>,
        task_id: &str,
        request_id: &str,
        params: serde_json::Value,
        token: &CancellationToken,
        max_retries: u32,
        started_at: chrono::DateTime<Utc>,
    ) -> TaskExecutionResult {
        let mut retry_count: u32 = 0;

        loop {
            let mut ctx = TaskContext::new(task_id, request_id, token.clone());
            if let Some(hook) = &self.progress_hook {
                ctx = ctx.with_progress_hook(Arc::clone(hook));
            }

            debug!(task_id, attempt = retry_count + 1, "executing attempt");

            match task.execute(params.clone(), &ctx).await {
                Ok(output) => {
                    return TaskExecutionResult::completed(
                        task_id.to_string(),
                        Some(output),
                        started_at,
                        retry_count,
                    );
                }
                Err(err) if err.is_cancellation() => {
                    // Explicit cancel_task or the execution-wide timer.
                    return TaskExecutionResult::cancelled(
                        task_id.to_string(),
                        err.to_string(),
                        started_at,
                        retry_count,
                    );
                }
                Err(err @ TaskError::Validation { .. }) => {
                    // Invalid input stays invalid; never retried.
                    return TaskExecutionResult::failed(
                        task_id.to_string(),
                        err.to_string(),
                        started_at,
                        retry_count,
                    );
                }
                Err(err) => {
                    warn!(
                        task_id,
                        attempt = retry_count + 1,
                        error = %err,
                        "task attempt failed"
                    );
                    if retry_count >= max_retries {
                        return TaskExecutionResult::failed(
                            task_id.to_string(),
                            err.to_string(),
                            started_at,
                            retry_count,
                        );
                    }

                    retry_count += 1;
                    let delay = self.backoff_delay(retry_count);
                    debug!(task_id, retry_count, ?delay, "backing off before retry");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = token.cancelled() => {
                            return TaskExecutionResult::cancelled(
                                task_id.to_string(),
                                "Cancelled: cancelled during retry backoff".to_string(),
                                started_at,
                                retry_count,
                            );
                        }
                    }
                }
            }
        }
    }

    /// The requested priority has no effect once an execution is running, but
    /// it is carried into the result's metadata so callers can see it.
    fn stamp_priority(result: &mut TaskExecutionResult, priority: Option<TaskPriority>) {
        if let Some(priority) = priority {
            result
                .metadata
                .insert("priority".to_string(), priority.to_string());
        }
    }

    /// `backoff_base * 2^retry_count`, the count already incremented for the
    /// upcoming attempt. Saturates instead of overflowing.
    fn backoff_delay(&self, retry_count: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(retry_count.min(16)))
    }

    /// Trip the cancellation signal of an in-flight execution. Idempotent:
    /// unknown or already-finished ids return false, never an error.
    pub async fn cancel_task(&self, task_id: &str) -> bool {
        match self.inflight.write().await.remove(task_id) {
            Some(token) => {
                token.cancel();
                info!(task_id, "cancellation requested");
                true
            }
            None => false,
        }
    }
}
