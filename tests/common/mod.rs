// ABOUTME: Shared test tasks and executor builders for integration tests
// ABOUTME: Provides counting, flaky, hanging, and input-rejecting task implementations

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use helmsman::{
    ExecutorConfig, Task, TaskContext, TaskError, TaskExecutor, TaskRegistry,
};

/// Executor with built-in tasks and the given backoff base.
pub fn test_executor_with_backoff(backoff_base: Duration) -> TaskExecutor {
    let config = ExecutorConfig {
        backoff_base,
        ..ExecutorConfig::default()
    };
    TaskExecutor::with_registry(config, TaskRegistry::with_builtins())
}

/// Executor with built-in tasks and a millisecond backoff base so retry tests
/// stay fast.
pub fn test_executor() -> TaskExecutor {
    test_executor_with_backoff(Duration::from_millis(1))
}

/// Fails every attempt before `succeed_on` (1-indexed), then succeeds.
/// `succeed_on = u32::MAX` never succeeds.
pub struct FlakyTask {
    succeed_on: u32,
    calls: Arc<AtomicU32>,
}

impl FlakyTask {
    pub fn new(succeed_on: u32) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                succeed_on,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Task for FlakyTask {
    fn task_type(&self) -> &str {
        "flaky"
    }

    fn name(&self) -> &str {
        "Flaky"
    }

    fn validate(&self, _input: &serde_json::Value) -> Result<(), Vec<String>> {
        Ok(())
    }

    async fn run(
        &self,
        _input: serde_json::Value,
        _ctx: &TaskContext,
    ) -> helmsman::Result<serde_json::Value> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt >= self.succeed_on {
            Ok(json!({ "attempt": attempt }))
        } else {
            Err(TaskError::execution(format!("attempt {attempt} failed")))
        }
    }
}

/// Blocks until the cancellation signal fires, then reports cancellation.
pub struct HangingTask;

#[async_trait]
impl Task for HangingTask {
    fn task_type(&self) -> &str {
        "hang"
    }

    fn name(&self) -> &str {
        "Hanging"
    }

    fn validate(&self, _input: &serde_json::Value) -> Result<(), Vec<String>> {
        Ok(())
    }

    async fn run(
        &self,
        _input: serde_json::Value,
        ctx: &TaskContext,
    ) -> helmsman::Result<serde_json::Value> {
        ctx.cancellation.cancelled().await;
        Err(TaskError::cancelled("cancelled while hanging"))
    }
}

/// Rejects every input at validation time; counts how often `run` is reached.
pub struct RejectAllTask {
    runs: Arc<AtomicU32>,
}

impl RejectAllTask {
    pub fn new() -> (Self, Arc<AtomicU32>) {
        let runs = Arc::new(AtomicU32::new(0));
        (
            Self {
                runs: Arc::clone(&runs),
            },
            runs,
        )
    }
}

#[async_trait]
impl Task for RejectAllTask {
    fn task_type(&self) -> &str {
        "reject"
    }

    fn name(&self) -> &str {
        "RejectAll"
    }

    fn validate(&self, _input: &serde_json::Value) -> Result<(), Vec<String>> {
        Err(vec!["input rejected".to_string()])
    }

    async fn run(
        &self,
        _input: serde_json::Value,
        _ctx: &TaskContext,
    ) -> helmsman::Result<serde_json::Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    }
}
