// ABOUTME: Wait task sleeping a configured duration while racing the cancellation signal
// ABOUTME: Exercises the cooperative cancellation path end to end

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::Task;
use crate::engine::context::TaskContext;
use crate::engine::error::{Result, TaskError};

#[derive(Debug, Deserialize)]
struct WaitInput {
    duration_ms: u64,
}

pub struct WaitTask;

#[async_trait]
impl Task for WaitTask {
    fn task_type(&self) -> &str {
        "wait"
    }

    fn name(&self) -> &str {
        "Wait"
    }

    fn description(&self) -> &str {
        "Sleeps for duration_ms milliseconds, observing cancellation"
    }

    fn validate(&self, input: &serde_json::Value) -> std::result::Result<(), Vec<String>> {
        let mut problems = Vec::new();
        if !input.is_object() {
            problems.push("input must be a JSON object".to_string());
        } else if input.get("duration_ms").and_then(|v| v.as_u64()).is_none() {
            problems.push("duration_ms must be a non-negative integer".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    async fn run(&self, input: serde_json::Value, ctx: &TaskContext) -> Result<serde_json::Value> {
        let config: WaitInput =
            serde_json::from_value(input).map_err(|e| TaskError::validation(e.to_string()))?;
        let duration = Duration::from_millis(config.duration_ms);

        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                ctx.report_progress(100, None);
                Ok(json!({ "waited_ms": config.duration_ms }))
            }
            _ = ctx.cancellation.cancelled() => {
                Err(TaskError::cancelled("cancelled during wait"))
            }
        }
    }
}
