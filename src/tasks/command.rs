// ABOUTME: Command task running a subprocess with captured output
// ABOUTME: Races the cancellation signal against the child and kills it on cancel

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::Task;
use crate::engine::context::TaskContext;
use crate::engine::error::{Result, TaskError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInput {
    /// Program to execute.
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    /// Exit codes treated as success.
    #[serde(default = "default_expected_exit_codes")]
    pub expected_exit_codes: Vec<i32>,
}

fn default_expected_exit_codes() -> Vec<i32> {
    vec![0]
}

pub struct CommandTask;

#[async_trait]
impl Task for CommandTask {
    fn task_type(&self) -> &str {
        "command"
    }

    fn name(&self) -> &str {
        "Command"
    }

    fn description(&self) -> &str {
        "Runs a subprocess and captures its output"
    }

    fn validate(&self, input: &serde_json::Value) -> std::result::Result<(), Vec<String>> {
        let config: CommandInput = match serde_json::from_value(input.clone()) {
            Ok(config) => config,
            Err(e) => return Err(vec![e.to_string()]),
        };
        if config.command.trim().is_empty() {
            return Err(vec!["command must not be empty".to_string()]);
        }
        Ok(())
    }

    async fn run(&self, input: serde_json::Value, ctx: &TaskContext) -> Result<serde_json::Value> {
        let config: CommandInput =
            serde_json::from_value(input).map_err(|e| TaskError::validation(e.to_string()))?;

        debug!(task_id = %ctx.task_id, command = %config.command, "spawning command");

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the child mid-wait (cancellation branch) kills it.
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            TaskError::execution(format!("failed to spawn {}: {}", config.command, e))
        })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            _ = ctx.cancellation.cancelled() => {
                return Err(TaskError::cancelled("cancelled while command was running"));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if !config.expected_exit_codes.contains(&exit_code) {
            return Err(TaskError::execution(format!(
                "command exited with status {exit_code}: {}",
                stderr.trim()
            )));
        }

        Ok(json!({
            "exit_code": exit_code,
            "stdout": stdout,
            "stderr": stderr,
        }))
    }
}
