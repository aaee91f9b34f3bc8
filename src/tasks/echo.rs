// ABOUTME: Echo task returning its validated input unchanged
// ABOUTME: The smallest useful task; doubles as the canonical registry smoke test

use async_trait::async_trait;

use super::Task;
use crate::engine::context::TaskContext;
use crate::engine::error::Result;

pub struct EchoTask;

#[async_trait]
impl Task for EchoTask {
    fn task_type(&self) -> &str {
        "echo"
    }

    fn name(&self) -> &str {
        "Echo"
    }

    fn description(&self) -> &str {
        "Returns the input payload unchanged"
    }

    fn validate(&self, input: &serde_json::Value) -> std::result::Result<(), Vec<String>> {
        if input.is_object() {
            Ok(())
        } else {
            Err(vec!["input must be a JSON object".to_string()])
        }
    }

    async fn run(&self, input: serde_json::Value, ctx: &TaskContext) -> Result<serde_json::Value> {
        ctx.report_progress(100, None);
        Ok(input)
    }
}
