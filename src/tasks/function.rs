// ABOUTME: Adapter turning a plain async closure into a registrable Task
// ABOUTME: Lets callers register one-off task types without a dedicated struct

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

use super::Task;
use crate::engine::context::TaskContext;
use crate::engine::error::Result;

type Handler =
    Arc<dyn Fn(serde_json::Value, TaskContext) -> BoxFuture<'static, Result<serde_json::Value>> + Send + Sync>;

pub struct FnTask {
    task_type: String,
    name: String,
    description: String,
    handler: Handler,
}

impl FnTask {
    pub fn new<F, Fut>(
        task_type: impl Into<String>,
        name: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(serde_json::Value, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        Self {
            task_type: task_type.into(),
            name: name.into(),
            description: String::new(),
            handler: Arc::new(move |input, ctx| handler(input, ctx).boxed()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl Task for FnTask {
    fn task_type(&self) -> &str {
        &self.task_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    // Plain functions accept any input; they validate inside `run` if needed.
    fn validate(&self, _input: &serde_json::Value) -> std::result::Result<(), Vec<String>> {
        Ok(())
    }

    async fn run(&self, input: serde_json::Value, ctx: &TaskContext) -> Result<serde_json::Value> {
        (self.handler)(input, ctx.clone()).await
    }
}
