// ABOUTME: Task contract shared by all execution units plus the type registry
// ABOUTME: Contains the built-in echo, wait, command, and closure-adapter tasks

pub mod command;
pub mod echo;
pub mod function;
pub mod wait;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::engine::context::TaskContext;
use crate::engine::error::{Result, TaskError};

pub use command::CommandTask;
pub use echo::EchoTask;
pub use function::FnTask;
pub use wait::WaitTask;

/// A registered, named unit of executable work with a validated input
/// contract. Implementations provide `validate` and `run`; the common
/// `execute` wrapper handles the cancellation pre-check and validation.
#[async_trait]
pub trait Task: Send + Sync {
    /// Registry key for this task type.
    fn task_type(&self) -> &str;

    /// Human-readable display name.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Check raw input against this task's schema, collecting every problem
    /// found rather than stopping at the first.
    fn validate(&self, input: &serde_json::Value) -> std::result::Result<(), Vec<String>>;

    /// Execute with already-validated input. Errors are reported through the
    /// result, never propagated as faults.
    async fn run(&self, input: serde_json::Value, ctx: &TaskContext) -> Result<serde_json::Value>;

    /// Common wrapper around `run`:
    /// 1. an already-fired cancellation signal fails immediately, before
    ///    validation;
    /// 2. invalid input fails with every validation message joined;
    /// 3. otherwise `run` decides the outcome.
    async fn execute(
        &self,
        input: serde_json::Value,
        ctx: &TaskContext,
    ) -> Result<serde_json::Value> {
        if ctx.is_cancelled() {
            return Err(TaskError::cancelled("cancelled before execution"));
        }
        if let Err(problems) = self.validate(&input) {
            return Err(TaskError::validation(problems.join("; ")));
        }
        self.run(input, ctx).await
    }
}

/// Mapping from task-type name to implementation. Registering an existing
/// type replaces it, with a warning.
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in task types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EchoTask));
        registry.register(Arc::new(WaitTask));
        registry.register(Arc::new(CommandTask));
        registry
    }

    pub fn register(&mut self, task: Arc<dyn Task>) {
        let task_type = task.task_type().to_string();
        if self.tasks.insert(task_type.clone(), task).is_some() {
            warn!(task_type = %task_type, "replacing previously registered task type");
        }
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_type).cloned()
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.tasks.contains_key(task_type)
    }

    pub fn task_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.tasks.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
