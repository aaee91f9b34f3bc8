// ABOUTME: Main library module for the helmsman task execution engine
// ABOUTME: Exports the engine core and the task contract with its built-ins

pub mod engine;
pub mod tasks;

// Re-export commonly used types
pub use engine::{
    Dispatcher, ExecuteOptions, ExecutionHistory, ExecutorConfig, HistoryStats, PriorityQueue,
    ProgressHook, ProgressUpdate, QueuedTask, TaskContext, TaskDefinition, TaskExecutionResult,
    TaskExecutor, TaskPriority, TaskRecord, TaskStatus,
};
pub use engine::{Result, TaskError};
pub use tasks::{CommandTask, EchoTask, FnTask, Task, TaskRegistry, WaitTask};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
