// ABOUTME: Task execution engine module wiring
// ABOUTME: Queue, history, context, executor, and dispatcher around a shared error type

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod history;
pub mod queue;
pub mod result;

pub use context::{ProgressHook, ProgressUpdate, TaskContext};
pub use dispatcher::{Dispatcher, DispatcherStats};
pub use error::{Result, TaskError};
pub use executor::{ExecuteOptions, ExecutorConfig, TaskExecutor};
pub use history::{ExecutionHistory, HistoryStats, DEFAULT_RECENT_LIMIT};
pub use queue::{PriorityQueue, QueuedTask, TaskDefinition, TaskPriority};
pub use result::{TaskExecutionResult, TaskRecord, TaskStatus};
