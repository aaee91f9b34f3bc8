// ABOUTME: Error types for task execution core operations
// ABOUTME: Defines the failure taxonomy for lookup, validation, execution, timeout, and cancellation

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Unknown task type: {task_type}")]
    UnknownTaskType { task_type: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Task execution failed: {message}")]
    Execution { message: String },

    #[error("Timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("Cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation {
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        TaskError::Execution {
            message: message.into(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        TaskError::Cancelled {
            reason: reason.into(),
        }
    }

    /// Whether this error is a cooperative cancellation rather than a task
    /// fault. Checked instead of inspecting error text.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Cancelled { .. })
    }

    /// Whether a retry could change the outcome. Cancellation is terminal and
    /// invalid input stays invalid.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskError::Execution { .. }
                | TaskError::TimedOut { .. }
                | TaskError::Io(_)
                | TaskError::Join(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_a_distinct_kind() {
        // An execution error that merely mentions cancellation must not be
        // classified as cancelled.
        let err = TaskError::execution("upstream said: cancelled");
        assert!(!err.is_cancellation());
        assert!(err.is_retryable());

        let err = TaskError::cancelled("requested by caller");
        assert!(err.is_cancellation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = TaskError::validation("missing field");
        assert!(!err.is_retryable());
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_error_messages() {
        let err = TaskError::UnknownTaskType {
            task_type: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown task type: nope");

        let err = TaskError::TimedOut {
            timeout: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5s"));
    }
}
