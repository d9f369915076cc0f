//! Error handling for the broad-phase crate
//!
//! Recoverable failures (configuration loading, posting through a detached
//! producer, joining a panicked worker) surface as `EngineError`. Programming
//! errors such as calling `Worker::stop` twice stay assertions.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for the crate
#[derive(Debug)]
pub enum EngineError {
    // Threading Errors
    ChannelClosed {
        name: String,
    },
    TaskJoinError {
        task: String,
    },

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    ParseError {
        value: String,
        expected_type: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ChannelClosed { name } => write!(f, "Channel closed: {}", name),
            EngineError::TaskJoinError { task } => write!(f, "Task join error: {}", task),

            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::ParseError {
                value,
                expected_type,
            } => write!(
                f,
                "Parse error: '{}' is not a valid {}",
                value, expected_type
            ),

            EngineError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for EngineError {}

/// Type alias for Results in this crate
pub type EngineResult<T> = Result<T, EngineError>;

impl From<crate::thread_pool::ThreadPoolError> for EngineError {
    fn from(err: crate::thread_pool::ThreadPoolError) -> Self {
        use crate::thread_pool::ThreadPoolError;
        match err {
            ThreadPoolError::QueueClosed => EngineError::ChannelClosed {
                name: "task_queue".to_string(),
            },
            ThreadPoolError::WorkerPanicked(index) => EngineError::TaskJoinError {
                task: format!("worker {}", index),
            },
            ThreadPoolError::InvalidWorkerCount(count) => EngineError::InvalidConfig {
                field: "worker_count".to_string(),
                value: count.to_string(),
                reason: "worker count must be at least 1".to_string(),
            },
        }
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> EngineResult<T>;
    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn context(self, msg: &str) -> EngineResult<T> {
        self.map_err(|e| EngineError::Internal {
            message: format!("{}: {}", msg, e),
        })
    }

    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::Internal {
            message: format!("{}: {}", f(), e),
        })
    }
}
