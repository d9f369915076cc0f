//! Thread Pool Data
//!
//! Plain data for the worker pool: the task type, worker lifecycle states,
//! configuration and the pool layout itself. Behaviour lives in
//! thread_pool_operations.rs and worker.rs.

use super::latch::Latch;
use super::task_queue::TaskQueue;
use super::worker::Worker;
use crate::constants::thread_pool::DEFAULT_THREAD_NAME_PREFIX;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Zero-argument unit of work, consumed exactly once by whichever worker
/// dequeues it
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Worker lifecycle
///
/// `Uninitialized -> Running -> Stopped`. `Stopped` is terminal; the thread
/// exits once its non-blocking drain finds the queue empty.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninitialized = 0,
    /// Dequeuing in blocking mode
    Running = 1,
    /// Dequeuing in non-blocking mode until the queue is empty
    Stopped = 2,
}

impl WorkerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::Running,
            2 => WorkerState::Stopped,
            _ => WorkerState::Uninitialized,
        }
    }
}

/// Thread pool errors
#[derive(Debug, thiserror::Error)]
pub enum ThreadPoolError {
    #[error("task queue closed")]
    QueueClosed,
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(usize),
}

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolConfig {
    /// Number of worker threads, hardware concurrency by default
    pub worker_count: usize,

    /// Worker threads are named `{prefix}-{index}`
    pub thread_name_prefix: String,

    /// Stack size in bytes, platform default when unset
    pub stack_size: Option<usize>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: ThreadPool::hardware_worker_count(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

/// Fixed-size worker pool sharing one task queue
///
/// Dropping the pool drains every pending task before the workers are joined.
pub struct ThreadPool {
    pub(super) queue: TaskQueue,
    pub(super) workers: Vec<Worker>,

    /// Counted down by each worker once it is `Running`
    pub(super) remaining_inits: Arc<Latch>,

    /// Tasks submitted by callers; shutdown dummies are not counted
    pub(super) tasks_posted: AtomicUsize,
}
