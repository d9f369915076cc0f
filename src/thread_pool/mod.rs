/// Thread Pool Module
///
/// Fixed-size worker pool over a shared MPMC task queue.
/// - thread_pool_data.rs: task type, worker states, configuration, pool layout
/// - thread_pool_operations.rs: startup, submission, drain-then-join shutdown
/// - worker.rs: per-thread two-phase dequeue loop
/// - task_queue.rs: queue with consumer/producer tokens
/// - latch.rs: countdown latch for startup and fork-join completion

pub mod latch;
pub mod task_queue;
pub mod thread_pool_data;
pub mod thread_pool_operations;
pub mod worker;

pub use latch::Latch;
pub use task_queue::{TaskConsumer, TaskProducer, TaskQueue};
pub use thread_pool_data::{Task, ThreadPool, ThreadPoolConfig, ThreadPoolError, WorkerState};
pub use worker::Worker;
