//! Thread Pool Operations
//!
//! Startup, submission and the drain-then-join shutdown sequence for
//! `ThreadPool`, plus configuration loading.

use super::latch::Latch;
use super::task_queue::{TaskProducer, TaskQueue};
use super::thread_pool_data::{Task, ThreadPool, ThreadPoolConfig, ThreadPoolError};
use super::worker::Worker;
use crate::constants::thread_pool::MAX_WORKER_COUNT;
use crate::error::{EngineError, EngineResult};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

// ============================================================================
// CONFIGURATION
// ============================================================================

impl ThreadPoolConfig {
    /// Default configuration with an explicit worker count
    pub fn with_worker_count(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> EngineResult<()> {
        if self.worker_count == 0 {
            return Err(ThreadPoolError::InvalidWorkerCount(self.worker_count).into());
        }

        if self.worker_count > MAX_WORKER_COUNT {
            return Err(EngineError::InvalidConfig {
                field: "worker_count".to_string(),
                value: self.worker_count.to_string(),
                reason: format!("exceeds maximum of {}", MAX_WORKER_COUNT),
            });
        }

        if self.thread_name_prefix.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "thread_name_prefix".to_string(),
                value: String::new(),
                reason: "cannot be empty".to_string(),
            });
        }

        if self.stack_size == Some(0) {
            return Err(EngineError::InvalidConfig {
                field: "stack_size".to_string(),
                value: "0".to_string(),
                reason: "stack size must be positive when set".to_string(),
            });
        }

        Ok(())
    }

    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| EngineError::ParseError {
            value: e.to_string(),
            expected_type: "ThreadPoolConfig".to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

impl ThreadPool {
    /// Create a pool with `worker_count` threads.
    ///
    /// Panics if the count is invalid or a thread cannot be spawned; use
    /// `with_config` to handle those cases.
    pub fn new(worker_count: usize) -> Self {
        match Self::with_config(&ThreadPoolConfig::with_worker_count(worker_count)) {
            Ok(pool) => pool,
            Err(e) => {
                log::error!("[ThreadPool::new] Failed to create thread pool: {}", e);
                panic!("Failed to create thread pool: {}", e);
            }
        }
    }

    /// Create a pool from a validated configuration.
    ///
    /// All workers are constructed before any is started, so no thread body
    /// observes a partially built worker.
    pub fn with_config(config: &ThreadPoolConfig) -> EngineResult<Self> {
        config.validate()?;

        let worker_count = config.worker_count;
        let queue = TaskQueue::new();
        let workers = (0..worker_count)
            .map(|index| Worker::new(&queue, index))
            .collect();

        let mut pool = Self {
            queue,
            workers,
            remaining_inits: Arc::new(Latch::new(worker_count)),
            tasks_posted: Default::default(),
        };

        for index in 0..worker_count {
            let init_latch = Arc::clone(&pool.remaining_inits);
            if let Err(e) = pool.workers[index].start(init_latch, config) {
                log::error!(
                    "[ThreadPool::with_config] Failed to start worker {}: {}",
                    index,
                    e
                );

                // Unstarted workers never count down; drop shuts down the rest
                pool.remaining_inits.count_down_by(worker_count - index);
                pool.workers.truncate(index);
                return Err(e);
            }
        }

        log::info!(
            "[ThreadPool::with_config] Started {} workers ({})",
            worker_count,
            config.thread_name_prefix
        );

        Ok(pool)
    }

    /// Submit a task. Safe to call concurrently from any thread.
    ///
    /// Tasks running on the pool cannot borrow the pool; they submit follow-up
    /// work through a `producer()` handle instead.
    pub fn post<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_task(Box::new(f));
    }

    /// Submit a task that borrows data living outside the pool.
    ///
    /// # Safety
    ///
    /// The caller must not let anything `f` borrows go out of scope before
    /// `f` has finished running. The broad phase guarantees this by counting
    /// a latch down from a drop guard inside `f` and waiting on that latch
    /// from a drop guard of its own.
    pub(crate) unsafe fn post_scoped<'scope, F>(&self, f: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        let task: Box<dyn FnOnce() + Send + 'scope> = Box::new(f);
        let task: Task = std::mem::transmute::<
            Box<dyn FnOnce() + Send + 'scope>,
            Box<dyn FnOnce() + Send + 'static>,
        >(task);
        self.post_task(task);
    }

    fn post_task(&self, task: Task) {
        let enqueued = self.queue.enqueue(task);
        assert!(enqueued, "[ThreadPool::post] Failed to enqueue task");
        self.tasks_posted.fetch_add(1, Ordering::Relaxed);
    }

    /// Producer handle for submitting from inside running tasks
    pub fn producer(&self) -> TaskProducer {
        self.queue.producer()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of tasks submitted so far, shutdown dummies excluded
    pub fn tasks_posted(&self) -> usize {
        self.tasks_posted.load(Ordering::Relaxed)
    }

    /// Hardware concurrency, at least one
    pub fn hardware_worker_count() -> usize {
        num_cpus::get().max(1)
    }

    fn are_all_workers_done_blocking_processing(&self) -> bool {
        self.workers
            .iter()
            .all(|worker| worker.is_done_blocking_processing())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Every worker must be `Running` and dequeuing before it can be stopped
        self.remaining_inits.wait();

        for worker in &self.workers {
            worker.stop();
        }

        // Each dummy wakes at most one blocked worker; a dummy may also be
        // taken by a worker already draining, so keep posting until all report
        let mut dummy_tasks = 0usize;
        while !self.are_all_workers_done_blocking_processing() {
            let enqueued = self.queue.enqueue(Box::new(|| {}));
            assert!(enqueued, "[ThreadPool::drop] Failed to enqueue dummy task");
            dummy_tasks += 1;
            thread::yield_now();
        }

        for worker in &mut self.workers {
            if let Err(e) = worker.join() {
                log::error!("[ThreadPool::drop] {}", e);
            }
        }

        // Producers may have posted after the last worker drained
        self.queue.close();
        let consumer = self.queue.consumer();
        let mut leftover_tasks = 0usize;
        while let Some(task) = consumer.try_dequeue() {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                log::error!("[ThreadPool::drop] Leftover task panicked");
            }
            leftover_tasks += 1;
        }

        log::info!(
            "[ThreadPool::drop] Joined {} workers after {} dummy tasks, {} leftover tasks",
            self.workers.len(),
            dummy_tasks,
            leftover_tasks
        );
    }
}

static_assertions::assert_impl_all!(ThreadPool: Send, Sync);
static_assertions::assert_impl_all!(TaskProducer: Send, Sync, Clone);
