/// Worker
///
/// One OS thread plus its consumer token into the shared task queue.
///
/// The thread runs in two phases. While `Running` it blocks in
/// `wait_dequeue`. A blocked worker cannot observe `stop()` until it receives
/// a task, so the pool posts no-op tasks after stopping; once the worker sees
/// `Stopped` it raises `done_blocking_processing` and switches to a
/// non-blocking drain, exiting as soon as the queue is empty.
use super::latch::Latch;
use super::task_queue::{TaskConsumer, TaskQueue};
use super::thread_pool_data::{Task, ThreadPoolConfig, ThreadPoolError, WorkerState};
use crate::error::{EngineError, EngineResult, ErrorContext};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// State shared between a `Worker` handle and its thread
struct WorkerShared {
    state: AtomicU8,
    done_blocking_processing: AtomicBool,
}

impl WorkerShared {
    fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

pub struct Worker {
    index: usize,
    thread: Option<JoinHandle<()>>,

    /// Moved into the thread by `start`
    consumer: Option<TaskConsumer>,
    shared: Arc<WorkerShared>,
}

impl Worker {
    pub fn new(queue: &TaskQueue, index: usize) -> Self {
        Self {
            index,
            thread: None,
            consumer: Some(queue.consumer()),
            shared: Arc::new(WorkerShared {
                state: AtomicU8::new(WorkerState::Uninitialized as u8),
                done_blocking_processing: AtomicBool::new(false),
            }),
        }
    }

    /// Spawn the worker thread. `init_latch` is counted down once the thread
    /// has entered `Running`.
    pub fn start(&mut self, init_latch: Arc<Latch>, config: &ThreadPoolConfig) -> EngineResult<()> {
        debug_assert_eq!(self.state(), WorkerState::Uninitialized);

        let consumer = match self.consumer.take() {
            Some(consumer) => consumer,
            None => {
                return Err(EngineError::Internal {
                    message: format!("worker {} started twice", self.index),
                })
            }
        };

        let shared = Arc::clone(&self.shared);
        let index = self.index;

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, index));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || run_worker(index, &shared, &consumer, &init_latch))
            .with_context(|| format!("spawning worker {}", index))?;

        self.thread = Some(handle);
        Ok(())
    }

    /// Flip to `Stopped`. Does not wake a thread blocked in `wait_dequeue`.
    pub fn stop(&self) {
        debug_assert_eq!(self.state(), WorkerState::Running);
        self.shared.set_state(WorkerState::Stopped);
    }

    /// Wait for the thread to return. Only valid after `stop`.
    pub fn join(&mut self) -> EngineResult<()> {
        debug_assert!(self.thread.is_some(), "worker {} is not joinable", self.index);
        debug_assert_eq!(self.state(), WorkerState::Stopped);

        match self.thread.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ThreadPoolError::WorkerPanicked(self.index).into()),
            None => Ok(()),
        }
    }

    pub fn is_done_blocking_processing(&self) -> bool {
        self.shared.done_blocking_processing.load(Ordering::Acquire)
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

fn run_worker(index: usize, shared: &WorkerShared, consumer: &TaskConsumer, init_latch: &Latch) {
    shared.set_state(WorkerState::Running);
    init_latch.count_down();
    log::debug!("[Worker::run] Worker {} running", index);

    while shared.state() == WorkerState::Running {
        match consumer.wait_dequeue() {
            Some(task) => run_task(index, task),
            None => break,
        }
    }

    debug_assert_eq!(shared.state(), WorkerState::Stopped);
    shared.done_blocking_processing.store(true, Ordering::Release);

    let mut drained = 0usize;
    while shared.state() == WorkerState::Stopped {
        match consumer.try_dequeue() {
            Some(task) => {
                run_task(index, task);
                drained += 1;
            }
            None => break,
        }
    }

    log::debug!(
        "[Worker::run] Worker {} exiting after draining {} tasks",
        index,
        drained
    );
}

/// Panics stay contained to the task; the worker keeps its lifecycle.
fn run_task(index: usize, task: Task) {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
        log::error!("[Worker::run] Task panicked on worker {}", index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_worker(queue: &TaskQueue) -> (Worker, Arc<Latch>) {
        let mut worker = Worker::new(queue, 0);
        let latch = Arc::new(Latch::new(1));
        worker
            .start(Arc::clone(&latch), &ThreadPoolConfig::default())
            .expect("Failed to start worker");
        (worker, latch)
    }

    #[test]
    fn test_new_worker_is_uninitialized() {
        let queue = TaskQueue::new();
        let worker = Worker::new(&queue, 7);
        assert_eq!(worker.state(), WorkerState::Uninitialized);
        assert_eq!(worker.index(), 7);
        assert!(!worker.is_done_blocking_processing());
    }

    #[test]
    fn test_worker_lifecycle() {
        let queue = TaskQueue::new();
        let (mut worker, latch) = start_worker(&queue);

        latch.wait();
        assert_eq!(worker.state(), WorkerState::Running);

        worker.stop();
        assert_eq!(worker.state(), WorkerState::Stopped);

        // Wake the blocking wait so the worker observes `Stopped`
        while !worker.is_done_blocking_processing() {
            assert!(queue.enqueue(Box::new(|| {})));
            thread::yield_now();
        }

        worker.join().expect("Failed to join worker");
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[test]
    fn test_worker_survives_panicking_task() {
        let queue = TaskQueue::new();
        let (mut worker, latch) = start_worker(&queue);
        latch.wait();

        let ran_after = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran_after);
        assert!(queue.enqueue(Box::new(|| panic!("task failure"))));
        assert!(queue.enqueue(Box::new(move || flag.store(true, Ordering::Release))));

        worker.stop();
        while !worker.is_done_blocking_processing() {
            assert!(queue.enqueue(Box::new(|| {})));
            thread::yield_now();
        }
        worker.join().expect("Worker should not propagate task panics");

        assert!(ran_after.load(Ordering::Acquire));
    }
}
