//! Task Queue
//!
//! Unbounded multi-producer/multi-consumer queue of `Task`s. Each worker owns a
//! `TaskConsumer` for its whole lifetime; submitters go through a
//! `TaskProducer`. Every enqueued task is delivered to exactly one dequeue
//! call. FIFO order across producers is not guaranteed.
//!
//! Producers outlive the pool, so the queue carries a `closed` flag. Posts
//! hold the read lock across the send; `close` takes the write lock, so once
//! it returns no producer can add a task and whatever is left can be drained.

use super::thread_pool_data::{Task, ThreadPoolError};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared task queue
pub struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    closed: Arc<RwLock<bool>>,
}

/// Consumer token, one per worker
pub struct TaskConsumer {
    receiver: Receiver<Task>,
}

/// Producer token, cheap to clone and safe to move into running tasks
#[derive(Clone)]
pub struct TaskProducer {
    sender: Sender<Task>,
    closed: Arc<RwLock<bool>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            closed: Arc::new(RwLock::new(false)),
        }
    }

    /// Returns false only if the queue can no longer deliver tasks
    pub fn enqueue(&self, task: Task) -> bool {
        self.sender.send(task).is_ok()
    }

    pub fn consumer(&self) -> TaskConsumer {
        TaskConsumer {
            receiver: self.receiver.clone(),
        }
    }

    pub fn producer(&self) -> TaskProducer {
        TaskProducer {
            sender: self.sender.clone(),
            closed: Arc::clone(&self.closed),
        }
    }

    /// Reject every later producer post. Waits for posts already in flight.
    pub(crate) fn close(&self) {
        *self.closed.write() = true;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// Number of tasks waiting to be dequeued
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskConsumer {
    /// Block until a task is available. `None` once every producer is gone.
    pub fn wait_dequeue(&self) -> Option<Task> {
        self.receiver.recv().ok()
    }

    /// Take a task if one is ready, without blocking
    pub fn try_dequeue(&self) -> Option<Task> {
        match self.receiver.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl TaskProducer {
    /// Submit a task. Fails once the owning pool has shut down.
    pub fn post<F>(&self, f: F) -> Result<(), ThreadPoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let closed = self.closed.read();
        if *closed {
            return Err(ThreadPoolError::QueueClosed);
        }
        self.sender
            .send(Box::new(f))
            .map_err(|_| ThreadPoolError::QueueClosed)
    }
}
