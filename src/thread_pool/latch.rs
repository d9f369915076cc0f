//! Single-use countdown latch
//!
//! Releases every waiter once its count reaches zero. Used for worker startup
//! synchronization and for fork-join completion in the broad phase.

use parking_lot::{Condvar, Mutex};

/// Countdown latch, counted down by workers and waited on by the owner
pub struct Latch {
    count: Mutex<usize>,
    released: Condvar,
}

impl Latch {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Decrement the count by one
    pub fn count_down(&self) {
        self.count_down_by(1);
    }

    /// Decrement the count by `n`; counting below zero is a programming error
    pub fn count_down_by(&self, n: usize) {
        if n == 0 {
            return;
        }

        let mut count = self.count.lock();
        debug_assert!(*count >= n, "latch counted down past zero");
        *count = count.saturating_sub(n);

        if *count == 0 {
            self.released.notify_all();
        }
    }

    /// Block until the count reaches zero
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.released.wait(&mut count);
        }
    }

    /// Non-blocking check
    pub fn try_wait(&self) -> bool {
        *self.count.lock() == 0
    }

    pub fn count(&self) -> usize {
        *self.count.lock()
    }
}

/// Counts a latch down once when dropped, including during unwinding
pub(crate) struct CountDownGuard<'a> {
    pub(crate) latch: &'a Latch,
}

impl Drop for CountDownGuard<'_> {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}

/// Waits on a latch when dropped, including during unwinding
pub(crate) struct WaitGuard<'a> {
    pub(crate) latch: &'a Latch,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.latch.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_zero_latch_is_released() {
        let latch = Latch::new(0);
        assert!(latch.try_wait());
        latch.wait();
    }

    #[test]
    fn test_count_down_by_releases_in_bulk() {
        let latch = Latch::new(5);
        latch.count_down();
        assert_eq!(latch.count(), 4);
        latch.count_down_by(4);
        assert!(latch.try_wait());
    }

    #[test]
    fn test_wait_blocks_until_all_threads_count_down() {
        let latch = Arc::new(Latch::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || latch.count_down())
            })
            .collect();

        latch.wait();
        assert_eq!(latch.count(), 0);

        for handle in handles {
            handle.join().expect("latch thread panicked");
        }
    }

    #[test]
    fn test_guard_counts_down_on_panic() {
        let latch = Latch::new(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = CountDownGuard { latch: &latch };
            panic!("task failed");
        }));

        assert!(result.is_err());
        assert!(latch.try_wait());
    }
}
