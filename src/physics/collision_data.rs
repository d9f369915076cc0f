use parking_lot::Mutex;

/// Unordered pair of object indices, stored smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexPair {
    pub a: usize,
    pub b: usize,
}

impl IndexPair {
    pub fn new(a: usize, b: usize) -> Self {
        // Always store smaller index first for consistency
        if a < b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// Thread-safe sink for pairs reported concurrently by the broad phase
#[derive(Default)]
pub struct PairCollector {
    pairs: Mutex<Vec<IndexPair>>,
}

impl PairCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, a: usize, b: usize) {
        self.pairs.lock().push(IndexPair::new(a, b));
    }

    pub fn len(&self) -> usize {
        self.pairs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.lock().is_empty()
    }

    /// Collected pairs sorted ascending, so results compare across runs
    pub fn into_sorted(self) -> Vec<IndexPair> {
        let mut pairs = self.pairs.into_inner();
        pairs.sort_unstable();
        pairs
    }
}

/// Per-query broad phase statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadPhaseStats {
    pub object_count: usize,
    pub pair_count: usize,

    /// Sweep-axis candidates that reached the y-axis test
    pub candidates_tested: usize,

    /// Chunks handed to the pool; the caller's own chunk is not counted
    pub chunks_posted: usize,
    pub elapsed_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_index_pair_orders_indices() {
        let pair = IndexPair::new(9, 2);
        assert_eq!(pair, IndexPair { a: 2, b: 9 });
        assert_eq!(pair, IndexPair::new(2, 9));
    }

    #[test]
    fn test_collector_across_threads() {
        let collector = Arc::new(PairCollector::with_capacity(64));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let collector = Arc::clone(&collector);
                thread::spawn(move || {
                    for i in 0..16 {
                        collector.push(t * 100 + i + 1, t * 100);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("collector thread panicked");
        }

        let collector = Arc::try_unwrap(collector)
            .unwrap_or_else(|_| panic!("collector still shared"));
        assert_eq!(collector.len(), 64);

        let pairs = collector.into_sorted();
        assert!(pairs.windows(2).all(|w| w[0] < w[1]));
        assert!(pairs.iter().all(|p| p.a < p.b));
    }
}
