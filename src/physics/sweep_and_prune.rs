/// Parallel Sweep-and-Prune Broad Phase
///
/// Boxes are kept sorted by `min_x`. For each box the scan walks forward
/// until the first box whose `min_x` exceeds the current `max_x`; nothing
/// after it can overlap on x. Surviving candidates are then tested on y.
///
/// The outer loop is split into contiguous chunks run on the pool. A chunk's
/// inner scan may read past the chunk's end, since the early exit depends on
/// the global sort order, so every chunking reports the same pairs as the
/// sequential scan.
use super::aabb::{aabb_from_circle, aabb_intersects, aabb_overlaps_y, Aabb};
use super::collision_data::{BroadPhaseStats, IndexPair, PairCollector};
use crate::constants::broad_phase::DEFAULT_AABB_CAPACITY;
use crate::thread_pool::latch::{CountDownGuard, Latch, WaitGuard};
use crate::thread_pool::ThreadPool;
use glam::Vec2;
use std::cmp::Ordering as CmpOrdering;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Anything with a circular footprint the broad phase can bound
pub trait BroadPhaseObject {
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Plain circle value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub position: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }
}

impl BroadPhaseObject for Circle {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

impl BroadPhaseObject for (Vec2, f32) {
    fn position(&self) -> Vec2 {
        self.0
    }

    fn radius(&self) -> f32 {
        self.1
    }
}

/// Sorted AABB array, rebuilt every frame
pub struct SweepAndPrune {
    aabbs: Vec<Aabb>,

    /// Widest box on the sweep axis, bounds how far back a radius query looks
    max_width: f32,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_AABB_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            aabbs: Vec::with_capacity(capacity),
            max_width: 0.0,
        }
    }

    /// Rebuild the boxes from the current object set and sort them by `min_x`.
    /// Must run before every query; the allocation is reused across frames.
    pub fn populate<T: BroadPhaseObject>(&mut self, objects: &[T]) {
        self.aabbs.clear();
        self.aabbs.extend(objects.iter().enumerate().map(|(index, object)| {
            aabb_from_circle(object.position(), object.radius(), index)
        }));
        self.aabbs.sort_unstable_by(|a, b| a.min_x.total_cmp(&b.min_x));
        self.max_width = self
            .aabbs
            .iter()
            .map(|a| a.max_x - a.min_x)
            .fold(0.0, f32::max);
    }

    pub fn clear(&mut self) {
        self.aabbs.clear();
        self.max_width = 0.0;
    }

    pub fn len(&self) -> usize {
        self.aabbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aabbs.is_empty()
    }

    /// Boxes in sweep order
    pub fn aabbs(&self) -> &[Aabb] {
        &self.aabbs
    }

    /// Call `func(i, j)` with `i < j` exactly once for every pair of objects
    /// whose boxes overlap on both axes.
    ///
    /// With `n_workers > 1`, `func` runs concurrently on the calling thread and
    /// on pool workers, in no particular order. With `n_workers <= 1` the pool
    /// is not touched. Must not be called from a task running on `pool` when
    /// every worker could end up waiting the same way.
    pub fn for_each_unique_index_pair<F>(&self, n_workers: usize, pool: &ThreadPool, func: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        self.for_each_unique_index_pair_with_stats(n_workers, pool, func);
    }

    /// Same as `for_each_unique_index_pair`, returning query statistics
    pub fn for_each_unique_index_pair_with_stats<F>(
        &self,
        n_workers: usize,
        pool: &ThreadPool,
        func: F,
    ) -> BroadPhaseStats
    where
        F: Fn(usize, usize) + Sync,
    {
        debug_assert!(
            self.is_sorted_by_min_x(),
            "[SweepAndPrune] Queried without populate"
        );

        let started = Instant::now();
        let n = self.aabbs.len();
        let mut stats = BroadPhaseStats {
            object_count: n,
            ..Default::default()
        };

        if n < 2 {
            return stats;
        }

        if n_workers <= 1 {
            let (pairs, candidates) = process_chunk(&self.aabbs, 0, n, &func);
            stats.pair_count = pairs;
            stats.candidates_tested = candidates;
        } else {
            let chunk_size = n.div_ceil(n_workers);
            let latch = Latch::new(n_workers - 1);
            let pair_count = AtomicUsize::new(0);
            let candidate_count = AtomicUsize::new(0);

            {
                // Borrowed data must outlive every posted chunk, panics included
                let _wait = WaitGuard { latch: &latch };

                let aabbs = self.aabbs.as_slice();
                let func = &func;
                let latch = &latch;
                let pair_count = &pair_count;
                let candidate_count = &candidate_count;

                for k in 1..n_workers {
                    let start = k * chunk_size;
                    if start >= n {
                        // No later chunk has work either
                        latch.count_down_by(n_workers - k);
                        break;
                    }
                    let end = (start + chunk_size).min(n);

                    let chunk = move || {
                        let _done = CountDownGuard { latch };
                        let (pairs, candidates) = process_chunk(aabbs, start, end, func);
                        pair_count.fetch_add(pairs, Ordering::Relaxed);
                        candidate_count.fetch_add(candidates, Ordering::Relaxed);
                    };

                    // SAFETY: `_wait` blocks this scope until the chunk's
                    // `CountDownGuard` has dropped, after its last borrow.
                    unsafe { pool.post_scoped(chunk) };
                    stats.chunks_posted += 1;
                }

                let (pairs, candidates) = process_chunk(aabbs, 0, chunk_size.min(n), func);
                pair_count.fetch_add(pairs, Ordering::Relaxed);
                candidate_count.fetch_add(candidates, Ordering::Relaxed);
            }

            stats.pair_count = pair_count.into_inner();
            stats.candidates_tested = candidate_count.into_inner();
        }

        stats.elapsed_us = started.elapsed().as_micros() as u64;
        log::trace!(
            "[SweepAndPrune] {} objects, {} pairs, {} candidates, {} chunks posted, {}us",
            stats.object_count,
            stats.pair_count,
            stats.candidates_tested,
            stats.chunks_posted,
            stats.elapsed_us
        );

        stats
    }

    /// Call `func(index)` for every object whose box overlaps the box around
    /// the query circle, in sweep order, on the calling thread. Stops at the
    /// first `ControlFlow::Break` and returns it.
    pub fn for_each_index_in_radius<F>(
        &self,
        center: Vec2,
        radius: f32,
        mut func: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(usize) -> ControlFlow<()>,
    {
        let query = aabb_from_circle(center, radius, usize::MAX);

        // A box reaching the query has min_x >= query.min_x - max_width
        let first = self
            .aabbs
            .partition_point(|a| a.min_x < query.min_x - self.max_width);
        let last = self.aabbs.partition_point(|a| a.min_x <= query.max_x);

        for aabb in self.aabbs.get(first..last).unwrap_or_default() {
            if aabb_intersects(aabb, &query) && func(aabb.obj_idx).is_break() {
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    /// Gather every overlapping pair, sorted ascending
    pub fn collect_unique_index_pairs(
        &self,
        n_workers: usize,
        pool: &ThreadPool,
    ) -> Vec<IndexPair> {
        let collector = PairCollector::with_capacity(self.aabbs.len());
        self.for_each_unique_index_pair(n_workers, pool, |i, j| collector.push(i, j));
        collector.into_sorted()
    }

    fn is_sorted_by_min_x(&self) -> bool {
        self.aabbs
            .windows(2)
            .all(|w| w[0].min_x.total_cmp(&w[1].min_x) != CmpOrdering::Greater)
    }
}

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan sorted positions `[start, end)`; returns (pairs reported, candidates tested)
fn process_chunk<F>(aabbs: &[Aabb], start: usize, end: usize, func: &F) -> (usize, usize)
where
    F: Fn(usize, usize),
{
    let mut pairs = 0;
    let mut candidates = 0;

    for i in start..end {
        let a = &aabbs[i];

        for b in &aabbs[i + 1..] {
            if b.min_x > a.max_x {
                break;
            }

            candidates += 1;
            if aabb_overlaps_y(a, b) {
                func(a.obj_idx.min(b.obj_idx), a.obj_idx.max(b.obj_idx));
                pairs += 1;
            }
        }
    }

    (pairs, candidates)
}
