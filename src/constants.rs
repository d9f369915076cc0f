//! Crate-wide constants

/// Thread pool limits and defaults
pub mod thread_pool {
    /// Upper bound accepted by `ThreadPoolConfig::validate`
    pub const MAX_WORKER_COUNT: usize = 256;

    /// Prefix for worker thread names, suffixed with the worker index
    pub const DEFAULT_THREAD_NAME_PREFIX: &str = "hearth-worker";
}

/// Broad phase defaults
pub mod broad_phase {
    /// Initial AABB capacity reserved by `SweepAndPrune::new`
    pub const DEFAULT_AABB_CAPACITY: usize = 1024;
}
