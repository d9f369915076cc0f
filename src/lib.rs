// Hearth Broadphase - parallel collision broad phase
//
// Two layers:
// - thread_pool: fixed set of workers draining a shared task queue, with a
//   shutdown that runs every accepted task before joining
// - physics: sweep-and-prune over circle AABBs, chunked across the pool
//
// Data lives in plain structs; behavior lives in *_operations modules and
// free functions over that data.

// Constants module
pub mod constants;

pub mod error;
pub mod physics;
pub mod thread_pool;

pub use error::{EngineError, EngineResult, ErrorContext};
pub use physics::{
    Aabb, BroadPhaseObject, BroadPhaseStats, Circle, IndexPair, PairCollector, SweepAndPrune,
};
pub use thread_pool::{TaskProducer, ThreadPool, ThreadPoolConfig, ThreadPoolError};

// Re-export glam so callers build positions with the same vector type
pub use glam;
