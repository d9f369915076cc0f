//! Physics Module - broad phase collision detection
//!
//! - aabb.rs: 2D boxes and overlap tests
//! - collision_data.rs: pair and statistics types
//! - sweep_and_prune.rs: sorted sweep split across the thread pool

pub mod aabb;
pub mod collision_data;
pub mod sweep_and_prune;

pub use aabb::Aabb;
pub use collision_data::{BroadPhaseStats, IndexPair, PairCollector};
pub use sweep_and_prune::{BroadPhaseObject, Circle, SweepAndPrune};
