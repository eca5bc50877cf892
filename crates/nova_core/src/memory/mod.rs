//! # Memory Management
//!
//! Slot pools for objects that are created and destroyed every few frames.
//!
//! ## Design Philosophy
//!
//! Storage is reserved once per level. During gameplay:
//! - Freed slots go back on a free list
//! - New objects take a freed slot before the store grows
//! - Indices never move

mod pool;

pub use pool::{PoolHandle, PoolStats, SlotPool};
