//! # NOVA Core
//!
//! Slot storage for short-lived simulation objects.
//!
//! ## Architecture Rules
//!
//! 1. **Handles are indices** - no pointers cross the API
//! 2. **Slots are recycled, never compacted** - an index stays valid for a whole level
//! 3. **Reuse before growth** - the backing store only grows when the free list is empty
//!
//! ## Example
//!
//! ```rust
//! use nova_core::SlotPool;
//!
//! let mut pool: SlotPool<u32> = SlotPool::with_capacity(256);
//! let handle = pool.acquire(7);
//! assert_eq!(pool.get(handle), Some(&7));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{PoolHandle, PoolStats, SlotPool};
