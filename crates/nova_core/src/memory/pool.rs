//! # Slot Pool
//!
//! Growable slot array with a free list, for objects that are frequently
//! created and destroyed.

/// A growable pool of slots addressed by stable indices.
///
/// Released slots are pushed onto a free list and handed out again before
/// the backing store grows. Slots are never compacted or reindexed, so a
/// handle stays meaningful until its slot is released.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one subsystem on the
/// simulation thread.
///
/// # Example
///
/// ```rust,ignore
/// struct Burst { life: f32 }
///
/// let mut pool: SlotPool<Burst> = SlotPool::with_capacity(256);
///
/// // Reuses a freed slot if there is one, otherwise grows by one
/// let handle = pool.acquire(Burst { life: 1.0 });
///
/// // Slot goes back on the free list, nothing moves
/// pool.release(handle);
/// ```
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    /// The storage array. `None` marks a free slot.
    slots: Vec<Option<T>>,
    /// Free list - indices of released slots.
    free_list: Vec<u32>,
    /// Hard ceiling on the number of slots the store may grow to.
    max_slots: usize,
}

/// Handle to a live slot in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    /// Index into the pool.
    index: u32,
}

impl PoolHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

/// Snapshot of pool occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots ever created this level.
    pub total_slots: usize,
    /// Slots currently on the free list.
    pub free_slots: usize,
    /// Slots currently holding a value.
    pub live: usize,
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotPool<T> {
    /// Creates an empty, unbounded pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool with room reserved for `capacity` slots.
    ///
    /// Reservation is a hint; the pool still grows past it.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            max_slots: u32::MAX as usize,
        }
    }

    /// Caps how many slots the store may ever hold.
    #[must_use]
    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots.min(u32::MAX as usize);
        self
    }

    /// Returns the number of slots ever created (live + free).
    #[inline]
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots on the free list.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the number of live slots.
    ///
    /// Always equals `total_slots() - free_count()`.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns an occupancy snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_slots: self.total_slots(),
            free_slots: self.free_count(),
            live: self.live_count(),
        }
    }

    /// Stores `value`, reusing a freed slot if one exists.
    ///
    /// # Panics
    ///
    /// Panics if the store is already at its slot ceiling. Use
    /// [`SlotPool::try_acquire_with`] where growth may be denied.
    pub fn acquire(&mut self, value: T) -> PoolHandle {
        match self.try_acquire_with(|_| value) {
            Some(handle) => handle,
            None => panic!("slot pool exhausted at {} slots", self.max_slots),
        }
    }

    /// Builds the value for the slot it will occupy and stores it.
    ///
    /// The closure sees the handle first so the stored value can record its
    /// own slot. A freed slot is preferred; otherwise the store grows by one.
    ///
    /// # Returns
    ///
    /// The handle, or `None` if the free list is empty and growth is denied.
    pub fn try_acquire_with<F>(&mut self, build: F) -> Option<PoolHandle>
    where
        F: FnOnce(PoolHandle) -> T,
    {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                if self.slots.len() >= self.max_slots {
                    return None;
                }
                let index = u32::try_from(self.slots.len()).ok()?;
                self.slots.push(None);
                index
            }
        };

        let handle = PoolHandle { index };
        let slot = &mut self.slots[handle.index()];
        debug_assert!(slot.is_none(), "free list handed out a live slot {index}");
        *slot = Some(build(handle));

        Some(handle)
    }

    /// Handle the next acquire will return, without acquiring it.
    ///
    /// Lets a caller hand the slot index to another system before the value
    /// exists. `None` if the pool cannot grow.
    #[must_use]
    pub fn next_handle(&self) -> Option<PoolHandle> {
        match self.free_list.last() {
            Some(&index) => Some(PoolHandle { index }),
            None if self.slots.len() < self.max_slots => {
                u32::try_from(self.slots.len()).ok().map(|index| PoolHandle { index })
            }
            None => None,
        }
    }

    /// Releases a live slot back to the free list.
    ///
    /// Releasing a slot that is not live is a caller contract violation.
    /// Debug builds assert; release builds return `None` and leave the pool
    /// untouched.
    ///
    /// # Returns
    ///
    /// The value that occupied the slot.
    pub fn release(&mut self, handle: PoolHandle) -> Option<T> {
        let value = self.slots.get_mut(handle.index()).and_then(Option::take);
        debug_assert!(value.is_some(), "release of non-live slot {}", handle.index);

        if value.is_some() {
            self.free_list.push(handle.index);
        }
        value
    }

    /// Returns true if the handle refers to a live slot.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        matches!(self.slots.get(handle.index()), Some(Some(_)))
    }

    /// Gets a reference to a live slot.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots.get(handle.index())?.as_ref()
    }

    /// Gets a mutable reference to a live slot.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.index())?.as_mut()
    }

    /// Drops every slot and empties the free list, keeping `capacity` reserved.
    ///
    /// Handles from before the reset are meaningless afterwards.
    pub fn reset(&mut self, capacity: usize) {
        self.slots.clear();
        self.free_list.clear();
        self.slots.reserve(capacity);
        self.free_list.reserve(capacity);
    }

    /// Iterates over all live slots.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|v| (Self::handle_at(index), v))
        })
    }

    /// Iterates mutably over all live slots.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            slot.as_mut().map(|v| (Self::handle_at(index), v))
        })
    }

    /// Handles of every live slot, in index order.
    #[must_use]
    pub fn live_handles(&self) -> Vec<PoolHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn handle_at(index: usize) -> PoolHandle {
        // slots.len() never exceeds u32::MAX
        PoolHandle { index: index as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_balanced<T>(pool: &SlotPool<T>) {
        assert_eq!(pool.live_count(), pool.total_slots() - pool.free_count());
        assert_eq!(pool.live_count(), pool.iter().count());
    }

    #[test]
    fn test_pool_acquire_release() {
        let mut pool: SlotPool<u32> = SlotPool::new();

        let h1 = pool.acquire(42);
        assert_eq!(*pool.get(h1).unwrap(), 42);
        assert_eq!(pool.live_count(), 1);

        let freed = pool.release(h1).unwrap();
        assert_eq!(freed, 42);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.total_slots(), 1);
        assert_eq!(pool.free_count(), 1);
        assert!(!pool.is_live(h1));
    }

    #[test]
    fn test_pool_grows_only_when_free_list_empty() {
        let mut pool: SlotPool<u8> = SlotPool::with_capacity(2);

        let a = pool.acquire(1);
        let b = pool.acquire(2);
        let c = pool.acquire(3);
        assert_eq!(pool.total_slots(), 3);
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));

        pool.release(b);
        let d = pool.acquire(4);
        assert_eq!(d.index(), 1); // Same slot reused
        assert_eq!(pool.total_slots(), 3);
        assert_eq!(*pool.get(d).unwrap(), 4);
    }

    #[test]
    fn test_pool_max_slots() {
        let mut pool: SlotPool<u8> = SlotPool::new().with_max_slots(2);

        let first = pool.try_acquire_with(|_| 1).unwrap();
        assert!(pool.try_acquire_with(|_| 2).is_some());
        assert!(pool.try_acquire_with(|_| 3).is_none());

        pool.release(first);
        assert!(pool.try_acquire_with(|_| 4).is_some());
    }

    #[test]
    fn test_builder_sees_own_handle() {
        let mut pool: SlotPool<usize> = SlotPool::new();
        pool.acquire(0);
        let h = pool.try_acquire_with(PoolHandle::index).unwrap();
        assert_eq!(*pool.get(h).unwrap(), 1);
    }

    #[test]
    fn test_next_handle_predicts_acquire() {
        let mut pool: SlotPool<u8> = SlotPool::new().with_max_slots(2);
        assert_eq!(pool.next_handle().map(PoolHandle::index), Some(0));

        let a = pool.acquire(1);
        let predicted = pool.next_handle().unwrap();
        assert_eq!(pool.acquire(2), predicted);
        assert_eq!(pool.next_handle(), None);

        pool.release(a);
        assert_eq!(pool.next_handle(), Some(a));
    }

    #[test]
    fn test_indices_are_stable_across_release() {
        let mut pool: SlotPool<&str> = SlotPool::new();
        let a = pool.acquire("a");
        let b = pool.acquire("b");
        let c = pool.acquire("c");

        pool.release(a);
        assert_eq!(*pool.get(b).unwrap(), "b");
        assert_eq!(*pool.get(c).unwrap(), "c");
        assert_eq!(pool.live_handles(), vec![b, c]);
    }

    #[test]
    fn test_counts_balance_over_mixed_sequence() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let mut live = Vec::new();

        for step in 0..200u32 {
            if step % 3 == 2 {
                if let Some(handle) = live.pop() {
                    pool.release(handle);
                }
            } else {
                live.push(pool.acquire(step));
            }
            assert_balanced(&pool);
        }
        assert_eq!(pool.live_count(), live.len());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let h = pool.acquire(1);
        pool.acquire(2);
        pool.release(h);

        pool.reset(16);
        assert_eq!(pool.stats(), PoolStats::default());
        assert_balanced(&pool);
    }
}
