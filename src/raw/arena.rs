use alloc::vec::Vec;

use super::handle::Handle;

/// Node storage for one tree, addressed by [`Handle`].
///
/// Removing a key vacates its node's slot, and the next insertion fills the most recently
/// vacated slot before the backing vector grows. Rebuilds relink nodes without touching the
/// arena at all.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Reserves slots for `capacity` nodes; none are vacant yet.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live nodes. Matches the owning tree's element count.
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.vacant.len())
    }

    /// Stores `value` and returns its handle, reusing a vacant slot when there is one.
    ///
    /// # Panics
    ///
    /// Panics if every addressable slot is live.
    pub(crate) fn alloc(&mut self, value: T) -> Handle {
        if let Some(handle) = self.vacant.pop() {
            self.slots[handle.to_index()] = Some(value);
            return handle;
        }
        // The new slot's index is `slots.len()`, which must stay below `Handle::MAX`.
        assert!(
            self.slots.len() < Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.slots.push(Some(value));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Moves the node out and marks its slot vacant. `handle` is dangling afterwards.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let value = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.vacant.push(handle);
        value
    }

    /// Drops every node. Capacity is kept.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}
