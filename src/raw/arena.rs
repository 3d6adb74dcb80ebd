use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes and values.
///
/// Freed slots are recycled LIFO, so a handle stays valid until its own slot is taken and
/// may be reissued afterwards.
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

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of occupied slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.vacant.pop() {
            self.slots[handle.index()] = Some(element);
            return handle;
        }

        assert!(
            self.slots.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX + 1
        );
        self.slots.push(Some(element));
        Handle::new(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.index()].as_ref().expect("`Arena::get()` - `handle` is vacant!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.index()].as_mut().expect("`Arena::get_mut()` - `handle` is vacant!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.index()].take().expect("`Arena::take()` - `handle` is vacant!");
        self.vacant.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }

    /// Base pointer of the slot storage, for iterators that hand out disjoint `&mut T`.
    ///
    /// The pointer is invalidated by any call that can reallocate (`alloc`, `clear`).
    pub(crate) fn slots_mut_ptr(&mut self) -> *mut Option<T> {
        self.slots.as_mut_ptr()
    }

    /// Returns the element at `handle` through a pointer from [`Arena::slots_mut_ptr`].
    ///
    /// # Safety
    /// - `slots` must come from `slots_mut_ptr` on an arena that has not reallocated since.
    /// - `handle` must address an occupied slot of that arena.
    /// - No other reference to that slot may be live for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_raw<'a>(slots: *mut Option<T>, handle: Handle) -> &'a mut T {
        // SAFETY: Caller guarantees `slots` is live and `handle` in bounds and exclusively borrowed.
        unsafe { (*slots.add(handle.index())).as_mut().expect("`Arena::get_mut_raw()` - `handle` is vacant!") }
    }
}
