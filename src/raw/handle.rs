use core::num::NonZero;

// Narrow handles under test so the capacity ceiling is reachable.
#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in the [`Arena`](super::arena::Arena).
///
/// Child links are stored as `Option<Handle>`, so the handle is one-based internally to let the
/// `None` case occupy the zero niche.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// The largest slot index a handle can address. The arena holds at most this many nodes.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Wraps the slot index of a node.
    ///
    /// # Panics
    ///
    /// Panics if `index > Handle::MAX`.
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawHandle;
        match NonZero::new(raw) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    /// Returns the slot index this handle was created from.
    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
