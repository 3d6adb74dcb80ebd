use core::fmt;
use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Stable address of a slot in an [`Arena`](super::arena::Arena).
///
/// Stored off-by-one inside a `NonZero` so that `Option<Handle>`, the type of every
/// tree link, costs no more than the handle itself.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest slot index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::new()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((index + 1) as RawHandle) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Links are `Option<Handle>`; they must not grow past the raw index width.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, RawHandle);

    #[test]
    #[should_panic(expected = "`Handle::new()` - `index` > `Handle::MAX`!")]
    fn handle_past_max_panics() {
        let _ = Handle::new(Handle::MAX + 1);
    }

    #[test]
    fn handle_debug_shows_index() {
        assert_eq!(format!("{:?}", Handle::new(7)), "#7");
    }

    proptest! {
        #[test]
        fn handle_preserves_index(index in 0..=Handle::MAX) {
            prop_assert_eq!(Handle::new(index).index(), index);
        }
    }
}
