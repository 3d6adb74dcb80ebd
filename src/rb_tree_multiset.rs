use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Bound, RangeBounds};

use crate::cursor::{SetCursor, SetCursorMut};
use crate::raw::{Duplicates, Handle, InsertResult, RawRbTree};
use crate::rb_tree_set::{IntoIter, Iter, Range};

/// An ordered multiset based on a red-black tree.
///
/// Equal items are all retained. Among equal items, the most recently inserted one comes
/// first in iteration order, directly in front of those inserted earlier.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMultiset;
///
/// let mut bag = RbTreeMultiset::new();
/// for item in [3, 3, 3, 1, 2] {
///     bag.insert(item);
/// }
///
/// assert_eq!(bag.len(), 5);
/// assert_eq!(bag.count(&3), 3);
/// assert_eq!(bag.count(&9), 0);
/// assert!(bag.iter().eq(&[1, 2, 3, 3, 3]));
///
/// assert_eq!(bag.remove_all(&3), 3);
/// assert!(bag.iter().eq(&[1, 2]));
/// ```
pub struct RbTreeMultiset<T> {
    raw: RawRbTree<T, ()>,
}

impl<T> RbTreeMultiset<T> {
    /// Makes a new, empty `RbTreeMultiset`. Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> RbTreeMultiset<T> {
        RbTreeMultiset {
            raw: RawRbTree::new(Duplicates::Allow),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbTreeMultiset {
            raw: RawRbTree::with_capacity(Duplicates::Allow, capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of items, counting every copy of equal items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn begin(&self) -> SetCursor<'_, T> {
        SetCursor::new(&self.raw, self.raw.first())
    }

    #[must_use]
    pub fn end(&self) -> SetCursor<'_, T> {
        SetCursor::new(&self.raw, None)
    }

    pub fn begin_mut(&mut self) -> SetCursorMut<'_, T> {
        let first = self.raw.first();
        SetCursorMut::new(&mut self.raw, first)
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|handle| self.raw.key(handle))
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|handle| self.raw.key(handle))
    }

    pub fn pop_first(&mut self) -> Option<T> {
        let first = self.raw.first()?;
        Some(self.raw.remove(first).0)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        let last = self.raw.last()?;
        Some(self.raw.remove(last).0)
    }

    /// Retains only the items for which `f` returns `true`, visiting them in order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.raw.retain(|item, ()| f(item));
    }

    /// Gets an iterator that visits every item in ascending order, equal items included.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { inner: self.raw.iter() }
    }
}

impl<T: Ord> RbTreeMultiset<T> {
    /// Adds a value to the multiset, in front of any items equal to it.
    ///
    /// Returns a cursor at the new item.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMultiset;
    ///
    /// let mut bag = RbTreeMultiset::from([2, 5]);
    /// let mut cursor = bag.insert(2);
    /// cursor.move_next();
    /// assert_eq!(cursor.key(), Some(&2));
    /// cursor.move_next();
    /// assert_eq!(cursor.key(), Some(&5));
    /// ```
    pub fn insert(&mut self, value: T) -> SetCursor<'_, T> {
        let handle = match self.raw.insert(value, ()) {
            InsertResult::Inserted(handle) => handle,
            // Unreachable when duplicates are allowed; point at the equal item regardless.
            InsertResult::Rejected { existing, .. } => existing,
        };
        SetCursor::new(&self.raw, Some(handle))
    }

    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(value).is_some()
    }

    /// Returns the first item equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let first = self.equal_start(value)?;
        Some(self.raw.key(first))
    }

    /// Returns how many items are equal to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n + k), where k is the returned count.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.count(value)
    }

    /// Returns a cursor at the first item equal to `value`, or the end cursor.
    pub fn find<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        SetCursor::new(&self.raw, self.equal_start(value))
    }

    pub fn find_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let found = self.equal_start(value);
        SetCursorMut::new(&mut self.raw, found)
    }

    pub fn lower_bound<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        SetCursor::new(&self.raw, self.raw.lower_bound(value))
    }

    pub fn upper_bound<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        SetCursor::new(&self.raw, self.raw.upper_bound(value))
    }

    pub fn lower_bound_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let bound = self.raw.lower_bound(value);
        SetCursorMut::new(&mut self.raw, bound)
    }

    pub fn upper_bound_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let bound = self.raw.upper_bound(value);
        SetCursorMut::new(&mut self.raw, bound)
    }

    /// Iterates over the run of items equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMultiset;
    ///
    /// let bag = RbTreeMultiset::from([1, 4, 4, 9]);
    /// assert_eq!(bag.equal_range(&4).count(), 2);
    /// assert_eq!(bag.equal_range(&5).next(), None);
    /// ```
    pub fn equal_range<Q>(&self, value: &Q) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Range {
            inner: self.raw.range::<Q, _>(&(Bound::Included(value), Bound::Included(value))),
        }
    }

    /// Constructs a double-ended iterator over a sub-range of items.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if range `start == end` and both bounds are
    /// `Excluded`.
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        Range {
            inner: self.raw.range(&range),
        }
    }

    /// Removes one item equal to `value`, the first in order. Returns whether one was found.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.equal_start(value) {
            Some(handle) => {
                self.raw.remove(handle);
                true
            }
            None => false,
        }
    }

    /// Removes every item equal to `value` and returns how many there were.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut removed = 0;
        let mut current = self.equal_start(value);
        while let Some(handle) = current {
            current = self
                .raw
                .successor(handle)
                .filter(|&next| value.cmp(self.raw.key(next).borrow()).is_eq());
            self.raw.remove(handle);
            removed += 1;
        }
        removed
    }

    /// Moves all items of `other` into `self`, leaving `other` empty. Every item is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMultiset;
    ///
    /// let mut a = RbTreeMultiset::from([2, 3]);
    /// let mut b = RbTreeMultiset::from([1, 2]);
    /// a.merge(&mut b);
    ///
    /// assert!(a.iter().eq(&[1, 2, 2, 3]));
    /// assert!(b.is_empty());
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        self.raw.merge(&mut other.raw);
    }

    fn equal_start<Q>(&self, value: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw
            .lower_bound(value)
            .filter(|&handle| value.cmp(self.raw.key(handle).borrow()).is_eq())
    }
}

impl<T: Hash> Hash for RbTreeMultiset<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self {
            item.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for RbTreeMultiset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RbTreeMultiset<T> {}

impl<T: PartialOrd> PartialOrd for RbTreeMultiset<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for RbTreeMultiset<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Clone> Clone for RbTreeMultiset<T> {
    fn clone(&self) -> Self {
        RbTreeMultiset { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for RbTreeMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for RbTreeMultiset<T> {
    fn default() -> Self {
        RbTreeMultiset::new()
    }
}

impl<T: Ord> FromIterator<T> for RbTreeMultiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut multiset = RbTreeMultiset::new();
        multiset.extend(iter);
        multiset
    }
}

impl<T: Ord> Extend<T> for RbTreeMultiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for RbTreeMultiset<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RbTreeMultiset<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T> IntoIterator for RbTreeMultiset<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RbTreeMultiset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
