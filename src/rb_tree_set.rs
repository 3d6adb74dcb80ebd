use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use crate::RbTreeMap;
use crate::cursor::{SetCursor, SetCursorMut};
use crate::raw::{RawIter, RawRange};

/// An ordered set based on a red-black tree.
///
/// See [`RbTreeMap`]'s documentation for a detailed discussion of this collection's
/// performance benefits and drawbacks.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering
/// relative to any other item, as determined by the [`Ord`] trait, changes while it is in
/// the set.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeSet;
///
/// let mut books = RbTreeSet::new();
///
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A set can be walked from any position with a cursor:
///
/// ```
/// use rb_collections::RbTreeSet;
///
/// let set = RbTreeSet::from([5, 3, 8, 1, 4, 7, 9]);
/// let mut cursor = set.upper_bound(&4);
/// assert_eq!(cursor.key(), Some(&5));
/// cursor.move_prev();
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&3));
/// ```
pub struct RbTreeSet<T> {
    pub(crate) map: RbTreeMap<T, ()>,
}

/// An iterator over the items of an `RbTreeSet` or `RbTreeMultiset`, in order.
///
/// This `struct` is created by the [`iter`] method on [`RbTreeSet`] and
/// [`RbTreeMultiset`](crate::RbTreeMultiset).
///
/// [`iter`]: RbTreeSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    pub(crate) inner: RawIter<'a, T, ()>,
}

/// An owning iterator over the items of an `RbTreeSet` or `RbTreeMultiset`, in order.
pub struct IntoIter<T> {
    pub(crate) inner: alloc::vec::IntoIter<(T, ())>,
}

/// An iterator over a sub-range of items in an `RbTreeSet` or `RbTreeMultiset`.
///
/// This `struct` is created by the [`range`] method on [`RbTreeSet`].
///
/// [`range`]: RbTreeSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T> {
    pub(crate) inner: RawRange<'a, T, ()>,
}

impl<T> RbTreeSet<T> {
    /// Makes a new, empty `RbTreeSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let mut set: RbTreeSet<i32> = RbTreeSet::new();
    /// ```
    #[must_use]
    pub const fn new() -> RbTreeSet<T> {
        RbTreeSet { map: RbTreeMap::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbTreeSet {
            map: RbTreeMap::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns a cursor at the smallest item, or the end cursor if the set is empty.
    #[must_use]
    pub fn begin(&self) -> SetCursor<'_, T> {
        self.map.begin()
    }

    #[must_use]
    pub fn end(&self) -> SetCursor<'_, T> {
        self.map.end()
    }

    /// Returns a mutable cursor at the smallest item.
    pub fn begin_mut(&mut self) -> SetCursorMut<'_, T> {
        self.map.begin_mut()
    }

    /// Returns a reference to the first item in the set, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let mut set = RbTreeSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(item, ())| item)
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(item, ())| item)
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(item, ())| item)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(item, ())| item)
    }

    /// Retains only the items for which `f` returns `true`, visiting them in order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|item, ()| f(item));
    }

    /// Gets an iterator that visits the items in the set in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let set = RbTreeSet::from([3, 1, 2]);
    /// let mut iter = set.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.raw.iter(),
        }
    }
}

impl<T: Ord> RbTreeSet<T> {
    /// Returns `true` if the set contains an item equal to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let set = RbTreeSet::from([1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the item in the set, if any, that is equal to the value.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get_key_value(value).map(|(item, ())| item)
    }

    /// Adds a value to the set unless an equal item is already present.
    ///
    /// Returns a cursor at the item equal to `value` and whether it was newly inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let mut set = RbTreeSet::new();
    /// assert!(set.insert(5).1);
    ///
    /// let (cursor, inserted) = set.insert(5);
    /// assert!(!inserted);
    /// assert_eq!(cursor.key(), Some(&5));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> (SetCursor<'_, T>, bool) {
        self.map.insert(value, ())
    }

    /// Removes an item equal to `value`. Returns whether one was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the item equal to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove_entry(value).map(|(item, ())| item)
    }

    pub fn find<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.find(value)
    }

    pub fn find_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.find_mut(value)
    }

    /// Returns a cursor at the first item not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.lower_bound(value)
    }

    /// Returns a cursor at the first item greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> SetCursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.upper_bound(value)
    }

    pub fn lower_bound_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.lower_bound_mut(value)
    }

    pub fn upper_bound_mut<Q>(&mut self, value: &Q) -> SetCursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.upper_bound_mut(value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.count(value)
    }

    /// Constructs a double-ended iterator over a sub-range of items in the set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if range `start == end` and both bounds are
    /// `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    /// use std::ops::Bound::Included;
    ///
    /// let set = RbTreeSet::from([3, 5, 8]);
    /// for elem in set.range((Included(&4), Included(&8))) {
    ///     println!("{elem}");
    /// }
    /// assert_eq!(Some(&5), set.range(4..).next());
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        Range {
            inner: self.map.raw.range(&range),
        }
    }

    /// Moves all items of `other` into `self`, leaving `other` empty. Items from `other`
    /// replace equal items already in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeSet;
    ///
    /// let mut a = RbTreeSet::from([5, 6]);
    /// let mut b = RbTreeSet::from([1, 2, 3, 4]);
    /// a.merge(&mut b);
    ///
    /// assert!(a.iter().eq(&[1, 2, 3, 4, 5, 6]));
    /// assert_eq!(b.len(), 0);
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        self.map.merge(&mut other.map);
    }
}

impl<T: Hash> Hash for RbTreeSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: PartialEq> PartialEq for RbTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map.eq(&other.map)
    }
}

impl<T: Eq> Eq for RbTreeSet<T> {}

impl<T: PartialOrd> PartialOrd for RbTreeSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for RbTreeSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Clone> Clone for RbTreeSet<T> {
    fn clone(&self) -> Self {
        RbTreeSet { map: self.map.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for RbTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for RbTreeSet<T> {
    fn default() -> Self {
        RbTreeSet::new()
    }
}

impl<T: Ord> FromIterator<T> for RbTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = RbTreeSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for RbTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for RbTreeSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RbTreeSet<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T> IntoIterator for RbTreeSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `RbTreeSet`'s contents in ascending order.
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RbTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// ─── Iterator implementations ───────────────────────────────────────────────

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<alloc::vec::Vec<_>>()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice().iter().map(|(item, ())| item)).finish()
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(item, ())| item)
    }
}

impl<T> DoubleEndedIterator for Range<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T> FusedIterator for Range<'_, T> {}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Range<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn round_trip_erase() {
        let mut set = RbTreeSet::from([5, 3, 8, 1, 4, 7, 9]);
        assert!(set.remove(&5));
        assert!(!set.remove(&5));
        set.map.raw.validate_invariants();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn second_insert_reports_existing() {
        let mut set = RbTreeSet::from([5]);
        let (cursor, inserted) = set.insert(5);
        let at = cursor.key().copied();
        assert!(!inserted);
        assert_eq!(at, Some(5));
        assert_eq!(set.find(&5).key(), Some(&5));
        assert_eq!(set.len(), 1);
        assert_eq!(set.count(&5), 1);
        assert_eq!(set.count(&6), 0);
    }

    #[test]
    fn begin_equals_end_only_when_empty() {
        let mut set = RbTreeSet::new();
        assert_eq!(set.begin(), set.end());
        set.insert('q');
        assert_ne!(set.begin(), set.end());
        assert_eq!(set.pop_last(), Some('q'));
        assert_eq!(set.begin(), set.end());
    }

    #[test]
    fn cursor_removal_through_find_mut() {
        let mut set: RbTreeSet<u32> = (0..20).collect();
        let mut cursor = set.find_mut(&10);
        while cursor.key().is_some_and(|&item| item < 15) {
            cursor.remove_current();
        }
        assert_eq!(cursor.key(), Some(&15));
        set.map.raw.validate_invariants();
        assert_eq!(set.len(), 15);
        assert_eq!(set.range(8..17).copied().collect::<Vec<_>>(), vec![8, 9, 15, 16]);
    }

    #[test]
    fn debug_formats() {
        let set = RbTreeSet::from(["b", "a"]);
        assert_eq!(format!("{set:?}"), r#"{"a", "b"}"#);
        assert_eq!(format!("{:?}", set.iter()), r#"Iter(["a", "b"])"#);
        assert_eq!(format!("{:?}", set.clone().into_iter()), r#"["a", "b"]"#);
    }

    #[test]
    fn take_and_get_return_stored_items() {
        let mut set = RbTreeSet::from([10, 20]);
        assert_eq!(set.get(&10), Some(&10));
        assert_eq!(set.take(&10), Some(10));
        assert_eq!(set.take(&10), None);
        assert_eq!(set.first(), Some(&20));
        assert_eq!(set.last(), Some(&20));
    }

    #[test]
    fn bound_cursors_remove_a_window() {
        let mut set: RbTreeSet<u8> = (1..=9).collect();
        let mut cursor = set.upper_bound_mut(&3);
        cursor.remove_current();
        cursor.remove_current();
        assert_eq!(cursor.key(), Some(&6));

        let mut cursor = set.lower_bound_mut(&9);
        cursor.move_prev();
        assert_eq!(cursor.remove_current(), Some((8, ())));
        assert!(cursor.key().is_some_and(|&item| item == 9));
        set.map.raw.validate_invariants();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 6, 7, 9]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn retain_matches_filter(items in prop::collection::vec(0i64..1000, 0..300), modulus in 1i64..7) {
            let mut set: RbTreeSet<i64> = items.iter().copied().collect();
            let expected: Vec<i64> = set.iter().copied().filter(|item| item % modulus == 0).collect();
            set.retain(|item| item % modulus == 0);
            set.map.raw.validate_invariants();
            prop_assert_eq!(set.into_iter().collect::<Vec<_>>(), expected);
        }
    }
}
