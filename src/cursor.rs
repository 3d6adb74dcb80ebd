//! Positions inside a red-black tree collection.
//!
//! A cursor points at one entry, or at the end position past the maximum. Stepping
//! follows in-order successor and predecessor links: `move_next` at the end stays at
//! the end, `move_prev` from the end lands on the maximum.

use core::fmt;
use core::ptr;

use crate::raw::{Handle, RawRbTree, Side};

/// One in-order step from `current` toward `side`, treating `None` as the end position:
/// stepping right from the end stays there, stepping left from it reaches the maximum.
fn advance<K, V>(tree: &RawRbTree<K, V>, current: Option<Handle>, side: Side) -> Option<Handle> {
    match (current, side) {
        (Some(handle), Side::Right) => tree.successor(handle),
        (Some(handle), Side::Left) => tree.predecessor(handle),
        (None, Side::Right) => None,
        (None, Side::Left) => tree.last(),
    }
}

/// A read-only position in an [`RbTreeMap`](crate::RbTreeMap),
/// [`RbTreeSet`](crate::RbTreeSet) or [`RbTreeMultiset`](crate::RbTreeMultiset).
///
/// Two cursors are equal when they come from the same collection and sit on the same
/// position, so `begin() == end()` exactly when the collection is empty.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMap;
///
/// let map = RbTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
/// let mut cursor = map.lower_bound(&2);
/// assert_eq!(cursor.key_value(), Some((&2, &"b")));
///
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&3));
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, map.end());
///
/// cursor.move_prev();
/// assert_eq!(cursor.value(), Some(&"c"));
/// ```
pub struct Cursor<'a, K, V> {
    tree: &'a RawRbTree<K, V>,
    current: Option<Handle>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a RawRbTree<K, V>, current: Option<Handle>) -> Self {
        Cursor { tree, current }
    }

    /// Returns the key at this position, or `None` at the end.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.current.map(|handle| self.tree.key(handle))
    }

    /// Returns the value at this position, or `None` at the end.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.current.map(|handle| self.tree.value(handle))
    }

    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|handle| self.tree.key_value(handle))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Steps to the in-order successor. Stays put at the end.
    pub fn move_next(&mut self) {
        self.current = advance(self.tree, self.current, Side::Right);
    }

    /// Steps to the in-order predecessor. From the end, moves to the maximum; from the
    /// minimum, moves to the end.
    pub fn move_prev(&mut self) {
        self.current = advance(self.tree, self.current, Side::Left);
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

/// A read-only position in a set or multiset, whose entries carry no value.
pub type SetCursor<'a, T> = Cursor<'a, T, ()>;

/// A position in a set or multiset that can remove the element under it.
pub type SetCursorMut<'a, T> = CursorMut<'a, T, ()>;

/// A position in a collection that can modify the value under it or remove its entry.
///
/// Keys are never handed out mutably, since changing a key in place could break the
/// tree's ordering.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMap;
///
/// let mut map = RbTreeMap::from([(1, 10), (2, 20), (3, 30)]);
/// let mut cursor = map.find_mut(&2);
/// if let Some(value) = cursor.value_mut() {
///     *value += 1;
/// }
/// assert_eq!(cursor.remove_current(), Some((2, 21)));
/// assert_eq!(cursor.key(), Some(&3));
/// assert_eq!(map.len(), 2);
/// ```
pub struct CursorMut<'a, K, V> {
    tree: &'a mut RawRbTree<K, V>,
    current: Option<Handle>,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) fn new(tree: &'a mut RawRbTree<K, V>, current: Option<Handle>) -> Self {
        CursorMut { tree, current }
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current.map(|handle| self.tree.key(handle))
    }

    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.current.map(|handle| self.tree.value(handle))
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        let handle = self.current?;
        Some(self.tree.value_mut(handle))
    }

    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        let handle = self.current?;
        Some(self.tree.key_value_mut(handle))
    }

    /// Converts the cursor into a mutable reference to its value, bound to the collection's
    /// borrow.
    #[must_use]
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        let tree = self.tree;
        let handle = self.current?;
        Some(tree.value_mut(handle))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// See [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.current = advance(self.tree, self.current, Side::Right);
    }

    /// See [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.current = advance(self.tree, self.current, Side::Left);
    }

    /// Returns a read-only cursor at the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.tree, self.current)
    }

    /// Removes the entry at this position and moves to its successor.
    ///
    /// Returns `None`, removing nothing, at the end position.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let handle = self.current?;
        self.current = self.tree.successor(handle);
        Some(self.tree.remove(handle))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.as_cursor().key_value()).finish()
    }
}
