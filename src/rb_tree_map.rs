use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Index, RangeBounds};

use crate::cursor::{Cursor, CursorMut};
use crate::error::OutOfRange;
use crate::raw::{Duplicates, InsertResult, RawIter, RawIterMut, RawRange, RawRbTree};

mod entry;

pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// An ordered map based on a [red-black tree].
///
/// Given a key type with a [total order], an ordered map stores its entries in key order,
/// one entry per key. Lookups, insertions and removals take O(log n); finding the first
/// entry is O(1).
///
/// Besides the usual `get`/`remove`/`iter` surface the map exposes cursors: [`find`],
/// [`lower_bound`], [`upper_bound`], [`begin`] and [`end`] return a [`Cursor`] that can be
/// stepped in both directions, and their `_mut` variants return a [`CursorMut`] that can
/// also update values and remove entries.
///
/// Unlike [`BTreeMap::insert`](alloc::collections::BTreeMap::insert), [`RbTreeMap::insert`]
/// never overwrites: it reports whether the entry was new. [`RbTreeMap::insert_or_assign`]
/// overwrites.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative
/// to any other key, as determined by the [`Ord`] trait, changes while it is in the map. The
/// behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `RbTreeMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMap;
///
/// let mut stock = RbTreeMap::new();
/// stock.insert("apples", 3);
/// stock.insert("pears", 0);
/// stock.insert("figs", 12);
///
/// let (cursor, inserted) = stock.insert("apples", 99);
/// assert!(!inserted);
/// assert_eq!(cursor.value(), Some(&3));
///
/// stock.insert_or_assign("pears", 8);
/// assert_eq!(stock["pears"], 8);
///
/// *stock.get_or_insert_default("plums") += 5;
/// assert_eq!(stock.at("plums"), Ok(&5));
///
/// let names: Vec<_> = stock.keys().copied().collect();
/// assert_eq!(names, ["apples", "figs", "pears", "plums"]);
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`find`]: RbTreeMap::find
/// [`lower_bound`]: RbTreeMap::lower_bound
/// [`upper_bound`]: RbTreeMap::upper_bound
/// [`begin`]: RbTreeMap::begin
/// [`end`]: RbTreeMap::end
pub struct RbTreeMap<K, V> {
    pub(crate) raw: RawRbTree<K, V>,
}

/// An iterator over the entries of an `RbTreeMap`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`RbTreeMap`].
///
/// [`iter`]: RbTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

/// A mutable iterator over the entries of an `RbTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`RbTreeMap`].
///
/// [`iter_mut`]: RbTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V> {
    inner: RawIterMut<'a, K, V>,
}

/// An owning iterator over the entries of an `RbTreeMap`, sorted by key.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `RbTreeMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `RbTreeMap`, in key order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an `RbTreeMap`, in key order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An iterator over a sub-range of entries in an `RbTreeMap`.
///
/// This `struct` is created by the [`range`] method on [`RbTreeMap`].
///
/// [`range`]: RbTreeMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    inner: RawRange<'a, K, V>,
}

impl<K, V> RbTreeMap<K, V> {
    /// Makes a new, empty `RbTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> RbTreeMap<K, V> {
        RbTreeMap {
            raw: RawRbTree::new(Duplicates::Reject),
        }
    }

    /// Creates an empty map with room for at least `capacity` entries before reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map: RbTreeMap<i32, i32> = RbTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbTreeMap {
            raw: RawRbTree::with_capacity(Duplicates::Reject, capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Clears the map, removing all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns a cursor at the entry with the smallest key, or the end cursor if the map is
    /// empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert_eq!(map.begin(), map.end());
    ///
    /// map.insert(7, 'x');
    /// assert_eq!(map.begin().key(), Some(&7));
    /// assert_ne!(map.begin(), map.end());
    /// ```
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, self.raw.first())
    }

    /// Returns the end cursor, one past the entry with the largest key.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, None)
    }

    /// Returns a mutable cursor at the entry with the smallest key.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let first = self.raw.first();
        CursorMut::new(&mut self.raw, first)
    }

    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.key_value(handle))
    }

    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.key_value(handle))
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::from([(2, 'b'), (1, 'a')]);
    /// assert_eq!(map.pop_first(), Some((1, 'a')));
    /// assert_eq!(map.pop_first(), Some((2, 'b')));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.raw.first()?;
        Some(self.raw.remove(handle))
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.raw.last()?;
        Some(self.raw.remove(handle))
    }

    /// Retains only the entries for which `f` returns `true`, visiting them in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map: RbTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq([(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let mut iter = map.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next_back(), Some((&3, &"c")));
    /// assert_eq!(iter.len(), 1);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { inner: self.raw.iter() }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::from([("a", 1), ("b", 2)]);
    /// for (_, value) in map.iter_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map["b"], 20);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }
}

impl<K: Ord, V> RbTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(1, "a")]);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| self.raw.value(handle))
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| self.raw.key_value(handle))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.value_mut(handle))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Returns the value for `key`, or [`OutOfRange`] if the map has no such key.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] when `key` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::{OutOfRange, RbTreeMap};
    ///
    /// let map = RbTreeMap::from([("one", 1)]);
    /// assert_eq!(map.at("one"), Ok(&1));
    /// assert_eq!(map.at("two"), Err(OutOfRange));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).ok_or(OutOfRange)
    }

    /// Mutable form of [`at`](RbTreeMap::at).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] when `key` is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_mut(key).ok_or(OutOfRange)
    }

    /// Inserts an entry unless the key is already present.
    ///
    /// Returns a cursor at the entry holding `key` and whether a new entry was created. An
    /// existing entry is left untouched and the given key and value are dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert!(map.insert(37, "a").1);
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        let (handle, inserted) = match self.raw.insert(key, value) {
            InsertResult::Inserted(handle) => (handle, true),
            InsertResult::Rejected { existing, .. } => (existing, false),
        };
        (Cursor::new(&self.raw, Some(handle)), inserted)
    }

    /// Inserts an entry, or overwrites the value if the key is already present.
    ///
    /// Returns a mutable cursor at the entry and `true` if the entry is new, `false` if an
    /// existing value was replaced. The stored key is not replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::from([(1, "old")]);
    /// let (cursor, inserted) = map.insert_or_assign(1, "new");
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"new"));
    ///
    /// assert!(map.insert_or_assign(2, "two").1);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (CursorMut<'_, K, V>, bool) {
        let (handle, inserted) = match self.raw.insert(key, value) {
            InsertResult::Inserted(handle) => (handle, true),
            InsertResult::Rejected { existing, value, .. } => {
                *self.raw.value_mut(existing) = value;
                (existing, false)
            }
        };
        (CursorMut::new(&mut self.raw, Some(handle)), inserted)
    }

    /// Returns the value for `key`, first inserting `V::default()` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut counts: RbTreeMap<char, usize> = RbTreeMap::new();
    /// for c in "abracadabra".chars() {
    ///     *counts.get_or_insert_default(c) += 1;
    /// }
    /// assert_eq!(counts[&'a'], 5);
    /// assert_eq!(counts[&'d'], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Gets the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut letters = RbTreeMap::new();
    /// for ch in "a short treatise on fungi".chars() {
    ///     letters.entry(ch).and_modify(|counter| *counter += 1).or_insert(1);
    /// }
    /// assert_eq!(letters[&'s'], 2);
    /// assert_eq!(letters[&'t'], 3);
    /// assert_eq!(letters.get(&'y'), None);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.raw.find(&key) {
            Some(handle) => Entry::Occupied(OccupiedEntry {
                handle,
                tree: &mut self.raw,
            }),
            None => Entry::Vacant(VacantEntry {
                key,
                tree: &mut self.raw,
            }),
        }
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_key(key).map(|(_, value)| value)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_key(key)
    }

    /// Returns a cursor at the entry for `key`, or the end cursor if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.find(key))
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let found = self.raw.find(key);
        CursorMut::new(&mut self.raw, found)
    }

    /// Returns a cursor at the first entry whose key is not less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.lower_bound(&20).key(), Some(&20));
    /// assert_eq!(map.lower_bound(&21).key(), Some(&30));
    /// assert!(map.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(key))
    }

    /// Returns a cursor at the first entry whose key is greater than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.upper_bound(&20).key(), Some(&30));
    /// assert_eq!(map.upper_bound(&5).key(), Some(&10));
    /// assert_eq!(map.upper_bound(&30), map.end());
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(key))
    }

    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let bound = self.raw.lower_bound(key);
        CursorMut::new(&mut self.raw, bound)
    }

    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let bound = self.raw.upper_bound(key);
        CursorMut::new(&mut self.raw, bound)
    }

    /// Returns the number of entries with key `key`, either 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.count(key)
    }

    /// Constructs a double-ended iterator over a sub-range of entries in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if range `start == end` and both bounds are
    /// `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(3, "a"), (5, "b"), (8, "c")]);
    /// let inside: Vec<_> = map.range(4..=8).map(|(k, _)| *k).collect();
    /// assert_eq!(inside, [5, 8]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        Range {
            inner: self.raw.range(&range),
        }
    }

    /// Moves every entry of `other` into `self`, leaving `other` empty.
    ///
    /// Where both maps hold the same key, the entry from `other` replaces the one in
    /// `self`. The trees are combined by split and join instead of
    /// inserting entries one at a time.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut a = RbTreeMap::from([(1, "a"), (2, "a")]);
    /// let mut b = RbTreeMap::from([(2, "b"), (3, "b")]);
    /// a.merge(&mut b);
    ///
    /// assert!(b.is_empty());
    /// assert!(a.into_iter().eq([(1, "a"), (2, "b"), (3, "b")]));
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        self.raw.merge(&mut other.raw);
    }
}

impl<K: Clone, V: Clone> Clone for RbTreeMap<K, V> {
    fn clone(&self) -> Self {
        RbTreeMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for RbTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RbTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for RbTreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for RbTreeMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for RbTreeMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RbTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        RbTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = RbTreeMap::new();
        map.extend(iter);
        map
    }
}

/// Later pairs overwrite earlier values for the same key, as with `BTreeMap`.
impl<K: Ord, V> Extend<(K, V)> for RbTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for RbTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&key, &value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RbTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RbTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for RbTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V> Index<&Q> for RbTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RbTreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

// ─── Iterator implementations ───────────────────────────────────────────────

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<K, V> DoubleEndedIterator for Range<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RbTreeMap<u32, String>: Send, Sync, Clone, Default);
    assert_impl_all!(Iter<'static, u32, String>: Send, Sync);
    assert_impl_all!(IterMut<'static, u32, String>: Send);

    #[test]
    fn erase_from_the_middle_keeps_order() {
        let mut map: RbTreeMap<i32, ()> = [5, 3, 8, 1, 4, 7, 9].into_iter().map(|k| (k, ())).collect();
        assert_eq!(map.remove(&5), Some(()));
        map.raw.validate_invariants();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn insert_does_not_overwrite() {
        let mut map = RbTreeMap::new();
        assert!(map.insert(5, "first").1);
        let (cursor, inserted) = map.insert(5, "second");
        assert!(!inserted);
        assert_eq!(cursor.key_value(), Some((&5, &"first")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_or_assign_reports_which_happened() {
        let mut map = RbTreeMap::from([(1, 10)]);
        {
            let (mut cursor, inserted) = map.insert_or_assign(1, 11);
            assert!(!inserted);
            *cursor.value_mut().expect("cursor is on key 1") += 1;
        }
        assert_eq!(map[&1], 12);

        let (cursor, inserted) = map.insert_or_assign(0, 0);
        assert!(inserted);
        assert_eq!(cursor.key(), Some(&0));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn at_reports_missing_keys() {
        let mut map = RbTreeMap::from([("k", 1)]);
        assert_eq!(map.at("k"), Ok(&1));
        assert_eq!(map.at("missing"), Err(OutOfRange));
        *map.at_mut("k").expect("key is present") = 7;
        assert_eq!(map.at_mut("missing"), Err(OutOfRange));
        assert_eq!(map["k"], 7);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map: RbTreeMap<u8, u8> = RbTreeMap::new();
        let _value = map[&0];
    }

    #[test]
    fn default_insertion_creates_once() {
        let mut map: RbTreeMap<&str, Vec<u8>> = RbTreeMap::new();
        map.get_or_insert_default("a").push(1);
        map.get_or_insert_default("a").push(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], vec![1, 2]);
    }

    #[test]
    fn merge_moves_everything_and_empties_donor() {
        let mut a = RbTreeMap::from([(5, 'a'), (6, 'a')]);
        let mut b = RbTreeMap::from([(1, 'b'), (2, 'b'), (3, 'b'), (4, 'b')]);
        a.merge(&mut b);
        a.raw.validate_invariants();

        assert_eq!(a.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(b.len(), 0);
        assert_eq!(b.begin(), b.end());
    }

    #[test]
    fn cursors_from_bounds_walk_the_map() {
        let mut map: RbTreeMap<i32, i32> = (0..10).map(|k| (k * 2, k)).collect();
        let mut cursor = map.upper_bound_mut(&7);
        assert_eq!(cursor.key(), Some(&8));
        cursor.move_prev();
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&4));
        assert_eq!(cursor.remove_current(), Some((4, 2)));
        assert_eq!(cursor.key(), Some(&6));

        let mut cursor = map.lower_bound_mut(&100);
        assert!(cursor.is_end());
        cursor.move_prev();
        assert_eq!(cursor.into_value_mut().map(|value| *value), Some(9));
        map.raw.validate_invariants();
        assert_eq!(map.count(&4), 0);
        assert_eq!(map.count(&6), 1);
    }

    #[test]
    fn clone_does_not_share_state() {
        let original = RbTreeMap::from([(1, String::from("one")), (2, String::from("two"))]);
        let mut copy = original.clone();
        copy.get_mut(&1).expect("key 1 was cloned").push('!');
        copy.remove(&2);

        assert_eq!(original[&1], "one");
        assert_eq!(original.len(), 2);
        assert_eq!(copy[&1], "one!");
    }

    #[test]
    fn taking_the_map_leaves_an_empty_one() {
        let mut map = RbTreeMap::from([(1, 1)]);
        let moved = core::mem::take(&mut map);
        assert!(map.is_empty());
        assert_eq!(moved.len(), 1);
    }

    #[test]
    fn debug_and_equality() {
        let map = RbTreeMap::from([(2, 'b'), (1, 'a')]);
        assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b'}");
        assert_eq!(format!("{:?}", map.keys()), "[1, 2]");
        assert_eq!(map, RbTreeMap::from([(1, 'a'), (2, 'b')]));
        assert_ne!(map, RbTreeMap::from([(1, 'a')]));
        assert!(RbTreeMap::from([(1, 'a')]) < map);
    }

    #[test]
    fn later_pairs_win_when_collecting() {
        let map: RbTreeMap<u8, char> = [(1, 'a'), (1, 'b')].into_iter().collect();
        assert_eq!(map[&1], 'b');
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn values_mut_then_iter_agree(keys in prop::collection::vec(0u16..500, 0..200)) {
            let mut map: RbTreeMap<u16, u32> = keys.iter().map(|&k| (k, u32::from(k))).collect();
            for value in map.values_mut() {
                *value *= 3;
            }
            map.raw.validate_invariants();
            for (key, value) in &map {
                prop_assert_eq!(*value, u32::from(*key) * 3);
            }
            prop_assert_eq!(map.values().count(), map.len());
        }
    }
}
