use core::fmt;
use core::mem;

use crate::raw::{Handle, InsertResult, RawRbTree};

/// A view into a single entry in a map, which may either be vacant or occupied.
///
/// This `enum` is constructed from the [`entry`] method on [`crate::RbTreeMap`].
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMap;
/// use rb_collections::rb_tree_map::Entry;
///
/// let mut map = RbTreeMap::new();
///
/// match map.entry("oz") {
///     Entry::Vacant(v) => {
///         v.insert(1);
///     }
///     Entry::Occupied(mut o) => {
///         *o.get_mut() += 1;
///     }
/// }
/// assert_eq!(map["oz"], 1);
/// ```
///
/// [`entry`]: crate::RbTreeMap::entry
pub enum Entry<'a, K: 'a, V: 'a> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),

    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(v) => f.debug_tuple("Entry").field(v).finish(),
            Entry::Occupied(o) => f.debug_tuple("Entry").field(o).finish(),
        }
    }
}

/// A view into a vacant entry in an `RbTreeMap`.
/// It is part of the [`Entry`] enum.
pub struct VacantEntry<'a, K, V> {
    pub(crate) key: K,
    pub(crate) tree: &'a mut RawRbTree<K, V>,
}

impl<K: fmt::Debug, V> fmt::Debug for VacantEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacantEntry").field("key", &self.key).finish()
    }
}

/// A view into an occupied entry in an `RbTreeMap`.
/// It is part of the [`Entry`] enum.
///
/// # Examples
///
/// ```
/// use rb_collections::RbTreeMap;
/// use rb_collections::rb_tree_map::Entry;
///
/// let mut map = RbTreeMap::from([("oz", 3)]);
/// if let Entry::Occupied(o) = map.entry("oz") {
///     assert_eq!(o.remove_entry(), ("oz", 3));
/// }
/// assert!(map.is_empty());
/// ```
pub struct OccupiedEntry<'a, K, V> {
    pub(crate) handle: Handle,
    pub(crate) tree: &'a mut RawRbTree<K, V>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OccupiedEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry").field("key", self.key()).field("value", self.get()).finish()
    }
}

impl<'a, K: Ord, V> Entry<'a, K, V> {
    /// Ensures a value is in the entry by inserting the default if empty, and returns
    /// a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::RbTreeMap;
    ///
    /// let mut map: RbTreeMap<&str, usize> = RbTreeMap::new();
    /// map.entry("poneyland").or_insert(12);
    /// *map.entry("poneyland").or_insert(99) += 1;
    /// assert_eq!(map["poneyland"], 13);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default),
        }
    }

    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Entry::or_insert_with), but the closure receives the key.
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let value = default(&v.key);
                v.insert(value)
            }
        }
    }

    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(o) => o.key(),
            Entry::Vacant(v) => v.key(),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any potential inserts.
    #[allow(clippy::return_self_not_must_use)]
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(ref mut o) = self {
            f(o.get_mut());
        }
        self
    }

    /// Sets the value of the entry and returns an [`OccupiedEntry`].
    pub fn insert_entry(self, value: V) -> OccupiedEntry<'a, K, V> {
        match self {
            Entry::Occupied(mut o) => {
                o.insert(value);
                o
            }
            Entry::Vacant(v) => v.insert_entry(value),
        }
    }
}

impl<'a, K: Ord, V: Default> Entry<'a, K, V> {
    #[allow(clippy::must_use_candidate)]
    pub fn or_default(self) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(V::default()),
        }
    }
}

impl<'a, K: Ord, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    #[allow(clippy::must_use_candidate)]
    pub fn into_key(self) -> K {
        self.key
    }

    /// Sets the value of the entry and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.insert_entry(value).into_mut()
    }

    pub fn insert_entry(self, value: V) -> OccupiedEntry<'a, K, V> {
        // The map held no such key when the entry was made and is borrowed since.
        let handle = match self.tree.insert(self.key, value) {
            InsertResult::Inserted(handle) => handle,
            InsertResult::Rejected { existing, .. } => existing,
        };
        OccupiedEntry { handle, tree: self.tree }
    }
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key stored in the map.
    #[must_use]
    pub fn key(&self) -> &K {
        self.tree.key(self.handle)
    }

    #[must_use]
    pub fn get(&self) -> &V {
        self.tree.value(self.handle)
    }

    pub fn get_mut(&mut self) -> &mut V {
        self.tree.value_mut(self.handle)
    }

    /// Converts the entry into a mutable reference to its value, bound to the map's borrow.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_mut(self) -> &'a mut V {
        self.tree.value_mut(self.handle)
    }

    /// Sets the value of the entry, returning the old value.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Takes the entry out of the map.
    #[allow(clippy::must_use_candidate)]
    pub fn remove_entry(self) -> (K, V) {
        self.tree.remove(self.handle)
    }

    #[allow(clippy::must_use_candidate)]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }
}
