use core::borrow::Borrow;
use core::cmp::Ordering;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Bound, RangeBounds};

use alloc::vec::Vec;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node, Side};

/// Whether a tree keeps several entries with equal keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Duplicates {
    /// Inserting an existing key is a no-op.
    Reject,
    /// Equal keys are kept; a new entry is placed before the equal entries already present.
    Allow,
}

/// The red-black tree engine backing every collection in this crate.
pub(crate) struct RawRbTree<K, V> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<K>>,
    /// Arena storing all values, addressed by each node's value handle.
    pub(super) values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    pub(super) root: Option<Handle>,
    /// Handle to the minimum node, kept current by insert and remove.
    pub(super) front: Option<Handle>,
    /// Number of live entries.
    pub(super) len: usize,
    pub(super) duplicates: Duplicates,
}

/// Outcome of [`RawRbTree::insert`].
pub(crate) enum InsertResult<K, V> {
    /// A new node was linked in.
    Inserted(Handle),
    /// The key is already present and duplicates are rejected; the arguments are handed back.
    Rejected { existing: Handle, key: K, value: V },
}

/// Situation around a doubly-black position, in the order the cases are resolved.
enum DoubleBlack {
    RedSibling(Handle),
    /// Black sibling with a red child on `nephew_side`, preferring the far child.
    RedNephew {
        sibling: Handle,
        nephew: Handle,
        nephew_side: Side,
    },
    BlackNephews(Handle),
}

/// Remaining in-order positions of an iterator, inclusive at both ends.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Span {
    front: Option<Handle>,
    back: Option<Handle>,
}

impl Span {
    pub(crate) const EMPTY: Self = Self { front: None, back: None };

    fn next<K>(&mut self, nodes: &Arena<Node<K>>) -> Option<Handle> {
        let handle = self.front?;
        if self.front == self.back {
            *self = Self::EMPTY;
        } else {
            self.front = step(nodes, handle, Side::Right);
        }
        Some(handle)
    }

    fn next_back<K>(&mut self, nodes: &Arena<Node<K>>) -> Option<Handle> {
        let handle = self.back?;
        if self.front == self.back {
            *self = Self::EMPTY;
        } else {
            self.back = step(nodes, handle, Side::Left);
        }
        Some(handle)
    }
}

/// In-order neighbour of `handle`: the successor when `toward` is `Right`, the predecessor
/// when it is `Left`. Colors play no part.
fn step<K>(nodes: &Arena<Node<K>>, mut handle: Handle, toward: Side) -> Option<Handle> {
    if let Some(child) = nodes.get(handle)[toward] {
        return Some(extreme(nodes, child, toward.opposite()));
    }
    loop {
        let parent = nodes.get(handle).parent()?;
        if nodes.get(parent)[toward.opposite()] == Some(handle) {
            return Some(parent);
        }
        handle = parent;
    }
}

/// The last node reached from `handle` by following `side` links.
pub(super) fn extreme<K>(nodes: &Arena<Node<K>>, mut handle: Handle, side: Side) -> Handle {
    while let Some(child) = nodes.get(handle)[side] {
        handle = child;
    }
    handle
}

impl<K, V> RawRbTree<K, V> {
    pub(crate) const fn new(duplicates: Duplicates) -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            front: None,
            len: 0,
            duplicates,
        }
    }

    pub(crate) fn with_capacity(duplicates: Duplicates, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            ..Self::new(duplicates)
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        if self.len > 0 {
            log::trace!("clearing red-black tree of {} entries", self.len);
        }
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.front = None;
        self.len = 0;
    }

    /// The minimum node, in O(1).
    pub(crate) fn first(&self) -> Option<Handle> {
        self.front
    }

    /// The maximum node.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| extreme(&self.nodes, root, Side::Right))
    }

    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        step(&self.nodes, handle, Side::Right)
    }

    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        step(&self.nodes, handle, Side::Left)
    }

    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(self.nodes.get(handle).value())
    }

    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        self.values.get_mut(self.nodes.get(handle).value())
    }

    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    pub(crate) fn key_value_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Unlinks `target`, rebalances, and returns its entry.
    pub(crate) fn remove(&mut self, target: Handle) -> (K, V) {
        if self.front == Some(target) {
            self.front = self.successor(target);
        }

        let node = self.nodes.get(target);
        let (left, right, parent, color) = (node.left(), node.right(), node.parent(), node.color());

        // `orphan` is whatever now occupies the slot that lost a node, possibly nothing.
        let (removed_color, orphan, orphan_parent) = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = extreme(&self.nodes, right, Side::Left);
                let successor_color = self.color(successor);
                let successor_right = self.nodes.get(successor).right();

                let orphan_parent = if successor == right {
                    Some(successor)
                } else {
                    let successor_parent = self.nodes.get(successor).parent();
                    self.transplant(successor, successor_right);
                    self.adopt(successor, Side::Right, Some(right));
                    successor_parent
                };

                self.transplant(target, Some(successor));
                self.adopt(successor, Side::Left, Some(left));
                self.set_color(successor, color);
                (successor_color, successor_right, orphan_parent)
            }
            (child, None) | (None, child) => {
                self.transplant(target, child);
                (color, child, parent)
            }
        };

        if removed_color == Color::Black {
            self.fix_double_black(orphan, orphan_parent);
        }

        self.len -= 1;
        let (key, value) = self.nodes.take(target).into_parts();
        (key, self.values.take(value))
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut doomed = Vec::new();
        let mut current = self.front;
        while let Some(handle) = current {
            let (key, value) = self.key_value_mut(handle);
            if !keep(key, value) {
                doomed.push(handle);
            }
            current = self.successor(handle);
        }
        // Removal relinks nodes but never moves them, so the collected handles stay valid.
        for handle in doomed {
            drop(self.remove(handle));
        }
    }

    /// Moves every entry out in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.front;
        while let Some(handle) = current {
            order.push(handle);
            current = self.successor(handle);
        }

        let entries = order
            .into_iter()
            .map(|handle| {
                let (key, value) = self.nodes.take(handle).into_parts();
                (key, self.values.take(value))
            })
            .collect();
        self.clear();
        entries
    }

    pub(crate) fn iter(&self) -> RawIter<'_, K, V> {
        RawIter {
            tree: self,
            span: Span {
                front: self.front,
                back: self.last(),
            },
            remaining: self.len,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> RawIterMut<'_, K, V> {
        let span = Span {
            front: self.front,
            back: self.last(),
        };
        RawIterMut {
            remaining: self.len,
            values: self.values.slots_mut_ptr(),
            nodes: &self.nodes,
            span,
            _marker: PhantomData,
        }
    }

    // ─── Structural helpers ─────────────────────────────────────────────────

    pub(super) fn color(&self, handle: Handle) -> Color {
        self.nodes.get(handle).color()
    }

    pub(super) fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|handle| self.color(handle) == Color::Red)
    }

    pub(super) fn set_color(&mut self, handle: Handle, color: Color) {
        self.nodes.get_mut(handle).set_color(color);
    }

    fn parent_of(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).parent()
    }

    /// Makes `child` the `side` child of `parent`, fixing the back link.
    pub(super) fn adopt(&mut self, parent: Handle, side: Side, child: Option<Handle>) {
        self.nodes.get_mut(parent)[side] = child;
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Points whichever link referenced `old` (a child slot of `parent`, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                if node.left() == Some(old) {
                    node[Side::Left] = new;
                } else {
                    node[Side::Right] = new;
                }
            }
        }
    }

    /// Puts `new` where `old` hangs. `old` keeps its own links.
    fn transplant(&mut self, old: Handle, new: Option<Handle>) {
        let parent = self.parent_of(old);
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.nodes.get_mut(new).set_parent(parent);
        }
    }

    /// Moves `pivot` down toward `side`; its child on the other side takes its place.
    /// Returns that child, the new root of the subtree.
    pub(super) fn rotate(&mut self, pivot: Handle, side: Side) -> Handle {
        let riser = self.nodes.get(pivot)[side.opposite()].expect("`RawRbTree::rotate()` - nothing to rotate up!");
        let inner = self.nodes.get(riser)[side];
        let parent = self.parent_of(pivot);

        self.adopt(pivot, side.opposite(), inner);
        self.replace_child(parent, pivot, Some(riser));
        self.nodes.get_mut(riser).set_parent(parent);
        self.adopt(riser, side, Some(pivot));
        riser
    }

    fn fix_after_insert(&mut self, mut node: Handle) {
        while let Some(parent) = self.parent_of(node) {
            if self.color(parent) == Color::Black {
                break;
            }
            // A red parent is never the root.
            let Some(grandparent) = self.parent_of(parent) else {
                break;
            };
            let side = if self.nodes.get(grandparent).left() == Some(parent) {
                Side::Left
            } else {
                Side::Right
            };

            if let Some(uncle) = self.nodes.get(grandparent)[side.opposite()].filter(|&uncle| self.is_red(Some(uncle))) {
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.nodes.get(parent)[side.opposite()] == Some(node) {
                self.rotate(parent, side);
                parent = node;
            }
            self.rotate(grandparent, side.opposite());
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    fn classify_sibling(&self, parent: Handle, side: Side) -> DoubleBlack {
        let sibling =
            self.nodes.get(parent)[side.opposite()].expect("`RawRbTree::fix_double_black()` - doubly-black node has no sibling!");
        if self.color(sibling) == Color::Red {
            return DoubleBlack::RedSibling(sibling);
        }

        let node = self.nodes.get(sibling);
        for nephew_side in [side.opposite(), side] {
            if let Some(nephew) = node[nephew_side].filter(|&nephew| self.is_red(Some(nephew))) {
                return DoubleBlack::RedNephew {
                    sibling,
                    nephew,
                    nephew_side,
                };
            }
        }
        DoubleBlack::BlackNephews(sibling)
    }

    /// Restores equal black-height after a black node left the slot now held by `node`.
    fn fix_double_black(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while node != self.root && !self.is_red(node) {
            let Some(above) = parent else {
                break;
            };
            let side = if self.nodes.get(above).left() == node {
                Side::Left
            } else {
                Side::Right
            };

            match self.classify_sibling(above, side) {
                DoubleBlack::RedSibling(sibling) => {
                    self.set_color(sibling, Color::Black);
                    self.set_color(above, Color::Red);
                    self.rotate(above, side);
                }
                DoubleBlack::RedNephew {
                    sibling,
                    nephew,
                    nephew_side,
                } => {
                    let parent_color = self.color(above);
                    if nephew_side == side {
                        // Near nephew: lift it over the sibling, it ends up on top.
                        self.set_color(nephew, parent_color);
                        self.rotate(sibling, side.opposite());
                    } else {
                        self.set_color(nephew, Color::Black);
                        self.set_color(sibling, parent_color);
                    }
                    self.rotate(above, side);
                    self.set_color(above, Color::Black);
                    node = self.root;
                    break;
                }
                DoubleBlack::BlackNephews(sibling) => {
                    self.set_color(sibling, Color::Red);
                    node = Some(above);
                    parent = self.parent_of(above);
                }
            }
        }

        if let Some(node) = node {
            self.set_color(node, Color::Black);
        }
    }
}

impl<K: Ord, V> RawRbTree<K, V> {
    /// Returns the first node met on the descent whose key equals `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Some(handle),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// First node whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()).is_le())
    }

    /// First node whose key is greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()).is_lt())
    }

    /// Leftmost node satisfying `past`, which must be monotone over the key order.
    fn bound<F>(&self, past: F) -> Option<Handle>
    where
        F: Fn(&K) -> bool,
    {
        let mut found = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if past(node.key()) {
                found = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        found
    }

    pub(crate) fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.duplicates == Duplicates::Reject {
            return usize::from(self.find(key).is_some());
        }

        let mut count = 0;
        let mut current = self.lower_bound(key);
        while let Some(handle) = current {
            if key.cmp(self.key(handle).borrow()).is_ne() {
                break;
            }
            count += 1;
            current = self.successor(handle);
        }
        count
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> InsertResult<K, V> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut is_minimum = true;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            side = match key.cmp(node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Equal if self.duplicates == Duplicates::Allow => Side::Left,
                Ordering::Equal => {
                    return InsertResult::Rejected {
                        existing: handle,
                        key,
                        value,
                    };
                }
                Ordering::Greater => {
                    is_minimum = false;
                    Side::Right
                }
            };
            parent = Some(handle);
            current = node[side];
        }

        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::new(key, value));
        match parent {
            Some(parent) => self.adopt(parent, side, Some(handle)),
            None => self.root = Some(handle),
        }
        if is_minimum {
            self.front = Some(handle);
        }
        self.len += 1;

        self.fix_after_insert(handle);
        InsertResult::Inserted(handle)
    }

    /// Removes the node `find` would return for `key`.
    pub(crate) fn remove_key<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.find(key)?;
        Some(self.remove(handle))
    }

    /// Entries whose keys fall in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the start bound exceeds the end bound, or if both are the same excluded key.
    pub(crate) fn range<Q, R>(&self, range: &R) -> RawRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
            (range.start_bound(), range.end_bound())
        {
            let both_excluded =
                matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_));
            let valid = if both_excluded { start < end } else { start <= end };
            assert!(valid, "range start is greater than range end in a red-black tree collection");
        }

        let start = match range.start_bound() {
            Bound::Included(key) => self.lower_bound(key),
            Bound::Excluded(key) => self.upper_bound(key),
            Bound::Unbounded => self.front,
        };
        // Exclusive end position; `None` is the end of the tree.
        let end = match range.end_bound() {
            Bound::Included(key) => self.upper_bound(key),
            Bound::Excluded(key) => self.lower_bound(key),
            Bound::Unbounded => None,
        };

        let span = match start {
            Some(start) if Some(start) != end => Span {
                front: Some(start),
                back: match end {
                    Some(end) => self.predecessor(end),
                    None => self.last(),
                },
            },
            _ => Span::EMPTY,
        };
        RawRange { tree: self, span }
    }
}

impl<K: Clone, V: Clone> Clone for RawRbTree<K, V> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.duplicates, self.len);
        let Some(root) = self.root else {
            return copy;
        };

        // Pre-order walk; each entry is (source node, cloned parent, side under that parent).
        let mut pending: SmallVec<[(Handle, Option<Handle>, Side); 32]> = SmallVec::new();
        pending.push((root, None, Side::Left));
        while let Some((source, parent, side)) = pending.pop() {
            let node = self.nodes.get(source);
            let value = copy.values.alloc(self.values.get(node.value()).clone());
            let mut cloned = Node::new(node.key().clone(), value);
            cloned.set_color(node.color());
            let handle = copy.nodes.alloc(cloned);

            match parent {
                Some(parent) => copy.adopt(parent, side, Some(handle)),
                None => copy.root = Some(handle),
            }
            if let Some(right) = node.right() {
                pending.push((right, Some(handle), Side::Right));
            }
            if let Some(left) = node.left() {
                pending.push((left, Some(handle), Side::Left));
            }
        }

        copy.front = copy.root.map(|root| extreme(&copy.nodes, root, Side::Left));
        copy.len = self.len;
        copy
    }
}

// ─── Iterators ──────────────────────────────────────────────────────────────

/// In-order iterator over every entry.
pub(crate) struct RawIter<'a, K, V> {
    tree: &'a RawRbTree<K, V>,
    span: Span,
    remaining: usize,
}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        RawIter { ..*self }
    }
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.span.next(&self.tree.nodes)?;
        self.remaining -= 1;
        Some(self.tree.key_value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.span.next_back(&self.tree.nodes)?;
        self.remaining -= 1;
        Some(self.tree.key_value(handle))
    }
}

impl<K, V> ExactSizeIterator for RawIter<'_, K, V> {}

impl<K, V> FusedIterator for RawIter<'_, K, V> {}

/// In-order iterator over the entries between two bounds.
pub(crate) struct RawRange<'a, K, V> {
    tree: &'a RawRbTree<K, V>,
    span: Span,
}

impl<K, V> Clone for RawRange<'_, K, V> {
    fn clone(&self) -> Self {
        RawRange { ..*self }
    }
}

impl<'a, K, V> Iterator for RawRange<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.span.next(&self.tree.nodes)?;
        Some(self.tree.key_value(handle))
    }
}

impl<K, V> DoubleEndedIterator for RawRange<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.span.next_back(&self.tree.nodes)?;
        Some(self.tree.key_value(handle))
    }
}

impl<K, V> FusedIterator for RawRange<'_, K, V> {}

/// In-order iterator handing out mutable values.
pub(crate) struct RawIterMut<'a, K, V> {
    nodes: &'a Arena<Node<K>>,
    values: *mut Option<V>,
    span: Span,
    remaining: usize,
    _marker: PhantomData<&'a mut V>,
}

// SAFETY: RawIterMut behaves as (&Arena<Node<K>>, &mut Arena<V>).
unsafe impl<K: Sync, V: Send> Send for RawIterMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for RawIterMut<'_, K, V> {}

impl<'a, K, V> Iterator for RawIterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.span.next(self.nodes)?;
        self.remaining -= 1;
        let node = self.nodes.get(handle);
        // SAFETY: `values` comes from the tree borrowed mutably for 'a, which cannot reallocate
        // meanwhile, and the span yields each node, hence each value slot, at most once.
        let value = unsafe { Arena::get_mut_raw(self.values, node.value()) };
        Some((node.key(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.span.next_back(self.nodes)?;
        self.remaining -= 1;
        let node = self.nodes.get(handle);
        // SAFETY: As in `next`; both ends share one span, so no slot is yielded twice.
        let value = unsafe { Arena::get_mut_raw(self.values, node.value()) };
        Some((node.key(), value))
    }
}

impl<K, V> ExactSizeIterator for RawIterMut<'_, K, V> {}

impl<K, V> FusedIterator for RawIterMut<'_, K, V> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::manual_assert)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl<K: Ord, V> RawRbTree<K, V> {
        /// Validates every red-black and bookkeeping invariant. Panics listing each violation.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            if let Some(root) = self.root {
                if self.nodes.get(root).parent().is_some() {
                    errors.push(format!("root {root:?} has a parent"));
                }
                if self.color(root) == Color::Red {
                    errors.push(format!("root {root:?} is red"));
                }
                self.check_subtree(root, &mut errors);
            }

            let leftmost = self.root.map(|root| extreme(&self.nodes, root, Side::Left));
            if leftmost != self.front {
                errors.push(format!("front {:?} is not the minimum {leftmost:?}", self.front));
            }

            let mut walked = 0;
            let mut previous: Option<&K> = None;
            let mut current = self.front;
            while let Some(handle) = current {
                walked += 1;
                if walked > self.len {
                    errors.push(format!("in-order walk runs past len={}", self.len));
                    break;
                }
                let key = self.key(handle);
                if let Some(previous) = previous {
                    match (previous.cmp(key), self.duplicates) {
                        (Ordering::Greater, _) => errors.push(format!("keys out of order at {handle:?}")),
                        (Ordering::Equal, Duplicates::Reject) => errors.push(format!("duplicate key at {handle:?}")),
                        _ => {}
                    }
                }
                previous = Some(key);
                current = self.successor(handle);
            }

            if walked != self.len {
                errors.push(format!("len={} but walk found {walked}", self.len));
            }
            if self.nodes.len() != self.len || self.values.len() != self.len {
                errors.push(format!(
                    "arena sizes nodes={} values={} disagree with len={}",
                    self.nodes.len(),
                    self.values.len(),
                    self.len
                ));
            }

            assert!(errors.is_empty(), "Red-black invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns the black height of the subtree at `handle`, recording local violations.
        fn check_subtree(&self, handle: Handle, errors: &mut Vec<String>) -> usize {
            let node = self.nodes.get(handle);
            let mut heights = [0; 2];

            for (height, side) in heights.iter_mut().zip([Side::Left, Side::Right]) {
                let Some(child) = node[side] else {
                    continue;
                };
                if self.nodes.get(child).parent() != Some(handle) {
                    errors.push(format!("{child:?} does not point back to parent {handle:?}"));
                }
                if node.color() == Color::Red && self.color(child) == Color::Red {
                    errors.push(format!("red {handle:?} has red child {child:?}"));
                }
                let child_key = self.key(child);
                let misplaced = match side {
                    Side::Left => child_key > node.key(),
                    Side::Right => child_key < node.key(),
                };
                if misplaced {
                    errors.push(format!("{child:?} is on the wrong side of {handle:?}"));
                }
                *height = self.check_subtree(child, errors);
            }

            if heights[0] != heights[1] {
                errors.push(format!("black heights differ under {handle:?}: {heights:?}"));
            }
            heights[0] + usize::from(node.color() == Color::Black)
        }
    }

    fn unique_from(keys: &[i32]) -> RawRbTree<i32, i32> {
        let mut tree = RawRbTree::new(Duplicates::Reject);
        for &key in keys {
            tree.insert(key, key * 10);
        }
        tree
    }

    fn keys_of<V>(tree: &RawRbTree<i32, V>) -> Vec<i32> {
        tree.iter().map(|(key, _)| *key).collect()
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let tree = unique_from(&(0..1000).collect::<Vec<_>>());
        tree.validate_invariants();
        assert_eq!(tree.len(), 1000);
        assert_eq!(tree.first().map(|handle| *tree.key(handle)), Some(0));
        assert_eq!(tree.last().map(|handle| *tree.key(handle)), Some(999));
    }

    #[test]
    fn rejected_insert_hands_arguments_back() {
        let mut tree = unique_from(&[5]);
        match tree.insert(5, 99) {
            InsertResult::Rejected { existing, key, value } => {
                assert_eq!((key, value), (5, 99));
                assert_eq!(tree.key_value(existing), (&5, &50));
            }
            InsertResult::Inserted(_) => panic!("duplicate key was inserted"),
        }
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn equal_keys_are_inserted_before_existing_ones() {
        let mut tree = RawRbTree::new(Duplicates::Allow);
        for (key, value) in [(5, 'a'), (3, 'x'), (5, 'b'), (7, 'y'), (5, 'c')] {
            assert!(matches!(tree.insert(key, value), InsertResult::Inserted(_)));
        }
        tree.validate_invariants();

        let entries: Vec<_> = tree.iter().map(|(key, value)| (*key, *value)).collect();
        assert_eq!(entries, vec![(3, 'x'), (5, 'c'), (5, 'b'), (5, 'a'), (7, 'y')]);
        assert_eq!(tree.count(&5), 3);
        assert_eq!(tree.count(&4), 0);
    }

    #[test]
    fn bounds_bracket_the_key() {
        let tree = unique_from(&[30, 10, 20]);
        let key_at = |handle: Option<Handle>| handle.map(|handle| *tree.key(handle));

        assert_eq!(key_at(tree.lower_bound(&20)), Some(20));
        assert_eq!(key_at(tree.upper_bound(&20)), Some(30));
        assert_eq!(key_at(tree.lower_bound(&5)), Some(10));
        assert_eq!(key_at(tree.lower_bound(&25)), Some(30));
        assert_eq!(key_at(tree.lower_bound(&35)), None);
        assert_eq!(key_at(tree.upper_bound(&30)), None);
    }

    #[test]
    fn removing_the_minimum_advances_front() {
        let mut tree = unique_from(&[4, 2, 6, 1, 3]);
        let front = tree.first().expect("tree is not empty");
        assert_eq!(tree.remove(front), (1, 10));
        assert_eq!(tree.first().map(|handle| *tree.key(handle)), Some(2));
        tree.validate_invariants();

        assert_eq!(tree.remove_key(&9), None);
        assert_eq!(tree.remove_key(&4), Some((4, 40)));
        assert_eq!(keys_of(&tree), vec![2, 3, 6]);
        tree.validate_invariants();
    }

    #[test]
    fn removal_keeps_other_handles_valid() {
        let mut tree = unique_from(&(0..64).collect::<Vec<_>>());
        let handles: Vec<_> = (0..64).map(|key| tree.find(&key).expect("key was inserted")).collect();
        for key in (0..64).step_by(3) {
            tree.remove(handles[key]);
        }
        tree.validate_invariants();
        for key in (0..64).filter(|key| key % 3 != 0) {
            assert_eq!(*tree.key(handles[key]), i32::try_from(key).expect("small key"));
        }
    }

    #[test]
    #[should_panic(expected = "doubly-black node has no sibling")]
    fn black_leaf_without_sibling_panics_on_removal() {
        let mut tree = unique_from(&[1, 2]);
        let leaf = tree.find(&2).expect("key was inserted");
        // A lone black leaf breaks equal black-height, so its removal finds no sibling.
        tree.set_color(leaf, Color::Black);
        tree.remove(leaf);
    }

    #[test]
    fn clone_is_independent() {
        let original = unique_from(&[8, 3, 12, 1, 5]);
        let mut copy = original.clone();
        copy.validate_invariants();
        copy.remove_key(&3);
        copy.insert(4, 40);

        assert_eq!(keys_of(&original), vec![1, 3, 5, 8, 12]);
        assert_eq!(keys_of(&copy), vec![1, 4, 5, 8, 12]);
    }

    #[test]
    fn drain_yields_entries_in_order_and_empties() {
        let mut tree = unique_from(&[2, 9, 4]);
        assert_eq!(tree.drain_to_vec(), vec![(2, 20), (4, 40), (9, 90)]);
        assert!(tree.is_empty());
        assert_eq!(tree.first(), None);
        tree.validate_invariants();
    }

    #[test]
    fn retain_drops_rejected_entries() {
        let mut tree = unique_from(&(0..40).collect::<Vec<_>>());
        tree.retain(|key, value| {
            *value += 1;
            key % 4 == 0
        });
        tree.validate_invariants();
        let entries: Vec<_> = tree.iter().map(|(key, value)| (*key, *value)).collect();
        assert_eq!(entries, (0..40).step_by(4).map(|key| (key, key * 10 + 1)).collect::<Vec<_>>());
    }

    #[test]
    fn iter_mut_meets_in_the_middle() {
        let mut tree = unique_from(&[1, 2, 3, 4, 5]);
        let mut iter = tree.iter_mut();
        assert_eq!(iter.len(), 5);
        let (_, first) = iter.next().expect("five entries");
        let (_, last) = iter.next_back().expect("five entries");
        *first = 0;
        *last = 0;
        for (_, value) in iter.by_ref() {
            *value = -*value;
        }
        assert!(iter.next().is_none());

        let values: Vec<_> = tree.iter().map(|(_, value)| *value).collect();
        assert_eq!(values, vec![0, -20, -30, -40, 0]);
    }

    #[test]
    fn empty_ranges_yield_nothing() {
        let tree = unique_from(&[10, 20, 30]);
        assert_eq!(tree.range(&(11..20)).count(), 0);
        assert_eq!(tree.range(&(31..)).count(), 0);
        assert_eq!(tree.range(&(..10)).count(), 0);
        let keys: Vec<_> = tree.range(&(10..=20)).map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![10, 20]);
        let keys: Vec<_> = tree.range(&(15..)).rev().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![30, 20]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..200).prop_map(Op::Insert),
            3 => (0i32..200).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn unique_tree_matches_btreemap(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawRbTree<i32, i32> = RawRbTree::new(Duplicates::Reject);
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let inserted = matches!(tree.insert(key, -key), InsertResult::Inserted(_));
                        prop_assert_eq!(inserted, model.insert(key, -key).is_none());
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove_key(&key), model.remove_entry(&key));
                    }
                    Op::PopFirst => {
                        let popped = tree.first().map(|handle| tree.remove(handle));
                        prop_assert_eq!(popped, model.pop_first());
                    }
                    Op::PopLast => {
                        let popped = tree.last().map(|handle| tree.remove(handle));
                        prop_assert_eq!(popped, model.pop_last());
                    }
                }
                tree.validate_invariants();
            }

            let entries: Vec<_> = tree.iter().map(|(key, value)| (*key, *value)).collect();
            let expected: Vec<_> = model.into_iter().collect();
            prop_assert_eq!(entries, expected);
        }

        #[test]
        fn duplicate_tree_matches_sorted_vec(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawRbTree<i32, usize> = RawRbTree::new(Duplicates::Allow);
            let mut model: Vec<(i32, usize)> = Vec::new();

            for (serial, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key % 20, serial);
                        let at = model.partition_point(|&(existing, _)| existing < key % 20);
                        model.insert(at, (key % 20, serial));
                    }
                    Op::Remove(key) => match tree.remove_key(&(key % 20)) {
                        Some(entry) => {
                            let at = model.iter().position(|&existing| existing == entry);
                            prop_assert!(at.is_some(), "removed {:?} which the model lacks", entry);
                            model.remove(at.unwrap_or_default());
                        }
                        None => prop_assert!(model.iter().all(|&(existing, _)| existing != key % 20)),
                    },
                    Op::PopFirst => {
                        let popped = tree.first().map(|handle| tree.remove(handle));
                        prop_assert_eq!(popped, (!model.is_empty()).then(|| model.remove(0)));
                    }
                    Op::PopLast => {
                        let popped = tree.last().map(|handle| tree.remove(handle));
                        prop_assert_eq!(popped, model.pop());
                    }
                }
                tree.validate_invariants();
            }

            let entries: Vec<_> = tree.iter().map(|(key, value)| (*key, *value)).collect();
            prop_assert_eq!(&entries, &model);
            for key in 0..20 {
                prop_assert_eq!(tree.count(&key), model.iter().filter(|&&(existing, _)| existing == key).count());
            }
        }

        #[test]
        fn ranges_match_btreemap(
            keys in prop::collection::vec(0i32..300, 0..200),
            start in 0i32..300,
            width in 0i32..100,
        ) {
            let tree = unique_from(&keys);
            let model: BTreeMap<i32, i32> = keys.iter().map(|&key| (key, key * 10)).collect();
            let end = start + width;

            let actual: Vec<_> = tree.range(&(start..end)).map(|(key, _)| *key).collect();
            let expected: Vec<_> = model.range(start..end).map(|(key, _)| *key).collect();
            prop_assert_eq!(actual, expected);

            let actual: Vec<_> = tree.range(&(start..=end)).rev().map(|(key, _)| *key).collect();
            let expected: Vec<_> = model.range(start..=end).rev().map(|(key, _)| *key).collect();
            prop_assert_eq!(actual, expected);

            let lower = tree.lower_bound(&start).map(|handle| *tree.key(handle));
            prop_assert_eq!(lower, model.range(start..).next().map(|(key, _)| *key));
            let upper = tree.upper_bound(&start).map(|handle| *tree.key(handle));
            prop_assert_eq!(upper, model.range(start + 1..).next().map(|(key, _)| *key));
        }
    }
}
