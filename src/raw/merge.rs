//! Bulk merge of one tree into another by split/join set union.

use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::{Color, Node, Side};
use super::raw_rb_tree::{Duplicates, RawRbTree, extreme};

/// Result of splitting a subtree around a pivot key: keys below, an equal node (only when
/// duplicates are rejected), keys above.
type Split = (Option<Handle>, Option<Handle>, Option<Handle>);

impl<K: Ord, V> RawRbTree<K, V> {
    /// Moves every entry of `other` into `self`, leaving `other` empty.
    ///
    /// When duplicates are rejected and both trees hold a key, the entry from `other` replaces
    /// the one in `self`.
    pub(crate) fn merge(&mut self, other: &mut Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            core::mem::swap(&mut self.nodes, &mut other.nodes);
            core::mem::swap(&mut self.values, &mut other.values);
            self.root = other.root.take();
            self.front = other.front.take();
            self.len = core::mem::take(&mut other.len);
            other.clear();
            log::trace!("merged {} entries into an empty tree", self.len);
            return;
        }

        let incoming = other.len;
        let donor = self.relocate(other);
        let base = self.root.take();

        let mut dropped = 0;
        let root = self.union(base, donor, &mut dropped);

        self.root = root;
        if let Some(root) = root {
            self.nodes.get_mut(root).set_parent(None);
            self.set_color(root, Color::Black);
            self.front = Some(extreme(&self.nodes, root, Side::Left));
        }
        self.len += incoming - dropped;
        log::trace!("merged {incoming} entries, dropped {dropped} duplicates, len now {}", self.len);
    }

    /// Moves every node and value of `other` into this tree's arenas, preserving shape and
    /// colors. Returns the moved root, detached from this tree.
    fn relocate(&mut self, other: &mut Self) -> Option<Handle> {
        let root = other.root?;
        let mut relocated_root = None;

        let mut pending: SmallVec<[(Handle, Option<Handle>, Side); 32]> = SmallVec::new();
        pending.push((root, None, Side::Left));
        while let Some((source, parent, side)) = pending.pop() {
            let node = other.nodes.take(source);
            let (color, left, right) = (node.color(), node.left(), node.right());
            let (key, value) = node.into_parts();

            let value = self.values.alloc(other.values.take(value));
            let mut moved = Node::new(key, value);
            moved.set_color(color);
            let handle = self.nodes.alloc(moved);

            match parent {
                Some(parent) => self.adopt(parent, side, Some(handle)),
                None => relocated_root = Some(handle),
            }
            if let Some(right) = right {
                pending.push((right, Some(handle), Side::Right));
            }
            if let Some(left) = left {
                pending.push((left, Some(handle), Side::Left));
            }
        }

        other.clear();
        relocated_root
    }

    /// Cuts `handle` loose from its children, which become detached roots.
    fn detach_children(&mut self, handle: Handle) -> (Option<Handle>, Option<Handle>) {
        let node = self.nodes.get_mut(handle);
        let (left, right) = (node.left(), node.right());
        node.unlink();
        for child in [left, right].into_iter().flatten() {
            self.nodes.get_mut(child).set_parent(None);
        }
        (left, right)
    }

    fn union(&mut self, base: Option<Handle>, donor: Option<Handle>, dropped: &mut usize) -> Option<Handle> {
        let Some(donor) = donor else {
            return base;
        };
        if base.is_none() {
            return Some(donor);
        }

        let (donor_left, donor_right) = self.detach_children(donor);
        let (below, found, above) = self.split(base, donor);

        if let Some(found) = found {
            let (key, value) = self.nodes.take(found).into_parts();
            drop((key, self.values.take(value)));
            *dropped += 1;
        }

        let left = self.union(below, donor_left, dropped);
        let right = self.union(above, donor_right, dropped);
        Some(self.join(left, donor, right))
    }

    /// Splits the detached subtree `tree` around the key of the detached node `pivot`.
    ///
    /// Under `Duplicates::Allow` equal keys go below and nothing is reported as found.
    fn split(&mut self, tree: Option<Handle>, pivot: Handle) -> Split {
        let Some(node) = tree else {
            return (None, None, None);
        };
        let (left, right) = self.detach_children(node);

        match self.nodes.get(pivot).key().cmp(self.nodes.get(node).key()) {
            Ordering::Equal if self.duplicates == Duplicates::Reject => (left, Some(node), right),
            Ordering::Less => {
                let (below, found, above) = self.split(left, pivot);
                (below, found, Some(self.join(above, node, right)))
            }
            Ordering::Greater | Ordering::Equal => {
                let (below, found, above) = self.split(right, pivot);
                (Some(self.join(left, node, below)), found, above)
            }
        }
    }

    /// Number of black nodes on the leftmost path of a detached subtree.
    fn black_height(&self, mut tree: Option<Handle>) -> usize {
        let mut height = 0;
        while let Some(handle) = tree {
            if self.color(handle) == Color::Black {
                height += 1;
            }
            tree = self.nodes.get(handle).left();
        }
        height
    }

    /// Joins two detached subtrees with `middle` between them; every key of `left` must be
    /// at most `middle`'s and every key of `right` at least it. Returns the detached result,
    /// whose root may be red.
    fn join(&mut self, left: Option<Handle>, middle: Handle, right: Option<Handle>) -> Handle {
        for root in [left, right].into_iter().flatten() {
            self.set_color(root, Color::Black);
        }
        self.nodes.get_mut(middle).unlink();

        let left_height = self.black_height(left);
        let right_height = self.black_height(right);

        let (root, toward) = match left_height.cmp(&right_height) {
            Ordering::Equal => {
                self.adopt(middle, Side::Left, left);
                self.adopt(middle, Side::Right, right);
                self.set_color(middle, Color::Red);
                return middle;
            }
            Ordering::Greater => (self.join_spine(left, left_height, middle, right, right_height, Side::Right), Side::Right),
            Ordering::Less => (self.join_spine(right, right_height, middle, left, left_height, Side::Left), Side::Left),
        };

        if self.is_red(Some(root)) && self.is_red(self.nodes.get(root)[toward]) {
            self.set_color(root, Color::Black);
        }
        root
    }

    /// Descends the `toward` spine of the taller tree until the black height matches `short`,
    /// hangs `middle` there, and repairs red-red violations on the way back up.
    fn join_spine(
        &mut self,
        tall: Option<Handle>,
        tall_height: usize,
        middle: Handle,
        short: Option<Handle>,
        short_height: usize,
        toward: Side,
    ) -> Handle {
        if tall_height == short_height && !self.is_red(tall) {
            self.adopt(middle, toward.opposite(), tall);
            self.adopt(middle, toward, short);
            self.set_color(middle, Color::Red);
            return middle;
        }

        let top = tall.expect("`RawRbTree::join_spine()` - black heights out of step!");
        let top_color = self.color(top);
        let below_height = if top_color == Color::Black { tall_height - 1 } else { tall_height };
        let spine = self.nodes.get(top)[toward];

        let joined = self.join_spine(spine, below_height, middle, short, short_height, toward);
        self.adopt(top, toward, Some(joined));

        let grandchild = self.nodes.get(joined)[toward];
        if top_color == Color::Black && self.is_red(Some(joined)) && self.is_red(grandchild) {
            if let Some(grandchild) = grandchild {
                self.set_color(grandchild, Color::Black);
            }
            return self.rotate(top, toward.opposite());
        }
        top
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::InsertResult;
    use alloc::collections::BTreeMap;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn tree_of(duplicates: Duplicates, entries: &[(i32, char)]) -> RawRbTree<i32, char> {
        let mut tree = RawRbTree::new(duplicates);
        for &(key, value) in entries {
            tree.insert(key, value);
        }
        tree
    }

    fn entries_of(tree: &RawRbTree<i32, char>) -> Vec<(i32, char)> {
        tree.iter().map(|(key, value)| (*key, *value)).collect()
    }

    #[test]
    fn merge_takes_incoming_entry_on_collision() {
        let mut tree = tree_of(Duplicates::Reject, &[(1, 'a'), (3, 'a'), (5, 'a')]);
        let mut other = tree_of(Duplicates::Reject, &[(2, 'b'), (3, 'b'), (6, 'b')]);

        tree.merge(&mut other);
        tree.validate_invariants();
        other.validate_invariants();

        assert_eq!(entries_of(&tree), vec![(1, 'a'), (2, 'b'), (3, 'b'), (5, 'a'), (6, 'b')]);
        assert!(other.is_empty());
    }

    #[test]
    fn merge_with_duplicates_keeps_everything() {
        let mut tree = tree_of(Duplicates::Allow, &[(1, 'a'), (2, 'a'), (2, 'a')]);
        let mut other = tree_of(Duplicates::Allow, &[(2, 'b'), (0, 'b')]);

        tree.merge(&mut other);
        tree.validate_invariants();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.count(&2), 3);
        let keys: Vec<_> = tree.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn merge_into_empty_takes_everything() {
        let mut tree = tree_of(Duplicates::Reject, &[]);
        let mut other = tree_of(Duplicates::Reject, &[(4, 'x'), (2, 'y')]);

        tree.merge(&mut other);
        tree.validate_invariants();
        assert_eq!(entries_of(&tree), vec![(2, 'y'), (4, 'x')]);
        assert!(other.is_empty());

        let mut empty = tree_of(Duplicates::Reject, &[]);
        tree.merge(&mut empty);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn merged_tree_accepts_further_edits() {
        let mut tree = tree_of(Duplicates::Reject, &[(10, 'a'), (20, 'a')]);
        let mut other = tree_of(Duplicates::Reject, &(0..50).map(|key| (key, 'b')).collect::<Vec<_>>());
        tree.merge(&mut other);

        assert!(matches!(tree.insert(100, 'c'), InsertResult::Inserted(_)));
        for key in 0..30 {
            tree.remove_key(&key);
        }
        tree.validate_invariants();
        assert_eq!(tree.len(), 21);
        assert_eq!(tree.first().map(|handle| *tree.key(handle)), Some(30));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn merge_matches_btreemap_union(
            left in prop::collection::vec(0i32..400, 0..150),
            right in prop::collection::vec(0i32..400, 0..150),
        ) {
            let mut tree = tree_of(Duplicates::Reject, &left.iter().map(|&key| (key, 'l')).collect::<Vec<_>>());
            let mut other = tree_of(Duplicates::Reject, &right.iter().map(|&key| (key, 'r')).collect::<Vec<_>>());

            let mut model: BTreeMap<i32, char> = left.iter().map(|&key| (key, 'l')).collect();
            model.extend(right.iter().map(|&key| (key, 'r')));

            tree.merge(&mut other);
            tree.validate_invariants();
            prop_assert!(other.is_empty());
            prop_assert_eq!(entries_of(&tree), model.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn merge_with_duplicates_is_a_sorted_concatenation(
            left in prop::collection::vec(0i32..50, 0..150),
            right in prop::collection::vec(0i32..50, 0..150),
        ) {
            let mut tree = tree_of(Duplicates::Allow, &left.iter().map(|&key| (key, 'l')).collect::<Vec<_>>());
            let mut other = tree_of(Duplicates::Allow, &right.iter().map(|&key| (key, 'r')).collect::<Vec<_>>());

            tree.merge(&mut other);
            tree.validate_invariants();

            let mut expected: Vec<i32> = left.iter().chain(&right).copied().collect();
            expected.sort_unstable();
            let keys: Vec<_> = tree.iter().map(|(key, _)| *key).collect();
            prop_assert_eq!(keys, expected);
        }
    }
}
