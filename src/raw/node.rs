use core::ops::{Index, IndexMut};

use super::handle::Handle;

/// Balancing tag of a node. Absent children count as `Black`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A red-black tree node.
///
/// The key lives in the node; the value lives in the tree's value arena so that mutable
/// value iteration never aliases the link fields walked to find the next node.
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    color: Color,
    parent: Option<Handle>,
    children: [Option<Handle>; 2],
}

impl<K> Node<K> {
    /// Creates a detached red node.
    pub(crate) fn new(key: K, value: Handle) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent: None,
            children: [None, None],
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self[Side::Left]
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self[Side::Right]
    }

    /// Clears all three links, leaving the color untouched.
    pub(crate) fn unlink(&mut self) {
        self.parent = None;
        self.children = [None, None];
    }

    pub(crate) fn into_parts(self) -> (K, Handle) {
        (self.key, self.value)
    }
}

impl<K> Index<Side> for Node<K> {
    type Output = Option<Handle>;

    #[inline]
    fn index(&self, side: Side) -> &Option<Handle> {
        match side {
            Side::Left => &self.children[0],
            Side::Right => &self.children[1],
        }
    }
}

impl<K> IndexMut<Side> for Node<K> {
    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut Option<Handle> {
        match side {
            Side::Left => &mut self.children[0],
            Side::Right => &mut self.children[1],
        }
    }
}
