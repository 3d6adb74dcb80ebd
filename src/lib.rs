//! Red-black tree ordered collections for Rust.
//!
//! This crate provides [`RbTreeMap`], [`RbTreeSet`] and [`RbTreeMultiset`], ordered
//! collections backed by one red-black tree engine. Alongside the familiar
//! `BTreeMap`/`BTreeSet` style API they offer:
//!
//! - Bidirectional [`Cursor`]s returned by `find`, `lower_bound`, `upper_bound`, `begin`
//!   and `end`, plus [`CursorMut`] for in-place updates and removal
//! - Non-overwriting `insert` that reports whether the key was new, and
//!   [`insert_or_assign`](RbTreeMap::insert_or_assign) when overwriting is wanted
//! - Checked lookups with [`at`](RbTreeMap::at), failing with [`OutOfRange`]
//! - `merge`, which moves another tree's entries in by split and join
//!
//! # Example
//!
//! ```
//! use rb_collections::{RbTreeMap, RbTreeMultiset, RbTreeSet};
//!
//! let mut scores = RbTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Walk from the first name at or after "B".
//! let mut cursor = scores.lower_bound("B");
//! assert_eq!(cursor.key_value(), Some((&"Bob", &85)));
//! cursor.move_next();
//! assert_eq!(cursor.key(), Some(&"Carol"));
//!
//! let mut a = RbTreeSet::from([5, 6]);
//! let mut b = RbTreeSet::from([1, 2, 3, 4]);
//! a.merge(&mut b);
//! assert!(a.iter().eq(&[1, 2, 3, 4, 5, 6]));
//! assert!(b.is_empty());
//!
//! let rolls: RbTreeMultiset<u8> = [3, 3, 3, 1, 2].into_iter().collect();
//! assert_eq!(rolls.count(&3), 3);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) updates** - Insert and remove rebalance with at most three rotations
//! - **O(1) `begin`** - The minimum entry is tracked through every insert and remove
//!
//! # Implementation
//!
//! Nodes live in an arena and link to each other through compact handles instead of
//! pointers. Values are stored in a second arena so the node arena stays dense for
//! searching. Set and multiset are the same tree with `()` values; they differ only in
//! whether equal keys are rejected or kept.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: `IterMut` hands out disjoint `&mut` values from the value arena, which needs unsafe.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod cursor;
pub mod rb_tree_map;
pub mod rb_tree_multiset;
pub mod rb_tree_set;

pub use cursor::{Cursor, CursorMut, SetCursor, SetCursorMut};
pub use error::OutOfRange;
pub use rb_tree_map::RbTreeMap;
pub use rb_tree_multiset::RbTreeMultiset;
pub use rb_tree_set::RbTreeSet;
