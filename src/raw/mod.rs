mod arena;
mod handle;
mod merge;
mod node;
mod raw_rb_tree;

pub(crate) use handle::Handle;
pub(crate) use node::Side;
pub(crate) use raw_rb_tree::{Duplicates, InsertResult, RawIter, RawIterMut, RawRange, RawRbTree};
