use core::fmt;

/// The error returned by [`RbTreeMap::at`](crate::RbTreeMap::at) and
/// [`RbTreeMap::at_mut`](crate::RbTreeMap::at_mut) when the key is absent.
///
/// # Examples
///
/// ```
/// use rb_collections::{OutOfRange, RbTreeMap};
///
/// let map: RbTreeMap<i32, &str> = RbTreeMap::new();
/// assert_eq!(map.at(&1), Err(OutOfRange));
/// assert_eq!(OutOfRange.to_string(), "key not found in RbTreeMap");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found in RbTreeMap")
    }
}

impl core::error::Error for OutOfRange {}
