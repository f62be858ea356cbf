//! Configuration constants for the B-tree.

/// Smallest legal degree.
///
/// Degree 2 gives nodes of 1..=3 entries (a 2-3-4 tree). Degree 1 would
/// allow empty non-root nodes and a capacity of one entry, which cannot be
/// split into two legal halves.
pub const MIN_DEGREE: usize = 2;

/// Degree used by [`BTree::default`](crate::BTree) and `FromIterator`.
///
/// With 32 the fullest node holds 63 entries, so a binary search inside a
/// node stays within a handful of cache lines for small keys.
pub const DEFAULT_DEGREE: usize = 32;

/// Largest legal degree.
///
/// `max_items = 2 * degree - 1` must fit in a `usize`.
pub const MAX_DEGREE: usize = usize::MAX / 2;

/// Minimum number of entries in a non-root node.
#[inline]
pub const fn min_items(degree: usize) -> usize {
    degree - 1
}

/// Maximum number of entries in any node.
#[inline]
pub const fn max_items(degree: usize) -> usize {
    degree * 2 - 1
}
