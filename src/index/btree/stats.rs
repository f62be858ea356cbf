//! Restructuring statistics.

use std::fmt;

/// Counts of the structural changes made to a tree.
///
/// The node algorithms bump these as they split, borrow and merge. Every
/// mutation already holds `&mut` on the tree, so plain integers suffice.
///
/// # Example
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for i in 0..4 {
///     tree.put(i, ());
/// }
/// // Four keys overflow a degree-2 root once.
/// assert_eq!(tree.stats().root_splits, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes split into two (root splits included).
    pub splits: u64,

    /// Splits of the root, each adding one level to the tree.
    pub root_splits: u64,

    /// Thin children fixed by rotating an entry in from the left sibling.
    pub borrows_left: u64,

    /// Thin children fixed by rotating an entry in from the right sibling.
    pub borrows_right: u64,

    /// Sibling pairs merged into one node.
    pub merges: u64,

    /// Empty roots replaced by their only child, each removing one level.
    pub root_collapses: u64,
}

impl TreeStats {
    /// Total borrow operations in either direction.
    pub fn borrows(&self) -> u64 {
        self.borrows_left + self.borrows_right
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {} (root: {}), borrows: {} (left: {}, right: {}), merges: {}, root_collapses: {} }}",
            self.splits,
            self.root_splits,
            self.borrows(),
            self.borrows_left,
            self.borrows_right,
            self.merges,
            self.root_collapses
        )
    }
}
