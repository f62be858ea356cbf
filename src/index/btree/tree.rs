//! The tree handle: root ownership and the public API.

use std::fmt;
use std::mem;
use std::ops::{Bound, ControlFlow};

use tracing::{debug, trace, warn};

use crate::common::{Degree, Error, Result};
use crate::index::btree::node::{Check, Node};
use crate::index::btree::{Comparator, Direction, NaturalOrder, Range, TreeStats};

/// An in-memory B-tree ordered map.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                       BTree<K, V, C>                     │
/// │  ┌────────────┐  ┌────────────┐  ┌────────────────────┐  │
/// │  │ cmp: C     │  │ degree     │  │ stats: TreeStats   │  │
/// │  └────────────┘  └────────────┘  └────────────────────┘  │
/// │  ┌────────────────────────────────────────────────────┐  │
/// │  │ root: Node ──▶ Box<Node> ... ──▶ leaves            │  │
/// │  └────────────────────────────────────────────────────┘  │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// The tree owns the root and is the only place the height changes:
/// - `put` grows a level when the root overflows
/// - `delete`/`pop_*` drop a level when the root empties around one child
///
/// Every other structural change happens inside [`Node`].
///
/// # Thread Safety
/// None internally. Mutations take `&mut self`, so sharing across threads
/// needs an outer lock chosen by the caller.
///
/// # Usage
/// ```
/// use btree_index::{BTree, Direction};
/// use std::ops::Bound;
///
/// let mut tree = BTree::new(2).unwrap();
/// for k in [10, 20, 30] {
///     tree.put(k, k.to_string());
/// }
///
/// assert_eq!(tree.get(&20).map(String::as_str), Some("20"));
/// assert_eq!(tree.put(20, "twenty".into()).as_deref(), Some("20"));
///
/// let keys: Vec<_> = tree
///     .range(Bound::Excluded(&15), Direction::Ascending)
///     .map(|(k, _)| *k)
///     .collect();
/// assert_eq!(keys, vec![20, 30]);
/// ```
pub struct BTree<K, V, C = NaturalOrder> {
    /// Ordering used for every key comparison.
    cmp: C,

    /// Fixed occupancy bounds (immutable after construction).
    degree: Degree,

    /// Never absent: an empty tree is a single empty leaf.
    root: Node<K, V>,

    /// Number of entries.
    len: usize,

    /// Restructuring counters.
    stats: TreeStats,
}

impl<K: Ord, V> BTree<K, V, NaturalOrder> {
    /// Create an empty tree ordered by `K: Ord`.
    ///
    /// # Errors
    /// - `Error::DegreeOutOfRange` if `degree < 2`
    pub fn new(degree: usize) -> Result<Self> {
        Self::with_comparator(NaturalOrder, degree)
    }
}

impl<K: Ord, V> Default for BTree<K, V, NaturalOrder> {
    /// An empty tree with [`DEFAULT_DEGREE`](crate::common::config::DEFAULT_DEGREE).
    fn default() -> Self {
        Self::with_degree(NaturalOrder, Degree::default())
    }
}

impl<K, V, C: Comparator<K>> BTree<K, V, C> {
    /// Create an empty tree ordered by `cmp`.
    ///
    /// # Arguments
    /// * `cmp` - Total order over keys, fixed for the tree's lifetime
    /// * `degree` - Branching factor; nodes hold `degree - 1 ..= 2 * degree - 1` entries
    ///
    /// # Errors
    /// - `Error::DegreeOutOfRange` if `degree < 2` or too large to size a node
    ///
    /// # Example
    /// ```
    /// use btree_index::BTree;
    ///
    /// // Longest string first.
    /// let mut tree = BTree::with_comparator(
    ///     |a: &String, b: &String| b.len().cmp(&a.len()).then_with(|| a.cmp(b)),
    ///     4,
    /// )
    /// .unwrap();
    /// tree.put("a".to_string(), 1);
    /// tree.put("abc".to_string(), 3);
    /// assert_eq!(tree.min().map(|(k, _)| k.as_str()), Some("abc"));
    /// ```
    pub fn with_comparator(cmp: C, degree: usize) -> Result<Self> {
        let degree = Degree::new(degree)?;
        Ok(Self::with_degree(cmp, degree))
    }

    /// Create an empty tree from an already validated [`Degree`].
    pub fn with_degree(cmp: C, degree: Degree) -> Self {
        debug!(
            degree = degree.get(),
            min_items = degree.min_items(),
            max_items = degree.max_items(),
            "created b-tree"
        );
        Self {
            cmp,
            degree,
            root: Node::new(),
            len: 0,
            stats: TreeStats::default(),
        }
    }

    // ========================================================================
    // Public API: Lookup
    // ========================================================================

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.root.get(&self.cmp, key)
    }

    /// Look up the value stored under `key` for modification.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.root.get_mut(&self.cmp, key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Smallest key and its value, or `None` if the tree is empty.
    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.min().map(|e| e.as_pair())
    }

    /// Largest key and its value, or `None` if the tree is empty.
    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.max().map(|e| e.as_pair())
    }

    // ========================================================================
    // Public API: Mutation
    // ========================================================================

    /// Insert `key`, returning the value it replaced.
    ///
    /// If `key` was already present its value is overwritten in place and
    /// the stored key is kept.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let max_items = self.degree.max_items();
        let old = self
            .root
            .insert(&self.cmp, max_items, key, value, &mut self.stats);

        if old.is_none() {
            self.len += 1;
        }

        // A split below can still overflow the root when the key was found
        // as a promoted median, so this check does not depend on `old`.
        if self.root.len() > max_items {
            let old_root = mem::take(&mut self.root);
            self.root.children.push(Box::new(old_root));
            self.root.try_split_child(0, max_items, &mut self.stats);
            self.stats.root_splits += 1;
            trace!(height = self.height(), len = self.len, "root split");
        }
        old
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let min_items = self.degree.min_items();
        let old = self.root.remove(&self.cmp, min_items, key, &mut self.stats);
        self.after_remove(old.is_some());
        old
    }

    /// Remove and return the smallest entry.
    pub fn pop_min(&mut self) -> Option<(K, V)> {
        let min_items = self.degree.min_items();
        let entry = self.root.remove_min(min_items, &mut self.stats);
        self.after_remove(entry.is_some());
        entry.map(|e| e.into_pair())
    }

    /// Remove and return the largest entry.
    pub fn pop_max(&mut self) -> Option<(K, V)> {
        let min_items = self.degree.min_items();
        let entry = self.root.remove_max(min_items, &mut self.stats);
        self.after_remove(entry.is_some());
        entry.map(|e| e.into_pair())
    }

    /// Remove every entry. The degree, comparator and stats are kept.
    pub fn clear(&mut self) {
        self.root = Node::new();
        self.len = 0;
    }

    /// Shared tail of every removal: count and root collapse.
    fn after_remove(&mut self, removed: bool) {
        if removed {
            self.len -= 1;
        }

        // Only a merge under the root can leave it empty with a single child.
        if self.root.entries.is_empty() && self.root.children.len() == 1 {
            if let Some(child) = self.root.children.pop() {
                self.root = *child;
                self.stats.root_collapses += 1;
                trace!(height = self.height(), len = self.len, "root collapsed");
            }
        }
    }

    // ========================================================================
    // Public API: Iteration
    // ========================================================================

    /// Visit entries from `from` in `direction` until `visit` breaks.
    ///
    /// `Bound::Included(k)` starts at `k` if present, `Bound::Excluded(k)`
    /// starts just past it, and `Bound::Unbounded` starts at the first (or,
    /// descending, the last) entry. Returns `ControlFlow::Break(())` if the
    /// visitor stopped the walk early.
    ///
    /// # Example
    /// ```
    /// use btree_index::{BTree, Direction};
    /// use std::ops::{Bound, ControlFlow};
    ///
    /// let tree: BTree<i32, ()> = (0..10).map(|k| (k, ())).collect();
    ///
    /// let mut seen = Vec::new();
    /// let flow = tree.iterate(Bound::Included(&6), Direction::Descending, |k, _| {
    ///     seen.push(*k);
    ///     if seen.len() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    /// });
    /// assert_eq!(seen, vec![6, 5, 4]);
    /// assert!(flow.is_break());
    /// ```
    pub fn iterate<F>(&self, from: Bound<&K>, direction: Direction, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        self.root.iterate(&self.cmp, from, direction, &mut visit)
    }

    /// A lazy iterator starting at `from` in `direction`.
    ///
    /// Same start semantics as [`iterate`](Self::iterate).
    pub fn range(&self, from: Bound<&K>, direction: Direction) -> Range<'_, K, V> {
        Range::new(&self.root, &self.cmp, from, direction)
    }

    /// All entries in ascending key order.
    pub fn iter(&self) -> Range<'_, K, V> {
        self.range(Bound::Unbounded, Direction::Ascending)
    }

    /// All entries in descending key order.
    pub fn iter_rev(&self) -> Range<'_, K, V> {
        self.range(Bound::Unbounded, Direction::Descending)
    }

    // ========================================================================
    // Public API: Shape and diagnostics
    // ========================================================================

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; an empty or single-leaf tree has height 1.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// The degree the tree was built with.
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// The comparator the tree was built with.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Restructuring counters since construction or the last reset.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Reset restructuring counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Check every structural invariant.
    ///
    /// Walks the whole tree, so this is for tests and debugging.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` describing the first violation found:
    ///   occupancy out of bounds, wrong child count, keys out of order,
    ///   leaves at different depths, or a stale entry count
    pub fn validate(&self) -> Result<()> {
        let mut leaf_depth = None;
        let check = Check {
            min_items: self.degree.min_items(),
            max_items: self.degree.max_items(),
            lower: None,
            upper: None,
            depth: 0,
        };

        let count = self
            .root
            .check(&self.cmp, check, &mut leaf_depth)
            .map_err(|reason| {
                warn!(%reason, "b-tree invariant violated");
                Error::InvariantViolation(reason)
            })?;

        if count != self.len {
            warn!(counted = count, recorded = self.len, "b-tree length mismatch");
            return Err(Error::InvariantViolation(format!(
                "tree records {} entries but holds {}",
                self.len, count
            )));
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> BTree<K, V, C> {
    /// Level-order dump, one line per level, nodes as `|k:v|k:v|`.
    ///
    /// Diagnostic only; the format is not stable.
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(2).unwrap();
    /// for k in 1..=4 {
    ///     tree.put(k, k * 10);
    /// }
    /// assert_eq!(tree.to_debug_string(), "|2:20|  \n|1:10|  |3:30|4:40|  \n");
    /// ```
    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        let mut level: Vec<&Node<K, V>> = vec![&self.root];
        while !level.is_empty() {
            let mut next = Vec::new();
            for node in &level {
                out.push_str(&format!("{:?}  ", node));
                next.extend(node.children.iter().map(|c| &**c));
            }
            out.push('\n');
            level = next;
        }
        out
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Comparator<K>> fmt::Debug for BTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a BTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BTree<K, V, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for BTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::MAX_DEGREE;

    fn tree_with(degree: usize, keys: &[i32]) -> BTree<i32, i32> {
        let mut tree = BTree::new(degree).unwrap();
        for &k in keys {
            tree.put(k, k * 10);
        }
        tree
    }

    #[test]
    fn test_new_rejects_bad_degree() {
        assert!(matches!(
            BTree::<i32, i32>::new(0),
            Err(Error::DegreeOutOfRange { degree: 0, .. })
        ));
        assert!(matches!(
            BTree::<i32, i32>::new(1),
            Err(Error::DegreeOutOfRange { degree: 1, .. })
        ));
        assert!(BTree::<i32, i32>::new(2).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: BTree<i32, i32> = BTree::new(3).unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.get(&1), None);
        assert_eq!(tree.delete(&1), None);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.pop_min(), None);
        assert_eq!(tree.pop_max(), None);
        assert_eq!(tree.height(), 1);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_put_and_overwrite() {
        let mut tree = BTree::new(2).unwrap();

        assert_eq!(tree.put(1, "a"), None);
        assert_eq!(tree.put(1, "b"), Some("a"));
        assert_eq!(tree.get(&1), Some(&"b"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_root_split_grows_height() {
        let tree = tree_with(2, &[10, 20, 30]);
        assert_eq!(tree.height(), 1);

        let tree = tree_with(2, &[10, 20, 30, 40]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.stats().root_splits, 1);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_degree_two_scenario() {
        let mut tree = tree_with(2, &[10, 20, 30, 40, 5]);

        assert!(tree.stats().root_splits >= 1);
        assert_eq!(tree.get(&30), Some(&300));

        assert_eq!(tree.delete(&20), Some(200));
        assert_eq!(tree.get(&20), None);
        for k in [5, 10, 30, 40] {
            assert_eq!(tree.get(&k), Some(&(k * 10)), "missing key {}", k);
        }
        assert_eq!(tree.len(), 4);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_collapses_root() {
        let mut tree = tree_with(2, &[1, 2, 3, 4]);
        assert_eq!(tree.height(), 2);

        tree.delete(&4);
        tree.delete(&3);

        assert_eq!(tree.height(), 1);
        assert_eq!(tree.stats().root_collapses, 1);
        assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_internal_key() {
        let keys: Vec<i32> = (1..=30).collect();
        let mut tree = tree_with(2, &keys);
        let root_key = tree.root.entries[0].key;

        assert_eq!(tree.delete(&root_key), Some(root_key * 10));
        assert_eq!(tree.get(&root_key), None);
        assert_eq!(tree.len(), 29);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_pop_min_and_max() {
        let mut tree = tree_with(3, &[5, 1, 4, 2, 3]);

        assert_eq!(tree.pop_min(), Some((1, 10)));
        assert_eq!(tree.pop_max(), Some((5, 50)));
        assert_eq!(tree.min(), Some((&2, &20)));
        assert_eq!(tree.max(), Some((&4, &40)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_get_mut() {
        let mut tree = tree_with(2, &[1, 2, 3, 4, 5, 6]);

        if let Some(v) = tree.get_mut(&5) {
            *v = -5;
        }

        assert_eq!(tree.get(&5), Some(&-5));
        assert_eq!(tree.get_mut(&99), None);
    }

    #[test]
    fn test_iterate_scenario() {
        let tree = tree_with(2, &[10, 20, 30]);

        let mut up = Vec::new();
        let _ = tree.iterate(Bound::Excluded(&15), Direction::Ascending, |k, _| {
            up.push(*k);
            ControlFlow::Continue(())
        });
        assert_eq!(up, vec![20, 30]);

        let mut down = Vec::new();
        let _ = tree.iterate(Bound::Included(&25), Direction::Descending, |k, _| {
            down.push(*k);
            ControlFlow::Continue(())
        });
        assert_eq!(down, vec![20, 10]);
    }

    #[test]
    fn test_iterate_early_stop() {
        let keys: Vec<i32> = (0..100).collect();
        let tree = tree_with(3, &keys);
        let mut count = 0;

        let flow = tree.iterate(Bound::Unbounded, Direction::Ascending, |_, _| {
            count += 1;
            if count == 7 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(count, 7);
    }

    #[test]
    fn test_custom_comparator_reverses_order() {
        let mut tree = BTree::with_comparator(|a: &i32, b: &i32| b.cmp(a), 2).unwrap();
        for k in 0..10 {
            tree.put(k, ());
        }

        assert_eq!(tree.min().map(|(k, _)| *k), Some(9));
        assert_eq!(tree.max().map(|(k, _)| *k), Some(0));
        assert_eq!(
            tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            (0..10).rev().collect::<Vec<_>>()
        );
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_with(2, &[1, 2, 3, 4, 5]);
        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.get(&3), None);
    }

    #[test]
    fn test_debug_string_levels() {
        let tree = tree_with(2, &[1, 2, 3, 4]);
        let dump = tree.to_debug_string();

        assert_eq!(dump.lines().count(), 2);
        assert!(dump.starts_with("|2:20|"));
    }

    #[test]
    fn test_debug_string_with_huge_degree() {
        let mut tree: BTree<i32, i32> = BTree::new(MAX_DEGREE).unwrap();
        tree.put(1, 10);
        tree.put(2, 20);
        assert_eq!(tree.to_debug_string(), "|1:10|2:20|  \n");

        let mut tree: BTree<i32, i32> = BTree::new(1 << 40).unwrap();
        tree.put(1, 10);
        assert_eq!(tree.to_debug_string(), "|1:10|  \n");
    }

    #[test]
    fn test_debug_as_map() {
        let tree = tree_with(2, &[2, 1]);
        assert_eq!(format!("{:?}", tree), "{1: 10, 2: 20}");
    }

    #[test]
    fn test_validate_catches_corruption() {
        let mut tree = tree_with(2, &[1, 2, 3, 4, 5, 6, 7]);
        tree.root.entries[0].key = 100;

        match tree.validate() {
            Err(Error::InvariantViolation(_)) => {}
            other => panic!("Expected InvariantViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_from_iterator_and_into_iterator() {
        let tree: BTree<i32, char> = vec![(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        let pairs: Vec<(i32, char)> = (&tree).into_iter().map(|(k, v)| (*k, *v)).collect();

        assert_eq!(pairs, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
        assert_eq!(tree.degree(), Degree::default());
    }
}
