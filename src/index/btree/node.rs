//! B-tree node and the recursive maintenance algorithms.
//!
//! A [`Node`] is a sorted run of entries interleaved with owned children:
//!
//! ```text
//!            entries:   [ e0 | e1 | e2 ]
//!            children: c0   c1   c2   c3
//!
//!   keys(c0) < e0 < keys(c1) < e1 < keys(c2) < e2 < keys(c3)
//! ```
//!
//! A leaf has no children; an internal node has exactly `entries + 1`.
//! Nodes hold no parent pointers. Every algorithm here works top-down and
//! fixes a child *before* descending into it:
//! - insert splits a full child so the descent never has to split twice
//! - remove grows a thin child so the descent never has to rebalance upward

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::{Bound, ControlFlow};

use crate::index::btree::{Comparator, Direction, Entry, TreeStats};

/// A single tree node.
pub(crate) struct Node<K, V> {
    pub(crate) entries: Vec<Entry<K, V>>,
    pub(crate) children: Vec<Box<Node<K, V>>>,
}

impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Node<K, V> {
    /// Create an empty leaf.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Binary-search this node's entries.
    ///
    /// `Ok(i)` if `entries[i]` holds `key`, otherwise `Err(i)` with the
    /// insertion point, which is also the index of the child whose subtree
    /// brackets `key`.
    #[inline]
    pub(crate) fn search<C: Comparator<K>>(&self, cmp: &C, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| cmp.compare(&e.key, key))
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub(crate) fn get<C: Comparator<K>>(&self, cmp: &C, key: &K) -> Option<&V> {
        let mut node = self;
        loop {
            match node.search(cmp, key) {
                Ok(index) => return Some(&node.entries[index].value),
                Err(_) if node.is_leaf() => return None,
                Err(index) => node = &node.children[index],
            }
        }
    }

    pub(crate) fn get_mut<C: Comparator<K>>(&mut self, cmp: &C, key: &K) -> Option<&mut V> {
        match self.search(cmp, key) {
            Ok(index) => Some(&mut self.entries[index].value),
            Err(_) if self.is_leaf() => None,
            Err(index) => self.children[index].get_mut(cmp, key),
        }
    }

    /// Leftmost entry of this subtree.
    pub(crate) fn min(&self) -> Option<&Entry<K, V>> {
        let mut node = self;
        while let Some(first) = node.children.first() {
            node = first;
        }
        node.entries.first()
    }

    /// Rightmost entry of this subtree.
    pub(crate) fn max(&self) -> Option<&Entry<K, V>> {
        let mut node = self;
        while let Some(last) = node.children.last() {
            node = last;
        }
        node.entries.last()
    }

    /// Number of levels from this node down to its leaves.
    pub(crate) fn height(&self) -> usize {
        let mut node = self;
        let mut height = 1;
        while let Some(first) = node.children.first() {
            node = first;
            height += 1;
        }
        height
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Split this node around `entries[at]`.
    ///
    /// `self` keeps `entries[..at]` and `children[..=at]`; the median and a
    /// new right node holding everything after it are returned.
    fn split(&mut self, at: usize) -> (Entry<K, V>, Node<K, V>) {
        let right_entries = self.entries.split_off(at + 1);
        let median = self.entries.remove(at);
        let right_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(at + 1)
        };

        let right = Node {
            entries: right_entries,
            children: right_children,
        };
        (median, right)
    }

    /// Split `children[index]` if it holds at least `max_items` entries.
    ///
    /// The child's median moves up into `entries[index]` and the new right
    /// half becomes `children[index + 1]`.
    pub(crate) fn try_split_child(
        &mut self,
        index: usize,
        max_items: usize,
        stats: &mut TreeStats,
    ) -> bool {
        if self.children[index].len() < max_items {
            return false;
        }

        let (median, right) = self.children[index].split(max_items / 2);
        self.entries.insert(index, median);
        self.children.insert(index + 1, Box::new(right));
        stats.splits += 1;
        true
    }

    /// Insert or overwrite `key`, returning the previous value.
    ///
    /// The root may end up with `max_items + 1` entries; the tree splits it.
    /// Any other node on the path is split before it is entered, so it
    /// never exceeds `max_items`.
    pub(crate) fn insert<C: Comparator<K>>(
        &mut self,
        cmp: &C,
        max_items: usize,
        key: K,
        value: V,
        stats: &mut TreeStats,
    ) -> Option<V> {
        let mut index = match self.search(cmp, &key) {
            Ok(index) => return Some(mem::replace(&mut self.entries[index].value, value)),
            Err(index) => index,
        };

        if self.is_leaf() {
            self.entries.insert(index, Entry::new(key, value));
            return None;
        }

        if self.try_split_child(index, max_items, stats) {
            // The promoted median now sits at `index`; it may be the key itself.
            match cmp.compare(&self.entries[index].key, &key) {
                Ordering::Equal => {
                    return Some(mem::replace(&mut self.entries[index].value, value));
                }
                Ordering::Less => index += 1,
                Ordering::Greater => {}
            }
        }

        self.children[index].insert(cmp, max_items, key, value, stats)
    }

    // ========================================================================
    // Rebalancing
    // ========================================================================

    /// Grow `children[index]` if it holds `min_items` entries or fewer.
    ///
    /// Policy, in order:
    /// 1. borrow from the left sibling if it can spare an entry
    /// 2. borrow from the right sibling if it can spare an entry
    /// 3. merge with a sibling: `index` with `index + 1`, or with
    ///    `index - 1` when `index` is the last child; the left node survives
    ///
    /// Returns `true` if the tree was restructured.
    pub(crate) fn try_merge_child(
        &mut self,
        index: usize,
        min_items: usize,
        stats: &mut TreeStats,
    ) -> bool {
        if self.children[index].len() > min_items {
            return false;
        }

        if index > 0 && self.children[index - 1].len() > min_items {
            self.borrow_from_left(index);
            stats.borrows_left += 1;
        } else if index + 1 < self.children.len() && self.children[index + 1].len() > min_items {
            self.borrow_from_right(index);
            stats.borrows_right += 1;
        } else {
            let left = if index + 1 == self.children.len() {
                index - 1
            } else {
                index
            };
            self.merge_children(left);
            stats.merges += 1;
        }
        true
    }

    /// Rotate `children[index - 1]`'s last entry up and the separator down.
    fn borrow_from_left(&mut self, index: usize) {
        let (head, tail) = self.children.split_at_mut(index);
        let prev = &mut head[index - 1];
        let curr = &mut tail[0];

        let borrowed = prev.entries.remove(prev.entries.len() - 1);
        let separator = mem::replace(&mut self.entries[index - 1], borrowed);
        curr.entries.insert(0, separator);

        if !curr.is_leaf() {
            let child = prev.children.remove(prev.children.len() - 1);
            curr.children.insert(0, child);
        }
    }

    /// Rotate `children[index + 1]`'s first entry up and the separator down.
    fn borrow_from_right(&mut self, index: usize) {
        let (head, tail) = self.children.split_at_mut(index + 1);
        let curr = &mut head[index];
        let next = &mut tail[0];

        let borrowed = next.entries.remove(0);
        let separator = mem::replace(&mut self.entries[index], borrowed);
        curr.entries.push(separator);

        if !curr.is_leaf() {
            curr.children.push(next.children.remove(0));
        }
    }

    /// Fold `children[index + 1]` and `entries[index]` into `children[index]`.
    fn merge_children(&mut self, index: usize) {
        let next = self.children.remove(index + 1);
        let separator = self.entries.remove(index);

        let Node { entries, children } = *next;
        let curr = &mut self.children[index];
        curr.entries.push(separator);
        curr.entries.extend(entries);
        curr.children.extend(children);
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove `key` from this subtree, returning its value.
    ///
    /// A key found in an internal node is replaced by its in-order
    /// predecessor, the maximum of the subtree to its left.
    pub(crate) fn remove<C: Comparator<K>>(
        &mut self,
        cmp: &C,
        min_items: usize,
        key: &K,
        stats: &mut TreeStats,
    ) -> Option<V> {
        loop {
            let found = self.search(cmp, key);

            if self.is_leaf() {
                return found.ok().map(|index| self.entries.remove(index).value);
            }

            let (Ok(index) | Err(index)) = found;
            if self.try_merge_child(index, min_items, stats) {
                // Entries moved between this node and its children; search again.
                continue;
            }

            return match found {
                Ok(index) => {
                    let predecessor = self.children[index].remove_max(min_items, stats)?;
                    Some(mem::replace(&mut self.entries[index], predecessor).value)
                }
                Err(index) => self.children[index].remove(cmp, min_items, key, stats),
            };
        }
    }

    /// Detach the leftmost entry of this subtree.
    pub(crate) fn remove_min(&mut self, min_items: usize, stats: &mut TreeStats) -> Option<Entry<K, V>> {
        loop {
            if self.is_leaf() {
                return if self.entries.is_empty() {
                    None
                } else {
                    Some(self.entries.remove(0))
                };
            }
            if self.try_merge_child(0, min_items, stats) {
                continue;
            }
            return self.children[0].remove_min(min_items, stats);
        }
    }

    /// Detach the rightmost entry of this subtree.
    pub(crate) fn remove_max(&mut self, min_items: usize, stats: &mut TreeStats) -> Option<Entry<K, V>> {
        loop {
            if self.is_leaf() {
                return self.entries.pop();
            }
            let last = self.children.len() - 1;
            if self.try_merge_child(last, min_items, stats) {
                continue;
            }
            return self.children[last].remove_max(min_items, stats);
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Visit entries starting at `from`, in `direction`, until `visit` breaks.
    ///
    /// Returns `ControlFlow::Break` as soon as the visitor does, so callers
    /// up the recursion stop without touching any more nodes.
    pub(crate) fn iterate<C, F>(
        &self,
        cmp: &C,
        from: Bound<&K>,
        direction: Direction,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        C: Comparator<K>,
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        match direction {
            Direction::Ascending => {
                let (start, descend_first) = match self.seek(cmp, from, direction) {
                    Seek::OnEntry(index) => (index, false),
                    Seek::AfterEntry(index) => (index + 1, true),
                    Seek::Between(index) => (index, true),
                };
                if descend_first && !self.is_leaf() {
                    self.children[start].iterate(cmp, from, direction, visit)?;
                }
                for index in start..self.entries.len() {
                    let entry = &self.entries[index];
                    visit(&entry.key, &entry.value)?;
                    if !self.is_leaf() {
                        self.children[index + 1].iterate(cmp, Bound::Unbounded, direction, visit)?;
                    }
                }
            }
            Direction::Descending => {
                let (end, descend_first) = match self.seek(cmp, from, direction) {
                    Seek::OnEntry(index) => (index + 1, false),
                    Seek::AfterEntry(index) | Seek::Between(index) => (index, true),
                };
                if descend_first && !self.is_leaf() {
                    self.children[end].iterate(cmp, from, direction, visit)?;
                }
                for index in (0..end).rev() {
                    let entry = &self.entries[index];
                    visit(&entry.key, &entry.value)?;
                    if !self.is_leaf() {
                        self.children[index].iterate(cmp, Bound::Unbounded, direction, visit)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Locate where a walk starting at `from` begins inside this node.
    pub(crate) fn seek<C: Comparator<K>>(&self, cmp: &C, from: Bound<&K>, direction: Direction) -> Seek {
        match from {
            Bound::Unbounded => match direction {
                Direction::Ascending => Seek::Between(0),
                Direction::Descending => Seek::Between(self.entries.len()),
            },
            Bound::Included(key) => match self.search(cmp, key) {
                Ok(index) => Seek::OnEntry(index),
                Err(index) => Seek::Between(index),
            },
            Bound::Excluded(key) => match self.search(cmp, key) {
                Ok(index) => Seek::AfterEntry(index),
                Err(index) => Seek::Between(index),
            },
        }
    }
}

/// Where a bounded walk starts within one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Seek {
    /// The bound is an inclusive match on `entries[i]`: start there, no
    /// child on the near side can contain keys in range.
    OnEntry(usize),
    /// The bound is an exclusive match on `entries[i]`: skip it, but the
    /// adjacent child on the walking side is entirely in range.
    AfterEntry(usize),
    /// The bound falls inside `children[i]`.
    Between(usize),
}

// ============================================================================
// Validation
// ============================================================================

/// Bounds and expectations for checking one subtree.
pub(crate) struct Check<'a, K> {
    pub(crate) min_items: usize,
    pub(crate) max_items: usize,
    pub(crate) lower: Option<&'a K>,
    pub(crate) upper: Option<&'a K>,
    pub(crate) depth: usize,
}

impl<K, V> Node<K, V> {
    /// Verify shape and ordering of this subtree.
    ///
    /// `leaf_depth` records the depth of the first leaf seen so every other
    /// leaf can be compared against it. Returns the number of entries.
    pub(crate) fn check<C: Comparator<K>>(
        &self,
        cmp: &C,
        check: Check<'_, K>,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, String> {
        let is_root = check.depth == 0;
        if self.len() > check.max_items {
            return Err(format!(
                "node at depth {} holds {} entries, max is {}",
                check.depth,
                self.len(),
                check.max_items
            ));
        }
        if !is_root && self.len() < check.min_items {
            return Err(format!(
                "node at depth {} holds {} entries, min is {}",
                check.depth,
                self.len(),
                check.min_items
            ));
        }
        if !self.is_leaf() && self.children.len() != self.len() + 1 {
            return Err(format!(
                "node at depth {} has {} entries but {} children",
                check.depth,
                self.len(),
                self.children.len()
            ));
        }
        if is_root && !self.is_leaf() && self.entries.is_empty() {
            return Err("internal root has no entries".to_string());
        }

        for pair in self.entries.windows(2) {
            if cmp.compare(&pair[0].key, &pair[1].key) != Ordering::Less {
                return Err(format!("entries out of order at depth {}", check.depth));
            }
        }
        if let (Some(lower), Some(first)) = (check.lower, self.entries.first()) {
            if cmp.compare(lower, &first.key) != Ordering::Less {
                return Err(format!("key below its separator at depth {}", check.depth));
            }
        }
        if let (Some(upper), Some(last)) = (check.upper, self.entries.last()) {
            if cmp.compare(&last.key, upper) != Ordering::Less {
                return Err(format!("key above its separator at depth {}", check.depth));
            }
        }

        if self.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(check.depth),
                Some(expected) if expected != check.depth => {
                    return Err(format!(
                        "leaf at depth {} but an earlier leaf is at depth {}",
                        check.depth, expected
                    ));
                }
                Some(_) => {}
            }
            return Ok(self.len());
        }

        let mut count = self.len();
        for (index, child) in self.children.iter().enumerate() {
            let lower = if index == 0 {
                check.lower
            } else {
                Some(&self.entries[index - 1].key)
            };
            let upper = self.entries.get(index).map(|e| &e.key).or(check.upper);
            count += child.check(
                cmp,
                Check {
                    min_items: check.min_items,
                    max_items: check.max_items,
                    lower,
                    upper,
                    depth: check.depth + 1,
                },
                leaf_depth,
            )?;
        }
        Ok(count)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Node<K, V> {
    /// Formats the node's own entries as `|k:v|k:v|`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "|{:?}", entry)?;
        }
        f.write_str("|")
    }
}
