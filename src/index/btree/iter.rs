//! Lazy range iteration.

use std::iter::FusedIterator;
use std::ops::Bound;

use crate::index::btree::node::{Node, Seek};
use crate::index::btree::Comparator;

/// Walk order for range iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest key first.
    Ascending,
    /// Largest key first.
    Descending,
}

/// One node on the path from the root to the next entry.
///
/// Ascending: `position` is the next entry index to yield.
/// Descending: `position` is one past the next entry index to yield.
struct Frame<'a, K, V> {
    node: &'a Node<K, V>,
    position: usize,
}

/// A lazy iterator over tree entries in key order.
///
/// Holds a stack of at most `height` frames; nothing is buffered. Created by
/// [`BTree::range`](crate::BTree::range), [`BTree::iter`](crate::BTree::iter)
/// and [`BTree::iter_rev`](crate::BTree::iter_rev).
pub struct Range<'a, K, V> {
    stack: Vec<Frame<'a, K, V>>,
    direction: Direction,
}

impl<'a, K, V> Range<'a, K, V> {
    /// Position a new iterator at the first entry at or past `from`.
    pub(crate) fn new<C: Comparator<K>>(
        root: &'a Node<K, V>,
        cmp: &C,
        from: Bound<&K>,
        direction: Direction,
    ) -> Self {
        let mut range = Range {
            stack: Vec::with_capacity(root.height()),
            direction,
        };

        let mut node = root;
        loop {
            let (position, descend) = match (direction, node.seek(cmp, from, direction)) {
                (Direction::Ascending, Seek::OnEntry(index)) => (index, None),
                (Direction::Ascending, Seek::AfterEntry(index)) => (index + 1, Some(index + 1)),
                (Direction::Ascending, Seek::Between(index)) => (index, Some(index)),
                (Direction::Descending, Seek::OnEntry(index)) => (index + 1, None),
                (Direction::Descending, Seek::AfterEntry(index) | Seek::Between(index)) => {
                    (index, Some(index))
                }
            };
            range.stack.push(Frame { node, position });

            match descend.and_then(|index| node.children.get(index)) {
                Some(child) => node = child,
                None => break,
            }
        }
        range
    }

    /// Push `node` and the edge of its subtree nearest the walk's start.
    fn push_edge(&mut self, mut node: &'a Node<K, V>) {
        loop {
            let (position, child) = match self.direction {
                Direction::Ascending => (0, node.children.first()),
                Direction::Descending => (node.len(), node.children.last()),
            };
            self.stack.push(Frame { node, position });
            match child {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;

            let (index, child) = match self.direction {
                Direction::Ascending => {
                    if frame.position >= node.len() {
                        self.stack.pop();
                        continue;
                    }
                    let index = frame.position;
                    frame.position += 1;
                    (index, node.children.get(index + 1))
                }
                Direction::Descending => {
                    if frame.position == 0 {
                        self.stack.pop();
                        continue;
                    }
                    frame.position -= 1;
                    let index = frame.position;
                    (index, node.children.get(index))
                }
            };

            if let Some(child) = child {
                self.push_edge(child);
            }
            return Some(node.entries[index].as_pair());
        }
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::btree::NaturalOrder;
    use crate::BTree;

    fn tree(keys: impl IntoIterator<Item = i32>) -> BTree<i32, i32> {
        let mut tree = BTree::new(2).unwrap();
        for k in keys {
            tree.put(k, k);
        }
        tree
    }

    fn collect(range: Range<'_, i32, i32>) -> Vec<i32> {
        range.map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_empty_tree() {
        let root: Node<i32, i32> = Node::new();
        let range = Range::new(&root, &NaturalOrder, Bound::Unbounded, Direction::Ascending);
        assert_eq!(collect(range), Vec::<i32>::new());

        let range = Range::new(&root, &NaturalOrder, Bound::Included(&3), Direction::Descending);
        assert_eq!(collect(range), Vec::<i32>::new());
    }

    #[test]
    fn test_full_scan_both_directions() {
        let t = tree((1..=50).rev());
        assert_eq!(collect(t.iter()), (1..=50).collect::<Vec<_>>());
        assert_eq!(collect(t.iter_rev()), (1..=50).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_bounds_on_present_key() {
        let t = tree((0..100).map(|k| k * 2));

        assert_eq!(
            collect(t.range(Bound::Included(&90), Direction::Ascending)).first(),
            Some(&90)
        );
        assert_eq!(
            collect(t.range(Bound::Excluded(&90), Direction::Ascending)).first(),
            Some(&92)
        );
        assert_eq!(
            collect(t.range(Bound::Included(&90), Direction::Descending)).first(),
            Some(&90)
        );
        assert_eq!(
            collect(t.range(Bound::Excluded(&90), Direction::Descending)).first(),
            Some(&88)
        );
    }

    #[test]
    fn test_bounds_on_absent_key() {
        let t = tree((0..100).map(|k| k * 2));

        let up = collect(t.range(Bound::Included(&91), Direction::Ascending));
        assert_eq!(up.len(), 54);
        assert_eq!(up.first(), Some(&92));

        let down = collect(t.range(Bound::Excluded(&91), Direction::Descending));
        assert_eq!(down.len(), 46);
        assert_eq!(down.first(), Some(&90));
        assert_eq!(down.last(), Some(&0));
    }

    #[test]
    fn test_bounds_past_the_ends() {
        let t = tree(10..20);

        assert!(collect(t.range(Bound::Excluded(&19), Direction::Ascending)).is_empty());
        assert!(collect(t.range(Bound::Included(&100), Direction::Ascending)).is_empty());
        assert!(collect(t.range(Bound::Excluded(&10), Direction::Descending)).is_empty());
        assert_eq!(collect(t.range(Bound::Included(&-5), Direction::Ascending)).len(), 10);
        assert_eq!(collect(t.range(Bound::Included(&100), Direction::Descending)).len(), 10);
    }

    #[test]
    fn test_fused() {
        let t = tree(0..3);
        let mut it = t.iter();
        assert_eq!(it.by_ref().count(), 3);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }
}
