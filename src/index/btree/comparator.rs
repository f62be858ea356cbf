//! Key ordering.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// The tree never calls `Ord` on keys directly; every comparison goes
/// through the comparator it was built with. Implementations must be a
/// consistent total order. If they are not, lookups may miss keys and
/// [`BTree::validate`](crate::BTree::validate) will report violations, but
/// nothing becomes memory-unsafe.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator:
/// ```
/// use btree_index::Comparator;
/// use std::cmp::Ordering;
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"ab", &"abc"), Ordering::Less);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compare `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_order() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.compare(&2, &2), Ordering::Equal);
        assert_eq!(NaturalOrder.compare("b", "a"), Ordering::Greater);
    }

    #[test]
    fn test_closure_comparator() {
        let reverse = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(reverse.compare(&1, &2), Ordering::Greater);
        assert_eq!(reverse.compare(&3, &3), Ordering::Equal);
    }
}
