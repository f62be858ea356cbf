//! Key/value record stored in a node.

use std::fmt;

/// An owned key/value pair.
///
/// Entries inside a node are kept in strictly ascending key order.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Borrow as a `(key, value)` pair.
    #[inline]
    pub(crate) fn as_pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Consume into a `(key, value)` pair.
    #[inline]
    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{:?}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::new(7, "seven");
        assert_eq!(entry.as_pair(), (&7, &"seven"));
        assert_eq!(entry.into_pair(), (7, "seven"));
    }

    #[test]
    fn test_entry_debug() {
        assert_eq!(format!("{:?}", Entry::new(1, 'a')), "1:'a'");
    }
}
