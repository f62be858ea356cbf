//! Error types for the B-tree.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the tree.
///
/// A missing key or an empty tree is not an error: lookups and removals
/// report those through `Option`. The variants here are programmer errors
/// (a bad degree) and corruption reported by [`BTree::validate`](crate::BTree::validate).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The degree given at construction is outside `[min, max]`.
    #[error("degree {degree} is out of range [{min}, {max}]")]
    DegreeOutOfRange {
        degree: usize,
        min: usize,
        max: usize,
    },

    /// A structural invariant does not hold.
    ///
    /// This indicates a bug in the tree or a comparator that is not a
    /// total order.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
