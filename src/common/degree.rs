//! Validated branching factor.

use std::fmt;

use crate::common::config::{self, MAX_DEGREE, MIN_DEGREE};
use crate::common::{Error, Result};

/// The branching factor of a tree.
///
/// A degree `d` fixes node occupancy for the lifetime of the tree:
/// - non-root nodes hold at least `d - 1` entries
/// - every node holds at most `2d - 1` entries
///
/// A `Degree` can only be built through [`Degree::new`], so holding one
/// means the value is already in `[MIN_DEGREE, MAX_DEGREE]`.
///
/// # Example
/// ```
/// use btree_index::Degree;
///
/// let degree = Degree::new(3).unwrap();
/// assert_eq!(degree.min_items(), 2);
/// assert_eq!(degree.max_items(), 5);
///
/// assert!(Degree::new(1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Degree(usize);

impl Degree {
    /// Validate and wrap a degree.
    ///
    /// # Errors
    /// - `Error::DegreeOutOfRange` if `degree < 2` or `2 * degree - 1`
    ///   overflows `usize`.
    pub fn new(degree: usize) -> Result<Self> {
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
            return Err(Error::DegreeOutOfRange {
                degree,
                min: MIN_DEGREE,
                max: MAX_DEGREE,
            });
        }
        Ok(Degree(degree))
    }

    /// The raw degree.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Minimum entries in a non-root node (`degree - 1`).
    #[inline]
    pub fn min_items(self) -> usize {
        config::min_items(self.0)
    }

    /// Maximum entries in any node (`2 * degree - 1`).
    #[inline]
    pub fn max_items(self) -> usize {
        config::max_items(self.0)
    }
}

impl Default for Degree {
    fn default() -> Self {
        Degree(config::DEFAULT_DEGREE)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Degree({})", self.0)
    }
}
