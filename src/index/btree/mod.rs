//! In-memory B-tree.
//!
//! # Components
//! - [`BTree`] - Tree handle: root ownership, growth/shrink, public API
//! - `Node` - Recursive split/merge/borrow/search/iterate algorithms
//! - `Entry` - Key/value record stored in a node
//! - [`Comparator`] / [`NaturalOrder`] - Key ordering
//! - [`Range`] / [`Direction`] - Lazy bounded iteration
//! - [`TreeStats`] - Restructuring counters
//!
//! # Occupancy
//! For degree `d`, every node but the root holds `d - 1 ..= 2d - 1`
//! entries, and every internal node has one more child than entries.

mod comparator;
mod entry;
mod iter;
mod node;
mod stats;
mod tree;

pub use comparator::{Comparator, NaturalOrder};
pub(crate) use entry::Entry;
pub use iter::{Direction, Range};
pub use stats::TreeStats;
pub use tree::BTree;
