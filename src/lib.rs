//! btree-index - An in-memory B-tree ordered map.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          btree-index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Tree handle (index/btree)               │   │
//! │  │   comparator + degree + root + len + stats              │   │
//! │  │   root growth on overflow, root collapse on underflow   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Node (index/btree/node)                 │   │
//! │  │   search · split-before-descend insert                  │   │
//! │  │   fix-before-descend remove · borrow/merge              │   │
//! │  │   min/max · bounded bidirectional iteration             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                  Common (common/)                       │   │
//! │  │        Degree + config constants + Error/Result         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Degree, Error, config)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use btree_index::{BTree, Direction};
//! use std::ops::Bound;
//!
//! let mut tree = BTree::new(3).unwrap();
//! tree.put("b", 2);
//! tree.put("a", 1);
//! tree.put("c", 3);
//!
//! assert_eq!(tree.get(&"a"), Some(&1));
//! assert_eq!(tree.min(), Some((&"a", &1)));
//! assert_eq!(tree.delete(&"b"), Some(2));
//!
//! let desc: Vec<_> = tree.range(Bound::Unbounded, Direction::Descending).collect();
//! assert_eq!(desc, vec![(&"c", &3), (&"a", &1)]);
//! ```
//!
//! The tree is single-threaded: wrap it in a lock to share it.

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_DEGREE, MIN_DEGREE};
pub use common::{Degree, Error, Result};

pub use index::btree::{BTree, Comparator, Direction, NaturalOrder, Range, TreeStats};
