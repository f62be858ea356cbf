//! Index structures.
//!
//! - [`btree`] - In-memory B-tree ordered map

pub mod btree;
