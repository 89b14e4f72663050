//! Data structures and algorithms
//!
//! - `core`: output plumbing (pager writer)
//! - `graph`: commit graph, ancestor search and linearization
//! - `tree`: arena tree, walks, colouring and task schedules

pub mod core;
pub mod graph;
pub mod tree;
