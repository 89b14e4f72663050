//! Nested-tree engine
//!
//! - `node`: arena, node links and insertion policies
//! - `walk`: the single walk primitive and walk-order helpers
//! - `colour`: ordinal lookup over a coloured walk
//! - `schedule`: forward-propagating task schedule built on the walk

pub mod colour;
pub mod node;
pub mod schedule;
pub mod walk;

pub use colour::ColourIndex;
pub use node::{InsertMode, NodeId, Tree, TreeNode};
pub use walk::{Direction, WalkFlags, WalkStep};
