//! Command implementations
//!
//! Each command is an `impl Viewer` block writing to the viewer's writer:
//!
//! - `log`: linearized multi-branch history with one lane per tip
//! - `merge_base`: joint common ancestor of several tips
//! - `roots`: root commits and listing order

pub mod log;
pub mod merge_base;
pub mod roots;
