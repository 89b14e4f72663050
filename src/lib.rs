//! trellis: nested task trees and multi-branch commit ancestry
//!
//! - `artifacts::tree`: arena tree with ordered insertion, sub-forests, a
//!   single walk primitive and coloured lookup
//! - `artifacts::graph`: commit graph, joint ancestor search and stream
//!   linearization
//! - `areas`: the consumer boundary (`History`) and the CLI's inputs
//! - `commands`: the CLI commands

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
