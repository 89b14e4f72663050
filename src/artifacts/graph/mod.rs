//! Commit-ancestry engine
//!
//! - `commit`: records supplied by the history collaborator
//! - `builder`: the parent/child graph built from them
//! - `search`: multi-tip joint common ancestor search
//! - `linearize`: merging search streams into one display order

pub mod builder;
pub mod commit;
pub mod linearize;
pub mod search;

pub use builder::{CommitGraph, CommitNode};
pub use commit::{Branch, BranchList, Commit, CommitId, HistorySource, Tag, TagList};
pub use linearize::{LinearEntry, linearise_search};
pub use search::{AncestorSearch, SearchOutcome, StreamSet};
