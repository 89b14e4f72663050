//! Error types for the tree engine and the ancestry engine
//!
//! Both enums describe local, recoverable failures: a failed tree mutation
//! leaves the tree untouched, and a failed search leaves the graph untouched.

use crate::artifacts::graph::commit::CommitId;
use crate::artifacts::tree::node::NodeId;

/// Failures of [`Tree`](crate::artifacts::tree::Tree) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id does not name a live node (never allocated, or deleted).
    #[error("unknown tree node {0}")]
    UnknownNode(NodeId),

    /// The node to insert already has a parent or sibling links.
    #[error("tree node {0} is already linked")]
    AlreadyLinked(NodeId),

    /// Ordinary nodes cannot be spliced next to a forest head.
    #[error("tree node {0} is a forest head")]
    ForestHead(NodeId),

    /// Inserting the node would make it its own ancestor.
    #[error("tree node {node} cannot be placed under its own descendant {anchor}")]
    WouldCycle { node: NodeId, anchor: NodeId },

    /// The tree changed since the colour index was built.
    #[error("colour index is stale: built at revision {built}, tree is at revision {current}")]
    StaleColours { built: u64, current: u64 },

    /// A walk visited more nodes than the arena holds.
    #[error("tree links are corrupt: walk exceeded {0} steps")]
    CorruptLinks(usize),
}

/// Failures of graph construction, ancestor search and linearization.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A requested tip is not part of the built graph.
    #[error("unknown commit id: {0}")]
    UnknownCommit(CommitId),

    /// A requested branch name does not exist.
    #[error("unknown branch: {0}")]
    UnknownBranch(String),

    /// The same commit id was listed twice.
    #[error("duplicate commit id: {0}")]
    DuplicateCommit(CommitId),

    /// The parent relation has a cycle or never terminates.
    #[error("malformed commit graph: {0}")]
    Malformed(String),

    /// More tips than a stream set can represent.
    #[error("too many tips: {requested} requested, at most {max} supported")]
    TooManyTips { requested: usize, max: usize },

    /// A search needs at least one tip.
    #[error("no tips given to search")]
    NoTips,

    /// Streams wait on each other in contradictory orders.
    #[error("streams disagree on the order of commit {0}")]
    InconsistentStreams(CommitId),

    /// The history collaborator failed to produce its lists.
    #[error("history source failed: {0}")]
    Source(#[from] anyhow::Error),
}
