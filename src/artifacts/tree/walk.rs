//! Single-pass tree walk
//!
//! [`Tree::walk_tree`] is the one traversal primitive of the tree engine.
//! From the current node it moves:
//!
//! - `Down` into the first child, unless the visitor asked to skip children
//! - `Next` to the next sibling
//! - `Up` to the next sibling of the nearest ancestor that has one
//!
//! The walk never climbs above the level of its start node, so a walk
//! covers the start node, its descendants, and its following siblings with
//! their descendants. Forest heads are visited like any other node.

use crate::artifacts::tree::node::{NodeId, Tree};
use crate::errors::TreeError;
use bitflags::bitflags;

/// How the walk reached the node being visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Start,
    Down,
    Next,
    Up,
}

bitflags! {
    /// Visitor requests for the rest of the walk
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WalkFlags: u8 {
        /// Do not descend into the children of the node just visited.
        const SKIP_CHILDREN = 0b01;
        /// End the walk after the node just visited.
        const STOP = 0b10;
    }
}

/// One visit of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkStep {
    /// Node visited just before this one, `None` for the start node
    pub prev: Option<NodeId>,
    pub node: NodeId,
    /// Depth relative to the start node
    pub depth: usize,
    /// Level change from the previous node: `1` down, `0` across, negative up
    pub depth_delta: i32,
    pub direction: Direction,
}

impl<T> Tree<T> {
    /// Walk from `start`, threading an accumulator through `visitor`
    ///
    /// The visitor returns the next accumulator and the [`WalkFlags`] for
    /// the node it was just handed. Every node is visited at most once.
    pub fn walk_tree<A, F>(&self, start: NodeId, init: A, mut visitor: F) -> Result<A, TreeError>
    where
        F: FnMut(A, &WalkStep) -> (A, WalkFlags),
    {
        self.node(start)?;

        let budget = self.len();
        let mut visited = 0;
        let mut acc = init;
        let mut step = WalkStep {
            prev: None,
            node: start,
            depth: 0,
            depth_delta: 0,
            direction: Direction::Start,
        };

        loop {
            visited += 1;
            if visited > budget {
                return Err(TreeError::CorruptLinks(budget));
            }

            let (next_acc, flags) = visitor(acc, &step);
            acc = next_acc;
            if flags.contains(WalkFlags::STOP) {
                break;
            }

            let skip_children = flags.contains(WalkFlags::SKIP_CHILDREN);
            match self.advance(step.node, step.depth, skip_children)? {
                Some((node, depth, depth_delta, direction)) => {
                    step = WalkStep {
                        prev: Some(step.node),
                        node,
                        depth,
                        depth_delta,
                        direction,
                    };
                }
                None => break,
            }
        }

        Ok(acc)
    }

    fn advance(
        &self,
        current: NodeId,
        depth: usize,
        skip_children: bool,
    ) -> Result<Option<(NodeId, usize, i32, Direction)>, TreeError> {
        let node = self.node(current)?;
        if !skip_children && let Some(child) = node.first_child() {
            return Ok(Some((child, depth + 1, 1, Direction::Down)));
        }
        if let Some(next) = node.next() {
            return Ok(Some((next, depth, 0, Direction::Next)));
        }

        let mut climbed = current;
        let mut depth = depth;
        let mut levels = 0;
        while depth > 0 {
            let Some(parent) = self.node(climbed)?.parent() else {
                break;
            };
            climbed = parent;
            depth -= 1;
            levels += 1;
            if let Some(next) = self.node(climbed)?.next() {
                return Ok(Some((next, depth, -levels, Direction::Up)));
            }
        }

        Ok(None)
    }

    /// Payload-carrying nodes reachable by a walk from `start`, in walk order
    pub fn collect(&self, start: NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.walk_tree(start, Vec::new(), |mut found, step| {
            if !self.is_sub_node(step.node) {
                found.push(step.node);
            }
            (found, WalkFlags::empty())
        })
    }

    /// First node from `start` whose payload satisfies `predicate`
    pub fn find_node<P>(&self, start: NodeId, mut predicate: P) -> Result<Option<NodeId>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        self.walk_tree(start, None, |_, step| match self.payload(step.node) {
            Some(payload) if predicate(payload) => (Some(step.node), WalkFlags::STOP),
            _ => (None, WalkFlags::empty()),
        })
    }

    /// Nearest node before `node` in walk order that carries a payload
    ///
    /// Forest heads are stepped over, so the first node of a forest sees the
    /// payload that precedes its head.
    pub fn prev_payload_node(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        for _ in 0..self.len() {
            let before = match self.get(current)?.prev() {
                Some(prev) => self.last_descendant(prev),
                None => self.get(current)?.parent()?,
            };
            if self.payload(before).is_some() {
                return Some(before);
            }
            current = before;
        }
        None
    }

    pub fn prev_payload(&self, node: NodeId) -> Option<&T> {
        self.prev_payload_node(node)
            .and_then(|before| self.payload(before))
    }

    fn last_descendant(&self, node: NodeId) -> NodeId {
        std::iter::successors(Some(node), |id| self.last_child(*id))
            .take(self.len())
            .last()
            .unwrap_or(node)
    }
}
