//! Arena-backed tree nodes and structural mutations
//!
//! Nodes live in a `Vec`-based arena owned by [`Tree`] and refer to each
//! other through [`NodeId`]s. Every link (parent, siblings, children) is a
//! plain id, so the arena is the only owner and no node can outlive it.
//!
//! ## Layout of a child list
//!
//! ```text
//! parent
//!   ├── child 1        ordinary children, ordered by the insert mode
//!   ├── child 2
//!   ├── [head 1]       forest heads (is_sub_node), appended in call order
//!   │     ├── a
//!   │     └── b
//!   └── [head 2]
//!         ├── c
//!         └── d
//! ```
//!
//! Ordinary insertions always land before the first forest head, so a node
//! can own several independent forests without disturbing its children.

use crate::errors::TreeError;
use std::cmp::Ordering;
use std::fmt;

/// Generational handle to a node of a [`Tree`]
///
/// The generation changes whenever a slot is freed, so an id kept past a
/// delete is rejected instead of aliasing the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Insertion policy for [`Tree::add_child_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Before every ordinary child.
    Front,
    /// After every ordinary child, before any forest head.
    End,
    /// Before the first child that compares greater; equal payloads keep
    /// insertion order.
    Ascending,
    /// Before the first child that compares smaller; equal payloads keep
    /// insertion order.
    Descending,
}

/// A node of the arena
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    payload: Option<T>,
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    is_sub_node: bool,
}

impl<T> TreeNode<T> {
    fn new(payload: Option<T>, is_sub_node: bool) -> Self {
        Self {
            payload,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
            is_sub_node,
        }
    }

    /// `None` only for forest heads.
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn is_sub_node(&self) -> bool {
        self.is_sub_node
    }

    fn is_linked(&self) -> bool {
        self.parent.is_some() || self.prev.is_some() || self.next.is_some()
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<TreeNode<T>>,
}

/// Owner of all nodes and their links
#[derive(Debug, Clone)]
pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    revision: u64,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            revision: 0,
        }
    }

    /// Number of live nodes, forest heads included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Structural revision, bumped by every link change and delete
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Allocate an unlinked node holding `payload`
    pub fn insert(&mut self, payload: T) -> NodeId {
        self.alloc(TreeNode::new(Some(payload), false))
    }

    fn alloc(&mut self, node: TreeNode<T>) -> NodeId {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<TreeNode<T>> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&TreeNode<T>, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode<T>, TreeError> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::UnknownNode(id))
    }

    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.get(id).and_then(TreeNode::payload)
    }

    /// Payload edits are not structural and keep colour indexes valid
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).ok().and_then(|node| node.payload.as_mut())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.next)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.prev)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.last_child)
    }

    pub fn is_sub_node(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(TreeNode::is_sub_node)
    }

    /// Ordinary children of `parent`, forest heads excluded
    pub fn children(&self, parent: NodeId) -> Children<'_, T> {
        Children {
            tree: self,
            next: self.first_child(parent),
        }
    }

    /// Forest heads attached to `parent`, in attach order
    pub fn sub_trees(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(parent), move |id| self.next(*id))
            .filter(move |id| self.is_sub_node(*id))
    }

    /// Indexed lookup over the ordinary children of `parent`
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Number of parent links between `id` and its root
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            depth += 1;
            current = self.get(parent)?;
        }
        Some(depth)
    }

    /// Insert `node` as a child of `parent` according to `mode`
    ///
    /// Fails without touching the tree if `node` already carries links.
    pub fn add_child_node(
        &mut self,
        parent: NodeId,
        node: NodeId,
        mode: InsertMode,
    ) -> Result<(), TreeError>
    where
        T: Ord,
    {
        self.add_child_node_by(parent, node, mode, T::cmp)
    }

    /// [`add_child_node`](Self::add_child_node) with an explicit comparator
    pub fn add_child_node_by<F>(
        &mut self,
        parent: NodeId,
        node: NodeId,
        mode: InsertMode,
        mut compare: F,
    ) -> Result<(), TreeError>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.ensure_insertable(node, parent)?;
        let payload = self
            .node(node)?
            .payload()
            .ok_or(TreeError::ForestHead(node))?;

        let stop_at = match mode {
            InsertMode::Front => self.first_child(parent),
            InsertMode::End => None,
            InsertMode::Ascending => self.children(parent).find(|child| {
                self.payload(*child)
                    .is_some_and(|existing| compare(existing, payload) == Ordering::Greater)
            }),
            InsertMode::Descending => self.children(parent).find(|child| {
                self.payload(*child)
                    .is_some_and(|existing| compare(existing, payload) == Ordering::Less)
            }),
        };

        let (prev, next) = match stop_at {
            Some(next) => (self.prev(next), Some(next)),
            None => {
                let prev = self.last_ordinary_child(parent);
                let next = match prev {
                    Some(prev) => self.next(prev),
                    None => self.first_child(parent),
                };
                (prev, next)
            }
        };

        self.link(node, Some(parent), prev, next)
    }

    /// Splice an unlinked `node` into the sibling list right before `anchor`
    pub fn add_node_before(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TreeError> {
        let anchor_node = self.splice_anchor(anchor, node)?;
        let (parent, prev) = (anchor_node.parent, anchor_node.prev);
        self.link(node, parent, prev, Some(anchor))
    }

    /// Splice an unlinked `node` into the sibling list right after `anchor`
    pub fn add_node_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TreeError> {
        let anchor_node = self.splice_anchor(anchor, node)?;
        let (parent, next) = (anchor_node.parent, anchor_node.next);
        self.link(node, parent, Some(anchor), next)
    }

    /// Attach the forest starting at `node` under a new forest head of `parent`
    ///
    /// `node` may carry following siblings: the whole chain moves under the
    /// head. Returns the id of the new head.
    pub fn add_sub_tree_node(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let head_node = self.node(node)?;
        if head_node.parent.is_some() || head_node.prev.is_some() {
            return Err(TreeError::AlreadyLinked(node));
        }

        let chain: Vec<NodeId> =
            std::iter::successors(Some(node), |id| self.next(*id)).collect();
        for member in &chain {
            self.ensure_not_ancestor(*member, parent)?;
        }

        let head = self.alloc(TreeNode::new(None, true));
        let last_child = self.last_child(parent);
        self.link(head, Some(parent), last_child, None)?;

        for member in &chain {
            self.node_mut(*member)?.parent = Some(head);
        }
        let head_node = self.node_mut(head)?;
        head_node.first_child = chain.first().copied();
        head_node.last_child = chain.last().copied();

        Ok(head)
    }

    /// Unlink `node` from its parent and siblings, keeping its subtree
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let current = self.node(node)?;
        let (parent, prev, next) = (current.parent, current.prev, current.next);

        match prev {
            Some(prev) => self.node_mut(prev)?.next = next,
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent)?.first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.node_mut(next)?.prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent)?.last_child = prev;
                }
            }
        }

        let current = self.node_mut(node)?;
        current.parent = None;
        current.prev = None;
        current.next = None;
        self.revision += 1;

        Ok(())
    }

    /// Unlink and free `node`, returning its payload
    ///
    /// With `recursive` the whole subtree is freed. Otherwise the children
    /// stay alive as a root-level forest that keeps its sibling order.
    pub fn delete_node(&mut self, node: NodeId, recursive: bool) -> Result<Option<T>, TreeError> {
        self.detach(node)?;

        if recursive {
            let mut pending: Vec<NodeId> =
                std::iter::successors(self.first_child(node), |id| self.next(*id)).collect();
            while let Some(id) = pending.pop() {
                pending.extend(std::iter::successors(self.first_child(id), |child| {
                    self.next(*child)
                }));
                self.release(id);
            }
        } else {
            let orphans: Vec<NodeId> =
                std::iter::successors(self.first_child(node), |id| self.next(*id)).collect();
            for orphan in orphans {
                self.node_mut(orphan)?.parent = None;
            }
        }

        let removed = self.release(node).ok_or(TreeError::UnknownNode(node))?;
        Ok(removed.payload)
    }

    fn last_ordinary_child(&self, parent: NodeId) -> Option<NodeId> {
        std::iter::successors(self.last_child(parent), |id| self.prev(*id))
            .find(|id| !self.is_sub_node(*id))
    }

    fn ensure_insertable(&self, node: NodeId, anchor: NodeId) -> Result<(), TreeError> {
        self.node(anchor)?;
        if self.node(node)?.is_linked() {
            return Err(TreeError::AlreadyLinked(node));
        }
        self.ensure_not_ancestor(node, anchor)
    }

    /// `node` must not be `anchor` or one of its ancestors
    fn ensure_not_ancestor(&self, node: NodeId, anchor: NodeId) -> Result<(), TreeError> {
        let mut current = Some(anchor);
        while let Some(id) = current {
            if id == node {
                return Err(TreeError::WouldCycle { node, anchor });
            }
            current = self.parent(id);
        }
        Ok(())
    }

    fn splice_anchor(&self, anchor: NodeId, node: NodeId) -> Result<&TreeNode<T>, TreeError> {
        self.ensure_insertable(node, anchor)?;
        let anchor_node = self.node(anchor)?;
        if anchor_node.is_sub_node {
            return Err(TreeError::ForestHead(anchor));
        }
        if self.node(node)?.is_sub_node {
            return Err(TreeError::ForestHead(node));
        }
        Ok(anchor_node)
    }

    fn link(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        prev: Option<NodeId>,
        next: Option<NodeId>,
    ) -> Result<(), TreeError> {
        match prev {
            Some(prev) => self.node_mut(prev)?.next = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent)?.first_child = Some(node);
                }
            }
        }
        match next {
            Some(next) => self.node_mut(next)?.prev = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent)?.last_child = Some(node);
                }
            }
        }

        let current = self.node_mut(node)?;
        current.parent = parent;
        current.prev = prev;
        current.next = next;
        self.revision += 1;

        Ok(())
    }
}

/// Iterator over the ordinary children of a node
pub struct Children<'t, T> {
    tree: &'t Tree<T>,
    next: Option<NodeId>,
}

impl<T> Iterator for Children<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|id| !self.tree.is_sub_node(*id))?;
        self.next = self.tree.next(current);
        Some(current)
    }
}
