//! Ordinal lookup over a coloured walk
//!
//! A colouring walk hands every visited node a strictly increasing ordinal
//! (its colour). Because colours follow walk order, a node's descendants
//! carry colours between its own colour and its next sibling's, which lets
//! [`ColourIndex::find_item_with_colour`] skip whole subtrees instead of
//! re-walking them.
//!
//! Colours are kept in the index rather than on the nodes. The index also
//! remembers the tree revision it was built at and refuses lookups once the
//! tree has been restructured.

use crate::artifacts::tree::node::{NodeId, Tree};
use crate::artifacts::tree::walk::WalkFlags;
use crate::errors::TreeError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ColourIndex {
    start: NodeId,
    revision: u64,
    colours: HashMap<NodeId, usize>,
    order: Vec<NodeId>,
}

impl ColourIndex {
    /// Colour every node a full walk from `start` reaches
    pub fn build<T>(tree: &Tree<T>, start: NodeId) -> Result<Self, TreeError> {
        Self::build_with(tree, start, |_| WalkFlags::empty())
    }

    /// Colour a bounded walk; `flags` decides per node whether to skip its
    /// children or stop
    pub fn build_with<T, F>(tree: &Tree<T>, start: NodeId, mut flags: F) -> Result<Self, TreeError>
    where
        F: FnMut(NodeId) -> WalkFlags,
    {
        let order = tree.walk_tree(start, Vec::new(), |mut order, step| {
            order.push(step.node);
            (order, flags(step.node))
        })?;
        let colours = order
            .iter()
            .enumerate()
            .map(|(colour, node)| (*node, colour))
            .collect();

        Ok(Self {
            start,
            revision: tree.revision(),
            colours,
            order,
        })
    }

    pub fn colour_of(&self, node: NodeId) -> Option<usize> {
        self.colours.get(&node).copied()
    }

    /// Coloured nodes in walk order
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Locate the node coloured `target` by skipping along siblings
    ///
    /// Returns `Ok(None)` when no node carries that colour, and
    /// [`TreeError::StaleColours`] when `tree` changed since the index was
    /// built.
    pub fn find_item_with_colour<T>(
        &self,
        tree: &Tree<T>,
        target: usize,
    ) -> Result<Option<NodeId>, TreeError> {
        if tree.revision() != self.revision {
            return Err(TreeError::StaleColours {
                built: self.revision,
                current: tree.revision(),
            });
        }

        let mut current = self.start;
        loop {
            let Some(colour) = self.colour_of(current) else {
                return Ok(None);
            };
            if colour == target {
                return Ok(Some(current));
            }
            if colour > target {
                return Ok(None);
            }

            let node = tree.node(current)?;
            let sibling = node
                .next()
                .filter(|next| self.colour_of(*next).is_some_and(|c| c <= target));
            current = match sibling.or(node.first_child()) {
                Some(next) => next,
                None => return Ok(None),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::tree::node::InsertMode;
    use proptest::prelude::*;

    fn small_tree() -> (Tree<u32>, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(0);
        let child = tree.insert(1);
        let grandchild = tree.insert(2);
        let sibling = tree.insert(3);
        let forest = tree.insert(4);
        tree.add_child_node(root, child, InsertMode::End).unwrap();
        tree.add_child_node(child, grandchild, InsertMode::End)
            .unwrap();
        tree.add_child_node(root, sibling, InsertMode::End).unwrap();
        tree.add_sub_tree_node(sibling, forest).unwrap();
        (tree, root)
    }

    #[test]
    fn colours_follow_walk_order() {
        let (tree, root) = small_tree();
        let index = ColourIndex::build(&tree, root).unwrap();

        let payloads: Vec<Option<u32>> = index
            .nodes()
            .iter()
            .map(|id| tree.payload(*id).copied())
            .collect();
        assert_eq!(payloads, vec![Some(0), Some(1), Some(2), Some(3), None, Some(4)]);
        assert_eq!(index.colour_of(root), Some(0));
    }

    #[test]
    fn colours_are_walk_positions() {
        let (tree, root) = small_tree();
        let index = ColourIndex::build(&tree, root).unwrap();

        for (position, node) in index.nodes().iter().enumerate() {
            assert_eq!(index.colour_of(*node), Some(position));
        }
        assert_eq!(
            index.find_item_with_colour(&tree, index.len() - 1).unwrap(),
            index.nodes().last().copied()
        );
    }

    #[test]
    fn missing_colours_are_not_found() {
        let (tree, root) = small_tree();
        let index = ColourIndex::build(&tree, root).unwrap();

        assert_eq!(index.find_item_with_colour(&tree, 99).unwrap(), None);
    }

    #[test]
    fn restructuring_invalidates_the_index() {
        let (mut tree, root) = small_tree();
        let index = ColourIndex::build(&tree, root).unwrap();
        let late = tree.insert(5);
        tree.add_child_node(root, late, InsertMode::Front).unwrap();

        assert!(matches!(
            index.find_item_with_colour(&tree, 1),
            Err(TreeError::StaleColours { .. })
        ));
    }

    #[test]
    fn payload_edits_keep_the_index_valid() {
        let (mut tree, root) = small_tree();
        let index = ColourIndex::build(&tree, root).unwrap();
        let child = tree.child_at(root, 0).unwrap();
        if let Some(payload) = tree.payload_mut(child) {
            *payload = 10;
        }

        assert_eq!(index.find_item_with_colour(&tree, 1).unwrap(), Some(child));
    }

    #[test]
    fn bounded_colouring_leaves_skipped_nodes_uncoloured() {
        let (tree, root) = small_tree();
        let child = tree.child_at(root, 0).unwrap();
        let grandchild = tree.child_at(child, 0).unwrap();
        let index = ColourIndex::build_with(&tree, root, |node| {
            if node == child {
                WalkFlags::SKIP_CHILDREN
            } else {
                WalkFlags::empty()
            }
        })
        .unwrap();

        assert_eq!(index.colour_of(grandchild), None);
        assert_eq!(index.len(), 5);
        for (colour, node) in index.nodes().iter().enumerate() {
            assert_eq!(
                index.find_item_with_colour(&tree, colour).unwrap(),
                Some(*node)
            );
        }
    }

    proptest! {
        #[test]
        fn every_coloured_node_round_trips(shape in prop::collection::vec((0usize..64, 0u8..3), 0..48)) {
            let mut tree = Tree::new();
            let root = tree.insert(0usize);
            let mut nodes = vec![root];
            for (value, (parent_pick, kind)) in shape.iter().enumerate() {
                let anchor = nodes[parent_pick % nodes.len()];
                let node = tree.insert(value + 1);
                match kind {
                    0 => tree.add_child_node(anchor, node, InsertMode::Descending).unwrap(),
                    1 if anchor != root => tree.add_node_after(anchor, node).unwrap_or_else(|_| {
                        tree.add_child_node(anchor, node, InsertMode::End).unwrap()
                    }),
                    _ => {
                        tree.add_sub_tree_node(anchor, node).unwrap();
                    }
                }
                nodes.push(node);
            }

            let index = ColourIndex::build(&tree, root).unwrap();
            prop_assert_eq!(index.len(), tree.len());
            for node in index.nodes() {
                let colour = index.colour_of(*node).unwrap();
                prop_assert_eq!(index.find_item_with_colour(&tree, colour).unwrap(), Some(*node));
            }
        }
    }
}
