//! Commit DAG construction
//!
//! [`CommitGraph::build`] turns the flat commit list into a DAG oriented
//! child -> parent with back links parent -> child. Nodes live in a vector
//! in first-creation order; every lookup by id goes through the id ->
//! position map, never through the position of a commit in the input list.
//!
//! ## Input order
//!
//! Collaborators normally list children before parents (`git log` order).
//! The builder does not require it, but records whether it held so
//! consumers that care about positions can check [`CommitGraph::is_topological`]
//! instead of assuming it.

use crate::artifacts::graph::commit::{BranchList, Commit, CommitId, TagList};
use crate::errors::GraphError;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// A commit inside the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    id: CommitId,
    parents: Vec<usize>,
    children: Vec<usize>,
    branches: Vec<String>,
    tags: Vec<String>,
    description: String,
    listed_at: Option<usize>,
}

impl CommitNode {
    fn placeholder(id: CommitId) -> Self {
        Self {
            id,
            parents: Vec::new(),
            children: Vec::new(),
            branches: Vec::new(),
            tags: Vec::new(),
            description: String::new(),
            listed_at: None,
        }
    }

    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// First line of the description
    pub fn short_description(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// `false` for commits only known as the parent of a listed commit
    pub fn is_listed(&self) -> bool {
        self.listed_at.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.is_listed() && self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommitGraph {
    nodes: Vec<CommitNode>,
    positions: HashMap<CommitId, usize>,
    topological: bool,
}

impl CommitGraph {
    /// Build the DAG from the collaborator's lists
    ///
    /// Rejects duplicate commit ids and cyclic parent relations. Branch and
    /// tag names that point at unknown commits are skipped.
    pub fn build(
        commits: &[Commit],
        branches: &BranchList,
        tags: &TagList,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            nodes: Vec::with_capacity(commits.len()),
            positions: HashMap::with_capacity(commits.len()),
            topological: true,
        };

        for (listed_at, commit) in commits.iter().enumerate() {
            let entry = graph.fetch_or_create(&commit.id);
            if graph.nodes[entry].listed_at.is_some() {
                return Err(GraphError::DuplicateCommit(commit.id.clone()));
            }
            graph.nodes[entry].listed_at = Some(listed_at);
            graph.nodes[entry].description = commit.description.clone();

            for parent_id in &commit.parents {
                let parent = graph.fetch_or_create(parent_id);
                graph.nodes[entry].parents.push(parent);
                graph.nodes[parent].children.push(entry);
            }
        }

        for branch in &branches.branches {
            match graph.positions.get(&branch.commit_id) {
                Some(&position) => graph.nodes[position].branches.push(branch.name.clone()),
                None => warn!(branch = %branch.name, commit = %branch.commit_id, "branch points at an unknown commit"),
            }
        }
        for tag in &tags.tags {
            match graph.positions.get(&tag.commit_id) {
                Some(&position) => graph.nodes[position].tags.push(tag.name.clone()),
                None => warn!(tag = %tag.name, commit = %tag.commit_id, "tag points at an unknown commit"),
            }
        }

        graph.ensure_acyclic()?;
        graph.topological = graph.check_topological();

        debug!(
            commits = graph.nodes.len(),
            roots = graph.roots().count(),
            topological = graph.topological,
            "built commit graph"
        );

        Ok(graph)
    }

    fn fetch_or_create(&mut self, id: &CommitId) -> usize {
        if let Some(&position) = self.positions.get(id) {
            return position;
        }
        let position = self.nodes.len();
        self.nodes.push(CommitNode::placeholder(id.clone()));
        self.positions.insert(id.clone(), position);
        position
    }

    /// Iterative three-colour DFS over parent links
    fn ensure_acyclic(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unseen,
            Open,
            Done,
        }

        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unseen {
                continue;
            }

            let mut stack = vec![(start, 0usize)];
            marks[start] = Mark::Open;
            while let Some((position, next_parent)) = stack.pop() {
                match self.nodes[position].parents.get(next_parent) {
                    Some(&parent) => {
                        stack.push((position, next_parent + 1));
                        match marks[parent] {
                            Mark::Open => {
                                return Err(GraphError::Malformed(format!(
                                    "commit {} is its own ancestor",
                                    self.nodes[parent].id
                                )));
                            }
                            Mark::Unseen => {
                                marks[parent] = Mark::Open;
                                stack.push((parent, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => marks[position] = Mark::Done,
                }
            }
        }

        Ok(())
    }

    fn check_topological(&self) -> bool {
        self.nodes.iter().all(|node| match node.listed_at {
            Some(child_at) => node.parents.iter().all(|&parent| {
                self.nodes[parent]
                    .listed_at
                    .is_none_or(|parent_at| parent_at > child_at)
            }),
            None => true,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether every listed commit came before its listed parents
    pub fn is_topological(&self) -> bool {
        self.topological
    }

    /// Position of `id` in first-creation order
    pub fn position(&self, id: &CommitId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn get(&self, id: &CommitId) -> Option<&CommitNode> {
        self.position(id).map(|position| &self.nodes[position])
    }

    /// All nodes in first-creation order
    pub fn nodes(&self) -> impl Iterator<Item = &CommitNode> {
        self.nodes.iter()
    }

    pub(crate) fn parent_positions(&self, position: usize) -> &[usize] {
        &self.nodes[position].parents
    }

    pub(crate) fn id_at(&self, position: usize) -> &CommitId {
        &self.nodes[position].id
    }

    pub fn parents(&self, id: &CommitId) -> Option<Vec<&CommitId>> {
        self.get(id)
            .map(|node| node.parents.iter().map(|&p| &self.nodes[p].id).collect())
    }

    pub fn children(&self, id: &CommitId) -> Option<Vec<&CommitId>> {
        self.get(id)
            .map(|node| node.children.iter().map(|&c| &self.nodes[c].id).collect())
    }

    /// Listed commits without parents, in input order
    pub fn roots(&self) -> impl Iterator<Item = &CommitId> {
        let mut roots: Vec<&CommitNode> = self.nodes.iter().filter(|n| n.is_root()).collect();
        roots.sort_by_key(|node| node.listed_at);
        roots.into_iter().map(|node| &node.id)
    }

    /// Listed commits that no other commit names as a parent
    pub fn heads(&self) -> impl Iterator<Item = &CommitId> {
        self.nodes
            .iter()
            .filter(|node| node.is_listed() && node.children.is_empty())
            .map(|node| &node.id)
    }

    /// Whether `ancestor` is reachable from `descendant` through parent links
    ///
    /// A commit counts as its own ancestor.
    pub fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool, GraphError> {
        let target = self
            .position(ancestor)
            .ok_or_else(|| GraphError::UnknownCommit(ancestor.clone()))?;
        let start = self
            .position(descendant)
            .ok_or_else(|| GraphError::UnknownCommit(descendant.clone()))?;

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(position) = queue.pop_front() {
            if position == target {
                return Ok(true);
            }
            for &parent in self.parent_positions(position) {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::graph::commit::{Branch, Tag};
    use rstest::{fixture, rstest};

    fn oid(id: &str) -> CommitId {
        CommitId::try_parse(id).expect("valid test commit id")
    }

    fn commit(id: &str, parents: &[&str]) -> Commit {
        Commit::new(
            oid(id),
            parents.iter().map(|p| oid(p)).collect(),
            format!("commit {id}"),
        )
    }

    /// ```text
    ///     R
    ///    / \
    ///   A   B
    ///    \ /
    ///     M
    /// ```
    #[fixture]
    fn diamond() -> Vec<Commit> {
        vec![
            commit("M", &["A", "B"]),
            commit("A", &["R"]),
            commit("B", &["R"]),
            commit("R", &[]),
        ]
    }

    #[rstest]
    fn links_run_both_directions(diamond: Vec<Commit>) {
        let graph = CommitGraph::build(&diamond, &BranchList::default(), &TagList::default())
            .unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.parents(&oid("M")), Some(vec![&oid("A"), &oid("B")]));
        assert_eq!(graph.children(&oid("R")), Some(vec![&oid("A"), &oid("B")]));
        assert!(graph.get(&oid("M")).is_some_and(CommitNode::is_merge));
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![&oid("R")]);
        assert_eq!(graph.heads().collect::<Vec<_>>(), vec![&oid("M")]);
        assert!(graph.is_topological());
    }

    #[rstest]
    fn positions_follow_first_creation(diamond: Vec<Commit>) {
        let graph = CommitGraph::build(&diamond, &BranchList::default(), &TagList::default())
            .unwrap();

        assert_eq!(graph.position(&oid("M")), Some(0));
        assert_eq!(graph.position(&oid("A")), Some(1));
        assert_eq!(graph.position(&oid("B")), Some(2));
        assert_eq!(graph.position(&oid("R")), Some(3));
        assert_eq!(graph.position(&oid("X")), None);
    }

    #[test]
    fn parents_listed_first_are_reported_as_non_topological() {
        let commits = vec![commit("R", &[]), commit("A", &["R"])];
        let graph =
            CommitGraph::build(&commits, &BranchList::default(), &TagList::default()).unwrap();

        assert!(!graph.is_topological());
        assert_eq!(graph.parents(&oid("A")), Some(vec![&oid("R")]));
    }

    #[rstest]
    fn names_attach_to_known_commits_only(diamond: Vec<Commit>) {
        let branches = BranchList::new(
            Some(0),
            vec![
                Branch::new(oid("M"), "main".into(), None, None),
                Branch::new(oid("gone"), "stale".into(), None, None),
            ],
        );
        let tags = TagList::new(None, vec![Tag::new(oid("R"), "v1.0".into())]);

        let graph = CommitGraph::build(&diamond, &branches, &tags).unwrap();

        assert_eq!(graph.get(&oid("M")).unwrap().branches(), ["main".to_string()]);
        assert_eq!(graph.get(&oid("R")).unwrap().tags(), ["v1.0".to_string()]);
        assert_eq!(graph.position(&oid("gone")), None);
    }

    #[test]
    fn duplicate_commits_are_rejected() {
        let commits = vec![commit("A", &[]), commit("A", &[])];

        let result = CommitGraph::build(&commits, &BranchList::default(), &TagList::default());

        assert!(matches!(result, Err(GraphError::DuplicateCommit(id)) if id == oid("A")));
    }

    #[rstest]
    #[case::self_parent(vec![commit("A", &["A"])])]
    #[case::two_cycle(vec![commit("A", &["B"]), commit("B", &["A"])])]
    #[case::long_cycle(vec![
        commit("A", &["B"]),
        commit("B", &["C"]),
        commit("C", &["D", "A"]),
        commit("D", &[]),
    ])]
    fn cycles_are_rejected(#[case] commits: Vec<Commit>) {
        let result = CommitGraph::build(&commits, &BranchList::default(), &TagList::default());

        assert!(matches!(result, Err(GraphError::Malformed(_))));
    }

    #[test]
    fn unlisted_parents_are_placeholders_not_roots() {
        let commits = vec![commit("A", &["shallow"])];
        let graph =
            CommitGraph::build(&commits, &BranchList::default(), &TagList::default()).unwrap();

        assert!(!graph.get(&oid("shallow")).unwrap().is_listed());
        assert_eq!(graph.roots().count(), 0);
        assert_eq!(graph.get(&oid("shallow")).unwrap().short_description(), "");
    }

    #[test]
    fn short_description_is_the_first_line() {
        let commits = vec![Commit::new(
            oid("A"),
            Vec::new(),
            "Add lanes\n\nOne column per tip.".to_string(),
        )];
        let graph =
            CommitGraph::build(&commits, &BranchList::default(), &TagList::default()).unwrap();

        assert_eq!(graph.get(&oid("A")).unwrap().short_description(), "Add lanes");
    }

    #[rstest]
    fn ancestry_queries(diamond: Vec<Commit>) {
        let graph = CommitGraph::build(&diamond, &BranchList::default(), &TagList::default())
            .unwrap();

        assert!(graph.is_ancestor(&oid("R"), &oid("M")).unwrap());
        assert!(graph.is_ancestor(&oid("A"), &oid("A")).unwrap());
        assert!(!graph.is_ancestor(&oid("A"), &oid("B")).unwrap());
        assert!(matches!(
            graph.is_ancestor(&oid("nope"), &oid("M")),
            Err(GraphError::UnknownCommit(_))
        ));
    }
}
