//! Consumer boundary of the ancestry engine
//!
//! A [`History`] owns one built [`CommitGraph`] together with the branch and
//! tag lists it was decorated with. Graph viewers talk to this type only:
//! resolve tips, search their joint ancestry, linearize the result.

use crate::artifacts::graph::builder::CommitGraph;
use crate::artifacts::graph::commit::{
    Branch, BranchList, Commit, CommitId, HistorySource, Tag, TagList,
};
use crate::artifacts::graph::linearize::{LinearEntry, linearise_search};
use crate::artifacts::graph::search::{AncestorSearch, SearchOutcome};
use crate::errors::GraphError;
use tracing::info;

#[derive(Debug, Clone)]
pub struct History {
    graph: CommitGraph,
    branches: BranchList,
    tags: TagList,
}

impl History {
    pub fn new(commits: &[Commit], branches: BranchList, tags: TagList) -> Result<Self, GraphError> {
        let graph = CommitGraph::build(commits, &branches, &tags)?;

        Ok(Self {
            graph,
            branches,
            tags,
        })
    }

    /// Ask the collaborator for its lists and build the graph once
    pub fn load(source: &impl HistorySource) -> Result<Self, GraphError> {
        let commits = source.commit_list()?;
        let branches = source.branches()?;
        let tags = source.tags()?;
        info!(
            commits = commits.len(),
            branches = branches.branches.len(),
            tags = tags.tags.len(),
            "loaded history"
        );

        Self::new(&commits, branches, tags)
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn branches(&self) -> &BranchList {
        &self.branches
    }

    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.find(name)
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.find(name)
    }

    pub fn current_branch(&self) -> Option<&Branch> {
        self.branches.current_branch()
    }

    pub fn search_by_branch(&self, names: &[&str]) -> Result<SearchOutcome, GraphError> {
        AncestorSearch::new(&self.graph).search_by_branch(&self.branches, names)
    }

    pub fn search_by_commits(&self, ids: &[CommitId]) -> Result<SearchOutcome, GraphError> {
        AncestorSearch::new(&self.graph).search_by_commits(ids)
    }

    pub fn linearise(&self, outcome: &SearchOutcome) -> Result<Vec<LinearEntry>, GraphError> {
        linearise_search(outcome.streams())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn oid(id: &str) -> CommitId {
        CommitId::try_parse(id).expect("valid test commit id")
    }

    struct InMemorySource {
        commits: Vec<Commit>,
        branches: BranchList,
    }

    impl HistorySource for InMemorySource {
        fn commit_list(&self) -> anyhow::Result<Vec<Commit>> {
            Ok(self.commits.clone())
        }

        fn branches(&self) -> anyhow::Result<BranchList> {
            Ok(self.branches.clone())
        }

        fn tags(&self) -> anyhow::Result<TagList> {
            Ok(TagList::new(None, vec![Tag::new(oid("R"), "v1".into())]))
        }
    }

    struct BrokenSource;

    impl HistorySource for BrokenSource {
        fn commit_list(&self) -> anyhow::Result<Vec<Commit>> {
            anyhow::bail!("git log failed")
        }

        fn branches(&self) -> anyhow::Result<BranchList> {
            Ok(BranchList::default())
        }

        fn tags(&self) -> anyhow::Result<TagList> {
            Ok(TagList::default())
        }
    }

    /// ```text
    ///   R - A   (main, current)
    ///    \
    ///     B     (feature)
    /// ```
    #[fixture]
    fn history() -> History {
        let source = InMemorySource {
            commits: vec![
                Commit::new(oid("A"), vec![oid("R")], "work on main".into()),
                Commit::new(oid("B"), vec![oid("R")], "work on feature".into()),
                Commit::new(oid("R"), vec![], "root".into()),
            ],
            branches: BranchList::new(
                Some(0),
                vec![
                    Branch::new(oid("A"), "main".into(), None, None),
                    Branch::new(oid("B"), "feature".into(), Some("main".into()), None),
                ],
            ),
        };

        History::load(&source).expect("valid history")
    }

    #[rstest]
    fn branches_are_searched_and_linearized(history: History) {
        let outcome = history.search_by_branch(&["main", "feature"]).unwrap();
        let entries = history.linearise(&outcome).unwrap();

        let rows: Vec<(String, Vec<usize>)> = entries
            .iter()
            .map(|e| (e.commit.to_string(), e.streams.indices().collect()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("A".to_string(), vec![0]),
                ("B".to_string(), vec![1]),
                ("R".to_string(), vec![0, 1]),
            ]
        );
    }

    #[rstest]
    fn refs_are_reachable_through_the_history(history: History) {
        assert_eq!(history.current_branch().map(|b| b.name.as_str()), Some("main"));
        assert_eq!(history.branch("feature").map(|b| b.commit_id.clone()), Some(oid("B")));
        assert_eq!(history.tag("v1").map(|t| t.commit_id.clone()), Some(oid("R")));
        assert_eq!(history.graph().get(&oid("R")).unwrap().tags(), ["v1".to_string()]);
    }

    #[rstest]
    fn commit_tips_bypass_branch_names(history: History) {
        let outcome = history.search_by_commits(&[oid("A")]).unwrap();

        assert_eq!(
            history.linearise(&outcome).unwrap().len(),
            2,
            "a single tip linearizes its own first-parent chain"
        );
    }

    #[test]
    fn collaborator_failures_surface_as_source_errors() {
        let result = History::load(&BrokenSource);

        assert!(matches!(result, Err(GraphError::Source(e)) if e.to_string() == "git log failed"));
    }
}
