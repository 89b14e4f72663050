//! Commit, branch and tag records handed over by the history collaborator
//!
//! These are plain values: the collaborator (a VCS adapter, a listing file,
//! a test fixture) materializes them, and the graph builder consumes them.

use derive_new::new;
use std::fmt;

/// Length of an abbreviated commit id
pub const SHORT_ID_LENGTH: usize = 7;

/// Opaque commit identifier (typically a hash string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    /// Validate a commit id
    ///
    /// Ids are opaque keys: any non-empty string without whitespace.
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            anyhow::bail!("commit id cannot be empty");
        }
        if id.chars().any(char::is_whitespace) {
            anyhow::bail!("invalid commit id: {id:?}");
        }
        Ok(Self(id))
    }

    /// First characters of the id, the whole id when it is short
    pub fn to_short_id(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LENGTH) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CommitId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

/// One entry of the commit list
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Commit {
    pub id: CommitId,
    /// First parent first; empty for a root commit
    pub parents: Vec<CommitId>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Branch {
    pub commit_id: CommitId,
    pub name: String,
    /// Upstream or parent-branch information, as reported by the collaborator
    pub parent_info: Option<String>,
    /// Remote the branch belongs to, `None` for local branches
    pub remote: Option<String>,
}

impl Branch {
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Tag {
    pub commit_id: CommitId,
    pub name: String,
}

/// Branches plus the index of the checked-out one
#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct BranchList {
    pub current: Option<usize>,
    pub branches: Vec<Branch>,
}

impl BranchList {
    pub fn current_branch(&self) -> Option<&Branch> {
        self.current.and_then(|index| self.branches.get(index))
    }

    pub fn find(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.name == name)
    }
}

/// Tags plus the index of the one the work tree sits on, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct TagList {
    pub current: Option<usize>,
    pub tags: Vec<Tag>,
}

impl TagList {
    pub fn find(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == name)
    }
}

/// Boundary to the version-control collaborator
///
/// Implementations run whatever commands they need and return fully
/// materialized lists; the core never performs I/O itself.
pub trait HistorySource {
    /// Commits ordered children before parents, as `git log` lists them
    fn commit_list(&self) -> anyhow::Result<Vec<Commit>>;

    fn branches(&self) -> anyhow::Result<BranchList>;

    fn tags(&self) -> anyhow::Result<TagList>;
}
