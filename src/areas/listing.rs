//! Text listing of a materialized history
//!
//! The command-line front end reads commits, branches and tags from a plain
//! text file instead of running a version-control tool:
//!
//! ```text
//! # comment
//! commit <id> [<parent-id>...] [| <description>]
//! branch <name> <id> [current] [remote=<remote>] [parent=<info>]
//! tag <name> <id> [current]
//! ```
//!
//! Commits are listed children first, the way `git log` prints them.

use crate::artifacts::graph::commit::{
    Branch, BranchList, Commit, CommitId, HistorySource, Tag, TagList,
};
use anyhow::Context;
use std::path::Path;

const COMMIT_REGEX: &str = r"^commit\s+(?P<ids>[^|]*?)\s*(?:\|\s*(?P<description>.*?))?\s*$";
const REF_REGEX: &str = r"^(?P<kind>branch|tag)\s+(?P<name>\S+)\s+(?P<id>\S+)(?P<options>.*)$";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    commits: Vec<Commit>,
    branches: BranchList,
    tags: TagList,
}

impl Listing {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history listing {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("invalid history listing {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let commit_regex = regex::Regex::new(COMMIT_REGEX)?;
        let ref_regex = regex::Regex::new(REF_REGEX)?;
        let mut listing = Listing::default();

        for (number, line) in content.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = commit_regex.captures(line) {
                let commit = Self::parse_commit(&caps)
                    .with_context(|| format!("line {number}: invalid commit entry"))?;
                listing.commits.push(commit);
            } else if let Some(caps) = ref_regex.captures(line) {
                listing
                    .push_ref(&caps)
                    .with_context(|| format!("line {number}: invalid ref entry"))?;
            } else {
                anyhow::bail!("line {number}: unrecognized entry {line:?}");
            }
        }

        Ok(listing)
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    fn parse_commit(caps: &regex::Captures<'_>) -> anyhow::Result<Commit> {
        let mut ids = caps["ids"].split_whitespace().map(CommitId::try_parse);
        let id = ids
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing commit id"))??;
        let parents = ids.collect::<anyhow::Result<Vec<_>>>()?;
        let description = caps
            .name("description")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Commit::new(id, parents, description))
    }

    fn push_ref(&mut self, caps: &regex::Captures<'_>) -> anyhow::Result<()> {
        let name = caps["name"].to_string();
        let commit_id = CommitId::try_parse(&caps["id"])?;
        let mut current = false;
        let mut remote = None;
        let mut parent_info = None;

        for option in caps["options"].split_whitespace() {
            match option.split_once('=') {
                None if option == "current" => current = true,
                Some(("remote", value)) if &caps["kind"] == "branch" => {
                    remote = Some(value.to_string())
                }
                Some(("parent", value)) if &caps["kind"] == "branch" => {
                    parent_info = Some(value.to_string())
                }
                _ => anyhow::bail!("unknown option {option:?} for {} {name}", &caps["kind"]),
            }
        }

        match &caps["kind"] {
            "branch" => {
                if current {
                    Self::mark_current(&mut self.branches.current, self.branches.branches.len(), &name)?;
                }
                self.branches
                    .branches
                    .push(Branch::new(commit_id, name, parent_info, remote));
            }
            _ => {
                if current {
                    Self::mark_current(&mut self.tags.current, self.tags.tags.len(), &name)?;
                }
                self.tags.tags.push(Tag::new(commit_id, name));
            }
        }

        Ok(())
    }

    fn mark_current(slot: &mut Option<usize>, index: usize, name: &str) -> anyhow::Result<()> {
        if slot.is_some() {
            anyhow::bail!("{name} cannot be current: another entry already is");
        }
        *slot = Some(index);
        Ok(())
    }
}

impl HistorySource for Listing {
    fn commit_list(&self) -> anyhow::Result<Vec<Commit>> {
        Ok(self.commits.clone())
    }

    fn branches(&self) -> anyhow::Result<BranchList> {
        Ok(self.branches.clone())
    }

    fn tags(&self) -> anyhow::Result<TagList> {
        Ok(self.tags.clone())
    }
}
