use crate::areas::viewer::Viewer;
use crate::artifacts::graph::builder::CommitGraph;
use crate::artifacts::graph::commit::CommitId;
use crate::artifacts::graph::search::SearchOutcome;
use anyhow::bail;
use tracing::debug;

impl Viewer {
    /// Print the lowest common ancestor of `tips`
    ///
    /// Fails when the histories share no commit.
    pub fn merge_base(&self, tips: &[String]) -> anyhow::Result<()> {
        let ids = tips
            .iter()
            .map(|tip| self.resolve_tip(tip))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let ancestor = match self.history().search_by_commits(&ids)? {
            SearchOutcome::Joined { ancestor, .. } => {
                lowest_common_ancestor(self.history().graph(), ancestor, &ids)?
            }
            // A commit is its own ancestor.
            SearchOutcome::Linear { mut stream } if !stream.is_empty() => stream.swap_remove(0),
            SearchOutcome::Linear { .. } | SearchOutcome::Disjoint { .. } => {
                bail!("no common ancestor: histories of {} are disjoint", tips.join(", "))
            }
        };

        writeln!(self.writer(), "{ancestor}")?;
        Ok(())
    }
}

/// Descend from `ancestor` through children that still reach every tip
///
/// The search stops at the first commit all lineages meet at, which is not
/// always the lowest one when the tips sit at very different depths.
fn lowest_common_ancestor(
    graph: &CommitGraph,
    ancestor: CommitId,
    tips: &[CommitId],
) -> anyhow::Result<CommitId> {
    let reaches_every_tip = |id: &CommitId| -> anyhow::Result<bool> {
        for tip in tips {
            if !graph.is_ancestor(id, tip)? {
                return Ok(false);
            }
        }
        Ok(true)
    };

    let mut lowest = ancestor;
    loop {
        let mut lower = None;
        for child in graph.children(&lowest).unwrap_or_default() {
            if reaches_every_tip(child)? {
                lower = Some(child.clone());
                break;
            }
        }

        match lower {
            Some(child) => {
                debug!(from = %lowest, to = %child, "lowered common ancestor");
                lowest = child;
            }
            None => return Ok(lowest),
        }
    }
}
