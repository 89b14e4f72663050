use crate::areas::viewer::Viewer;
use crate::artifacts::graph::builder::CommitNode;
use crate::artifacts::graph::linearize::LinearEntry;
use crate::artifacts::graph::search::SearchOutcome;
use colored::Colorize;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub branches: Vec<String>,
    pub commits: Vec<String>,
    pub oneline: bool,
}

/// Lane layout of a linearized history: one column per stream
struct Lanes {
    last_rows: Vec<usize>,
}

impl Lanes {
    fn new(streams: usize, entries: &[LinearEntry]) -> Self {
        let mut last_rows = vec![0; streams];
        for (row, entry) in entries.iter().enumerate() {
            for stream in entry.streams.indices() {
                last_rows[stream] = row;
            }
        }

        Lanes { last_rows }
    }

    /// `*` for contributing streams, `|` for streams that continue below
    fn render(&self, row: usize, entry: &LinearEntry) -> String {
        self.last_rows
            .iter()
            .enumerate()
            .map(|(stream, &last)| {
                if entry.streams.has_stream(stream) {
                    "*"
                } else if row < last {
                    "|"
                } else {
                    " "
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Viewer {
    pub fn log(&self, opts: &LogOptions) -> anyhow::Result<()> {
        let outcome = self.search_tips(opts)?;
        if let SearchOutcome::Disjoint { partial } = &outcome {
            warn!(tips = partial.len(), "histories are disjoint, showing each tip separately");
        }

        let entries = self.history().linearise(&outcome)?;
        let lanes = Lanes::new(outcome.streams().len(), &entries);

        for (row, entry) in entries.iter().enumerate() {
            let node = self
                .history()
                .graph()
                .get(&entry.commit)
                .ok_or_else(|| anyhow::anyhow!("commit {} missing from graph", entry.commit))?;

            if opts.oneline {
                writeln!(
                    self.writer(),
                    "{}{} {}",
                    entry.commit.to_short_id().yellow(),
                    self.decoration(node),
                    node.short_description()
                )?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {}{} {}",
                    lanes.render(row, entry),
                    entry.commit.to_short_id().yellow(),
                    self.decoration(node),
                    node.short_description()
                )?;
            }
        }

        Ok(())
    }

    fn search_tips(&self, opts: &LogOptions) -> anyhow::Result<SearchOutcome> {
        if opts.commits.is_empty() {
            let names: Vec<&str> = if opts.branches.is_empty() {
                let current = self.history().current_branch().ok_or_else(|| {
                    anyhow::anyhow!("no current branch; pass --branch or --commit")
                })?;
                vec![current.name.as_str()]
            } else {
                opts.branches.iter().map(String::as_str).collect()
            };

            return Ok(self.history().search_by_branch(&names)?);
        }

        let ids = opts
            .branches
            .iter()
            .chain(&opts.commits)
            .map(|name| self.resolve_tip(name))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(self.history().search_by_commits(&ids)?)
    }

    fn decoration(&self, node: &CommitNode) -> String {
        let current = self.history().current_branch().map(|b| b.name.as_str());
        let branches = node.branches().iter().map(|name| {
            let remote = self
                .history()
                .branch(name)
                .and_then(|branch| branch.remote.as_deref());
            match remote {
                Some(remote) => format!("{remote}/{name}").red().to_string(),
                None if current == Some(name.as_str()) => {
                    format!("HEAD -> {name}").cyan().bold().to_string()
                }
                None => name.green().to_string(),
            }
        });
        let tags = node
            .tags()
            .iter()
            .map(|tag| format!("tag: {tag}").yellow().to_string());

        let names = branches.chain(tags).collect::<Vec<_>>();
        if names.is_empty() {
            String::new()
        } else {
            format!(" ({})", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::graph::commit::CommitId;
    use crate::artifacts::graph::search::StreamSet;

    fn entry(id: &str, streams: &[usize]) -> LinearEntry {
        LinearEntry {
            commit: CommitId::try_parse(id).unwrap(),
            streams: streams
                .iter()
                .fold(StreamSet::empty(), |set, s| set | StreamSet::single(*s)),
        }
    }

    #[test]
    fn lanes_stay_open_until_their_last_commit() {
        let entries = vec![entry("A", &[0]), entry("B", &[1]), entry("R", &[0, 1])];
        let lanes = Lanes::new(2, &entries);

        let rows: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(row, e)| lanes.render(row, e))
            .collect();

        assert_eq!(rows, vec!["* |", "| *", "* *"]);
    }

    #[test]
    fn finished_lanes_are_blank() {
        let entries = vec![entry("X", &[0]), entry("Y", &[1]), entry("Z", &[1])];
        let lanes = Lanes::new(2, &entries);

        assert_eq!(lanes.render(2, &entries[2]), "  *");
    }
}
