use crate::areas::history::History;
use crate::artifacts::graph::commit::CommitId;
use crate::errors::GraphError;
use std::cell::{RefCell, RefMut};

/// A loaded history plus the writer commands print to
pub struct Viewer {
    history: History,
    writer: RefCell<Box<dyn std::io::Write>>,
}

impl Viewer {
    pub fn new(history: History, writer: Box<dyn std::io::Write>) -> Self {
        Viewer {
            history,
            writer: RefCell::new(writer),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    /// Resolve a branch name, a tag name or a commit id, in that order
    pub fn resolve_tip(&self, name: &str) -> anyhow::Result<CommitId> {
        if let Some(branch) = self.history.branch(name) {
            return Ok(branch.commit_id.clone());
        }
        if let Some(tag) = self.history.tag(name) {
            return Ok(tag.commit_id.clone());
        }

        let id = CommitId::try_parse(name)?;
        if self.history.graph().get(&id).is_none() {
            return Err(GraphError::UnknownCommit(id).into());
        }

        Ok(id)
    }
}
