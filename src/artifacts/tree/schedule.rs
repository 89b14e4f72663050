//! Forward-propagating task schedule
//!
//! Tasks are laid out back to back in walk order: every task starts when
//! the payload before it (per [`Tree::prev_payload_node`]) ends, or at the
//! origin when nothing precedes it inside the walk. One walk computes the
//! whole schedule.

use crate::artifacts::tree::node::{NodeId, Tree};
use crate::artifacts::tree::walk::WalkFlags;
use crate::errors::TreeError;
use chrono::{DateTime, FixedOffset, TimeDelta};
use derive_new::new;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Task {
    name: String,
    effort: TimeDelta,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effort(&self) -> TimeDelta {
        self.effort
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpan {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Schedule every task a walk from `start` reaches
pub fn schedule(
    tree: &Tree<Task>,
    start: NodeId,
    origin: DateTime<FixedOffset>,
) -> Result<HashMap<NodeId, TaskSpan>, TreeError> {
    tree.walk_tree(start, HashMap::new(), |mut spans, step| {
        if let Some(task) = tree.payload(step.node) {
            let begins = tree
                .prev_payload_node(step.node)
                .and_then(|before| spans.get(&before))
                .map_or(origin, |span: &TaskSpan| span.end);
            spans.insert(
                step.node,
                TaskSpan {
                    start: begins,
                    end: begins + task.effort(),
                },
            );
        }
        (spans, WalkFlags::empty())
    })
}
