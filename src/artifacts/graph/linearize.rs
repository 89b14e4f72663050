//! Linearization of search streams
//!
//! Turns the per-tip streams of a search into one ordered sequence. A commit
//! shared by several streams is emitted once, after every stream containing
//! it has emitted everything that precedes it in that stream, and is tagged
//! with the set of streams it belongs to.
//!
//! Streams are scanned in ascending index order and the scan restarts from
//! the first stream after every emission, so lower-indexed streams win ties.

use crate::artifacts::graph::commit::CommitId;
use crate::artifacts::graph::search::StreamSet;
use crate::errors::GraphError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// One row of the linearized history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearEntry {
    pub commit: CommitId,
    pub streams: StreamSet,
}

/// Merge `streams` into a single order respecting every stream's order
///
/// # Errors
///
/// - [`GraphError::TooManyTips`] above [`StreamSet::MAX_STREAMS`] streams
/// - [`GraphError::InconsistentStreams`] when two streams order shared
///   commits differently, so no commit can be emitted
pub fn linearise_search(streams: &[Vec<CommitId>]) -> Result<Vec<LinearEntry>, GraphError> {
    if streams.len() > StreamSet::MAX_STREAMS {
        return Err(GraphError::TooManyTips {
            requested: streams.len(),
            max: StreamSet::MAX_STREAMS,
        });
    }

    let mut occurrences: HashMap<&CommitId, Vec<(usize, usize)>> = HashMap::new();
    for (stream, commits) in streams.iter().enumerate() {
        for (offset, commit) in commits.iter().enumerate() {
            occurrences.entry(commit).or_default().push((stream, offset));
        }
    }

    let mut cursors = vec![0usize; streams.len()];
    let mut waiting: HashMap<&CommitId, StreamSet> = HashMap::new();
    let mut entries = Vec::with_capacity(occurrences.len());

    // Streams still holding `commit` at or after their cursor.
    let pending = |commit: &CommitId, cursors: &[usize]| {
        occurrences
            .get(commit)
            .into_iter()
            .flatten()
            .filter(|(stream, offset)| *offset >= cursors[*stream])
            .fold(StreamSet::empty(), |set, (stream, _)| {
                set | StreamSet::single(*stream)
            })
    };

    'scan: loop {
        let mut blocked = None;

        for (stream, commits) in streams.iter().enumerate() {
            let Some(commit) = commits.get(cursors[stream]) else {
                continue;
            };
            blocked.get_or_insert(commit);

            let owners = pending(commit, &cursors);
            let held = waiting.entry(commit).or_default();
            held.insert(StreamSet::single(stream));
            if *held != owners {
                trace!(stream, %commit, held = %*held, %owners, "stream waits for shared commit");
                continue;
            }

            waiting.remove(commit);
            for owner in owners.indices() {
                cursors[owner] += 1;
            }
            entries.push(LinearEntry {
                commit: commit.clone(),
                streams: owners,
            });
            continue 'scan;
        }

        match blocked {
            None => break,
            Some(commit) => {
                debug!(%commit, "streams cannot agree on an order");
                return Err(GraphError::InconsistentStreams(commit.clone()));
            }
        }
    }

    debug!(entries = entries.len(), streams = streams.len(), "linearized search streams");
    Ok(entries)
}
