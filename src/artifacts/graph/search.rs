//! Multi-tip ancestor search
//!
//! Finds the joint common ancestry of N commits (branch tips), not just a
//! pairwise merge base.
//!
//! ## Algorithm Overview
//!
//! Tip `i` owns the bit `1 << i` of a [`StreamSet`]. Every commit the search
//! reaches records the set of tips it was reached from. The search keeps a
//! FIFO queue of streams; each stream is a lineage walking first parents:
//!
//! 1. Pop the earliest-queued stream and refresh its set from its current
//!    commit (another lineage may have merged into it meanwhile).
//! 2. Advance to the first parent:
//!    - unexplored: record the set, re-queue the stream;
//!    - already reached: OR the sets. If the union holds every tip, that
//!      parent is the joint common ancestor and the search ends. Otherwise
//!      the union is pushed to the already-reached ancestors of that parent
//!      and the stream ends, merged.
//! 3. Every extra parent of a branch point spawns a stream with the same set
//!    when unexplored, or is merged like above.
//!
//! The queue drains without a full union only when the histories are
//! disjoint. Every continuing step reaches a commit for the first time, so
//! the number of steps is bounded by the graph size; exceeding that bound
//! means the graph is malformed and is reported rather than looped on.
//!
//! ## Result
//!
//! For each tip, the commits from the tip down to the common ancestor,
//! following first parents wherever they carry the tip's bit. Commits the
//! search visited past the ancestor are not part of the result.

use crate::artifacts::graph::builder::CommitGraph;
use crate::artifacts::graph::commit::{BranchList, CommitId};
use crate::errors::GraphError;
use bitflags::bitflags;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, trace};

bitflags! {
    /// Set of originating streams, one bit per requested tip
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamSet: u64 {
        const _ = !0;
    }
}

impl StreamSet {
    pub const MAX_STREAMS: usize = u64::BITS as usize;

    /// The set holding only stream `index`
    pub fn single(index: usize) -> Self {
        debug_assert!(index < Self::MAX_STREAMS);
        Self::from_bits_retain(1 << index)
    }

    /// The set holding streams `0..count`
    pub fn first(count: usize) -> Self {
        if count >= Self::MAX_STREAMS {
            Self::all()
        } else {
            Self::from_bits_retain((1 << count) - 1)
        }
    }

    pub fn has_stream(&self, index: usize) -> bool {
        index < Self::MAX_STREAMS && self.contains(Self::single(index))
    }

    /// Stream indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::MAX_STREAMS).filter(|index| self.has_stream(*index))
    }
}

impl fmt::Debug for StreamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices = self
            .indices()
            .map(|index| index.to_string())
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", indices.join(","))
    }
}

impl fmt::Display for StreamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of [`AncestorSearch::search_by_commits`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A single tip: its first-parent history
    Linear { stream: Vec<CommitId> },
    /// Every tip reaches `ancestor`; one stream per tip, ending at it
    Joined {
        ancestor: CommitId,
        streams: Vec<Vec<CommitId>>,
    },
    /// No commit is reachable from all tips; each tip's own first-parent walk
    Disjoint { partial: Vec<Vec<CommitId>> },
}

impl SearchOutcome {
    pub fn ancestor(&self) -> Option<&CommitId> {
        match self {
            SearchOutcome::Joined { ancestor, .. } => Some(ancestor),
            SearchOutcome::Linear { .. } | SearchOutcome::Disjoint { .. } => None,
        }
    }

    /// Per-tip commit streams, ready for the linearizer
    pub fn streams(&self) -> &[Vec<CommitId>] {
        match self {
            SearchOutcome::Linear { stream } => std::slice::from_ref(stream),
            SearchOutcome::Joined { streams, .. } => streams,
            SearchOutcome::Disjoint { partial } => partial,
        }
    }
}

/// One in-flight lineage of a search
#[derive(Debug, Clone)]
struct SearchStream {
    tips: StreamSet,
    commits: Vec<usize>,
}

impl SearchStream {
    fn head(&self) -> usize {
        // Streams are created with one commit and only grow.
        self.commits[self.commits.len() - 1]
    }
}

/// Mutable bookkeeping of one search call
struct SearchState<'g> {
    graph: &'g CommitGraph,
    everyone: StreamSet,
    reached: Vec<StreamSet>,
    streams: Vec<SearchStream>,
    queue: VecDeque<usize>,
}

impl SearchState<'_> {
    fn spawn(&mut self, commit: usize, tips: StreamSet) -> usize {
        self.streams.push(SearchStream {
            tips,
            commits: vec![commit],
        });
        self.streams.len() - 1
    }

    /// OR `tips` into an already-reached commit and its reached ancestors
    ///
    /// Returns the first commit whose set becomes complete.
    fn merge(&mut self, commit: usize, tips: StreamSet) -> Option<usize> {
        let existing = self.reached[commit];
        let union = existing | tips;
        if union == existing {
            return None;
        }
        self.reached[commit] = union;
        if union == self.everyone {
            return Some(commit);
        }

        let graph = self.graph;
        let mut pending = VecDeque::from([commit]);
        while let Some(position) = pending.pop_front() {
            for &parent in graph.parent_positions(position) {
                let known = self.reached[parent];
                if known.is_empty() || known.contains(union) {
                    continue;
                }
                self.reached[parent] = known | union;
                if self.reached[parent] == self.everyone {
                    return Some(parent);
                }
                pending.push_back(parent);
            }
        }

        None
    }

    /// Advance the earliest-queued stream by one commit
    fn step(&mut self, stream: usize) -> Option<usize> {
        let graph = self.graph;
        let current = self.streams[stream].head();
        let tips = self.reached[current];
        self.streams[stream].tips = tips;

        let Some((&first, extra)) = graph.parent_positions(current).split_first() else {
            trace!(stream, commit = %self.id(current), tips = %self.streams[stream].tips, "stream reached a root");
            return None;
        };

        self.streams[stream].commits.push(first);
        if self.reached[first].is_empty() {
            self.reached[first] = tips;
            self.queue.push_back(stream);
            trace!(stream, commit = %self.id(first), %tips, "stream advanced");
        } else {
            debug!(stream, commit = %self.id(first), %tips, "stream merged");
            if let Some(found) = self.merge(first, tips) {
                return Some(found);
            }
        }

        for &parent in extra {
            if self.reached[parent].is_empty() {
                self.reached[parent] = tips;
                let spawned = self.spawn(parent, tips);
                self.queue.push_back(spawned);
                debug!(stream = spawned, from = stream, commit = %self.id(parent), "spawned stream at branch point");
            } else if let Some(found) = self.merge(parent, tips) {
                return Some(found);
            }
        }

        None
    }

    fn id(&self, position: usize) -> &CommitId {
        self.graph.id_at(position)
    }

    /// Path from `from` to `target` through commits carrying `bit`,
    /// preferring earlier parents
    fn path(&self, from: usize, target: usize, bit: StreamSet) -> Vec<usize> {
        let mut visited = HashSet::from([from]);
        let mut stack = vec![(from, 0usize)];

        loop {
            let Some(top) = stack.last_mut() else {
                return Vec::new();
            };
            if top.0 == target {
                return stack.iter().map(|(position, _)| *position).collect();
            }

            let parent = self.graph.parent_positions(top.0).get(top.1).copied();
            top.1 += 1;
            match parent {
                Some(parent) => {
                    if self.reached[parent].contains(bit) && visited.insert(parent) {
                        stack.push((parent, 0));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    fn ids(&self, positions: &[usize]) -> Vec<CommitId> {
        positions
            .iter()
            .map(|position| self.id(*position).clone())
            .collect()
    }
}

/// Searches over a built [`CommitGraph`]
#[derive(Debug, Clone, Copy)]
pub struct AncestorSearch<'g> {
    graph: &'g CommitGraph,
}

impl<'g> AncestorSearch<'g> {
    pub fn new(graph: &'g CommitGraph) -> Self {
        Self { graph }
    }

    /// Find the joint common ancestry of `ids`
    ///
    /// # Errors
    ///
    /// - [`GraphError::NoTips`] for an empty request
    /// - [`GraphError::TooManyTips`] above [`StreamSet::MAX_STREAMS`]
    /// - [`GraphError::UnknownCommit`] if any id is absent from the graph
    /// - [`GraphError::Malformed`] if the walk does not terminate in bounds
    pub fn search_by_commits(&self, ids: &[CommitId]) -> Result<SearchOutcome, GraphError> {
        if ids.is_empty() {
            return Err(GraphError::NoTips);
        }
        if ids.len() > StreamSet::MAX_STREAMS {
            return Err(GraphError::TooManyTips {
                requested: ids.len(),
                max: StreamSet::MAX_STREAMS,
            });
        }

        let tips = ids
            .iter()
            .map(|id| {
                self.graph
                    .position(id)
                    .ok_or_else(|| GraphError::UnknownCommit(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let [tip] = tips.as_slice() {
            return self.first_parent_chain(*tip).map(|stream| SearchOutcome::Linear { stream });
        }

        debug!(tips = ?ids, "starting ancestor search");
        let mut state = SearchState {
            graph: self.graph,
            everyone: StreamSet::first(tips.len()),
            reached: vec![StreamSet::empty(); self.graph.len()],
            streams: Vec::with_capacity(tips.len()),
            queue: VecDeque::with_capacity(tips.len()),
        };

        let mut found = None;
        for (index, &tip) in tips.iter().enumerate() {
            let bit = StreamSet::single(index);
            let seed = state.spawn(tip, bit);
            if state.reached[tip].is_empty() {
                state.reached[tip] = bit;
                state.queue.push_back(seed);
            } else if let Some(ancestor) = state.merge(tip, bit) {
                found = Some(ancestor);
                break;
            }
        }

        let budget = 2 * self.graph.len() + tips.len() + 1;
        let mut steps = 0;
        while found.is_none()
            && let Some(stream) = state.queue.pop_front()
        {
            steps += 1;
            if steps > budget {
                return Err(GraphError::Malformed(format!(
                    "ancestor search exceeded {budget} steps"
                )));
            }
            found = state.step(stream);
        }

        match found {
            Some(ancestor) => {
                debug!(ancestor = %state.id(ancestor), streams = state.streams.len(), "joint common ancestor found");
                let streams = tips
                    .iter()
                    .enumerate()
                    .map(|(index, &tip)| {
                        state.ids(&state.path(tip, ancestor, StreamSet::single(index)))
                    })
                    .collect();
                Ok(SearchOutcome::Joined {
                    ancestor: state.id(ancestor).clone(),
                    streams,
                })
            }
            None => {
                debug!(streams = state.streams.len(), "histories are disjoint");
                let partial = state.streams[..tips.len()]
                    .iter()
                    .map(|stream| state.ids(&stream.commits))
                    .collect();
                Ok(SearchOutcome::Disjoint { partial })
            }
        }
    }

    /// Resolve branch names, then search their tips
    pub fn search_by_branch(
        &self,
        branches: &BranchList,
        names: &[&str],
    ) -> Result<SearchOutcome, GraphError> {
        let ids = names
            .iter()
            .map(|name| {
                branches
                    .find(name)
                    .map(|branch| branch.commit_id.clone())
                    .ok_or_else(|| GraphError::UnknownBranch(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.search_by_commits(&ids)
    }

    fn first_parent_chain(&self, tip: usize) -> Result<Vec<CommitId>, GraphError> {
        let chain: Vec<CommitId> = std::iter::successors(Some(tip), |position| {
            self.graph.parent_positions(*position).first().copied()
        })
        .take(self.graph.len() + 1)
        .map(|position| self.graph.id_at(position).clone())
        .collect();

        if chain.len() > self.graph.len() {
            return Err(GraphError::Malformed(format!(
                "first-parent chain from {} does not terminate",
                chain[0]
            )));
        }

        Ok(chain)
    }
}
