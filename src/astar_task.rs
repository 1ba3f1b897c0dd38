//! # A* task
//!
//! Wraps an [`AStar`] search in a [`Task`] so it can be dropped onto a
//! [`crate::scheduler::Scheduler`] alongside everything else: each
//! `run()` call expands a bounded number of nodes, and the task reports
//! `Waiting` while the search is still in progress, `Terminated` once it
//! resolves (found or exhausted).

use crate::astar::{AStar, SearchStep};
use crate::graph::{Graph, NodeIndex};
use crate::task::{Status, Task, TaskState};
use tracing::debug;

/// Notified when an [`AStarTask`] finishes, with either the found path
/// or `None` if the goal was unreachable.
pub trait AStarTaskListener {
    fn on_search_complete(&mut self, path: Option<Vec<NodeIndex>>);
}

/// A [`Task`] that drives an [`AStar`] search a bounded number of
/// expansions at a time.
pub struct AStarTask<'g, N, E> {
    state: TaskState,
    search: AStar<'g, N, E>,
    steps_per_run: usize,
    listener: Option<Box<dyn AStarTaskListener>>,
    result: Option<Option<Vec<NodeIndex>>>,
}

impl<'g, N, E> AStarTask<'g, N, E> {
    /// Build a task that searches `graph` from `start` for any node
    /// matching `goal`, expanding at most `steps_per_run` nodes per
    /// `run()` call.
    pub fn new(
        graph: &'g Graph<N, E>,
        start: NodeIndex,
        goal: impl Fn(NodeIndex) -> bool + 'g,
        heuristic: impl Fn(NodeIndex) -> f64 + 'g,
        steps_per_run: usize,
    ) -> Self {
        Self {
            state: TaskState::new(),
            search: AStar::new(graph, start, goal, heuristic),
            steps_per_run,
            listener: None,
            result: None,
        }
    }

    /// Install the completion listener.
    pub fn set_search_listener(&mut self, listener: Option<Box<dyn AStarTaskListener>>) {
        self.listener = listener;
    }

    /// The found path, once the task has terminated with a result.
    /// Returns `None` both before completion and when the search was
    /// exhausted — use [`Task::status`] to distinguish "not finished yet"
    /// from "finished, unreachable".
    pub fn path(&self) -> Option<&[NodeIndex]> {
        self.result.as_ref().and_then(|r| r.as_deref())
    }
}

impl<'g, N, E> Task for AStarTask<'g, N, E> {
    fn run(&mut self) {
        match self.search.run(self.steps_per_run) {
            SearchStep::InProgress => {
                self.set_status(Status::Waiting);
            }
            SearchStep::Found(path) => {
                debug!(len = path.len(), "a* search found a path");
                if let Some(l) = self.listener.as_mut() {
                    l.on_search_complete(Some(path.clone()));
                }
                self.result = Some(Some(path));
                self.set_status(Status::Terminated);
            }
            SearchStep::Exhausted => {
                debug!("a* search exhausted the open set without reaching the goal");
                if let Some(l) = self.listener.as_mut() {
                    l.on_search_complete(None);
                }
                self.result = Some(None);
                self.set_status(Status::Terminated);
            }
        }
    }

    fn state(&self) -> &TaskState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TaskState {
        &mut self.state
    }
}
