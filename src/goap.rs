//! # GOAP — Goal-Oriented Action Planning
//!
//! Builds a [`crate::graph::Graph`] of reachable world states by forward
//! expansion from a start state: repeatedly apply every action whose
//! preconditions hold, pruning a branch the moment it reaches a state
//! already known at an equal-or-lower cost (a memoized best-cost map
//! keyed by state, not a per-branch visited set).
//!
//! Deliberately, [`build_graph`] never looks at the goal. Reaching the
//! goal is left entirely to a subsequent [`crate::astar::AStar`] search
//! over the built graph, driven by a goal predicate — the graph-building
//! and goal-seeking concerns stay fully separate, matching the original
//! planner's structure.

use crate::graph::{Graph, NodeIndex};
use std::collections::HashMap;
use std::hash::Hash;

/// One action the planner may apply to a world state.
pub trait GoapAction<S> {
    /// Whether this action can be applied to `state`.
    fn is_applicable(&self, state: &S) -> bool;

    /// The state that results from applying this action to `state`.
    /// Only ever called when `is_applicable` returned `true`.
    fn apply(&self, state: &S) -> S;

    /// The cost of applying this action from `state`. Must be
    /// non-negative for A* admissibility to hold over the built graph.
    fn cost(&self, state: &S) -> f64;

    /// A short label, used only for diagnostics.
    fn name(&self) -> &str;
}

impl<S, T: GoapAction<S> + ?Sized> GoapAction<S> for Box<T> {
    fn is_applicable(&self, state: &S) -> bool {
        (**self).is_applicable(state)
    }
    fn apply(&self, state: &S) -> S {
        (**self).apply(state)
    }
    fn cost(&self, state: &S) -> f64 {
        (**self).cost(state)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Forward-expand every reachable state from `start` into a graph, up to
/// `max_nodes` states, applying `actions` at each frontier state. Each
/// graph edge carries the index (into `actions`) of the action that
/// produced it, so a planner can recover the action sequence once a path
/// is found.
///
/// Branches are pruned via a `state -> best known cost` map: a
/// newly reached state that is no cheaper than a previously recorded
/// visit to the same state is not re-expanded, bounding the search even
/// when many action orderings reach the same state.
pub fn build_graph<S, A>(start: S, actions: &[A], max_nodes: usize) -> (Graph<S, usize>, NodeIndex)
where
    S: Clone + Eq + Hash,
    A: GoapAction<S>,
{
    let mut graph: Graph<S, usize> = Graph::new();
    let start_idx = graph.add_node(start.clone());

    let mut best_cost: HashMap<S, f64> = HashMap::new();
    best_cost.insert(start.clone(), 0.0);

    let mut frontier: Vec<(NodeIndex, f64)> = vec![(start_idx, 0.0)];

    while let Some((node_idx, node_cost)) = frontier.pop() {
        if graph.len() >= max_nodes {
            break;
        }
        let state = graph.node(node_idx).clone();

        for (action_idx, action) in actions.iter().enumerate() {
            if !action.is_applicable(&state) {
                continue;
            }
            let next_state = action.apply(&state);
            let edge_cost = action.cost(&state);
            let next_cost = node_cost + edge_cost;

            let is_better = match best_cost.get(&next_state) {
                Some(&known) => next_cost < known,
                None => true,
            };
            if !is_better {
                continue;
            }
            best_cost.insert(next_state.clone(), next_cost);

            let next_idx = graph.add_node(next_state);
            graph.add_edge(node_idx, next_idx, edge_cost, action_idx);
            frontier.push((next_idx, next_cost));
        }
    }

    (graph, start_idx)
}

/// Recover the sequence of action names along a path produced by running
/// [`crate::astar::find_path`] over the graph `build_graph` returned.
pub fn action_names<'a, S>(
    graph: &Graph<S, usize>,
    actions: &'a [impl GoapAction<S>],
    path: &[NodeIndex],
) -> Vec<&'a str> {
    let mut names = Vec::with_capacity(path.len().saturating_sub(1));
    for window in path.windows(2) {
        let (from, to) = (window[0], window[1]);
        if let Some(edge) = graph.successors(from).iter().find(|e| e.target == to) {
            names.push(actions[edge.data].name());
        }
    }
    names
}
