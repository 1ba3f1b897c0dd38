//! # A*
//!
//! Incremental A* search over a [`crate::graph::Graph`], with bookkeeping
//! preallocated per node (`NodeInfo`) rather than allocated per expansion
//! — the same trade the original made to keep the hot path allocation
//! free, here expressed as one `Vec<NodeInfo>` sized to the graph up
//! front.
//!
//! Search is driven one expansion at a time via [`AStar::step`] so that
//! [`crate::astar_task::AStarTask`] can bound how much of a search runs
//! per scheduler time slice, rather than blocking until a full path is
//! found or exhausted.

use crate::graph::{Graph, NodeIndex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A finite `f64` wrapped for use in a max-heap ordered by "lowest cost
/// first". Search heuristics and edge costs are assumed never to produce
/// NaN; `partial_cmp` is unwrapped rather than silently treating NaN as
/// any particular ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MinCost(f64);

impl Eq for MinCost {}

impl PartialOrd for MinCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so a `BinaryHeap` (a max-heap) pops the lowest cost.
        other.0.partial_cmp(&self.0).expect("cost must not be NaN")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct NodeInfo {
    est_total_cost: f64,
    current_cost: f64,
    parent: Option<NodeIndex>,
    /// Ordinal, within `parent`'s successor list, of the edge that
    /// reached this node — the connection half of the parent link,
    /// needed to reconstruct `out_connections` without re-searching
    /// `parent`'s edges for the one that matches.
    incoming_edge_ordinal: Option<usize>,
    state: NodeState,
}

impl NodeInfo {
    fn unvisited() -> Self {
        Self {
            est_total_cost: f64::INFINITY,
            current_cost: f64::INFINITY,
            parent: None,
            incoming_edge_ordinal: None,
            state: NodeState::Unvisited,
        }
    }
}

/// Outcome of a single [`AStar::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// The search is not yet resolved; call `step` again.
    InProgress,
    /// A path to the goal was found.
    Found(Vec<NodeIndex>),
    /// The open set emptied without reaching the goal — no path exists.
    Exhausted,
}

/// Incremental A* search state over a borrowed graph.
pub struct AStar<'g, N, E> {
    graph: &'g Graph<N, E>,
    goal: Box<dyn Fn(NodeIndex) -> bool + 'g>,
    heuristic: Box<dyn Fn(NodeIndex) -> f64 + 'g>,
    open: BinaryHeap<(MinCost, NodeIndex)>,
    info: Vec<NodeInfo>,
    done: Option<SearchStep>,
}

impl<'g, N, E> AStar<'g, N, E> {
    /// Begin a new search from `start`. `goal` decides whether a node is
    /// an acceptable destination — for a single concrete target node this
    /// is just `move |n| n == target`; `heuristic` must be admissible
    /// (never overestimate true remaining cost). Pass `|_| 0.0` for plain
    /// Dijkstra.
    pub fn new(
        graph: &'g Graph<N, E>,
        start: NodeIndex,
        goal: impl Fn(NodeIndex) -> bool + 'g,
        heuristic: impl Fn(NodeIndex) -> f64 + 'g,
    ) -> Self {
        let mut info = vec![NodeInfo::unvisited(); graph.len()];
        info[start.index()] = NodeInfo {
            est_total_cost: heuristic(start),
            current_cost: 0.0,
            parent: None,
            incoming_edge_ordinal: None,
            state: NodeState::Open,
        };
        let mut open = BinaryHeap::new();
        open.push((MinCost(info[start.index()].est_total_cost), start));
        Self {
            graph,
            goal: Box::new(goal),
            heuristic: Box::new(heuristic),
            open,
            info,
            done: None,
        }
    }

    /// Expand the single best open node. Returns the search's current
    /// status; once `Found` or `Exhausted` is returned, further calls
    /// return the same value without doing more work.
    pub fn step(&mut self) -> SearchStep {
        if let Some(done) = &self.done {
            return done.clone();
        }

        let Some((_, current)) = self.open.pop() else {
            self.done = Some(SearchStep::Exhausted);
            return SearchStep::Exhausted;
        };

        if self.info[current.index()].state == NodeState::Closed {
            // Stale heap entry from a cost update; skip it.
            return SearchStep::InProgress;
        }
        self.info[current.index()].state = NodeState::Closed;

        if (self.goal)(current) {
            let path = self.build_path(current);
            let result = SearchStep::Found(path);
            self.done = Some(result.clone());
            return result;
        }

        let current_cost = self.info[current.index()].current_cost;
        for (ordinal, edge) in self.graph.successors(current).iter().enumerate() {
            let neighbor = edge.target;
            let tentative = current_cost + edge.cost;
            let existing = &self.info[neighbor.index()];
            if existing.state == NodeState::Closed && tentative >= existing.current_cost {
                continue;
            }
            if tentative < existing.current_cost {
                let est = tentative + (self.heuristic)(neighbor);
                self.info[neighbor.index()] = NodeInfo {
                    est_total_cost: est,
                    current_cost: tentative,
                    parent: Some(current),
                    incoming_edge_ordinal: Some(ordinal),
                    state: NodeState::Open,
                };
                self.open.push((MinCost(est), neighbor));
            }
        }

        SearchStep::InProgress
    }

    /// Drive the search to completion, expanding at most `max_steps`
    /// nodes. Returns `InProgress` if the budget ran out first.
    pub fn run(&mut self, max_steps: usize) -> SearchStep {
        for _ in 0..max_steps {
            match self.step() {
                SearchStep::InProgress => continue,
                done => return done,
            }
        }
        SearchStep::InProgress
    }

    fn build_path(&self, goal: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = self.info[current.index()].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// The ordered `(from_index, edge_ordinal)` connections along the
    /// path to `goal`, reconstructed the same way [`Self::build_path`]
    /// reconstructs the node sequence — by walking `parent` links back
    /// to the start and reversing. `edge_ordinal` indexes `from_index`'s
    /// successor list, so a caller can recover the exact traversed edge
    /// via `graph.successors(from_index)[edge_ordinal]`.
    pub fn connections(&self, goal: NodeIndex) -> Vec<(NodeIndex, usize)> {
        let mut out = Vec::new();
        let mut current = goal;
        while let Some(parent) = self.info[current.index()].parent {
            let ordinal = self.info[current.index()]
                .incoming_edge_ordinal
                .expect("a node with a recorded parent always records the edge that reached it");
            out.push((parent, ordinal));
            current = parent;
        }
        out.reverse();
        out
    }
}

/// Convenience wrapper: run a full search to completion with no step
/// budget, for callers that don't need incremental control.
pub fn find_path<N, E>(
    graph: &Graph<N, E>,
    start: NodeIndex,
    goal: impl Fn(NodeIndex) -> bool,
    heuristic: impl Fn(NodeIndex) -> f64,
) -> Option<Vec<NodeIndex>> {
    find_path_with_connections(graph, start, goal, heuristic, None)
}

/// Like [`find_path`], but when `out_connections` is `Some` it is
/// overwritten with the ordered `(from_index, edge_ordinal)` sequence
/// corresponding to the returned path.
pub fn find_path_with_connections<N, E>(
    graph: &Graph<N, E>,
    start: NodeIndex,
    goal: impl Fn(NodeIndex) -> bool,
    heuristic: impl Fn(NodeIndex) -> f64,
    mut out_connections: Option<&mut Vec<(NodeIndex, usize)>>,
) -> Option<Vec<NodeIndex>> {
    let mut search = AStar::new(graph, start, goal, heuristic);
    loop {
        match search.step() {
            SearchStep::Found(path) => {
                if let Some(out) = out_connections.as_deref_mut() {
                    let last = *path.last().expect("a found path always has at least the goal node");
                    *out = search.connections(last);
                }
                return Some(path);
            }
            SearchStep::Exhausted => return None,
            SearchStep::InProgress => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: i64, h: i64) -> (Graph<(i64, i64), ()>, Vec<Vec<NodeIndex>>) {
        let mut g = Graph::new();
        let mut idx: Vec<Vec<Option<NodeIndex>>> = vec![vec![None; h as usize]; w as usize];
        for x in 0..w {
            for y in 0..h {
                idx[x as usize][y as usize] = Some(g.add_node((x, y)));
            }
        }
        let idx: Vec<Vec<NodeIndex>> = idx
            .into_iter()
            .map(|col| col.into_iter().map(|n| n.expect("every cell populated")).collect())
            .collect();
        for x in 0..w {
            for y in 0..h {
                let here = idx[x as usize][y as usize];
                if x + 1 < w {
                    g.add_edge(here, idx[(x + 1) as usize][y as usize], 1.0, ());
                    g.add_edge(idx[(x + 1) as usize][y as usize], here, 1.0, ());
                }
                if y + 1 < h {
                    g.add_edge(here, idx[x as usize][(y + 1) as usize], 1.0, ());
                    g.add_edge(idx[x as usize][(y + 1) as usize], here, 1.0, ());
                }
            }
        }
        (g, idx)
    }

    #[test]
    fn finds_shortest_path_on_a_grid() {
        let (g, idx) = grid(4, 4);
        let start = idx[0][0];
        let goal = idx[3][3];
        let heuristic = |n: NodeIndex| {
            let (x, y) = *g.node(n);
            let (gx, gy) = *g.node(goal);
            ((gx - x).abs() + (gy - y).abs()) as f64
        };
        let path = find_path(&g, start, |n| n == goal, heuristic).expect("path exists");
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 7); // Manhattan distance 6 + the start node.
    }

    #[test]
    fn unreachable_goal_reports_exhausted() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        // No edge between a and b.
        let mut search = AStar::new(&g, a, |n| n == b, |_| 0.0);
        assert_eq!(search.run(100), SearchStep::Exhausted);
    }

    #[test]
    fn connections_trace_the_edge_ordinal_taken_at_each_step() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let c = g.add_node(());
        // b is a's second successor, so the a->b connection's ordinal is 1.
        g.add_edge(a, c, 5.0, ());
        g.add_edge(a, b, 1.0, ());
        g.add_edge(b, c, 1.0, ());

        let mut connections = Vec::new();
        let path = find_path_with_connections(&g, a, |n| n == c, |_| 0.0, Some(&mut connections))
            .expect("a path exists");

        assert_eq!(path, vec![a, b, c]);
        assert_eq!(connections, vec![(a, 1), (b, 0)]);
    }

    #[test]
    fn step_budget_is_respected() {
        let (g, idx) = grid(10, 10);
        let start = idx[0][0];
        let goal = idx[9][9];
        let mut search = AStar::new(&g, start, |n| n == goal, |_| 0.0);
        assert_eq!(search.run(1), SearchStep::InProgress);
    }
}
