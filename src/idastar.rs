//! # IDA*
//!
//! Iterative-deepening A*: repeated depth-first searches bounded by a
//! cost threshold that starts at `heuristic(start)` and grows, each
//! iteration, to the smallest f-cost seen that exceeded the previous
//! threshold. Unlike [`crate::astar::AStar`] this needs no open/closed
//! sets — only a per-depth stack of "next sibling to try" — trading
//! search-order optimality for a constant memory footprint, which is the
//! reason to reach for it over A* on very deep or very wide graphs.
//!
//! Children are pushed onto each depth's stack worst-heuristic-first, so
//! that popping from the back of the stack (depth-first, most promising
//! child first) tries the best-looking child next. The stack itself is
//! bounded to `max_depth` frames: a child within threshold but past that
//! bound is left unexplored rather than pushed, the same way the
//! original's fixed-size stack arrays simply have no slot past
//! `maxDepth`.

use crate::error::IdaStarError;
use crate::graph::{Edge, Graph, NodeIndex};

/// Outcome of a single IDA* [`search`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum IdaResult {
    /// A path from start to goal, within the given depth bound.
    Found(Vec<NodeIndex>),
    /// No path exists within the given depth bound (search exhausted
    /// every threshold without finding the goal).
    NoPath,
}

impl IdaResult {
    /// Collapse this into a `Result` for callers that want to propagate
    /// "no path" through `?` rather than match on [`IdaResult`] directly.
    pub fn into_result(self) -> Result<Vec<NodeIndex>, IdaStarError> {
        match self {
            IdaResult::Found(path) => Ok(path),
            IdaResult::NoPath => Err(IdaStarError::NoPath),
        }
    }
}

struct Frame {
    node: NodeIndex,
    cost_so_far: f64,
    /// Remaining children to try, worst-heuristic-first so the best is
    /// popped (from the back) next.
    children: Vec<(NodeIndex, f64)>,
}

/// Run IDA* from `start` to the first node matching `goal`, using the
/// admissible `heuristic`, never exploring past `max_depth` edges from
/// `start`. `max_depth == 0` returns an empty path without invoking
/// `heuristic` at all; a negative depth bound is rejected by `max_depth`
/// being unsigned, so no runtime check is needed for it.
pub fn search<N, E>(
    graph: &Graph<N, E>,
    start: NodeIndex,
    goal: impl Fn(NodeIndex) -> bool,
    heuristic: impl Fn(NodeIndex) -> f64,
    max_depth: u32,
) -> IdaResult {
    if max_depth == 0 {
        return IdaResult::Found(Vec::new());
    }

    let mut threshold = heuristic(start);

    loop {
        let mut next_threshold = f64::INFINITY;
        let mut path = vec![start];
        let mut stack: Vec<Frame> = vec![Frame {
            node: start,
            cost_so_far: 0.0,
            children: ordered_children(graph, start, 0.0, &heuristic),
        }];

        if goal(start) {
            return IdaResult::Found(path);
        }

        let found = loop {
            let Some(frame) = stack.last_mut() else {
                break false;
            };

            let Some((child, child_f)) = frame.children.pop() else {
                stack.pop();
                path.pop();
                continue;
            };

            if child_f > threshold {
                if child_f < next_threshold {
                    next_threshold = child_f;
                }
                continue;
            }

            if goal(child) {
                path.push(child);
                break true;
            }

            // Past the depth bound this child is left unexplored: it
            // counted against the threshold, but the stack has no slot
            // to descend into it.
            if (stack.len() as u32) < max_depth {
                let child_cost_so_far = cost_so_far_for(graph, frame.node, child, frame.cost_so_far);
                path.push(child);
                stack.push(Frame {
                    node: child,
                    cost_so_far: child_cost_so_far,
                    children: ordered_children(graph, child, child_cost_so_far, &heuristic),
                });
            }
        };

        if found {
            return IdaResult::Found(path);
        }
        if next_threshold.is_infinite() {
            return IdaResult::NoPath;
        }
        threshold = next_threshold;
    }
}

fn cost_so_far_for<N, E>(graph: &Graph<N, E>, from: NodeIndex, to: NodeIndex, parent_cost: f64) -> f64 {
    graph
        .successors(from)
        .iter()
        .find(|e| e.target == to)
        .map(|e: &Edge<E>| parent_cost + e.cost)
        .unwrap_or(parent_cost)
}

/// Children of `node`, each paired with its f-cost, sorted
/// worst-first so the best is at the end of the `Vec` (ready to `pop`).
fn ordered_children<N, E>(
    graph: &Graph<N, E>,
    node: NodeIndex,
    cost_so_far: f64,
    heuristic: &impl Fn(NodeIndex) -> f64,
) -> Vec<(NodeIndex, f64)> {
    let mut children: Vec<(NodeIndex, f64)> = graph
        .successors(node)
        .iter()
        .map(|edge| {
            let g = cost_so_far + edge.cost;
            (edge.target, g + heuristic(edge.target))
        })
        .collect();
    children.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("cost must not be NaN"));
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> (Graph<(), ()>, Vec<NodeIndex>) {
        let mut g: Graph<(), ()> = Graph::new();
        let mut nodes = vec![g.add_node(())];
        for _ in 1..len {
            let prev = *nodes.last().unwrap();
            let next = g.add_node(());
            g.add_edge(prev, next, 1.0, ());
            nodes.push(next);
        }
        (g, nodes)
    }

    #[test]
    fn finds_a_path_down_a_deep_chain() {
        let (g, nodes) = chain(50);
        let goal = *nodes.last().unwrap();
        let result = search(&g, nodes[0], |n| n == goal, |_| 0.0, 1_000);
        match result {
            IdaResult::Found(path) => {
                assert_eq!(path.first(), Some(&nodes[0]));
                assert_eq!(path.last(), Some(&goal));
                assert_eq!(path.len(), 50);
            }
            IdaResult::NoPath => panic!("expected a path"),
        }
    }

    #[test]
    fn reports_no_path_when_unreachable() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let result = search(&g, a, |n| n == b, |_| 0.0, 1_000);
        assert_eq!(result, IdaResult::NoPath);
    }

    #[test]
    fn depth_bound_limits_the_search() {
        let (g, nodes) = chain(50);
        let goal = *nodes.last().unwrap();
        // Reaching the goal needs 49 edges; a bound well short of that
        // must give up rather than search past its stack depth.
        let result = search(&g, nodes[0], |n| n == goal, |_| 0.0, 5);
        assert_eq!(result, IdaResult::NoPath);
    }

    #[test]
    fn zero_depth_returns_an_empty_path_without_invoking_the_heuristic() {
        use std::cell::Cell;

        let (g, nodes) = chain(5);
        let goal = *nodes.last().unwrap();
        let heuristic_calls = Cell::new(0u32);
        let result = search(
            &g,
            nodes[0],
            |n| n == goal,
            |_| {
                heuristic_calls.set(heuristic_calls.get() + 1);
                0.0
            },
            0,
        );
        assert_eq!(result, IdaResult::Found(Vec::new()));
        assert_eq!(heuristic_calls.get(), 0);
    }

    #[test]
    fn into_result_maps_no_path_to_the_error_type() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let result = search(&g, a, |n| n == b, |_| 0.0, 1_000).into_result();
        assert_eq!(result, Err(IdaStarError::NoPath));
    }
}
