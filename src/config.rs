//! # Runtime configuration
//!
//! Crate-wide tunables. Kept as plain constants rather than a config file
//! format — every value here is a structural limit (array bound, default
//! search budget) rather than deployment-specific policy, so there is
//! nothing for an external config loader to override.

/// Maximum children a [`crate::behavior::Parallel`] node may have. Chosen
/// to keep the node's child-state bitmask a single machine word on every
/// target this crate builds for.
pub const MAX_PARALLEL_CHILDREN: usize = 8;

/// Default number of A* node expansions performed per
/// [`crate::astar_task::AStarTask::run`] call, when the host does not
/// override it. Keeps a single scheduler time slice bounded even on a
/// dense graph.
pub const DEFAULT_ASTAR_STEPS_PER_RUN: usize = 500;

/// Default scheduler soft wall-clock budget, in microseconds, for a
/// single [`crate::scheduler::Scheduler::update`] call.
pub const DEFAULT_SCHEDULER_BUDGET_MICROS: i64 = 4_000;

/// Tournament size used by [`crate::genetic::GeneticAlgorithm`] selection.
pub const GENETIC_TOURNAMENT_SIZE: usize = 3;

/// Fraction of the population carried over unchanged between generations
/// in [`crate::genetic::GeneticAlgorithm`].
pub const GENETIC_ELITISM_RATIO: f64 = 0.1;
