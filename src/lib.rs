//! # tacticore
//!
//! An embeddable game-AI runtime: a cooperative, time-sliced task
//! scheduler and a set of AI building blocks — behavior trees, A*/IDA*
//! graph search, and GOAP action planning — that all plug into it as
//! [`task::Task`] implementors.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Host application                     │
//! ├──────────────┬───────────────┬──────────────┬────────────┤
//! │ behavior::*  │ astar_task    │ goap          │ genetic     │
//! │  Behavior    │  AStarTask    │  GOAPPlanner  │  ...        │
//! │  trees       │               │               │             │
//! ├──────────────┴───────────────┴──────────────┴────────────┤
//! │                  task::Task  (scheduled unit)              │
//! ├────────────────────────────────────────────────────────────┤
//! │                  scheduler::Scheduler                      │
//! ├────────────────────┬─────────────────────┬────────────────┤
//! │  graph::Graph       │  blackboard::        │  value::        │
//! │  astar::AStar       │  Blackboard          │  DynValue        │
//! │  idastar            │                      │                 │
//! └────────────────────┴─────────────────────┴────────────────┘
//! ```
//!
//! Nothing in this crate reaches for wall-clock time or a global PRNG
//! directly: a [`time::Clock`] and an injected [`rand::RngCore`] are
//! passed in wherever timing or randomness is needed, so host
//! applications — and this crate's own tests — get deterministic,
//! reproducible runs.

pub mod astar;
pub mod astar_task;
pub mod behavior;
pub mod blackboard;
pub mod config;
pub mod error;
pub mod genetic;
pub mod goap;
pub mod graph;
pub mod idastar;
pub mod scheduler;
pub mod task;
pub mod time;
pub mod value;

pub use error::{BlackboardError, IdaStarError, SchedulerError, ValueError};
pub use scheduler::{Scheduler, SchedulerListener};
pub use task::{Status, Task, TaskHandle, TaskId, TaskListener, TaskState};
pub use value::DynValue;
