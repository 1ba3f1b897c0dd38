//! # Error taxonomy
//!
//! Recoverable error kinds for the runtime. Contract violations (null
//! start/goal, dequeuing a terminated task, a `Parallel` with too many
//! children, non-contiguous graph storage) are **not** represented here —
//! those stay `assert!`/`debug_assert!` per the propagation policy: they are
//! programming errors, not conditions a caller can recover from.
//!
//! Only failures that originate from data the caller controls at runtime
//! (an unknown listener handle, a type mismatch on a dynamic value) are
//! `Result`-shaped.

use crate::task::Status;
use thiserror::Error;

/// Errors raised by [`crate::scheduler::Scheduler`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Attempted to dequeue a task that is not currently queued.
    #[error("cannot dequeue a task in status {status:?}; only Running or Waiting tasks may be removed")]
    IllegalDequeue {
        /// The task's status at the time of the failed dequeue.
        status: Status,
    },
}

/// Errors raised by [`crate::value::DynValue`] retrieval.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The stored value's concrete type does not match the requested type.
    #[error("dynamic value holds `{actual}`, not the requested `{expected}`")]
    TypeMismatch {
        /// Type name of the requested type.
        expected: &'static str,
        /// Type name of the value actually stored.
        actual: &'static str,
    },
    /// The container held no value at all.
    #[error("dynamic value is empty")]
    Empty,
}

/// Errors raised by [`crate::blackboard::Blackboard`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlackboardError {
    /// Removal was requested for a handle that was never issued, or that
    /// has already been removed.
    #[error("no listener registered under handle {0}")]
    UnknownListener(u32),
}

/// Errors surfaced by [`crate::idastar`] search. `search` itself stays
/// success-shaped (`IdaResult::NoPath`, matching A*'s empty-path
/// convention); [`crate::idastar::IdaResult::into_result`] converts that
/// into this `Err` for callers that want to propagate exhaustion with
/// `?` rather than match on `IdaResult` directly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdaStarError {
    /// No path exists between start and goal within the supplied depth
    /// bound.
    #[error("no path found within the given depth bound")]
    NoPath,
}
