//! # Task
//!
//! The unit of cooperatively scheduled work. A `Task` is anything that can
//! perform one bounded step of computation in `run()`, reports a `Status`,
//! and accumulates a cumulative runtime the [`crate::scheduler::Scheduler`]
//! uses for fairness.
//!
//! ## Status state machine
//!
//! ```text
//!   ┌─────────┐   enqueue()    ┌─────────┐
//!   │ Dormant │ ─────────────► │ Running │
//!   └─────────┘                └─────────┘
//!        ▲                      │      ▲
//!        │ notify_success/      │      │ set_status(Waiting)
//!        │ notify_failure       ▼      │
//!        │                ┌─────────┐  │
//!        └─────────────── │ Waiting │──┘
//!                         └─────────┘
//!                     terminate() from any state
//!                              │
//!                              ▼
//!                      ┌─────────────┐
//!                      │ Terminated  │  (absorbing — never leaves)
//!                      └─────────────┘
//! ```
//!
//! A task never transitions out of `Terminated`. Status-change notification
//! fires only on an actual change, and only before the task is observed in
//! its new state by any other component (the listener is called from
//! inside `set_status`, synchronously, before this function returns).

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Saturating cumulative-runtime counter, in microseconds.
///
/// The original C++ source used a 16-bit counter that silently wrapped
/// after ~65ms of accumulated runtime — flagged as an open design question
/// (spec §9) rather than carried over. This crate widens the counter to
/// 32 bits and saturates instead of wrapping: a long task can still appear
/// artificially "cheap" relative to tasks whose runtime overflowed a 16-bit
/// field, but saturation can never make an old task look *newer* than it
/// is, which wraparound could.
pub type Runtime = u32;

/// Execution state of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not scheduled. The initial state, and the state re-entered after a
    /// successful or failed notification.
    Dormant,
    /// Actively dispatched by the scheduler's `tasks` set.
    Running,
    /// Parked in the scheduler's `waiting` set until something external
    /// sets it back to `Running`.
    Waiting,
    /// Done. Absorbing — a task must never leave this state.
    Terminated,
}

/// Process-wide unique identity for a task, used for the scheduler's
/// `(runtime, identity)` tiebreak ordering. Assigned once, at
/// [`TaskState::new`], and never reused — the Rust-native replacement for
/// comparing raw `Task*` pointers (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receives notification whenever a task's [`Status`] actually changes.
/// Implemented by [`crate::scheduler::Scheduler`] to keep its queues
/// consistent with tasks that change state on their own (for example, a
/// behavior tree node reviving from `Waiting` back to `Running`).
pub trait TaskListener {
    /// Called synchronously from inside `set_status`, after the task's
    /// status has been updated but before the call that triggered it
    /// returns.
    fn on_status_changed(&mut self, id: TaskId, from: Status, to: Status);
}

/// The state every [`Task`] implementor embeds: status, runtime, identity,
/// and an optional listener. Concrete task types hold a `TaskState` field
/// and delegate `Task`'s status/runtime operations to it, the same way the
/// teacher's `TaskControlBlock` holds its scheduling fields as plain data
/// with small recording methods.
pub struct TaskState {
    id: TaskId,
    status: Status,
    runtime: Runtime,
    listener: Option<Weak<RefCell<dyn TaskListener>>>,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskState {
    /// Create state for a freshly constructed, `Dormant` task with a fresh
    /// identity.
    pub fn new() -> Self {
        Self {
            id: TaskId::next(),
            status: Status::Dormant,
            runtime: 0,
            listener: None,
        }
    }

    /// This task's process-wide identity.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Set the status, firing the listener exactly when the value actually
    /// changes. A no-op if `status` equals the current status.
    pub fn set_status(&mut self, status: Status) {
        let before = self.status;
        if status == before {
            return;
        }
        self.status = status;
        if let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) {
            listener.borrow_mut().on_status_changed(self.id, before, status);
        }
    }

    /// Charge `dt` microseconds of runtime to this task, saturating rather
    /// than wrapping (see [`Runtime`]).
    pub fn add_runtime(&mut self, dt: Runtime) {
        self.runtime = self.runtime.saturating_add(dt);
    }

    /// Reset accumulated runtime to zero.
    pub fn reset_runtime(&mut self) {
        self.runtime = 0;
    }

    /// Current cumulative runtime.
    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Install (or clear) the listener that receives status-change
    /// notifications.
    pub fn set_listener(&mut self, listener: Option<Weak<RefCell<dyn TaskListener>>>) {
        self.listener = listener;
    }
}

/// An abstract unit of cooperatively scheduled work.
///
/// Implementors embed a [`TaskState`] and delegate the status/runtime
/// operations to it; `run()` is the only method with real per-task
/// behavior.
pub trait Task {
    /// Perform one bounded step of work. Must not call
    /// `Scheduler::update` directly or transitively — the scheduler is
    /// not re-entrant (spec §5).
    fn run(&mut self);

    /// Borrow this task's embedded state.
    fn state(&self) -> &TaskState;

    /// Mutably borrow this task's embedded state.
    fn state_mut(&mut self) -> &mut TaskState;

    /// This task's process-wide identity.
    fn id(&self) -> TaskId {
        self.state().id()
    }

    /// Current status.
    fn status(&self) -> Status {
        self.state().status()
    }

    /// Set the status (see [`TaskState::set_status`]).
    fn set_status(&mut self, status: Status) {
        self.state_mut().set_status(status);
    }

    /// Charge runtime (see [`TaskState::add_runtime`]).
    fn add_runtime(&mut self, dt: Runtime) {
        self.state_mut().add_runtime(dt);
    }

    /// Reset runtime to zero.
    fn reset_runtime(&mut self) {
        self.state_mut().reset_runtime();
    }

    /// Current cumulative runtime.
    fn runtime(&self) -> Runtime {
        self.state().runtime()
    }

    /// Install (or clear) the status-change listener.
    fn set_listener(&mut self, listener: Option<Weak<RefCell<dyn TaskListener>>>) {
        self.state_mut().set_listener(listener);
    }

    /// Idempotently terminate this task. The default implementation simply
    /// sets `Terminated`; composite task types (behavior tree nodes)
    /// override this to cascade to children first.
    fn terminate(&mut self) {
        self.set_status(Status::Terminated);
    }
}

/// Shared handle to a task. Both the scheduler and, for behavior trees,
/// the owning composite hold clones of the same handle — the Rust
/// translation of the original's aliased raw `Task*` ownership (spec §9).
pub type TaskHandle = Rc<RefCell<dyn Task>>;
