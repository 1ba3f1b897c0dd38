//! # Behavior trees
//!
//! A behavior is a [`Task`](crate::task::Task): it schedules and runs
//! exactly like any other task. What a behavior adds on top is a second,
//! separate notification channel — [`BehaviorListener`] — that fires
//! when the behavior resolves to success or failure, distinct from the
//! [`crate::task::TaskListener`] channel that fires on every raw status
//! change. A composite node is its children's `BehaviorListener`: it
//! decides its own outcome from the outcomes its children report, not
//! from their scheduling status.
//!
//! ## Node kinds
//!
//! - [`composite::Sequence`] — runs children in order, fails on the
//!   first child failure, succeeds when all succeed.
//! - [`composite::Selector`] — runs children in order, succeeds on the
//!   first child success, fails when all fail.
//! - [`parallel::Parallel`] — runs up to
//!   [`crate::config::MAX_PARALLEL_CHILDREN`] children concurrently
//!   (within one scheduler time slice each), with a configurable
//!   success/failure policy.
//! - [`decorator::Decorator`] — wraps a single child, transforming its
//!   outcome (inversion, always-succeed, and so on).
//! - [`random::RandomSelector`] / [`random::RandomSequence`] — the above
//!   composites, but shuffling child order on each reset via an injected
//!   [`rand::RngCore`] rather than a global PRNG.

pub mod composite;
pub mod decorator;
pub mod parallel;
pub mod random;

use crate::task::{Status, Task, TaskId, TaskState};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The result a [`Behavior`] resolves to, orthogonal to its
/// [`crate::task::Status`] scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Notified when a behavior resolves to success or failure, or is reset
/// back to a fresh, unresolved state. A composite node implements this
/// for each of its children.
pub trait BehaviorListener {
    fn on_success(&mut self, id: TaskId);
    fn on_failure(&mut self, id: TaskId);
    /// Called when a behavior's `reset()` clears a previously resolved
    /// outcome. Default no-op — most listeners only care about
    /// resolution, not re-arming.
    fn on_reset(&mut self, _id: TaskId) {}
}

/// State shared by every behavior: the embedded [`TaskState`] plus the
/// resolved outcome (if any) and the listener that should hear about it.
pub struct BehaviorState {
    task: TaskState,
    outcome: Option<Outcome>,
    listener: Option<Weak<RefCell<dyn BehaviorListener>>>,
}

impl Default for BehaviorState {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorState {
    pub fn new() -> Self {
        Self {
            task: TaskState::new(),
            outcome: None,
            listener: None,
        }
    }

    pub fn task(&self) -> &TaskState {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut TaskState {
        &mut self.task
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn set_listener(&mut self, listener: Option<Weak<RefCell<dyn BehaviorListener>>>) {
        self.listener = listener;
    }

    /// Resolve to success: record the outcome, notify the listener, and
    /// return the task status to `Dormant` — resolved, but ready to be
    /// re-run without an explicit `reset()`. `Terminated` is reserved for
    /// an explicit `terminate()` call.
    pub fn notify_success(&mut self) {
        self.outcome = Some(Outcome::Success);
        let id = self.task.id();
        if let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) {
            listener.borrow_mut().on_success(id);
        }
        self.task.set_status(Status::Dormant);
    }

    /// Resolve to failure: record the outcome, notify the listener, and
    /// return the task status to `Dormant` — resolved, but ready to be
    /// re-run without an explicit `reset()`. `Terminated` is reserved for
    /// an explicit `terminate()` call.
    pub fn notify_failure(&mut self) {
        self.outcome = Some(Outcome::Failure);
        let id = self.task.id();
        if let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) {
            listener.borrow_mut().on_failure(id);
        }
        self.task.set_status(Status::Dormant);
    }

    /// Clear a resolved outcome and return the task to `Running` rather
    /// than `Dormant`, unconditionally notifying `on_reset` — used when a
    /// composite's conclusion becomes uncertain again because one of its
    /// children retracted the outcome that was driving it (see
    /// [`crate::behavior::parallel::Parallel::reset_child`]), not because
    /// the whole node was freshly rearmed.
    pub fn revive(&mut self) {
        self.outcome = None;
        let id = self.task.id();
        if let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) {
            listener.borrow_mut().on_reset(id);
        }
        self.task.set_status(Status::Running);
    }

    /// Clear a resolved outcome and return the task to `Dormant`,
    /// notifying the listener that this node has been re-armed. A
    /// behavior with no resolved outcome yet is unaffected.
    pub fn reset(&mut self) {
        if self.outcome.take().is_some() {
            let id = self.task.id();
            if let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) {
                listener.borrow_mut().on_reset(id);
            }
        }
        self.task.set_status(Status::Dormant);
    }
}

/// A node in a behavior tree: a [`Task`] that additionally resolves to
/// success or failure via [`BehaviorListener`].
pub trait Behavior: Task {
    fn behavior_state(&self) -> &BehaviorState;
    fn behavior_state_mut(&mut self) -> &mut BehaviorState;

    fn outcome(&self) -> Option<Outcome> {
        self.behavior_state().outcome()
    }

    fn set_behavior_listener(&mut self, listener: Option<Weak<RefCell<dyn BehaviorListener>>>) {
        self.behavior_state_mut().set_listener(listener);
    }

    /// Clear a resolved outcome and become runnable again.
    fn reset(&mut self) {
        self.behavior_state_mut().reset();
    }
}

/// Shared handle to a behavior tree node.
pub type BehaviorHandle = Rc<RefCell<dyn Behavior>>;

/// A leaf behavior backed by a plain closure — the common case of "check
/// a condition or perform one atomic action and resolve immediately",
/// without writing a dedicated type for every leaf.
pub struct Action<F: FnMut() -> Outcome> {
    state: BehaviorState,
    action: F,
}

impl<F: FnMut() -> Outcome> Action<F> {
    pub fn new(action: F) -> Self {
        Self {
            state: BehaviorState::new(),
            action,
        }
    }
}

impl<F: FnMut() -> Outcome> Task for Action<F> {
    fn run(&mut self) {
        match (self.action)() {
            Outcome::Success => self.state.notify_success(),
            Outcome::Failure => self.state.notify_failure(),
        }
    }

    fn state(&self) -> &TaskState {
        self.state.task()
    }

    fn state_mut(&mut self) -> &mut TaskState {
        self.state.task_mut()
    }
}

impl<F: FnMut() -> Outcome> Behavior for Action<F> {
    fn behavior_state(&self) -> &BehaviorState {
        &self.state
    }

    fn behavior_state_mut(&mut self) -> &mut BehaviorState {
        &mut self.state
    }
}
