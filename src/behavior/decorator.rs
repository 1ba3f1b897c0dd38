//! [`Decorator`] — wraps a single child and transforms its resolved
//! outcome. Covers the common cases (invert, always-succeed,
//! always-fail) plus an arbitrary user transform.

use crate::behavior::{Behavior, BehaviorHandle, BehaviorState, Outcome};
use crate::task::{Status, Task, TaskState};
use std::cell::RefCell;
use std::rc::Rc;

/// How a [`Decorator`] transforms its child's resolved outcome.
pub enum Transform {
    /// Success becomes failure and vice versa.
    Invert,
    /// Any resolution becomes success.
    AlwaysSucceed,
    /// Any resolution becomes failure.
    AlwaysFail,
    /// An arbitrary mapping, for host-defined transforms.
    Custom(Box<dyn Fn(Outcome) -> Outcome>),
}

impl Transform {
    fn apply(&self, outcome: Outcome) -> Outcome {
        match self {
            Transform::Invert => match outcome {
                Outcome::Success => Outcome::Failure,
                Outcome::Failure => Outcome::Success,
            },
            Transform::AlwaysSucceed => Outcome::Success,
            Transform::AlwaysFail => Outcome::Failure,
            Transform::Custom(f) => f(outcome),
        }
    }
}

/// Wraps one child, reporting a transformed outcome once the child
/// resolves.
pub struct Decorator {
    state: BehaviorState,
    child: BehaviorHandle,
    transform: Transform,
}

impl Decorator {
    pub fn new(child: BehaviorHandle, transform: Transform) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            state: BehaviorState::new(),
            child,
            transform,
        }))
    }
}

impl Task for Decorator {
    fn run(&mut self) {
        self.child.borrow_mut().run();
        if let Some(outcome) = self.child.borrow().outcome() {
            match self.transform.apply(outcome) {
                Outcome::Success => self.state.notify_success(),
                Outcome::Failure => self.state.notify_failure(),
            }
        }
    }

    fn state(&self) -> &TaskState {
        self.state.task()
    }

    fn state_mut(&mut self) -> &mut TaskState {
        self.state.task_mut()
    }

    fn terminate(&mut self) {
        self.child.borrow_mut().terminate();
        self.set_status(Status::Terminated);
    }
}

impl Behavior for Decorator {
    fn behavior_state(&self) -> &BehaviorState {
        &self.state
    }

    fn behavior_state_mut(&mut self) -> &mut BehaviorState {
        &mut self.state
    }

    fn reset(&mut self) {
        self.child.borrow_mut().reset();
        self.state.reset();
    }
}
