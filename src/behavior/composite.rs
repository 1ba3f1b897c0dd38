//! Sequential composites: [`Sequence`] and [`Selector`], both built on
//! the same [`SequentialComposite`] machinery and differing only in
//! which child outcome makes them advance versus resolve immediately.
//!
//! Running a composite steps its active child once and then *polls* the
//! child's resolved outcome, rather than having the child push its
//! resolution back through a [`BehaviorListener`] registered on the
//! parent. A push-based link back to the parent would have the child's
//! `notify_success`/`notify_failure` call try to borrow the very
//! `RefCell<Composite>` that is already mutably borrowed for the
//! duration of the parent's own `run()` — polling sidesteps that
//! entirely. [`BehaviorListener`] remains available on every node for an
//! *external* observer (a host watching the tree's root), which isn't
//! subject to the same reentrancy.

use crate::behavior::{Behavior, BehaviorHandle, BehaviorState, Outcome};
use crate::task::{Status, Task, TaskState};
use std::cell::RefCell;
use std::rc::Rc;

/// Whether a composite advances past a failing child and only fails once
/// every child has failed ([`Mode::Selector`]), or advances past a
/// succeeding child and only succeeds once every child has succeeded
/// ([`Mode::Sequence`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sequence,
    Selector,
}

/// Shared implementation behind [`Sequence`] and [`Selector`]: runs
/// children in order, advancing to the next child on the "continue"
/// outcome for this mode and resolving immediately on the "stop"
/// outcome.
pub struct SequentialComposite {
    state: BehaviorState,
    children: Vec<BehaviorHandle>,
    current: usize,
    mode: Mode,
}

impl SequentialComposite {
    fn new(children: Vec<BehaviorHandle>, mode: Mode) -> Rc<RefCell<Self>> {
        assert!(!children.is_empty(), "a composite needs at least one child");
        Rc::new(RefCell::new(Self {
            state: BehaviorState::new(),
            children,
            current: 0,
            mode,
        }))
    }

    fn active_child(&self) -> &BehaviorHandle {
        &self.children[self.current]
    }

    /// Outcome that makes this composite resolve immediately rather than
    /// advance to the next child.
    fn stopping_outcome_is_success(&self) -> bool {
        matches!(self.mode, Mode::Selector)
    }

    fn advance_or_resolve(&mut self, child_succeeded: bool) {
        let stop_now = child_succeeded == self.stopping_outcome_is_success();
        if stop_now {
            if child_succeeded {
                self.state.notify_success();
            } else {
                self.state.notify_failure();
            }
            return;
        }
        self.current += 1;
        if self.current >= self.children.len() {
            // Every child gave the "continue" outcome; the composite
            // resolves to that same outcome.
            if child_succeeded {
                self.state.notify_success();
            } else {
                self.state.notify_failure();
            }
        }
    }
}

impl Task for SequentialComposite {
    fn run(&mut self) {
        self.active_child().borrow_mut().run();
        let outcome = self.active_child().borrow().outcome();
        if let Some(outcome) = outcome {
            self.advance_or_resolve(outcome == Outcome::Success);
        }
    }

    fn state(&self) -> &TaskState {
        self.state.task()
    }

    fn state_mut(&mut self) -> &mut TaskState {
        self.state.task_mut()
    }

    fn terminate(&mut self) {
        for child in &self.children {
            child.borrow_mut().terminate();
        }
        self.set_status(Status::Terminated);
    }
}

impl Behavior for SequentialComposite {
    fn behavior_state(&self) -> &BehaviorState {
        &self.state
    }

    fn behavior_state_mut(&mut self) -> &mut BehaviorState {
        &mut self.state
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &self.children {
            child.borrow_mut().reset();
        }
        self.state.reset();
    }
}

/// Runs children in order; fails as soon as one child fails, succeeds
/// only once every child has succeeded.
pub struct Sequence;

impl Sequence {
    pub fn new(children: Vec<BehaviorHandle>) -> Rc<RefCell<SequentialComposite>> {
        SequentialComposite::new(children, Mode::Sequence)
    }
}

/// Runs children in order; succeeds as soon as one child succeeds, fails
/// only once every child has failed.
pub struct Selector;

impl Selector {
    pub fn new(children: Vec<BehaviorHandle>) -> Rc<RefCell<SequentialComposite>> {
        SequentialComposite::new(children, Mode::Selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Action;

    fn leaf(outcome: Outcome) -> BehaviorHandle {
        Rc::new(RefCell::new(Action::new(move || outcome)))
    }

    #[test]
    fn sequence_fails_fast_on_first_failure() {
        let seq = Sequence::new(vec![leaf(Outcome::Success), leaf(Outcome::Failure), leaf(Outcome::Success)]);
        seq.borrow_mut().run(); // first child succeeds, advances
        seq.borrow_mut().run(); // second child fails, composite fails
        assert_eq!(seq.borrow().outcome(), Some(Outcome::Failure));
        assert_eq!(seq.borrow().current, 1);
    }

    #[test]
    fn sequence_succeeds_when_every_child_succeeds() {
        let seq = Sequence::new(vec![leaf(Outcome::Success), leaf(Outcome::Success)]);
        seq.borrow_mut().run();
        seq.borrow_mut().run();
        assert_eq!(seq.borrow().outcome(), Some(Outcome::Success));
    }

    #[test]
    fn selector_succeeds_fast_on_first_success() {
        let sel = Selector::new(vec![leaf(Outcome::Failure), leaf(Outcome::Success), leaf(Outcome::Failure)]);
        sel.borrow_mut().run();
        sel.borrow_mut().run();
        assert_eq!(sel.borrow().outcome(), Some(Outcome::Success));
    }

    #[test]
    fn selector_fails_when_every_child_fails() {
        let sel = Selector::new(vec![leaf(Outcome::Failure), leaf(Outcome::Failure)]);
        sel.borrow_mut().run();
        sel.borrow_mut().run();
        assert_eq!(sel.borrow().outcome(), Some(Outcome::Failure));
    }

    #[test]
    fn reset_rewinds_to_the_first_child() {
        let seq = Sequence::new(vec![leaf(Outcome::Failure), leaf(Outcome::Success)]);
        seq.borrow_mut().run();
        assert_eq!(seq.borrow().outcome(), Some(Outcome::Failure));
        seq.borrow_mut().reset();
        assert_eq!(seq.borrow().outcome(), None);
        assert_eq!(seq.borrow().current, 0);
    }
}
