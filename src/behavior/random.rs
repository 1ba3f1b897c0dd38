//! [`RandomSelector`] / [`RandomSequence`] — the same resolution rules as
//! [`crate::behavior::composite::Selector`] and
//! [`crate::behavior::composite::Sequence`], but visiting children in a
//! shuffled order that is re-rolled every [`Behavior::reset`]. The
//! shuffle draws from an injected [`rand::RngCore`] rather than a global
//! PRNG, so a host (or a test) can make the order reproducible by
//! supplying a seeded generator.

use crate::behavior::{Behavior, BehaviorHandle, BehaviorState, Outcome};
use crate::task::{Status, Task, TaskState};
use rand::RngCore;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sequence,
    Selector,
}

/// Fisher-Yates shuffle of `0..len`, driven by `rng`.
fn shuffled_order(len: usize, rng: &mut dyn RngCore) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        order.swap(i, j);
    }
    order
}

/// Shared implementation behind [`RandomSequence`] and
/// [`RandomSelector`].
pub struct RandomComposite<R: RngCore> {
    state: BehaviorState,
    children: Vec<BehaviorHandle>,
    order: Vec<usize>,
    position: usize,
    mode: Mode,
    rng: R,
}

impl<R: RngCore> RandomComposite<R> {
    fn new(children: Vec<BehaviorHandle>, mode: Mode, mut rng: R) -> Rc<RefCell<Self>> {
        assert!(!children.is_empty(), "a composite needs at least one child");
        let order = shuffled_order(children.len(), &mut rng);
        Rc::new(RefCell::new(Self {
            state: BehaviorState::new(),
            children,
            order,
            position: 0,
            mode,
            rng,
        }))
    }

    fn active_child(&self) -> &BehaviorHandle {
        &self.children[self.order[self.position]]
    }

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
        self.position += 1;
        if self.position >= self.children.len() {
            if child_succeeded {
                self.state.notify_success();
            } else {
                self.state.notify_failure();
            }
        }
    }
}

impl<R: RngCore> Task for RandomComposite<R> {
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

impl<R: RngCore> Behavior for RandomComposite<R> {
    fn behavior_state(&self) -> &BehaviorState {
        &self.state
    }

    fn behavior_state_mut(&mut self) -> &mut BehaviorState {
        &mut self.state
    }

    fn reset(&mut self) {
        self.position = 0;
        self.order = shuffled_order(self.children.len(), &mut self.rng);
        for child in &self.children {
            child.borrow_mut().reset();
        }
        self.state.reset();
    }
}

/// A [`Sequence`](crate::behavior::composite::Sequence) that visits its
/// children in a freshly shuffled order each time it resets.
pub struct RandomSequence;

impl RandomSequence {
    pub fn new<R: RngCore + 'static>(children: Vec<BehaviorHandle>, rng: R) -> Rc<RefCell<RandomComposite<R>>> {
        RandomComposite::new(children, Mode::Sequence, rng)
    }
}

/// A [`Selector`](crate::behavior::composite::Selector) that visits its
/// children in a freshly shuffled order each time it resets.
pub struct RandomSelector;

impl RandomSelector {
    pub fn new<R: RngCore + 'static>(children: Vec<BehaviorHandle>, rng: R) -> Rc<RefCell<RandomComposite<R>>> {
        RandomComposite::new(children, Mode::Selector, rng)
    }
}
