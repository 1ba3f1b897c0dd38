//! [`Parallel`] — runs every child each tick, resolving once enough of
//! them have succeeded or failed. Bounded to
//! [`crate::config::MAX_PARALLEL_CHILDREN`] children so the "which
//! children have resolved" bookkeeping fits a single fixed-size array
//! rather than a heap-allocated bitset.
//!
//! Like [`crate::behavior::composite`], resolution is driven by polling
//! each child's outcome right after stepping it, not by the child
//! pushing its resolution back through a listener registered on this
//! node — see that module's docs for why.
//!
//! A resolved child can still be given a second life: [`Parallel::reset_child`]
//! clears one child's outcome without disturbing its siblings, and if
//! that child was the one holding the composite at `Failure` and no
//! other child is still `Failure`, the composite itself revives —
//! outcome cleared, status back to `Running`, reset notified upward.

use crate::behavior::{Behavior, BehaviorHandle, BehaviorState, Outcome};
use crate::config::MAX_PARALLEL_CHILDREN;
use crate::task::{Status, Task, TaskState};
use std::cell::RefCell;
use std::rc::Rc;

/// Runs all children concurrently (one `run()` each per parent tick).
/// Resolves to success once `success_threshold` children have succeeded,
/// or to failure once more than `children.len() - success_threshold`
/// have failed (making success no longer reachable). Unresolved children
/// still running when the parent resolves are terminated.
pub struct Parallel {
    state: BehaviorState,
    children: Vec<BehaviorHandle>,
    outcomes: [Option<Outcome>; MAX_PARALLEL_CHILDREN],
    success_threshold: usize,
}

impl Parallel {
    /// `success_threshold` must be between 1 and `children.len()`
    /// inclusive, and `children.len()` must not exceed
    /// [`MAX_PARALLEL_CHILDREN`].
    pub fn new(children: Vec<BehaviorHandle>, success_threshold: usize) -> Rc<RefCell<Self>> {
        assert!(!children.is_empty(), "a parallel node needs at least one child");
        assert!(
            children.len() <= MAX_PARALLEL_CHILDREN,
            "parallel node exceeds the {MAX_PARALLEL_CHILDREN}-child limit"
        );
        assert!(
            (1..=children.len()).contains(&success_threshold),
            "success_threshold must be between 1 and the child count"
        );

        Rc::new(RefCell::new(Self {
            state: BehaviorState::new(),
            children,
            outcomes: [None; MAX_PARALLEL_CHILDREN],
            success_threshold,
        }))
    }

    fn failure_threshold(&self) -> usize {
        self.children.len() - self.success_threshold + 1
    }

    fn successes(&self) -> usize {
        self.outcomes[..self.children.len()]
            .iter()
            .filter(|o| **o == Some(Outcome::Success))
            .count()
    }

    fn failures(&self) -> usize {
        self.outcomes[..self.children.len()]
            .iter()
            .filter(|o| **o == Some(Outcome::Failure))
            .count()
    }

    fn terminate_unresolved(&mut self) {
        for (child, outcome) in self.children.iter().zip(self.outcomes.iter()) {
            if outcome.is_none() {
                child.borrow_mut().terminate();
            }
        }
    }

    fn record(&mut self, idx: usize, outcome: Outcome) {
        self.outcomes[idx] = Some(outcome);

        if self.successes() >= self.success_threshold {
            self.terminate_unresolved();
            self.state.notify_success();
        } else if self.failures() >= self.failure_threshold() {
            self.terminate_unresolved();
            self.state.notify_failure();
        }
    }

    /// Reset a single child's resolved outcome, leaving the rest of the
    /// composite's bookkeeping untouched. If `idx` was the child holding
    /// this composite at `Failure`, and clearing it leaves no sibling
    /// still `Failure`, the composite revives: its own outcome clears,
    /// its status returns to `Running`, and its listener hears
    /// `on_reset` — the composite gets a second life rather than staying
    /// stuck at a failure one of its children has since retracted.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds for this composite's children.
    pub fn reset_child(&mut self, idx: usize) {
        assert!(idx < self.children.len(), "child index out of bounds");

        let before = self.outcomes[idx];
        self.children[idx].borrow_mut().reset();
        self.outcomes[idx] = None;

        let composite_was_failed = self.state.outcome() == Some(Outcome::Failure);
        if before == Some(Outcome::Failure) && composite_was_failed && self.failures() == 0 {
            self.state.revive();
        }
    }
}

impl Task for Parallel {
    fn run(&mut self) {
        for i in 0..self.children.len() {
            if self.state.outcome().is_some() {
                break;
            }
            if self.outcomes[i].is_some() {
                continue;
            }
            self.children[i].borrow_mut().run();
            let outcome = self.children[i].borrow().outcome();
            if let Some(outcome) = outcome {
                self.record(i, outcome);
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
        self.terminate_unresolved();
        self.set_status(Status::Terminated);
    }
}

impl Behavior for Parallel {
    fn behavior_state(&self) -> &BehaviorState {
        &self.state
    }

    fn behavior_state_mut(&mut self) -> &mut BehaviorState {
        &mut self.state
    }

    fn reset(&mut self) {
        for o in self.outcomes.iter_mut() {
            *o = None;
        }
        for child in &self.children {
            child.borrow_mut().reset();
        }
        self.state.reset();
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
    fn succeeds_once_threshold_reached_and_terminates_the_rest() {
        let slow_ran = Rc::new(RefCell::new(0u32));
        let slow_ran_clone = slow_ran.clone();
        let slow: BehaviorHandle = Rc::new(RefCell::new(Action::new(move || {
            *slow_ran_clone.borrow_mut() += 1;
            Outcome::Failure
        })));

        let p = Parallel::new(vec![leaf(Outcome::Success), slow.clone()], 1);
        p.borrow_mut().run();
        assert_eq!(p.borrow().outcome(), Some(Outcome::Success));
        assert_eq!(slow.borrow().status(), Status::Terminated);
    }

    #[test]
    fn fails_once_success_becomes_unreachable() {
        let p = Parallel::new(vec![leaf(Outcome::Failure), leaf(Outcome::Failure), leaf(Outcome::Success)], 3);
        p.borrow_mut().run();
        assert_eq!(p.borrow().outcome(), Some(Outcome::Failure));
    }

    #[test]
    fn revival_after_failure() {
        use crate::behavior::BehaviorListener;
        use crate::task::TaskId;

        #[derive(Default)]
        struct Recording {
            resets: Vec<TaskId>,
        }
        impl BehaviorListener for Recording {
            fn on_success(&mut self, _id: TaskId) {}
            fn on_failure(&mut self, _id: TaskId) {}
            fn on_reset(&mut self, id: TaskId) {
                self.resets.push(id);
            }
        }

        let failing = leaf(Outcome::Failure);
        let succeeding = leaf(Outcome::Success);
        let p = Parallel::new(vec![failing.clone(), succeeding.clone()], 2);

        let listener = Rc::new(RefCell::new(Recording::default()));
        p.borrow_mut().set_behavior_listener(Some(Rc::downgrade(&listener) as std::rc::Weak<RefCell<dyn BehaviorListener>>));

        p.borrow_mut().run();
        assert_eq!(p.borrow().outcome(), Some(Outcome::Failure));
        assert_eq!(succeeding.borrow().status(), Status::Terminated, "the unresolved sibling is terminated once the parallel fails");

        // The failed child retracts its failure; no sibling is still
        // Failure, so the composite itself revives.
        p.borrow_mut().reset_child(0);

        assert_eq!(p.borrow().outcome(), None);
        assert_eq!(p.borrow().status(), Status::Running);
        assert_eq!(listener.borrow().resets.len(), 1);
    }

    #[test]
    #[should_panic(expected = "child limit")]
    fn too_many_children_panics() {
        let children: Vec<BehaviorHandle> = (0..MAX_PARALLEL_CHILDREN + 1)
            .map(|_| leaf(Outcome::Success))
            .collect();
        Parallel::new(children, 1);
    }
}
