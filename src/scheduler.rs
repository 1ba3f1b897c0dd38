//! # Scheduler
//!
//! A cooperative, time-sliced scheduler. Tasks are drawn from two ordered
//! sets — `running` and `waiting` — both keyed by `(runtime, id)` so that
//! the task with the least accumulated runtime always runs next, with
//! task identity as a stable tiebreak (the Rust-native replacement for
//! the original's pointer-address tiebreak, see [`crate::task::TaskId`]).
//!
//! ## Update loop
//!
//! Each call to [`Scheduler::update`] pulls tasks from the front of
//! `running`, calls `run()`, charges the elapsed wall-clock time to the
//! task's runtime, and reinserts it — continuing until either the
//! `running` set is empty or `budget` microseconds have elapsed. The
//! budget is soft: a single task's `run()` is never interrupted
//! mid-call, so overshoot is bounded by the slowest task's single step.
//!
//! ## Status changes made outside `update`
//!
//! A task can change its own status while it isn't the one currently
//! running (a behavior tree task reviving a sibling, say). The scheduler
//! needs to hear about that, but it cannot register *itself* as the
//! task's [`TaskListener`] the way the original's scheduler aliased
//! itself by pointer: `Scheduler::update` already holds an exclusive
//! `&mut self` borrow for its whole duration, and any status change a
//! task makes to *itself* inside its own `run()` — which is the common
//! case, not an edge case — would need to re-enter that same borrow.
//! Instead, a small [`StatusRelay`] object, independent of the
//! scheduler's own borrow, collects `(TaskId, Status)` events as they
//! happen; `update` drains the relay between task steps and reconciles
//! `running`/`waiting` from it. The task the scheduler is itself
//! currently running is reconciled directly by polling its status after
//! `run()` returns, rather than through the relay, since the relay's
//! queue for that task may not have drained yet by the time it matters.

use crate::error::SchedulerError;
use crate::task::{Status, Task, TaskHandle, TaskId, TaskListener};
use crate::time::{Clock, SystemClock, Timestamp};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Observes scheduler-level events. All methods are no-ops by default, the
/// same "opt into only what you need" shape as the task-level
/// [`TaskListener`].
pub trait SchedulerListener {
    /// A task was newly enqueued (added to `running` or `waiting`).
    fn on_task_added(&mut self, _id: TaskId) {}
    /// A task left the scheduler entirely (dequeued, or transitioned to
    /// `Dormant`/`Terminated`).
    fn on_task_removed(&mut self, _id: TaskId) {}
    /// About to call `run()` on this task.
    fn on_begin_run_task(&mut self, _id: TaskId) {}
}

/// Ordering key for the scheduler's runnable sets: least runtime first,
/// ties broken by task identity so the ordering is a strict total order
/// even between two tasks with identical runtime.
type OrderKey = (u32, TaskId);

fn order_key(task: &dyn Task) -> OrderKey {
    (task.runtime(), task.id())
}

/// Relays a task's self-initiated status changes to whichever
/// [`Scheduler`] enqueued it, without requiring the scheduler to alias
/// its own `RefCell`. See the module docs for why this indirection
/// exists.
struct StatusRelay {
    events: Weak<RefCell<Vec<(TaskId, Status)>>>,
}

impl TaskListener for StatusRelay {
    fn on_status_changed(&mut self, id: TaskId, _from: Status, to: Status) {
        if let Some(events) = self.events.upgrade() {
            events.borrow_mut().push((id, to));
        }
    }
}

/// Cooperative scheduler: runs the least-run task next, bounded by a soft
/// per-`update` wall-clock budget.
pub struct Scheduler<C: Clock = SystemClock> {
    running: BTreeMap<OrderKey, TaskHandle>,
    waiting: BTreeMap<OrderKey, TaskHandle>,
    by_id: std::collections::HashMap<TaskId, OrderKey>,
    listener: Option<Box<dyn SchedulerListener>>,
    clock: C,
    pending: Rc<RefCell<Vec<(TaskId, Status)>>>,
    relay: Rc<RefCell<StatusRelay>>,
}

impl Scheduler<SystemClock> {
    /// A scheduler backed by the real system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Scheduler<C> {
    /// A scheduler backed by an arbitrary [`Clock`] — tests use
    /// [`crate::time::ManualClock`] for deterministic budgets.
    pub fn with_clock(clock: C) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let relay = Rc::new(RefCell::new(StatusRelay {
            events: Rc::downgrade(&pending),
        }));
        Self {
            running: BTreeMap::new(),
            waiting: BTreeMap::new(),
            by_id: std::collections::HashMap::new(),
            listener: None,
            clock,
            pending,
            relay,
        }
    }

    /// Install (or clear) the scheduler-level listener.
    pub fn set_listener(&mut self, listener: Option<Box<dyn SchedulerListener>>) {
        self.listener = listener;
    }

    /// Add a task to the `Running` set with `Status::Running`.
    ///
    /// # Panics
    /// Panics (via `assert!`) if `task` is already `Terminated` — enqueuing
    /// a terminated task is a programming error, not a recoverable
    /// condition.
    pub fn enqueue(&mut self, task: TaskHandle) {
        let status = task.borrow().status();
        assert!(status != Status::Terminated, "cannot enqueue a terminated task");

        task.borrow_mut().set_listener(Some(Rc::downgrade(&self.relay) as Weak<RefCell<dyn TaskListener>>));
        task.borrow_mut().set_status(Status::Running);

        let key = order_key(&*task.borrow());
        let id = task.borrow().id();
        self.running.insert(key, task);
        self.by_id.insert(id, key);
        if let Some(l) = self.listener.as_mut() {
            l.on_task_added(id);
        }
    }

    /// Remove a task from whichever set currently holds it.
    ///
    /// # Errors
    /// Returns [`SchedulerError::IllegalDequeue`] if the task is not
    /// currently `Running` or `Waiting` (i.e. it was never enqueued, or
    /// has already left the scheduler).
    pub fn dequeue(&mut self, task: &TaskHandle) -> Result<(), SchedulerError> {
        let id = task.borrow().id();
        let status = task.borrow().status();
        let key = match self.by_id.get(&id) {
            Some(key) => *key,
            None => {
                return Err(SchedulerError::IllegalDequeue { status });
            }
        };
        let removed = self.running.remove(&key).or_else(|| self.waiting.remove(&key));
        if removed.is_none() {
            return Err(SchedulerError::IllegalDequeue { status });
        }
        self.by_id.remove(&id);
        if let Some(l) = self.listener.as_mut() {
            l.on_task_removed(id);
        }
        Ok(())
    }

    /// Terminate every queued task and drain both sets — used to reset a
    /// scheduler between scenarios. `terminate()` is called on each task
    /// while it is still attached to the relay listener, so the task's
    /// own listeners hear about the transition the same way they would
    /// from a normal `update`; the resulting relay events are then
    /// discarded along with everything else.
    pub fn clear(&mut self) {
        for task in self.running.values() {
            task.borrow_mut().terminate();
        }
        for task in self.waiting.values() {
            task.borrow_mut().terminate();
        }
        self.running.clear();
        self.waiting.clear();
        self.by_id.clear();
        self.pending.borrow_mut().clear();
    }

    /// Whether any task remains scheduled (in either set).
    pub fn is_empty(&self) -> bool {
        self.running.is_empty() && self.waiting.is_empty()
    }

    /// Number of tasks in the `Running` set.
    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    /// Number of tasks in the `Waiting` set.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Run the least-runtime task repeatedly until `running` is empty or
    /// `budget` microseconds have elapsed (checked between tasks, never
    /// mid-`run()`). `_dt` is accepted for symmetry with the host's own
    /// per-frame tick, same as the original scheduler's `update`, which
    /// never consulted it either — the budget is the sole pacing input.
    /// Returns the total microseconds actually spent running tasks.
    pub fn update(&mut self, budget: Timestamp, _dt: f32) -> Timestamp {
        let deadline = self.clock.now() + budget;
        let mut spent: Timestamp = 0;
        let mut ran_any = false;

        while let Some((&key, _)) = self.running.iter().next() {
            if ran_any && self.clock.now() >= deadline {
                break;
            }
            let (_, handle) = self.running.remove_entry(&key).expect("key came from iter");
            let id = key.1;
            self.by_id.remove(&id);

            if let Some(l) = self.listener.as_mut() {
                l.on_begin_run_task(id);
            }

            let step_start = self.clock.now();
            handle.borrow_mut().run();
            let elapsed = (self.clock.now() - step_start).max(0);
            spent += elapsed;
            ran_any = true;
            let elapsed = elapsed as u32;

            self.drain_pending_except(id);

            let status_after = handle.borrow().status();
            match status_after {
                Status::Running => {
                    handle.borrow_mut().add_runtime(elapsed);
                    let new_key = order_key(&*handle.borrow());
                    self.running.insert(new_key, handle);
                    self.by_id.insert(id, new_key);
                }
                Status::Waiting => {
                    handle.borrow_mut().add_runtime(elapsed);
                    let new_key = order_key(&*handle.borrow());
                    self.waiting.insert(new_key, handle);
                    self.by_id.insert(id, new_key);
                }
                Status::Dormant | Status::Terminated => {
                    if let Some(l) = self.listener.as_mut() {
                        l.on_task_removed(id);
                    }
                }
            }
        }

        spent
    }

    /// Apply every queued out-of-band status change except `just_ran`'s
    /// own, which [`update`] reconciles directly by polling.
    fn drain_pending_except(&mut self, just_ran: TaskId) {
        let events: Vec<(TaskId, Status)> = self.pending.borrow_mut().drain(..).collect();
        for (id, to) in events {
            if id == just_ran {
                continue;
            }
            self.apply_external_status_change(id, to);
        }
    }

    fn apply_external_status_change(&mut self, id: TaskId, to: Status) {
        let Some(&key) = self.by_id.get(&id) else {
            return;
        };
        match to {
            Status::Running => {
                if let Some(handle) = self.waiting.remove(&key) {
                    self.running.insert(key, handle);
                }
            }
            Status::Waiting => {
                if let Some(handle) = self.running.remove(&key) {
                    self.waiting.insert(key, handle);
                }
            }
            Status::Dormant | Status::Terminated => {
                self.running.remove(&key);
                self.waiting.remove(&key);
                self.by_id.remove(&id);
                if let Some(l) = self.listener.as_mut() {
                    l.on_task_removed(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;
    use crate::time::ManualClock;
    use std::cell::RefCell as Cell;
    use std::rc::Rc as Shared;

    struct CountingTask {
        state: TaskState,
        runs: Shared<Cell<u32>>,
        stop_after: u32,
    }

    impl Task for CountingTask {
        fn run(&mut self) {
            let n = *self.runs.borrow() + 1;
            *self.runs.borrow_mut() = n;
            if n >= self.stop_after {
                self.set_status(Status::Terminated);
            }
        }
        fn state(&self) -> &TaskState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskState {
            &mut self.state
        }
    }

    struct RevivingTask {
        state: TaskState,
        sibling: Option<TaskHandle>,
    }

    impl Task for RevivingTask {
        fn run(&mut self) {
            if let Some(sibling) = &self.sibling {
                sibling.borrow_mut().set_status(Status::Running);
            }
            self.set_status(Status::Terminated);
        }
        fn state(&self) -> &TaskState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskState {
            &mut self.state
        }
    }

    struct ParksItselfTask {
        state: TaskState,
    }

    impl Task for ParksItselfTask {
        fn run(&mut self) {
            self.set_status(Status::Waiting);
        }
        fn state(&self) -> &TaskState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskState {
            &mut self.state
        }
    }

    #[test]
    fn least_runtime_task_runs_first() {
        let mut sched = Scheduler::with_clock(ManualClock::new());
        let runs_a = Shared::new(Cell::new(0));
        let runs_b = Shared::new(Cell::new(0));
        let a: TaskHandle = Shared::new(RefCell::new(CountingTask {
            state: TaskState::new(),
            runs: runs_a.clone(),
            stop_after: 1,
        }));
        let b: TaskHandle = Shared::new(RefCell::new(CountingTask {
            state: TaskState::new(),
            runs: runs_b.clone(),
            stop_after: 1,
        }));
        sched.enqueue(a);
        sched.enqueue(b);
        sched.update(1_000, 0.0);
        assert_eq!(*runs_a.borrow(), 1);
        assert_eq!(*runs_b.borrow(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn dequeue_of_unknown_task_is_an_error() {
        let mut sched = Scheduler::with_clock(ManualClock::new());
        let orphan: TaskHandle = Shared::new(RefCell::new(CountingTask {
            state: TaskState::new(),
            runs: Shared::new(Cell::new(0)),
            stop_after: 1,
        }));
        let err = sched.dequeue(&orphan).unwrap_err();
        assert!(matches!(err, SchedulerError::IllegalDequeue { status: Status::Dormant }));
    }

    #[test]
    fn terminated_task_leaves_the_scheduler() {
        let mut sched = Scheduler::with_clock(ManualClock::new());
        let runs = Shared::new(Cell::new(0));
        let t: TaskHandle = Shared::new(RefCell::new(CountingTask {
            state: TaskState::new(),
            runs: runs.clone(),
            stop_after: 3,
        }));
        sched.enqueue(t);
        for _ in 0..3 {
            sched.update(1_000, 0.0);
        }
        assert_eq!(*runs.borrow(), 3);
        assert!(sched.is_empty());
    }

    #[test]
    fn a_task_can_revive_a_waiting_sibling_without_a_borrow_panic() {
        let mut sched = Scheduler::with_clock(ManualClock::new());
        let sibling: TaskHandle = Shared::new(RefCell::new(ParksItselfTask { state: TaskState::new() }));
        sched.enqueue(sibling.clone());
        sched.update(1_000, 0.0); // sibling runs once and parks itself in `waiting`
        assert_eq!(sched.waiting_len(), 1);

        let reviver: TaskHandle = Shared::new(RefCell::new(RevivingTask {
            state: TaskState::new(),
            sibling: Some(sibling),
        }));
        sched.enqueue(reviver);

        sched.update(1_000, 0.0);
        assert_eq!(sched.running_len(), 1);
        assert_eq!(sched.waiting_len(), 0);
    }

    #[derive(Clone)]
    struct SharedClock(Shared<std::cell::Cell<Timestamp>>);

    impl SharedClock {
        fn new() -> Self {
            Self(Shared::new(std::cell::Cell::new(0)))
        }
        fn advance(&self, dt: Timestamp) {
            self.0.set(self.0.get() + dt);
        }
    }

    impl Clock for SharedClock {
        fn now(&self) -> Timestamp {
            self.0.get()
        }
    }

    struct TimedTask {
        state: TaskState,
        clock: SharedClock,
        ticks_per_run: Timestamp,
        runs_left: u32,
    }

    impl Task for TimedTask {
        fn run(&mut self) {
            self.clock.advance(self.ticks_per_run);
            self.runs_left -= 1;
            if self.runs_left == 0 {
                self.set_status(Status::Terminated);
            }
        }
        fn state(&self) -> &TaskState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskState {
            &mut self.state
        }
    }

    #[test]
    fn update_returns_the_total_time_actually_spent() {
        let clock = SharedClock::new();
        let mut sched = Scheduler::with_clock(clock.clone());
        let t: TaskHandle = Shared::new(RefCell::new(TimedTask {
            state: TaskState::new(),
            clock: clock.clone(),
            ticks_per_run: 3,
            runs_left: 2,
        }));
        sched.enqueue(t.clone());

        let runtime_before = t.borrow().runtime();
        let spent = sched.update(1_000, 0.0);

        assert_eq!(spent, 6, "two runs of 3 microseconds each");
        assert_eq!(t.borrow().runtime(), runtime_before + spent as u32);
    }

    #[test]
    fn clear_terminates_every_queued_task() {
        let mut sched = Scheduler::with_clock(ManualClock::new());

        // Run this one to completion-of-a-single-step first, so it's
        // sitting in `waiting` rather than `running` when cleared.
        let waiting: TaskHandle = Shared::new(RefCell::new(ParksItselfTask { state: TaskState::new() }));
        sched.enqueue(waiting.clone());
        sched.update(1_000, 0.0);
        assert_eq!(sched.waiting_len(), 1);

        // Never run this one — it would loop forever on a clock that
        // never advances — just leave it parked in `running`.
        let running: TaskHandle = Shared::new(RefCell::new(CountingTask {
            state: TaskState::new(),
            runs: Shared::new(Cell::new(0)),
            stop_after: u32::MAX,
        }));
        sched.enqueue(running.clone());

        sched.clear();

        assert_eq!(running.borrow().status(), Status::Terminated);
        assert_eq!(waiting.borrow().status(), Status::Terminated);
        assert!(sched.is_empty());
    }
}
