//! Batch scheduler.
//!
//! Runs a simulation a slice at a time so the host thread stays free
//! between slices. `BatchJob` is the slice state machine on its own;
//! `start` drives one through an `Executor`, which stands in for whatever
//! "run this on the next idle tick" primitive the host offers.
//!
//! Guarantees:
//! - slices run strictly in order, and after slice `k` the outcomes hold
//!   exactly the first `k × slice_size` trials (or all of them);
//! - cancellation is checked before each slice, never inside one, and the
//!   trials already recorded are kept;
//! - the completion callback fires exactly once.

use crate::aggregate::aggregate_into;
use crate::config::SimulationConfig;
use crate::item::Item;
use crate::outcome::Outcomes;
use crate::rng::run_rng;
use crate::step::Step;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How far a run has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    /// Completed share in `[0, 1]`; an empty run counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// State of a job after a call to `run_slice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    /// More trials remain.
    Pending,
    Finished,
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    Finished,
    Cancelled,
}

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A simulation run processed in fixed-size slices.
///
/// # Examples
///
/// ```rust
/// use scrollsim::scheduler::{BatchJob, SliceStatus};
/// use scrollsim::{Enhancement, Item, SimulationConfig, StatKey, StatSet, Step};
///
/// let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108));
/// let scroll = Enhancement::new("1", "ATT 60%", "weapon", 0.6)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
///
/// let config = SimulationConfig::with_trials(250).slice_size(100).seeded(4);
/// let mut job = BatchJob::new(config, item, vec![Step::using(scroll)]);
///
/// assert_eq!(job.run_slice(), SliceStatus::Pending);
/// assert_eq!(job.progress().completed, 100);
/// assert_eq!(job.run_slice(), SliceStatus::Pending);
/// assert_eq!(job.run_slice(), SliceStatus::Finished);
/// assert_eq!(job.outcomes().total_trials(), 250);
/// ```
#[derive(Debug)]
pub struct BatchJob {
    item: Item,
    steps: Vec<Step>,
    rng: ChaCha8Rng,
    outcomes: Outcomes,
    total: u64,
    slice_size: u64,
    slices_run: u64,
    cancel: CancelToken,
    status: SliceStatus,
}

impl BatchJob {
    /// Prepare a job. The config is normalized first.
    pub fn new(config: SimulationConfig, item: Item, steps: Vec<Step>) -> Self {
        let config = config.normalized();
        Self {
            item,
            steps,
            rng: run_rng(config.seed),
            outcomes: Outcomes::new(),
            total: u64::from(config.trials),
            slice_size: u64::from(config.slice_size),
            slices_run: 0,
            cancel: CancelToken::new(),
            status: SliceStatus::Pending,
        }
    }

    /// A token that cancels this job at its next slice boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the next slice.
    ///
    /// Once the job has finished or been cancelled, further calls do
    /// nothing and return the final status.
    pub fn run_slice(&mut self) -> SliceStatus {
        if self.status != SliceStatus::Pending {
            return self.status;
        }
        if self.cancel.is_cancelled() {
            self.status = SliceStatus::Cancelled;
            log::info!(
                "simulation cancelled after {}/{} trials",
                self.outcomes.total_trials(),
                self.total
            );
            return self.status;
        }

        let remaining = self.total - self.outcomes.total_trials();
        let batch = remaining.min(self.slice_size);
        aggregate_into(
            &mut self.outcomes,
            &self.item,
            &self.steps,
            batch,
            &mut self.rng,
        );
        self.slices_run += 1;
        log::debug!(
            "slice {} ran {} trials ({}/{})",
            self.slices_run,
            batch,
            self.outcomes.total_trials(),
            self.total
        );

        if self.outcomes.total_trials() >= self.total {
            self.status = SliceStatus::Finished;
            log::info!(
                "simulation finished: {} trials, {} outcomes",
                self.total,
                self.outcomes.len()
            );
        }
        self.status
    }

    /// Run slices until the job finishes or is cancelled.
    pub fn run_to_end(&mut self) -> Completion {
        loop {
            match self.run_slice() {
                SliceStatus::Pending => continue,
                SliceStatus::Finished => return Completion::Finished,
                SliceStatus::Cancelled => return Completion::Cancelled,
            }
        }
    }

    pub fn status(&self) -> SliceStatus {
        self.status
    }

    pub fn slices_run(&self) -> u64 {
        self.slices_run
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.outcomes.total_trials(),
            total: self.total,
        }
    }

    pub fn outcomes(&self) -> &Outcomes {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Outcomes {
        self.outcomes
    }
}

/// A deferred unit of work.
///
/// The task is handed the executor running it, so it can queue follow-up
/// work without holding on to the executor itself.
pub type Task = Box<dyn FnOnce(&dyn Executor) + 'static>;

/// Host hook for running work later, e.g. on the next frame or idle tick.
pub trait Executor {
    /// Queue `task`. When it runs, it must be given this executor.
    fn defer(&self, task: Task);
}

/// A FIFO task queue the caller drains explicitly.
///
/// Dropping the executor drops every queued task with it.
#[derive(Default)]
pub struct LocalExecutor {
    queue: RefCell<VecDeque<Task>>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the oldest queued task. Returns false if the queue was empty.
    pub fn run_next(&self) -> bool {
        let task = self.queue.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task(self);
                true
            }
            None => false,
        }
    }

    /// Run tasks until none are left; returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl Executor for LocalExecutor {
    fn defer(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }
}

type ProgressFn = Box<dyn FnMut(Progress)>;
type CompleteFn = Box<dyn FnOnce(Completion, Outcomes)>;

struct RunState {
    job: BatchJob,
    on_progress: Option<ProgressFn>,
    on_complete: Option<CompleteFn>,
    completion: Option<Completion>,
}

/// Handle to a run started with `start`.
#[derive(Clone)]
pub struct BatchHandle {
    state: Rc<RefCell<RunState>>,
    cancel: CancelToken,
}

impl BatchHandle {
    /// Ask the run to stop at its next slice boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the completion callback has fired.
    pub fn is_finished(&self) -> bool {
        self.state.borrow().completion.is_some()
    }

    pub fn completion(&self) -> Option<Completion> {
        self.state.borrow().completion
    }

    pub fn progress(&self) -> Progress {
        self.state.borrow().job.progress()
    }

    /// A copy of the outcomes recorded so far.
    pub fn snapshot(&self) -> Outcomes {
        self.state.borrow().job.outcomes().clone()
    }
}

/// Start a run on `executor`.
///
/// Nothing runs until the executor runs the first deferred task. Every
/// slice reports to `on_progress`, including the last one, so the final
/// report has `completed == total` unless the run was cancelled. While
/// work remains the next slice is deferred; once the run finishes or
/// notices a cancel, `on_complete` receives the outcomes recorded so far.
///
/// # Examples
///
/// ```rust
/// use scrollsim::scheduler::{start, Completion, LocalExecutor};
/// use scrollsim::{Enhancement, Item, SimulationConfig, StatKey, StatSet, Step};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108));
/// let scroll = Enhancement::new("1", "ATT 60%", "weapon", 0.6)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
///
/// let executor = LocalExecutor::new();
/// let done = Rc::new(Cell::new(0u64));
/// let seen = Rc::clone(&done);
///
/// let handle = start(
///     SimulationConfig::with_trials(1_000),
///     item,
///     vec![Step::using(scroll)],
///     &executor,
///     |_| {},
///     move |completion, outcomes| {
///         assert_eq!(completion, Completion::Finished);
///         seen.set(outcomes.total_trials());
///     },
/// );
///
/// assert_eq!(executor.run_until_idle(), 10);
/// assert!(handle.is_finished());
/// assert_eq!(done.get(), 1_000);
/// ```
pub fn start<E, P, C>(
    config: SimulationConfig,
    item: Item,
    steps: Vec<Step>,
    executor: &E,
    on_progress: P,
    on_complete: C,
) -> BatchHandle
where
    E: Executor + ?Sized,
    P: FnMut(Progress) + 'static,
    C: FnOnce(Completion, Outcomes) + 'static,
{
    let job = BatchJob::new(config, item, steps);
    let cancel = job.cancel_token();
    log::info!(
        "starting simulation: {} trials in slices of {}",
        job.total,
        job.slice_size
    );
    let state = Rc::new(RefCell::new(RunState {
        job,
        on_progress: Some(Box::new(on_progress)),
        on_complete: Some(Box::new(on_complete)),
        completion: None,
    }));

    let first = Rc::clone(&state);
    executor.defer(Box::new(move |runner: &dyn Executor| tick(first, runner)));

    BatchHandle { state, cancel }
}

/// Run one slice, then either re-queue or complete.
///
/// No borrow of the run state is held while user callbacks run, so they
/// may freely query or cancel the handle.
fn tick(state: Rc<RefCell<RunState>>, executor: &dyn Executor) {
    let (status, progress) = {
        let mut run = state.borrow_mut();
        let status = run.job.run_slice();
        (status, run.job.progress())
    };

    // A cancelled tick runs no slice, so there is nothing new to report.
    if status != SliceStatus::Cancelled {
        let callback = state.borrow_mut().on_progress.take();
        if let Some(mut callback) = callback {
            callback(progress);
            state.borrow_mut().on_progress = Some(callback);
        }
    }

    let completion = match status {
        SliceStatus::Pending => {
            let next = Rc::clone(&state);
            executor.defer(Box::new(move |runner: &dyn Executor| tick(next, runner)));
            return;
        }
        SliceStatus::Finished => Completion::Finished,
        SliceStatus::Cancelled => Completion::Cancelled,
    };

    let (callback, outcomes) = {
        let mut run = state.borrow_mut();
        run.completion = Some(completion);
        run.on_progress = None;
        (run.on_complete.take(), run.job.outcomes().clone())
    };
    if let Some(callback) = callback {
        callback(completion, outcomes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::item::Enhancement;
    use crate::stat::{StatKey, StatSet};
    use crate::step::Branch;
    use std::cell::Cell;

    fn item() -> Item {
        Item::new("1", "Maple Soul Searcher", "weapon", 7)
            .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108))
    }

    fn steps() -> Vec<Step> {
        let scroll = Enhancement::new("1", "ATT 60%", "weapon", 0.6)
            .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
        vec![Step::using(scroll).on_failure(Branch::Advance); 3]
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(Progress { completed: 0, total: 0 }.fraction(), 1.0);
        assert_eq!(Progress { completed: 25, total: 100 }.fraction(), 0.25);
    }

    #[test]
    fn test_slice_prefix_matches_sequential_aggregate() {
        let config = SimulationConfig::with_trials(1_000).slice_size(100).seeded(9);
        let mut job = BatchJob::new(config, item(), steps());
        for _ in 0..3 {
            job.run_slice();
        }
        let expected = aggregate(&item(), &steps(), 300, &mut run_rng(Some(9)));
        assert_eq!(job.outcomes(), &expected);
    }

    #[test]
    fn test_last_slice_is_partial() {
        let config = SimulationConfig::with_trials(150).slice_size(100).seeded(1);
        let mut job = BatchJob::new(config, item(), steps());
        assert_eq!(job.run_slice(), SliceStatus::Pending);
        assert_eq!(job.run_slice(), SliceStatus::Finished);
        assert_eq!(job.slices_run(), 2);
        assert_eq!(job.run_slice(), SliceStatus::Finished);
        assert_eq!(job.slices_run(), 2);
    }

    #[test]
    fn test_cancel_keeps_completed_trials() {
        let config = SimulationConfig::with_trials(1_000).slice_size(100).seeded(1);
        let mut job = BatchJob::new(config, item(), steps());
        job.run_slice();
        job.run_slice();
        job.cancel_token().cancel();
        assert_eq!(job.run_to_end(), Completion::Cancelled);
        assert_eq!(job.outcomes().total_trials(), 200);
        assert_eq!(job.run_slice(), SliceStatus::Cancelled);
    }

    #[test]
    fn test_start_defers_until_executor_runs() {
        let executor = LocalExecutor::new();
        let handle = start(
            SimulationConfig::with_trials(300),
            item(),
            steps(),
            &executor,
            |_| {},
            |_, _| {},
        );
        assert_eq!(executor.pending(), 1);
        assert_eq!(handle.progress().completed, 0);
        assert!(executor.run_next());
        assert_eq!(handle.progress().completed, 100);
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_last_slice_reports_full_progress() {
        let executor = LocalExecutor::new();
        let last = Rc::new(Cell::new(Progress { completed: 0, total: 0 }));
        let seen = Rc::clone(&last);
        start(
            SimulationConfig::with_trials(250),
            item(),
            steps(),
            &executor,
            move |progress| seen.set(progress),
            |_, _| {},
        );
        executor.run_until_idle();
        assert_eq!(last.get(), Progress { completed: 250, total: 250 });
        assert_eq!(last.get().fraction(), 1.0);
    }

    #[test]
    fn test_dropping_undrained_executor_frees_run() {
        let marker = Rc::new(());
        let watch = Rc::downgrade(&marker);
        let executor = LocalExecutor::new();
        let handle = start(
            SimulationConfig::with_trials(1_000),
            item(),
            steps(),
            &executor,
            |_| {},
            move |_, _| drop(marker),
        );
        executor.run_next();
        assert_eq!(executor.pending(), 1);

        drop(handle);
        drop(executor);
        assert!(watch.upgrade().is_none());
    }

    #[test]
    fn test_cancel_from_progress_callback() {
        let executor = LocalExecutor::new();
        let slot: Rc<RefCell<Option<BatchHandle>>> = Rc::new(RefCell::new(None));
        let from_callback = Rc::clone(&slot);
        let final_count = Rc::new(Cell::new(0u64));
        let record = Rc::clone(&final_count);

        let handle = start(
            SimulationConfig::with_trials(1_000).slice_size(100),
            item(),
            steps(),
            &executor,
            move |progress| {
                if progress.completed >= 300 {
                    if let Some(handle) = from_callback.borrow().as_ref() {
                        handle.cancel();
                    }
                }
            },
            move |completion, outcomes| {
                assert_eq!(completion, Completion::Cancelled);
                record.set(outcomes.total_trials());
            },
        );
        *slot.borrow_mut() = Some(handle.clone());

        executor.run_until_idle();
        assert_eq!(final_count.get(), 300);
        assert_eq!(handle.completion(), Some(Completion::Cancelled));
        assert_eq!(handle.snapshot().total_trials(), 300);
    }
}
