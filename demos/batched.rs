//! Batched example: Running a simulation a slice at a time
//!
//! This example demonstrates:
//! - Starting a run on a local executor
//! - Progress reports between slices
//! - Cancelling part way through

use scrollsim::scheduler::start;
use scrollsim::*;
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    env_logger::init();

    let catalog = Catalog::maple_weapons();
    let Some(axe) = catalog.item("3").cloned() else {
        return;
    };
    let steps: Vec<Step> = catalog
        .scrolls_for(&axe)
        .into_iter()
        .map(|scroll| Step::using(scroll.clone()).on_failure(Branch::Advance))
        .collect();

    let executor = LocalExecutor::new();
    let handle_slot: Rc<RefCell<Option<BatchHandle>>> = Rc::new(RefCell::new(None));
    let from_progress = Rc::clone(&handle_slot);

    let handle = start(
        SimulationConfig::with_trials(10_000).slice_size(500).seeded(5),
        axe,
        steps,
        &executor,
        move |progress| {
            println!(
                "  {:>5}/{} trials ({:.0}%)",
                progress.completed,
                progress.total,
                progress.fraction() * 100.0
            );
            // Stop once 60% is done.
            if progress.fraction() >= 0.6 {
                if let Some(handle) = from_progress.borrow().as_ref() {
                    handle.cancel();
                }
            }
        },
        |completion, outcomes| {
            println!(
                "\n{:?} with {} trials in {} outcomes",
                completion,
                outcomes.total_trials(),
                outcomes.len()
            );
            for outcome in outcomes.ranked(Ranking::HighestFirst).iter().take(5) {
                println!("  {:<22} {:>5}  {}", outcome.label(), outcome.count, outcome.final_stats);
            }
        },
    );
    *handle_slot.borrow_mut() = Some(handle.clone());

    println!("=== Batched Run ===");
    // Each task is one slice; a UI would run one per frame.
    let slices = executor.run_until_idle();
    println!("\nRan {} slices, finished: {}", slices, handle.is_finished());
}
