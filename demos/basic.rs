//! Basic example: Scrolling a weapon and listing the outcomes
//!
//! This example demonstrates:
//! - Picking an item and a scroll from a static catalog
//! - Building a plan and validating it
//! - Aggregating trials into outcomes

use scrollsim::rng::run_rng;
use scrollsim::*;

fn main() -> Result<(), ScrollError> {
    env_logger::init();

    let catalog = Catalog::maple_weapons();
    let Some(item) = catalog.item("1").cloned() else {
        eprintln!("item 1 is missing from the catalog");
        return Ok(());
    };

    println!("Item: {} ({} slots)", item.name, item.slots);
    println!("Base stats: {}", item.stats);

    // Three ATT 60% scrolls, carrying on after a failure.
    let mut plan = Plan::from_ids(item, &["1", "1", "1"], &catalog.scrolls)?;
    for index in 0..plan.steps().len() {
        plan.set_branches(index, Branch::Advance, Branch::Advance);
    }
    plan.validate()?;

    let outcomes = aggregate(
        plan.item(),
        plan.steps(),
        1_000,
        &mut run_rng(Some(2024)),
    );

    println!("\n=== Outcomes ({} trials) ===", outcomes.total_trials());
    for outcome in outcomes.ranked(Ranking::HighestFirst) {
        println!(
            "  {:<22} {:>5} trials ({:>5.1}%)  {}",
            outcome.label(),
            outcome.count,
            outcome.percentage(outcomes.total_trials()),
            outcome.final_stats
        );
    }

    Ok(())
}
