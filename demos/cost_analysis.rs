//! Cost analysis example: Pricing a run from entered costs and values
//!
//! This example demonstrates:
//! - Sanitizing user-entered amounts
//! - Attaching values to outcomes in a side table
//! - Totals and per-item averages over a selection

use scrollsim::analysis::{CostInputs, Selection};
use scrollsim::currency::{format_amount, format_signed, sanitize_amount};
use scrollsim::*;

fn main() -> Result<(), ScrollError> {
    env_logger::init();

    let catalog = Catalog::sample();
    let Some(robe) = catalog.item("1").cloned() else {
        eprintln!("item 1 is missing from the catalog");
        return Ok(());
    };
    let plan = Plan::from_ids(robe, &["1"; 7], &catalog.scrolls)?;

    let config = SimulationConfig::from_json(r#"{ "trials": 5000, "seed": 11 }"#)?;
    let outcomes = aggregate_parallel(
        plan.item(),
        plan.steps(),
        u64::from(config.trials),
        config.seed.unwrap_or_default(),
        4,
    );

    // Values as a user might type them.
    let mut values = Valuations::new();
    let entered = ["80,000", "120 000", "200_000", "n/a"];
    for (outcome, input) in outcomes.ranked(Ranking::LowestFirst).into_iter().zip(entered) {
        values.set_from_input(outcome.key.clone(), input);
    }

    let mut inputs = CostInputs::from_plan(plan.item(), plan.distinct_enhancements());
    inputs.item_cost = sanitize_amount("50,000");

    let analyzer = Analyzer::new(&outcomes, &values, &inputs);
    let summary = analyzer.summary();
    println!("=== Run Summary ===");
    println!("Trials:          {}", summary.total_trials);
    println!("Steps attempted: {}", summary.steps_attempted);
    println!("Total cost:      {}", format_signed(summary.total_cost));
    println!("Total value:     {}", format_signed(summary.total_value));

    println!("\n=== Outcomes ===");
    for row in analyzer.report() {
        let value = row.value.map_or_else(|| "-".to_string(), format_amount);
        println!(
            "  {:<22} {:>6.2}%  value {:>9}  {}",
            row.outcome.label(),
            row.percentage,
            value,
            row.outcome.final_stats
        );
    }

    if let Some(best) = outcomes.ranked(Ranking::HighestFirst).first() {
        let averages = analyzer.averages(&Selection::AtLeast {
            key: best.key.clone(),
            ranking: Ranking::HighestFirst,
        });
        println!("\n=== Best outcome ({}) ===", best.final_stats);
        println!("Trials:         {}", averages.trials);
        println!("Average cost:   {}", format_signed(averages.average_cost));
        println!("Average value:  {}", format_signed(averages.average_value));
        println!("Average profit: {}", format_signed(averages.average_profit));
    }

    Ok(())
}
