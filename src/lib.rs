//! # scrollsim - Monte Carlo Equipment Scrolling Simulator
//!
//! Estimates what happens when a chain of scrolls is applied to a piece of
//! equipment:
//! - **Trials**: one pass of a step plan, with success and failure branches
//! - **Outcomes**: trials bucketed by their final stats
//! - **Analysis**: cost, value and profit over the whole run or a selection
//! - **Batching**: slice-at-a-time runs with progress and cancellation
//!
//! ## Core Concepts
//!
//! ```text
//! [Item + Steps] → run_trial × N → [Outcomes] → [Analyzer + Valuations]
//! ```
//!
//! 1. An **Item** has base stats and a number of slots
//! 2. A **Step** applies one scroll, then advances or halts
//! 3. **Outcomes** group trials that end on equal stats
//! 4. The **Analyzer** prices the run using entered costs and values
//!
//! ## Example
//!
//! ```rust
//! use scrollsim::*;
//! use scrollsim::analysis::{CostInputs, Selection};
//! use scrollsim::rng::run_rng;
//!
//! let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
//!     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108))
//!     .with_cost(50_000);
//! let scroll = Enhancement::new("1", "ATT 100%", "weapon", 1.0)
//!     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5))
//!     .with_cost(10_000);
//! let steps = vec![Step::using(scroll.clone()).on_success(Branch::Halt)];
//!
//! let outcomes = aggregate(&item, &steps, 10, &mut run_rng(Some(42)));
//! let hit = StatSet::new().with(StatKey::WeaponAttack, 113);
//! assert_eq!(outcomes.get(&OutcomeKey::of(&hit)).unwrap().count, 10);
//!
//! let mut values = Valuations::new();
//! values.set(OutcomeKey::of(&hit), 75_000);
//! let inputs = CostInputs::from_plan(&item, [&scroll]);
//!
//! let analyzer = Analyzer::new(&outcomes, &values, &inputs);
//! let averages = analyzer.averages(&Selection::All);
//! assert_eq!(averages.average_cost, 60_000.0);
//! assert_eq!(averages.average_profit, 15_000.0);
//! ```
//!
//! ## Modules
//!
//! - [`stat`] - Stat keys and stat sets
//! - [`item`] - Items and scrolls
//! - [`step`] - Plan steps and branch rules
//! - [`plan`] - Plan editing and validation
//! - [`trial`] - Single trial executor
//! - [`aggregate`] - Outcome aggregation, sequential and parallel
//! - [`outcome`] - Outcome keys and maps
//! - [`valuation`] - Entered outcome values
//! - [`analysis`] - Cost, value and profit
//! - [`scheduler`] - Sliced runs with progress and cancellation
//! - [`catalog`] - Catalog loading and static catalogs
//! - [`config`] - Run configuration
//! - [`currency`] - Amount parsing and formatting
//! - [`rng`] - Random sources
//! - [`error`] - Error types

pub mod aggregate;
pub mod analysis;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod error;
pub mod item;
pub mod outcome;
pub mod plan;
pub mod rng;
pub mod scheduler;
pub mod stat;
pub mod step;
pub mod trial;
pub mod valuation;

// Re-export main types for convenience
pub use aggregate::{aggregate, aggregate_into, aggregate_parallel};
pub use analysis::Analyzer;
pub use catalog::{Catalog, CatalogSource};
pub use config::SimulationConfig;
pub use currency::Mesos;
pub use error::ScrollError;
pub use item::{Enhancement, Item};
pub use outcome::{Outcome, OutcomeKey, Outcomes, Ranking};
pub use plan::Plan;
pub use rng::RandomSource;
pub use scheduler::{BatchHandle, BatchJob, Completion, Executor, LocalExecutor, Progress};
pub use stat::{StatKey, StatSet};
pub use step::{Branch, Step};
pub use trial::{run_trial, TrialResult};
pub use valuation::Valuations;
