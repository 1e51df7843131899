//! Cost, value and profit analysis over aggregated outcomes.
//!
//! Totals cover every trial of a run. Averages are taken over a selected
//! set of outcomes: the total cost of the whole run is spread over the
//! trials that produced the selection, which answers "what does one item
//! like this cost me on average".
//!
//! Scroll spending is an estimate. Only final states are kept, not the
//! path each trial took, so the analyzer charges every trial for the full
//! step sequence (`steps_attempted × count`) at the mean cost of the
//! distinct scrolls in the plan. Trials that halted early are therefore
//! over-charged, and plans mixing cheap and expensive scrolls are priced
//! at their average.

use crate::currency::Mesos;
use crate::item::{Enhancement, Item};
use crate::outcome::{Outcome, OutcomeKey, Outcomes, Ranking};
use crate::valuation::Valuations;
use serde::{Deserialize, Serialize};

/// Costs entered for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    /// Price of one base item.
    pub item_cost: Mesos,
    /// Price of each distinct scroll used in the plan.
    pub scroll_costs: Vec<Mesos>,
}

impl CostInputs {
    /// Take costs from the item and the plan's distinct scrolls.
    pub fn from_plan<'a>(
        item: &Item,
        scrolls: impl IntoIterator<Item = &'a Enhancement>,
    ) -> Self {
        Self {
            item_cost: item.cost,
            scroll_costs: scrolls.into_iter().map(|s| s.cost).collect(),
        }
    }

    /// Arithmetic mean of the scroll costs, 0 when there are none.
    pub fn mean_scroll_cost(&self) -> f64 {
        if self.scroll_costs.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.scroll_costs.iter().map(|&c| c as f64).sum();
        sum / self.scroll_costs.len() as f64
    }
}

/// Which outcomes an average is taken over.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Exactly one outcome.
    Single(OutcomeKey),
    /// The outcome and every outcome ranked at or above it.
    AtLeast { key: OutcomeKey, ranking: Ranking },
    /// Every outcome of the run.
    All,
}

/// Per-trial averages over a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    /// Trials that produced the selected outcomes.
    pub trials: u64,
    pub average_cost: f64,
    pub average_value: f64,
    pub average_profit: f64,
}

impl Averages {
    /// Divide the totals by `trials`, yielding zeros when `trials` is 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scrollsim::analysis::Averages;
    ///
    /// let averages = Averages::from_totals(100_000.0, 150_000.0, 10);
    /// assert_eq!(averages.average_cost, 10_000.0);
    /// assert_eq!(averages.average_value, 15_000.0);
    /// assert_eq!(averages.average_profit, 5_000.0);
    ///
    /// assert_eq!(Averages::from_totals(100.0, 0.0, 0).average_cost, 0.0);
    /// ```
    pub fn from_totals(total_cost: f64, total_value: f64, trials: u64) -> Self {
        if trials == 0 {
            return Self::default();
        }
        let average_cost = total_cost / trials as f64;
        let average_value = total_value / trials as f64;
        Self {
            trials,
            average_cost,
            average_value,
            average_profit: average_value - average_cost,
        }
    }
}

/// Whole-run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_trials: u64,
    /// Sum of `steps_attempted × count` over all outcomes.
    pub steps_attempted: u64,
    pub mean_scroll_cost: f64,
    pub total_cost: f64,
    pub total_value: f64,
}

/// One outcome with its valuation and share merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub outcome: Outcome,
    pub value: Option<Mesos>,
    pub percentage: f64,
}

/// Sum of `steps_attempted × count` across the outcomes.
pub fn total_steps_attempted(outcomes: &Outcomes) -> u64 {
    outcomes
        .iter()
        .map(|o| u64::from(o.steps_attempted).saturating_mul(o.count))
        .fold(0u64, u64::saturating_add)
}

/// Estimated spend for the whole run.
///
/// `item_cost × trials + steps_attempted × mean_scroll_cost`.
pub fn total_cost(outcomes: &Outcomes, inputs: &CostInputs) -> f64 {
    let items = inputs.item_cost as f64 * outcomes.total_trials() as f64;
    let scrolls = total_steps_attempted(outcomes) as f64 * inputs.mean_scroll_cost();
    items + scrolls
}

/// Value of every outcome weighted by its count. Unvalued outcomes add 0.
pub fn total_value<'a>(
    outcomes: impl IntoIterator<Item = &'a Outcome>,
    valuations: &Valuations,
) -> f64 {
    outcomes
        .into_iter()
        .map(|o| valuations.value_or_zero(&o.key) as f64 * o.count as f64)
        .sum()
}

/// Resolve a selection to the outcomes it covers.
///
/// An unknown key selects nothing. For `AtLeast`, outcomes are ranked by
/// stat total and everything up to and including the key is taken; ties
/// ahead of the key in first-seen order are included, ties behind it are
/// not.
pub fn select<'a>(outcomes: &'a Outcomes, selection: &Selection) -> Vec<&'a Outcome> {
    match selection {
        Selection::All => outcomes.iter().collect(),
        Selection::Single(key) => outcomes.get(key).into_iter().collect(),
        Selection::AtLeast { key, ranking } => {
            let ranked = outcomes.ranked(*ranking);
            match ranked.iter().position(|o| &o.key == key) {
                Some(cut) => ranked.into_iter().take(cut + 1).collect(),
                None => Vec::new(),
            }
        }
    }
}

/// Reads an outcome map together with costs and valuations.
///
/// # Examples
///
/// ```rust
/// use scrollsim::analysis::{Analyzer, CostInputs, Selection};
/// use scrollsim::{OutcomeKey, Outcomes, StatKey, StatSet, Valuations};
///
/// let hit = StatSet::new().with(StatKey::WeaponAttack, 113);
/// let miss = StatSet::new().with(StatKey::WeaponAttack, 108);
///
/// let mut outcomes = Outcomes::new();
/// for _ in 0..6 { outcomes.record(1, 1, hit); }
/// for _ in 0..4 { outcomes.record(1, 0, miss); }
///
/// let mut values = Valuations::new();
/// values.set(OutcomeKey::of(&hit), 30_000);
///
/// let inputs = CostInputs { item_cost: 10_000, scroll_costs: vec![5_000] };
/// let analyzer = Analyzer::new(&outcomes, &values, &inputs);
///
/// let summary = analyzer.summary();
/// assert_eq!(summary.total_cost, 150_000.0);
/// assert_eq!(summary.total_value, 180_000.0);
///
/// let hits = analyzer.averages(&Selection::Single(OutcomeKey::of(&hit)));
/// assert_eq!(hits.average_cost, 25_000.0);
/// assert_eq!(hits.average_profit, 5_000.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    outcomes: &'a Outcomes,
    valuations: &'a Valuations,
    inputs: &'a CostInputs,
}

impl<'a> Analyzer<'a> {
    pub fn new(outcomes: &'a Outcomes, valuations: &'a Valuations, inputs: &'a CostInputs) -> Self {
        Self {
            outcomes,
            valuations,
            inputs,
        }
    }

    pub fn total_cost(&self) -> f64 {
        total_cost(self.outcomes, self.inputs)
    }

    pub fn total_value(&self) -> f64 {
        total_value(self.outcomes, self.valuations)
    }

    pub fn summary(&self) -> CostSummary {
        CostSummary {
            total_trials: self.outcomes.total_trials(),
            steps_attempted: total_steps_attempted(self.outcomes),
            mean_scroll_cost: self.inputs.mean_scroll_cost(),
            total_cost: self.total_cost(),
            total_value: self.total_value(),
        }
    }

    /// Averages over `selection`; all zeros when it covers no trials.
    pub fn averages(&self, selection: &Selection) -> Averages {
        let selected = select(self.outcomes, selection);
        let trials: u64 = selected.iter().map(|o| o.count).sum();
        let value = total_value(selected.iter().copied(), self.valuations);
        Averages::from_totals(self.total_cost(), value, trials)
    }

    /// Every outcome in first-seen order with its value and share.
    pub fn report(&self) -> Vec<OutcomeReport> {
        let total = self.outcomes.total_trials();
        self.outcomes
            .iter()
            .map(|outcome| OutcomeReport {
                outcome: outcome.clone(),
                value: self.valuations.get(&outcome.key),
                percentage: outcome.percentage(total),
            })
            .collect()
    }
}
