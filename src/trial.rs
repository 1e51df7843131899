//! Trial executor.
//!
//! Runs one pass of a step sequence against a fresh copy of an item's base
//! stats. The pass is a small state machine over the step index:
//!
//! 1. A step with no scroll halts immediately.
//! 2. One uniform draw decides success (`r < success`).
//! 3. Success adds the scroll's effects, then follows `on_success`.
//! 4. Failure bumps the run's failure count. Reaching the step's failure
//!    limit halts before `on_failure` is consulted.
//!
//! The success count is tracked as the loop runs. It cannot be recovered
//! from the stat difference because a scroll may have all-zero effects.

use crate::item::Item;
use crate::rng::RandomSource;
use crate::stat::StatSet;
use crate::step::{Branch, Step};
use serde::{Deserialize, Serialize};

/// The result of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub final_stats: StatSet,
    /// How many steps succeeded.
    pub successes: u32,
    /// How many steps failed.
    pub failures: u32,
    /// How many steps drew a roll.
    pub steps_executed: u32,
}

/// Run one trial of `steps` on `item`.
///
/// # Examples
///
/// ```rust
/// use scrollsim::rng::ScriptedDraws;
/// use scrollsim::{run_trial, Branch, Enhancement, Item, StatKey, StatSet, Step};
///
/// let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108));
/// let scroll = Enhancement::new("1", "Scroll for Weapon for ATT 60%", "weapon", 0.6)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
/// let steps = vec![
///     Step::using(scroll.clone()).on_failure(Branch::Advance),
///     Step::using(scroll).on_success(Branch::Halt),
/// ];
///
/// // First roll fails (0.7 >= 0.6), second lands (0.1 < 0.6).
/// let mut draws = ScriptedDraws::new([0.7, 0.1]);
/// let result = run_trial(&item, &steps, &mut draws);
///
/// assert_eq!(result.final_stats.get(StatKey::WeaponAttack), 113);
/// assert_eq!(result.successes, 1);
/// assert_eq!(result.failures, 1);
/// ```
pub fn run_trial<R>(item: &Item, steps: &[Step], rng: &mut R) -> TrialResult
where
    R: RandomSource + ?Sized,
{
    let mut stats = item.stats;
    let mut successes = 0u32;
    let mut failures = 0u32;
    let mut executed = 0u32;
    let mut index = 0usize;

    while let Some(step) = steps.get(index) {
        let Some(scroll) = step.scroll.as_ref() else {
            break;
        };

        executed += 1;
        let roll = rng.next_unit();
        let branch = if roll < scroll.success {
            stats.add_assign(&scroll.effects);
            successes += 1;
            step.on_success
        } else {
            failures += 1;
            if step.limit_reached(failures) {
                break;
            }
            step.on_failure
        };

        match branch {
            Branch::Advance => index += 1,
            Branch::Halt => break,
        }
    }

    TrialResult {
        final_stats: stats,
        successes,
        failures,
        steps_executed: executed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Enhancement;
    use crate::rng::ScriptedDraws;
    use crate::stat::StatKey;

    fn weapon() -> Item {
        Item::new("1", "Maple Soul Searcher", "weapon", 7)
            .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108))
    }

    fn att_scroll(success: f64, watk: i64) -> Enhancement {
        Enhancement::new("s", "ATT scroll", "weapon", success)
            .with_effects(StatSet::new().with(StatKey::WeaponAttack, watk))
    }

    #[test]
    fn test_empty_sequence_returns_base() {
        let item = weapon();
        let mut draws = ScriptedDraws::new([0.0]);
        let result = run_trial(&item, &[], &mut draws);
        assert_eq!(result.final_stats, item.stats);
        assert_eq!(result.successes, 0);
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn test_missing_scroll_halts_without_drawing() {
        let item = weapon();
        let steps = vec![Step::empty(), Step::using(att_scroll(1.0, 5))];
        let mut draws = ScriptedDraws::new([0.0]);
        let result = run_trial(&item, &steps, &mut draws);
        assert_eq!(result.final_stats, item.stats);
        assert_eq!(result.successes, 0);
        assert_eq!(result.steps_executed, 0);
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn test_missing_scroll_later_keeps_accumulated_stats() {
        let item = weapon();
        let steps = vec![Step::using(att_scroll(1.0, 5)), Step::empty()];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.5]));
        assert_eq!(result.final_stats.get(StatKey::WeaponAttack), 113);
        assert_eq!(result.successes, 1);
    }

    #[test]
    fn test_success_halt_stops_sequence() {
        let item = weapon();
        let steps = vec![
            Step::using(att_scroll(1.0, 5)).on_success(Branch::Halt),
            Step::using(att_scroll(1.0, 5)),
        ];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.0]));
        assert_eq!(result.final_stats.get(StatKey::WeaponAttack), 113);
        assert_eq!(result.steps_executed, 1);
    }

    #[test]
    fn test_failure_halt_stops_sequence() {
        let item = weapon();
        let steps = vec![
            Step::using(att_scroll(0.0, 5)).on_failure(Branch::Halt),
            Step::using(att_scroll(1.0, 5)),
        ];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.5]));
        assert_eq!(result.final_stats, item.stats);
        assert_eq!(result.failures, 1);
        assert_eq!(result.steps_executed, 1);
    }

    #[test]
    fn test_roll_equal_to_probability_fails() {
        let item = weapon();
        let steps = vec![Step::using(att_scroll(0.6, 5))];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.6]));
        assert_eq!(result.successes, 0);
    }

    #[test]
    fn test_failure_limit_overrides_advance() {
        let item = weapon();
        let steps = vec![
            Step::using(att_scroll(0.5, 5))
                .on_failure(Branch::Advance)
                .failure_limit(1),
            Step::using(att_scroll(1.0, 5)),
        ];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.9, 0.0]));
        assert_eq!(result.final_stats, item.stats);
        assert_eq!(result.steps_executed, 1);
    }

    #[test]
    fn test_failure_limit_counts_whole_run() {
        let item = weapon();
        // Failure at step 1 advances; step 2 has limit 2, so its failure is the
        // run's second and halts before step 3.
        let steps = vec![
            Step::using(att_scroll(0.5, 5)).on_failure(Branch::Advance),
            Step::using(att_scroll(0.5, 5))
                .on_failure(Branch::Advance)
                .failure_limit(2),
            Step::using(att_scroll(1.0, 5)),
        ];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.9, 0.9, 0.0]));
        assert_eq!(result.failures, 2);
        assert_eq!(result.steps_executed, 2);
        assert_eq!(result.final_stats, item.stats);
    }

    #[test]
    fn test_unreachable_limit_never_triggers() {
        let item = weapon();
        let steps = vec![
            Step::using(att_scroll(0.5, 5))
                .on_failure(Branch::Advance)
                .failure_limit(5),
            Step::using(att_scroll(0.5, 5)).on_failure(Branch::Advance),
        ];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.9, 0.1]));
        assert_eq!(result.steps_executed, 2);
        assert_eq!(result.final_stats.get(StatKey::WeaponAttack), 113);
    }

    #[test]
    fn test_zero_effect_success_still_counted() {
        let item = weapon();
        let blank = Enhancement::new("b", "Blank", "weapon", 1.0);
        let steps = vec![Step::using(blank.clone()), Step::using(blank)];
        let result = run_trial(&item, &steps, &mut ScriptedDraws::new([0.0]));
        assert_eq!(result.final_stats, item.stats);
        assert_eq!(result.successes, 2);
    }

    #[test]
    fn test_item_base_stats_untouched() {
        let item = weapon();
        let steps = vec![Step::using(att_scroll(1.0, 5))];
        let _ = run_trial(&item, &steps, &mut ScriptedDraws::new([0.0]));
        assert_eq!(item.stats.get(StatKey::WeaponAttack), 108);
    }
}
