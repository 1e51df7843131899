//! Outcome aggregator.
//!
//! Runs the trial executor many times and buckets the results by final
//! stats. The count of every outcome sums to the number of trials run.

use crate::item::Item;
use crate::outcome::Outcomes;
use crate::rng::{seeded_stream, RandomSource};
use crate::step::Step;
use crate::trial::run_trial;
use rayon::prelude::*;

/// Run `trials` trials and group them into outcomes.
///
/// # Examples
///
/// ```rust
/// use scrollsim::rng::run_rng;
/// use scrollsim::{aggregate, Branch, Enhancement, Item, StatKey, StatSet, Step};
///
/// let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108));
/// let sure_thing = Enhancement::new("x", "ATT 100%", "weapon", 1.0)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
/// let steps = vec![Step::using(sure_thing).on_success(Branch::Halt)];
///
/// let outcomes = aggregate(&item, &steps, 250, &mut run_rng(Some(1)));
/// assert_eq!(outcomes.len(), 1);
/// assert_eq!(outcomes.total_trials(), 250);
/// ```
pub fn aggregate<R>(item: &Item, steps: &[Step], trials: u64, rng: &mut R) -> Outcomes
where
    R: RandomSource + ?Sized,
{
    let mut outcomes = Outcomes::new();
    aggregate_into(&mut outcomes, item, steps, trials, rng);
    log::debug!(
        "aggregated {} trials of {} steps on {} into {} outcomes",
        trials,
        steps.len(),
        item.name,
        outcomes.len()
    );
    outcomes
}

/// Run `trials` more trials, recording into an existing map.
///
/// The scheduler uses this to grow one map a slice at a time.
pub fn aggregate_into<R>(
    outcomes: &mut Outcomes,
    item: &Item,
    steps: &[Step],
    trials: u64,
    rng: &mut R,
) where
    R: RandomSource + ?Sized,
{
    let attempted = u32::try_from(steps.len()).unwrap_or(u32::MAX);
    for _ in 0..trials {
        let result = run_trial(item, steps, rng);
        outcomes.record(attempted, result.successes, result.final_stats);
    }
}

/// Aggregate across `workers` parallel streams.
///
/// Each worker owns the stream `seeded_stream(seed, worker)` and fills a
/// private map on the rayon pool; the maps are then merged in worker order
/// on the calling thread, so no count is shared between threads and the
/// result is fixed for a given `(seed, workers)`. Trials are split as
/// evenly as possible and the first `trials % workers` workers take one
/// extra.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{aggregate_parallel, Enhancement, Item, StatKey, StatSet, Step};
///
/// let item = Item::new("1", "Maple Dragon Axe", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108));
/// let scroll = Enhancement::new("1", "ATT 60%", "weapon", 0.6)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
/// let steps = vec![Step::using(scroll)];
///
/// let outcomes = aggregate_parallel(&item, &steps, 1_001, 99, 4);
/// assert_eq!(outcomes.total_trials(), 1_001);
/// ```
pub fn aggregate_parallel(
    item: &Item,
    steps: &[Step],
    trials: u64,
    seed: u64,
    workers: usize,
) -> Outcomes {
    let workers = workers.max(1);
    let base = trials / workers as u64;
    let extra = trials % workers as u64;

    let partials: Vec<Outcomes> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let worker = worker as u64;
            let share = base + u64::from(worker < extra);
            let mut rng = seeded_stream(seed, worker);
            let mut local = Outcomes::new();
            aggregate_into(&mut local, item, steps, share, &mut rng);
            local
        })
        .collect();

    let mut outcomes = Outcomes::new();
    for partial in partials {
        outcomes.merge(partial);
    }
    log::debug!(
        "merged {} worker maps into {} outcomes ({} trials)",
        workers,
        outcomes.len(),
        outcomes.total_trials()
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Enhancement;
    use crate::rng::{run_rng, ScriptedDraws};
    use crate::stat::{StatKey, StatSet};
    use crate::step::Branch;
    use crate::OutcomeKey;

    fn weapon() -> Item {
        Item::new("1", "Maple Soul Searcher", "weapon", 7)
            .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108))
    }

    fn att(success: f64) -> Enhancement {
        Enhancement::new("1", "ATT", "weapon", success)
            .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5))
    }

    #[test]
    fn test_zero_trials_is_empty() {
        let outcomes = aggregate(&weapon(), &[], 0, &mut run_rng(Some(3)));
        assert!(outcomes.is_empty());
        assert_eq!(outcomes.total_trials(), 0);
    }

    #[test]
    fn test_conservation_with_mixed_odds() {
        let steps = vec![
            Step::using(att(0.6)).on_failure(Branch::Advance),
            Step::using(att(0.1)).on_failure(Branch::Advance),
            Step::using(att(0.3)),
        ];
        let outcomes = aggregate(&weapon(), &steps, 5_000, &mut run_rng(Some(11)));
        let summed: u64 = outcomes.iter().map(|o| o.count).sum();
        assert_eq!(summed, 5_000);
        assert!(outcomes.len() >= 2 && outcomes.len() <= 4);
    }

    #[test]
    fn test_different_paths_share_an_outcome() {
        // Success then failure, and failure then success, both end on 113.
        let steps = vec![
            Step::using(att(0.5)).on_failure(Branch::Advance),
            Step::using(att(0.5)).on_failure(Branch::Advance),
        ];
        let mut draws = ScriptedDraws::new([0.1, 0.9, 0.9, 0.1]);
        let outcomes = aggregate(&weapon(), &steps, 2, &mut draws);
        assert_eq!(outcomes.len(), 1);
        let outcome = outcomes
            .get(&OutcomeKey::of(&StatSet::new().with(StatKey::WeaponAttack, 113)))
            .unwrap();
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.steps_attempted, 2);
    }

    #[test]
    fn test_parallel_conserves_uneven_split() {
        let steps = vec![Step::using(att(0.5)).on_failure(Branch::Advance)];
        let outcomes = aggregate_parallel(&weapon(), &steps, 10, 5, 3);
        assert_eq!(outcomes.total_trials(), 10);
        assert_eq!(outcomes.iter().map(|o| o.count).sum::<u64>(), 10);
    }

    #[test]
    fn test_parallel_is_replayable() {
        let steps = vec![Step::using(att(0.5)).on_failure(Branch::Advance); 3];
        let a = aggregate_parallel(&weapon(), &steps, 2_000, 21, 4);
        let b = aggregate_parallel(&weapon(), &steps, 2_000, 21, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_merges_worker_streams_in_order() {
        let steps = vec![Step::using(att(0.6)).on_failure(Branch::Advance); 4];
        let parallel = aggregate_parallel(&weapon(), &steps, 1_000, 8, 3);

        let mut expected = Outcomes::new();
        for (worker, share) in [(0u64, 334u64), (1, 333), (2, 333)] {
            let mut rng = seeded_stream(8, worker);
            expected.merge(aggregate(&weapon(), &steps, share, &mut rng));
        }
        assert_eq!(parallel, expected);
    }

    #[test]
    fn test_parallel_zero_workers_runs_on_one() {
        let steps = vec![Step::using(att(1.0))];
        let outcomes = aggregate_parallel(&weapon(), &steps, 5, 1, 0);
        assert_eq!(outcomes.total_trials(), 5);
        assert_eq!(outcomes.len(), 1);
    }
}
