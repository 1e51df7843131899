//! Aggregated outcomes.
//!
//! Every trial ends on some final `StatSet`. Trials that end on equal
//! stats, however they got there, collapse into one `Outcome` identified
//! by an `OutcomeKey`: the canonical serialization of those stats.

use crate::stat::{StatKey, StatSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Canonical identity of a final stat set.
///
/// Every stat is emitted in canonical order with zeros included, so equal
/// sets always produce equal keys. Uses `Arc<str>` so keys are cheap to
/// clone into side tables.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{OutcomeKey, StatKey, StatSet};
///
/// let a = StatSet::new().with(StatKey::WeaponAttack, 113);
/// let b = StatSet::new().with(StatKey::Luck, 0).with(StatKey::WeaponAttack, 113);
///
/// assert_eq!(OutcomeKey::of(&a), OutcomeKey::of(&b));
/// assert!(OutcomeKey::of(&a).as_str().contains("watk=113"));
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutcomeKey(Arc<str>);

impl OutcomeKey {
    /// Serialize `stats` into its canonical key.
    pub fn of(stats: &StatSet) -> Self {
        let parts: Vec<String> = StatKey::ALL
            .iter()
            .map(|key| format!("{}={}", key.code(), stats.get(*key)))
            .collect();
        Self(Arc::from(parts.join(";")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&StatSet> for OutcomeKey {
    fn from(stats: &StatSet) -> Self {
        Self::of(stats)
    }
}

impl Serialize for OutcomeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutcomeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(OutcomeKey(Arc::from(s)))
    }
}

/// One distinct final state and how many trials reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub key: OutcomeKey,
    /// Length of the step sequence that was run.
    pub steps_attempted: u32,
    /// Successes in the first trial that reached this state.
    pub successful_steps: u32,
    pub final_stats: StatSet,
    /// Number of trials that ended here.
    pub count: u64,
}

impl Outcome {
    /// Share of `total_trials` that landed here, as a percentage.
    ///
    /// Returns 0 when `total_trials` is 0.
    pub fn percentage(&self, total_trials: u64) -> f64 {
        if total_trials == 0 {
            return 0.0;
        }
        self.count as f64 * 100.0 / total_trials as f64
    }

    /// Short label, e.g. `Outcome 3/7 Success`.
    pub fn label(&self) -> String {
        format!(
            "Outcome {}/{} Success",
            self.successful_steps, self.steps_attempted
        )
    }

    /// Scalar used to rank outcomes against each other.
    pub fn stat_total(&self) -> i64 {
        self.final_stats.total()
    }
}

/// Which end of the stat-total ranking counts as "better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ranking {
    /// Larger stat totals first.
    #[default]
    HighestFirst,
    /// Smaller stat totals first.
    LowestFirst,
}

/// The outcome map produced by a run.
///
/// Keeps outcomes in the order their key was first seen; ranking ties fall
/// back to that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcomes {
    entries: Vec<Outcome>,
    index: HashMap<OutcomeKey, usize>,
    total_trials: u64,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial's final stats.
    pub fn record(&mut self, steps_attempted: u32, successes: u32, final_stats: StatSet) {
        let key = OutcomeKey::of(&final_stats);
        self.total_trials += 1;
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].count += 1;
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Outcome {
            key,
            steps_attempted,
            successful_steps: successes,
            final_stats,
            count: 1,
        });
    }

    /// Fold `other` into this map.
    ///
    /// Counts for shared keys are added; new keys are appended in `other`'s
    /// order. The first recorded success count for a key wins.
    pub fn merge(&mut self, other: Outcomes) {
        self.total_trials += other.total_trials;
        for outcome in other.entries {
            if let Some(&slot) = self.index.get(&outcome.key) {
                self.entries[slot].count += outcome.count;
            } else {
                self.index.insert(outcome.key.clone(), self.entries.len());
                self.entries.push(outcome);
            }
        }
    }

    pub fn get(&self, key: &OutcomeKey) -> Option<&Outcome> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Position of `key` in first-seen order.
    pub fn position(&self, key: &OutcomeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Sum of every outcome's count.
    pub fn total_trials(&self) -> u64 {
        self.total_trials
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcomes in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.entries.iter()
    }

    /// Outcomes sorted by stat total. The sort is stable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scrollsim::{Outcomes, Ranking, StatKey, StatSet};
    ///
    /// let mut outcomes = Outcomes::new();
    /// outcomes.record(1, 0, StatSet::new().with(StatKey::WeaponAttack, 108));
    /// outcomes.record(1, 1, StatSet::new().with(StatKey::WeaponAttack, 113));
    ///
    /// let ranked = outcomes.ranked(Ranking::HighestFirst);
    /// assert_eq!(ranked[0].final_stats.get(StatKey::WeaponAttack), 113);
    /// ```
    pub fn ranked(&self, ranking: Ranking) -> Vec<&Outcome> {
        let mut sorted: Vec<&Outcome> = self.entries.iter().collect();
        match ranking {
            Ranking::HighestFirst => sorted.sort_by_key(|o| std::cmp::Reverse(o.stat_total())),
            Ranking::LowestFirst => sorted.sort_by_key(|o| o.stat_total()),
        }
        sorted
    }
}

impl<'a> IntoIterator for &'a Outcomes {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Outcomes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watk(v: i64) -> StatSet {
        StatSet::new().with(StatKey::WeaponAttack, v)
    }

    #[test]
    fn test_key_lists_every_stat() {
        let key = OutcomeKey::of(&StatSet::new());
        assert_eq!(key.as_str().split(';').count(), StatKey::COUNT);
        assert!(key.as_str().starts_with("str=0;dex=0"));
    }

    #[test]
    fn test_record_merges_equal_stats() {
        let mut outcomes = Outcomes::new();
        outcomes.record(2, 1, watk(113));
        outcomes.record(2, 2, watk(113));
        outcomes.record(2, 0, watk(108));

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.total_trials(), 3);
        let first = outcomes.get(&OutcomeKey::of(&watk(113))).unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(first.successful_steps, 1);
    }

    #[test]
    fn test_merge_adds_counts_and_appends() {
        let mut left = Outcomes::new();
        left.record(1, 1, watk(113));
        let mut right = Outcomes::new();
        right.record(1, 0, watk(108));
        right.record(1, 1, watk(113));

        left.merge(right);
        assert_eq!(left.total_trials(), 3);
        assert_eq!(left.position(&OutcomeKey::of(&watk(108))), Some(1));
        assert_eq!(left.get(&OutcomeKey::of(&watk(113))).unwrap().count, 2);
    }

    #[test]
    fn test_ranked_ties_keep_first_seen_order() {
        let mut outcomes = Outcomes::new();
        outcomes.record(1, 1, StatSet::new().with(StatKey::Strength, 2));
        outcomes.record(1, 1, StatSet::new().with(StatKey::Dexterity, 2));
        outcomes.record(1, 0, StatSet::new());

        let high = outcomes.ranked(Ranking::HighestFirst);
        assert_eq!(high[0].final_stats.get(StatKey::Strength), 2);
        assert_eq!(high[1].final_stats.get(StatKey::Dexterity), 2);

        let low = outcomes.ranked(Ranking::LowestFirst);
        assert!(low[0].final_stats.is_empty());
        assert_eq!(low[1].final_stats.get(StatKey::Strength), 2);
    }

    #[test]
    fn test_percentage_and_label() {
        let mut outcomes = Outcomes::new();
        outcomes.record(7, 3, watk(120));
        let outcome = outcomes.iter().next().unwrap();
        assert_eq!(outcome.percentage(4), 25.0);
        assert_eq!(outcome.percentage(0), 0.0);
        assert_eq!(outcome.label(), "Outcome 3/7 Success");
    }
}
