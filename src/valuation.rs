//! User valuations of outcomes.
//!
//! Outcome maps are immutable once produced. What a player thinks an
//! outcome is worth lives here instead, keyed by `OutcomeKey`, and is only
//! combined with the outcomes when the analyzer reads both.

use crate::currency::{sanitize_amount, Mesos};
use crate::outcome::OutcomeKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Side table of per-outcome values.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{OutcomeKey, StatKey, StatSet, Valuations};
///
/// let key = OutcomeKey::of(&StatSet::new().with(StatKey::WeaponAttack, 143));
///
/// let mut values = Valuations::new();
/// values.set_from_input(key.clone(), "25,000,000");
///
/// assert_eq!(values.get(&key), Some(25_000_000));
/// assert_eq!(values.value_or_zero(&key), 25_000_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuations {
    values: HashMap<OutcomeKey, Mesos>,
}

impl Valuations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of an outcome.
    pub fn set(&mut self, key: OutcomeKey, value: Mesos) {
        self.values.insert(key, value);
    }

    /// Set a value from raw user input. Malformed input stores 0.
    pub fn set_from_input(&mut self, key: OutcomeKey, input: &str) {
        self.set(key, sanitize_amount(input));
    }

    /// Forget the value of an outcome.
    pub fn clear(&mut self, key: &OutcomeKey) -> Option<Mesos> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &OutcomeKey) -> Option<Mesos> {
        self.values.get(key).copied()
    }

    /// The value of an outcome, treating an unvalued outcome as worthless.
    pub fn value_or_zero(&self, key: &OutcomeKey) -> Mesos {
        self.get(key).unwrap_or(0)
    }

    pub fn contains_key(&self, key: &OutcomeKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat::{StatKey, StatSet};

    fn key(watk: i64) -> OutcomeKey {
        OutcomeKey::of(&StatSet::new().with(StatKey::WeaponAttack, watk))
    }

    #[test]
    fn test_missing_value_is_zero() {
        let values = Valuations::new();
        assert_eq!(values.get(&key(108)), None);
        assert_eq!(values.value_or_zero(&key(108)), 0);
    }

    #[test]
    fn test_malformed_input_stores_zero() {
        let mut values = Valuations::new();
        values.set_from_input(key(113), "a lot");
        assert!(values.contains_key(&key(113)));
        assert_eq!(values.get(&key(113)), Some(0));
    }

    #[test]
    fn test_clear() {
        let mut values = Valuations::new();
        values.set(key(113), 10);
        assert_eq!(values.clear(&key(113)), Some(10));
        assert!(values.is_empty());
    }
}
