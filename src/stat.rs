//! Stat keys and stat sets.
//!
//! Provides the `StatKey` enumeration of every stat an item or scroll can
//! carry, and `StatSet`, a zero-defaulted mapping from those keys to
//! integer values. A `StatSet` is used both as an item's base stats and as
//! a scroll's delta.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One of the fixed stats tracked on equipment.
///
/// The declaration order is the canonical order used for outcome keys.
///
/// # Examples
///
/// ```rust
/// use scrollsim::StatKey;
///
/// assert_eq!(StatKey::WeaponAttack.code(), "watk");
/// assert_eq!(StatKey::from_code("WATK"), Some(StatKey::WeaponAttack));
/// assert_eq!(StatKey::WeaponAttack.display_name(), "Weapon Attack");
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatKey {
    Strength,
    Dexterity,
    Intelligence,
    Luck,
    WeaponAttack,
    MagicAttack,
    WeaponDefense,
    MagicDefense,
    Hp,
    Mp,
    Accuracy,
    Avoidability,
    Speed,
    Jump,
}

impl StatKey {
    /// Number of stat keys.
    pub const COUNT: usize = 14;

    /// Every key in canonical order.
    pub const ALL: [StatKey; StatKey::COUNT] = [
        StatKey::Strength,
        StatKey::Dexterity,
        StatKey::Intelligence,
        StatKey::Luck,
        StatKey::WeaponAttack,
        StatKey::MagicAttack,
        StatKey::WeaponDefense,
        StatKey::MagicDefense,
        StatKey::Hp,
        StatKey::Mp,
        StatKey::Accuracy,
        StatKey::Avoidability,
        StatKey::Speed,
        StatKey::Jump,
    ];

    /// Order in which stats are listed to a player.
    ///
    /// Pools (HP/MP) come before defenses here, unlike the canonical order.
    pub const DISPLAY_ORDER: [StatKey; StatKey::COUNT] = [
        StatKey::Strength,
        StatKey::Dexterity,
        StatKey::Intelligence,
        StatKey::Luck,
        StatKey::WeaponAttack,
        StatKey::MagicAttack,
        StatKey::Hp,
        StatKey::Mp,
        StatKey::WeaponDefense,
        StatKey::MagicDefense,
        StatKey::Accuracy,
        StatKey::Avoidability,
        StatKey::Speed,
        StatKey::Jump,
    ];

    /// Position of this key in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short lowercase code used in catalogs and serialized stat sets.
    pub fn code(self) -> &'static str {
        match self {
            StatKey::Strength => "str",
            StatKey::Dexterity => "dex",
            StatKey::Intelligence => "int",
            StatKey::Luck => "luk",
            StatKey::WeaponAttack => "watk",
            StatKey::MagicAttack => "matk",
            StatKey::WeaponDefense => "def",
            StatKey::MagicDefense => "mdef",
            StatKey::Hp => "hp",
            StatKey::Mp => "mp",
            StatKey::Accuracy => "acc",
            StatKey::Avoidability => "avoid",
            StatKey::Speed => "speed",
            StatKey::Jump => "jump",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            StatKey::Strength => "STR",
            StatKey::Dexterity => "DEX",
            StatKey::Intelligence => "INT",
            StatKey::Luck => "LUK",
            StatKey::WeaponAttack => "Weapon Attack",
            StatKey::MagicAttack => "Magic Attack",
            StatKey::WeaponDefense => "Weapon Defense",
            StatKey::MagicDefense => "Magic Defense",
            StatKey::Hp => "HP",
            StatKey::Mp => "MP",
            StatKey::Accuracy => "Accuracy",
            StatKey::Avoidability => "Avoidability",
            StatKey::Speed => "Speed",
            StatKey::Jump => "Jump",
        }
    }

    /// Look a key up by its short code, ignoring ASCII case.
    ///
    /// Returns `None` for anything that is not one of the fourteen codes.
    pub fn from_code(code: &str) -> Option<StatKey> {
        StatKey::ALL
            .into_iter()
            .find(|key| key.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for StatKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.code().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        StatKey::from_code(&code).ok_or_else(|| D::Error::custom(format!("unknown stat `{code}`")))
    }
}

/// A zero-defaulted mapping from every `StatKey` to an integer.
///
/// Storage is dense, so two sets compare equal exactly when every key has
/// the same effective value; an explicit zero and an absent key are the
/// same thing. Serialization is sparse and omits zeros.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{StatKey, StatSet};
///
/// let base = StatSet::new().with(StatKey::WeaponAttack, 108);
/// let delta = StatSet::new().with(StatKey::WeaponAttack, 5);
///
/// let mut stats = base.clone();
/// stats.add_assign(&delta);
///
/// assert_eq!(stats.get(StatKey::WeaponAttack), 113);
/// assert_eq!(stats.get(StatKey::Luck), 0);
/// assert_eq!(base.clone().with(StatKey::Luck, 0), base);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatSet {
    values: [i64; StatKey::COUNT],
}

impl StatSet {
    /// Create a set with every stat at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(key, value)` pairs. Repeated keys are summed,
    /// saturating at the `i64` bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scrollsim::{StatKey, StatSet};
    ///
    /// let stats = StatSet::from_pairs([(StatKey::Hp, 10), (StatKey::Hp, 5)]);
    /// assert_eq!(stats.get(StatKey::Hp), 15);
    /// ```
    pub fn from_pairs(pairs: impl IntoIterator<Item = (StatKey, i64)>) -> Self {
        let mut stats = Self::new();
        for (key, value) in pairs {
            let slot = &mut stats.values[key.index()];
            *slot = slot.saturating_add(value);
        }
        stats
    }

    /// Builder-style setter.
    pub fn with(mut self, key: StatKey, value: i64) -> Self {
        self.set(key, value);
        self
    }

    /// Effective value of `key` (zero when never set).
    pub fn get(&self, key: StatKey) -> i64 {
        self.values[key.index()]
    }

    pub fn set(&mut self, key: StatKey, value: i64) {
        self.values[key.index()] = value;
    }

    /// Add every entry of `delta` into this set, saturating at the `i64`
    /// bounds.
    pub fn add_assign(&mut self, delta: &StatSet) {
        for (value, change) in self.values.iter_mut().zip(delta.values.iter()) {
            *value = value.saturating_add(*change);
        }
    }

    /// Sum of all stat values, saturating at the `i64` bounds.
    ///
    /// This is the scalar used to rank outcomes; it is not weighted.
    pub fn total(&self) -> i64 {
        self.values.iter().fold(0i64, |sum, v| sum.saturating_add(*v))
    }

    /// True when every stat is zero.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }

    /// Every key with its value, in canonical order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, i64)> + '_ {
        StatKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Non-zero entries in canonical order.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (StatKey, i64)> + '_ {
        self.iter().filter(|(_, value)| *value != 0)
    }

    /// Non-zero entries in player-facing order.
    pub fn iter_display(&self) -> impl Iterator<Item = (StatKey, i64)> + '_ {
        StatKey::DISPLAY_ORDER
            .into_iter()
            .map(move |key| (key, self.get(key)))
            .filter(|(_, value)| *value != 0)
    }
}

impl fmt::Display for StatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter_display() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key.display_name(), value)?;
            first = false;
        }
        if first {
            write!(f, "(no stats)")?;
        }
        Ok(())
    }
}

impl Serialize for StatSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter_nonzero().map(|(key, value)| (key.code(), value)))
    }
}

impl<'de> Deserialize<'de> for StatSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, i64>::deserialize(deserializer)?;
        let mut stats = StatSet::new();
        for (code, value) in raw {
            let key = StatKey::from_code(&code)
                .ok_or_else(|| D::Error::custom(format!("unknown stat `{code}`")))?;
            stats.set(key, value);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip_through_lookup() {
        for key in StatKey::ALL {
            assert_eq!(StatKey::from_code(key.code()), Some(key));
        }
        assert_eq!(StatKey::from_code("nope"), None);
    }

    #[test]
    fn test_canonical_index_matches_position() {
        for (idx, key) in StatKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), idx);
        }
    }

    #[test]
    fn test_explicit_zero_equals_absent() {
        let a = StatSet::new().with(StatKey::WeaponAttack, 108);
        let b = StatSet::new()
            .with(StatKey::WeaponAttack, 108)
            .with(StatKey::Strength, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_add_assign_defaults_missing_keys() {
        let mut stats = StatSet::new().with(StatKey::WeaponDefense, 10);
        stats.add_assign(&StatSet::new().with(StatKey::MagicDefense, 1).with(StatKey::WeaponDefense, 2));
        assert_eq!(stats.get(StatKey::WeaponDefense), 12);
        assert_eq!(stats.get(StatKey::MagicDefense), 1);
    }

    #[test]
    fn test_total() {
        let stats = StatSet::new().with(StatKey::Hp, 15).with(StatKey::WeaponDefense, -3);
        assert_eq!(stats.total(), 12);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let mut stats = StatSet::new()
            .with(StatKey::WeaponAttack, i64::MAX)
            .with(StatKey::Hp, i64::MAX);
        stats.add_assign(&StatSet::new().with(StatKey::WeaponAttack, 5));
        assert_eq!(stats.get(StatKey::WeaponAttack), i64::MAX);
        assert_eq!(stats.total(), i64::MAX);

        let low = StatSet::from_pairs([(StatKey::Luck, i64::MIN), (StatKey::Luck, -1)]);
        assert_eq!(low.get(StatKey::Luck), i64::MIN);
    }

    #[test]
    fn test_serialize_is_sparse() {
        let stats = StatSet::new().with(StatKey::WeaponAttack, 113);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"watk":113}"#);
    }

    #[test]
    fn test_deserialize_rejects_unknown_stat() {
        let err = serde_json::from_str::<StatSet>(r#"{"crit":4}"#).unwrap_err();
        assert!(err.to_string().contains("crit"));
    }

    #[test]
    fn test_display_uses_player_order() {
        let stats = StatSet::new()
            .with(StatKey::WeaponDefense, 2)
            .with(StatKey::Hp, 15);
        assert_eq!(stats.to_string(), "HP: 15, Weapon Defense: 2");
        assert_eq!(StatSet::new().to_string(), "(no stats)");
    }
}
