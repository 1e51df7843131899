//! Equipment items and the scrolls that enhance them.
//!
//! Both are read-only catalog entries. The simulator copies an item's base
//! stats at the start of every trial and never mutates either type.

use crate::currency::Mesos;
use crate::stat::StatSet;
use serde::{Deserialize, Deserializer, Serialize};

/// A piece of equipment that can be scrolled.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{Item, StatKey, StatSet};
///
/// let item = Item::new("1", "Maple Soul Searcher", "weapon", 7)
///     .with_stats(StatSet::new().with(StatKey::WeaponAttack, 108))
///     .with_cost(1_500_000);
///
/// assert_eq!(item.slots, 7);
/// assert_eq!(item.stats.get(StatKey::WeaponAttack), 108);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Equipment category, e.g. `weapon` or `hat`. Scrolls must match it.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Number of upgrade slots, always at least 1.
    #[serde(deserialize_with = "deserialize_slots")]
    pub slots: u32,
    #[serde(default)]
    pub stats: StatSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Acquisition cost. Zero means unknown or free.
    #[serde(default)]
    pub cost: Mesos,
}

impl Item {
    /// Create an item with no stats and no cost.
    ///
    /// `slots` is raised to 1 if zero is given.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        item_type: impl Into<String>,
        slots: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: item_type.into(),
            slots: slots.max(1),
            stats: StatSet::new(),
            image_url: None,
            cost: 0,
        }
    }

    pub fn with_stats(mut self, stats: StatSet) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_cost(mut self, cost: Mesos) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Whether `scroll` targets this item's category.
    pub fn accepts(&self, scroll: &Enhancement) -> bool {
        scroll.scroll_type == self.item_type
    }
}

/// A scroll: a probabilistic stat delta for one equipment category.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{Enhancement, StatKey, StatSet};
///
/// let scroll = Enhancement::new("1", "Scroll for Weapon for ATT 60%", "weapon", 0.6)
///     .with_effects(StatSet::new().with(StatKey::WeaponAttack, 5));
///
/// assert_eq!(scroll.success, 0.6);
///
/// // Probabilities are clamped into [0, 1].
/// assert_eq!(Enhancement::new("2", "Broken", "weapon", 1.7).success, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub scroll_type: String,
    /// Success probability in `[0, 1]`. Clamped on deserialization too.
    #[serde(deserialize_with = "deserialize_probability")]
    pub success: f64,
    /// Stats added to the item on success.
    #[serde(default)]
    pub effects: StatSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cost: Mesos,
}

impl Enhancement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        scroll_type: impl Into<String>,
        success: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scroll_type: scroll_type.into(),
            success: clamp_probability(success),
            effects: StatSet::new(),
            image_url: None,
            cost: 0,
        }
    }

    pub fn with_effects(mut self, effects: StatSet) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_cost(mut self, cost: Mesos) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Clamp a probability into `[0, 1]`, mapping NaN to 0.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

fn deserialize_probability<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_probability)
}

fn deserialize_slots<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(|slots| slots.max(1))
}
