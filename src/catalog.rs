//! Item and scroll catalogs.
//!
//! Catalog rows arrive loosely typed, either from a spreadsheet query or
//! from a static list. Everything is coerced here, field by field, before
//! an `Item` or `Enhancement` is built; the simulator never sees a raw row.
//!
//! Spreadsheet rows use this column layout:
//!
//! ```text
//! 0 id | 1 name | 2 type | 3 slots (items) or success (scrolls)
//! 4..=17 str dex int luk watk matk def mdef hp mp acc avoid speed jump
//! 18 image url | 19 cost
//! ```

use crate::currency::{sanitize_amount, Mesos};
use crate::error::ScrollError;
use crate::item::{clamp_probability, Enhancement, Item};
use crate::stat::{StatKey, StatSet};
use serde::Deserialize;
use serde_json::Value;

const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_TYPE: usize = 2;
const COL_SLOTS_OR_SUCCESS: usize = 3;
const COL_FIRST_STAT: usize = 4;
const COL_IMAGE: usize = 18;
const COL_COST: usize = 19;

/// Something that can supply items and scrolls.
///
/// Hosts implement this over whatever storage or transport they use; the
/// crate ships a static implementation (`Catalog`) and one over raw
/// spreadsheet responses (`SheetPayloads`).
pub trait CatalogSource {
    /// Load every item.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying payload cannot be parsed.
    fn load_items(&self) -> Result<Vec<Item>, ScrollError>;

    /// Load every scroll.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying payload cannot be parsed.
    fn load_scrolls(&self) -> Result<Vec<Enhancement>, ScrollError>;
}

/// One spreadsheet row: a list of optional cells.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    #[serde(default)]
    c: Vec<Option<SheetCell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SheetCell {
    #[serde(default)]
    v: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SheetResponse {
    table: SheetTable,
}

#[derive(Debug, Deserialize)]
struct SheetTable {
    #[serde(default)]
    rows: Vec<SheetRow>,
}

impl SheetRow {
    /// Build a row from plain values; `Value::Null` is an empty cell.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let c = values
            .into_iter()
            .map(|v| match v {
                Value::Null => None,
                v => Some(SheetCell { v: Some(v) }),
            })
            .collect();
        Self { c }
    }

    fn cell(&self, idx: usize) -> Option<&Value> {
        self.c.get(idx)?.as_ref()?.v.as_ref()
    }

    fn text(&self, idx: usize) -> Option<String> {
        let text = match self.cell(idx)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => match n.as_i64() {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    fn int(&self, idx: usize) -> i64 {
        self.cell(idx).map_or(0, coerce_int)
    }

    /// Currency cells may carry digit-group separators.
    fn amount(&self, idx: usize) -> Mesos {
        match self.cell(idx) {
            Some(Value::String(s)) => sanitize_amount(s),
            Some(value) => u64::try_from(coerce_int(value)).unwrap_or(0),
            None => 0,
        }
    }

    fn float(&self, idx: usize) -> f64 {
        match self.cell(idx) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Stat cells are bounded to the `i32` range.
    fn stats(&self) -> StatSet {
        StatSet::from_pairs(StatKey::ALL.iter().map(|key| {
            let raw = self.int(COL_FIRST_STAT + key.index());
            let bounded = raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
            if bounded != raw {
                log::warn!("stat {key} value {raw} clamped to {bounded}");
            }
            (*key, bounded)
        }))
    }
}

/// Integer coercion: numbers truncate, strings read their leading integer.
fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        _ => 0,
    }
}

/// Parse the optional sign and digits at the start of `s`, or 0.
fn leading_int(s: &str) -> i64 {
    let s = s.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let magnitude = digits.parse::<i64>().unwrap_or(0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Extract the rows from a spreadsheet query response.
///
/// The response is a script call wrapping a JSON body; everything outside
/// the outermost parentheses is discarded. A bare JSON body is accepted
/// as well.
///
/// # Examples
///
/// ```rust
/// use scrollsim::catalog::{items_from_rows, parse_sheet_response};
///
/// let text = r#"/*O_o*/
/// google.visualization.Query.setResponse({"table":{"rows":[
///   {"c":[{"v":1},{"v":"Blue Jean"},{"v":"bottom"},{"v":5}]}
/// ]}});"#;
///
/// let rows = parse_sheet_response(text).unwrap();
/// let items = items_from_rows(&rows);
/// assert_eq!(items[0].id, "1");
/// assert_eq!(items[0].slots, 5);
/// ```
pub fn parse_sheet_response(text: &str) -> Result<Vec<SheetRow>, ScrollError> {
    let trimmed = text.trim();
    let body = if trimmed.starts_with('{') {
        trimmed
    } else {
        let start = trimmed.find('(').ok_or(ScrollError::MissingCatalogBody)?;
        let end = trimmed.rfind(')').ok_or(ScrollError::MissingCatalogBody)?;
        if end <= start {
            return Err(ScrollError::MissingCatalogBody);
        }
        &trimmed[start + 1..end]
    };
    let response: SheetResponse = serde_json::from_str(body)?;
    Ok(response.table.rows)
}

/// Coerce item rows. Rows without an id are skipped.
pub fn items_from_rows(rows: &[SheetRow]) -> Vec<Item> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let Some(id) = row.text(COL_ID) else {
                log::warn!("skipping item row {idx}: no id");
                return None;
            };
            let slots = row.int(COL_SLOTS_OR_SUCCESS);
            if slots < 1 {
                log::warn!("item {id} has {slots} slots, using 1");
            }
            let slots = u32::try_from(slots.max(1)).unwrap_or(u32::MAX);
            let mut item = Item::new(
                id,
                row.text(COL_NAME).unwrap_or_default(),
                row.text(COL_TYPE).unwrap_or_default(),
                slots,
            )
            .with_stats(row.stats())
            .with_cost(row.amount(COL_COST));
            item.image_url = row.text(COL_IMAGE);
            Some(item)
        })
        .collect()
}

/// Coerce scroll rows. Rows without an id are skipped.
pub fn scrolls_from_rows(rows: &[SheetRow]) -> Vec<Enhancement> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let Some(id) = row.text(COL_ID) else {
                log::warn!("skipping scroll row {idx}: no id");
                return None;
            };
            let raw = row.float(COL_SLOTS_OR_SUCCESS);
            let success = clamp_probability(raw);
            if success != raw {
                log::warn!("scroll {id} success {raw} clamped to {success}");
            }
            let mut scroll = Enhancement::new(
                id,
                row.text(COL_NAME).unwrap_or_default(),
                row.text(COL_TYPE).unwrap_or_default(),
                success,
            )
            .with_effects(row.stats())
            .with_cost(row.amount(COL_COST));
            scroll.image_url = row.text(COL_IMAGE);
            Some(scroll)
        })
        .collect()
}

/// Raw spreadsheet responses for the item and scroll sheets.
#[derive(Debug, Clone, Default)]
pub struct SheetPayloads {
    pub items: String,
    pub scrolls: String,
}

impl CatalogSource for SheetPayloads {
    fn load_items(&self) -> Result<Vec<Item>, ScrollError> {
        Ok(items_from_rows(&parse_sheet_response(&self.items)?))
    }

    fn load_scrolls(&self) -> Result<Vec<Enhancement>, ScrollError> {
        Ok(scrolls_from_rows(&parse_sheet_response(&self.scrolls)?))
    }
}

/// Query URL returning a sheet as a JSON response.
pub fn sheet_query_url(sheet_id: &str, sheet_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:json&sheet={sheet_name}"
    )
}

/// An in-memory catalog.
///
/// # Examples
///
/// ```rust
/// use scrollsim::Catalog;
///
/// let catalog = Catalog::maple_weapons();
/// let axe = catalog.item("3").unwrap();
/// assert_eq!(catalog.scrolls_for(axe).len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub scrolls: Vec<Enhancement>,
}

impl Catalog {
    /// Load both lists from a source.
    pub fn load(source: &impl CatalogSource) -> Result<Self, ScrollError> {
        let catalog = Self {
            items: source.load_items()?,
            scrolls: source.load_scrolls()?,
        };
        log::info!(
            "loaded catalog with {} items and {} scrolls",
            catalog.items.len(),
            catalog.scrolls.len()
        );
        Ok(catalog)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn scroll(&self, id: &str) -> Option<&Enhancement> {
        self.scrolls.iter().find(|scroll| scroll.id == id)
    }

    /// Scrolls usable on `item`.
    pub fn scrolls_for(&self, item: &Item) -> Vec<&Enhancement> {
        self.scrolls.iter().filter(|s| item.accepts(s)).collect()
    }

    /// Items at least one of `chosen` applies to; every item when none are chosen.
    pub fn items_for(&self, chosen: &[Enhancement]) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| chosen.is_empty() || chosen.iter().any(|s| item.accepts(s)))
            .collect()
    }

    /// Four max-attack weapons and the attack scrolls for them.
    pub fn maple_weapons() -> Self {
        let base = StatSet::new().with(StatKey::WeaponAttack, 108);
        let items = [
            ("1", "Maple Soul Searcher"),
            ("2", "Maple Storm Finger"),
            ("3", "Maple Dragon Axe"),
            ("4", "Maple Demon Axe"),
        ]
        .into_iter()
        .map(|(id, name)| Item::new(id, name, "weapon", 7).with_stats(base))
        .collect();

        let scrolls = [
            ("1", "Scroll for Weapon for ATT 60%", 0.6, 5),
            ("2", "Scroll for Weapon for ATT 10%", 0.1, 7),
            ("3", "Dark Scroll for Weapon for ATT 30%", 0.3, 9),
            ("4", "Dark Scroll for Weapon for ATT 70%", 0.7, 3),
        ]
        .into_iter()
        .map(|(id, name, success, watk)| {
            Enhancement::new(id, name, "weapon", success)
                .with_effects(StatSet::new().with(StatKey::WeaponAttack, watk))
        })
        .collect();

        Self { items, scrolls }
    }

    /// Armour pieces with prices and one matching scroll each.
    pub fn sample() -> Self {
        const ICONS: &str = "https://maplestory.io/api/GMS/210.1.1/item";
        let items = vec![
            Item::new("1", "Blue Cotton Robe", "overall", 7)
                .with_stats(
                    StatSet::new()
                        .with(StatKey::WeaponDefense, 10)
                        .with(StatKey::MagicDefense, 5)
                        .with(StatKey::Hp, 15),
                )
                .with_image(format!("{ICONS}/1050039/icon"))
                .with_cost(50_000),
            Item::new("2", "Blue Jean", "bottom", 5)
                .with_stats(
                    StatSet::new()
                        .with(StatKey::WeaponDefense, 5)
                        .with(StatKey::Hp, 10),
                )
                .with_image(format!("{ICONS}/1060057/icon"))
                .with_cost(35_000),
            Item::new("3", "White Bandana", "hat", 5)
                .with_stats(
                    StatSet::new()
                        .with(StatKey::WeaponDefense, 3)
                        .with(StatKey::Intelligence, 1),
                )
                .with_image(format!("{ICONS}/1002019/icon"))
                .with_cost(25_000),
        ];
        let scrolls = vec![
            Enhancement::new("1", "Overall DEF 60%", "overall", 0.6)
                .with_effects(
                    StatSet::new()
                        .with(StatKey::WeaponDefense, 2)
                        .with(StatKey::MagicDefense, 1),
                )
                .with_image(format!("{ICONS}/2040000/icon"))
                .with_cost(15_000),
            Enhancement::new("2", "Bottom DEF 10%", "bottom", 0.1)
                .with_effects(
                    StatSet::new()
                        .with(StatKey::WeaponDefense, 5)
                        .with(StatKey::Hp, 15),
                )
                .with_image(format!("{ICONS}/2040100/icon"))
                .with_cost(50_000),
            Enhancement::new("3", "Hat INT 30%", "hat", 0.3)
                .with_effects(
                    StatSet::new()
                        .with(StatKey::Intelligence, 2)
                        .with(StatKey::Mp, 15),
                )
                .with_image(format!("{ICONS}/2040200/icon"))
                .with_cost(35_000),
        ];
        Self { items, scrolls }
    }
}

impl CatalogSource for Catalog {
    fn load_items(&self) -> Result<Vec<Item>, ScrollError> {
        Ok(self.items.clone())
    }

    fn load_scrolls(&self) -> Result<Vec<Enhancement>, ScrollError> {
        Ok(self.scrolls.clone())
    }
}
