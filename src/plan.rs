//! Scroll plans.
//!
//! A `Plan` pairs an item with the ordered steps to try on it and keeps
//! the editing rules in one place: no more steps than slots, sensible
//! branch defaults for new steps, and failure limits that can never exceed
//! the number of failures possible by that step.

use crate::error::ScrollError;
use crate::item::{Enhancement, Item};
use crate::step::{Branch, Step};
use std::collections::HashSet;

/// An item and the steps planned for it.
///
/// # Examples
///
/// ```rust
/// use scrollsim::{Branch, Enhancement, Item, Plan};
///
/// let item = Item::new("3", "White Bandana", "hat", 2);
/// let scroll = Enhancement::new("3", "Hat INT 30%", "hat", 0.3);
///
/// // A single offered scroll is pre-selected on the first step.
/// let mut plan = Plan::new(item, std::slice::from_ref(&scroll));
/// assert!(plan.is_runnable());
///
/// // The step filling the last slot stops on success.
/// assert!(plan.push_step());
/// assert_eq!(plan.steps()[1].on_success, Branch::Halt);
/// assert!(!plan.push_step());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    item: Item,
    steps: Vec<Step>,
}

impl Plan {
    /// Start a plan with one default step.
    ///
    /// The step is pre-filled when exactly one scroll is offered.
    pub fn new(item: Item, offered: &[Enhancement]) -> Self {
        let mut plan = Self {
            item,
            steps: Vec::new(),
        };
        plan.reset_steps(offered);
        plan
    }

    /// Build a plan from existing steps, checking them first.
    pub fn with_steps(item: Item, steps: Vec<Step>) -> Result<Self, ScrollError> {
        let plan = Self { item, steps };
        plan.validate()?;
        Ok(plan)
    }

    /// Build a plan by scroll id, one step per id, looked up in `catalog`.
    ///
    /// Steps keep the default branches. Every unknown id is reported.
    pub fn from_ids(
        item: Item,
        ids: &[&str],
        catalog: &[Enhancement],
    ) -> Result<Self, ScrollError> {
        let mut missing = Vec::new();
        let mut steps = Vec::with_capacity(ids.len());
        for id in ids {
            match catalog.iter().find(|s| s.id == *id) {
                Some(scroll) => steps.push(Step::using(scroll.clone())),
                None => missing.push((*id).to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ScrollError::UnknownScrolls(missing));
        }
        Self::with_steps(item, steps)
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether another step fits in the item's slots.
    pub fn can_add_step(&self) -> bool {
        self.steps.len() < self.item.slots as usize
    }

    /// Append an empty step. Returns false when every slot is planned.
    pub fn push_step(&mut self) -> bool {
        if !self.can_add_step() {
            return false;
        }
        let fills_last_slot = self.steps.len() + 1 == self.item.slots as usize;
        let on_success = if fills_last_slot {
            Branch::Halt
        } else {
            Branch::Advance
        };
        self.steps.push(Step::empty().on_success(on_success));
        true
    }

    /// Remove a step. The last remaining step cannot be removed.
    pub fn remove_step(&mut self, index: usize) -> Option<Step> {
        if self.steps.len() <= 1 || index >= self.steps.len() {
            return None;
        }
        Some(self.steps.remove(index))
    }

    /// Choose (or clear) the scroll for a step.
    pub fn set_scroll(&mut self, index: usize, scroll: Option<Enhancement>) -> bool {
        match self.steps.get_mut(index) {
            Some(step) => {
                step.scroll = scroll;
                true
            }
            None => false,
        }
    }

    pub fn set_branches(&mut self, index: usize, on_success: Branch, on_failure: Branch) -> bool {
        match self.steps.get_mut(index) {
            Some(step) => {
                step.on_success = on_success;
                step.on_failure = on_failure;
                true
            }
            None => false,
        }
    }

    /// Set a step's failure limit, clamped to `0..=index + 1`.
    ///
    /// A trial can have failed at most `index + 1` times by step `index`,
    /// so larger limits could never trigger.
    pub fn set_failure_limit(&mut self, index: usize, limit: u32) -> Option<u32> {
        let step = self.steps.get_mut(index)?;
        let ceiling = u32::try_from(index + 1).unwrap_or(u32::MAX);
        step.failure_limit = limit.min(ceiling);
        Some(step.failure_limit)
    }

    /// Swap in a different item. Steps go back to a single default step.
    pub fn reset_item(&mut self, item: Item, offered: &[Enhancement]) {
        self.item = item;
        self.reset_steps(offered);
    }

    fn reset_steps(&mut self, offered: &[Enhancement]) {
        let scroll = match offered {
            [only] => Some(only.clone()),
            _ => None,
        };
        self.steps = vec![Step {
            scroll,
            ..Step::empty()
        }];
    }

    /// Check that the plan can run as configured.
    ///
    /// Reports the first problem found: too many steps, then per step an
    /// empty scroll or a scroll for another category.
    pub fn validate(&self) -> Result<(), ScrollError> {
        if self.steps.len() > self.item.slots as usize {
            return Err(ScrollError::TooManySteps {
                steps: self.steps.len(),
                slots: self.item.slots,
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            let Some(scroll) = step.scroll.as_ref() else {
                return Err(ScrollError::IncompleteStep { index });
            };
            if !self.item.accepts(scroll) {
                return Err(ScrollError::CategoryMismatch {
                    index,
                    item_type: self.item.item_type.clone(),
                    scroll_type: scroll.scroll_type.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_runnable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Scrolls used by the plan, once each by id, in first-use order.
    pub fn distinct_enhancements(&self) -> Vec<&Enhancement> {
        let mut seen = HashSet::new();
        self.steps
            .iter()
            .filter_map(|step| step.scroll.as_ref())
            .filter(|scroll| seen.insert(scroll.id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(slots: u32) -> Item {
        Item::new("1", "Maple Soul Searcher", "weapon", slots)
    }

    fn scrolls() -> Vec<Enhancement> {
        vec![
            Enhancement::new("1", "ATT 60%", "weapon", 0.6).with_cost(10),
            Enhancement::new("2", "ATT 10%", "weapon", 0.1).with_cost(30),
        ]
    }

    #[test]
    fn test_new_plan_has_one_empty_step_with_choice() {
        let plan = Plan::new(weapon(7), &scrolls());
        assert_eq!(plan.steps().len(), 1);
        assert!(!plan.steps()[0].is_complete());
        assert!(matches!(
            plan.validate(),
            Err(ScrollError::IncompleteStep { index: 0 })
        ));
    }

    #[test]
    fn test_push_respects_slots() {
        let mut plan = Plan::new(weapon(3), &scrolls());
        assert!(plan.push_step());
        assert_eq!(plan.steps()[1].on_success, Branch::Advance);
        assert!(plan.push_step());
        assert_eq!(plan.steps()[2].on_success, Branch::Halt);
        assert!(!plan.push_step());
        assert_eq!(plan.steps().len(), 3);
    }

    #[test]
    fn test_remove_keeps_last_step() {
        let mut plan = Plan::new(weapon(3), &scrolls());
        assert!(plan.remove_step(0).is_none());
        plan.push_step();
        assert!(plan.remove_step(5).is_none());
        assert!(plan.remove_step(0).is_some());
        assert_eq!(plan.steps().len(), 1);
    }

    #[test]
    fn test_failure_limit_clamped_to_position() {
        let mut plan = Plan::new(weapon(3), &scrolls());
        plan.push_step();
        assert_eq!(plan.set_failure_limit(0, 5), Some(1));
        assert_eq!(plan.set_failure_limit(1, 5), Some(2));
        assert_eq!(plan.set_failure_limit(1, 0), Some(0));
        assert_eq!(plan.set_failure_limit(9, 1), None);
    }

    #[test]
    fn test_category_mismatch() {
        let hat = Enhancement::new("3", "Hat INT 30%", "hat", 0.3);
        let mut plan = Plan::new(weapon(2), &scrolls());
        plan.set_scroll(0, Some(hat));
        assert!(matches!(
            plan.validate(),
            Err(ScrollError::CategoryMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_with_steps_rejects_too_many() {
        let steps = vec![Step::using(scrolls()[0].clone()); 3];
        let err = Plan::with_steps(weapon(2), steps).unwrap_err();
        assert!(matches!(err, ScrollError::TooManySteps { steps: 3, slots: 2 }));
    }

    #[test]
    fn test_from_ids_reports_unknown() {
        let err = Plan::from_ids(weapon(3), &["1", "8", "9"], &scrolls()).unwrap_err();
        match err {
            ScrollError::UnknownScrolls(ids) => assert_eq!(ids, vec!["8", "9"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_distinct_enhancements_first_use_order() {
        let plan = Plan::from_ids(weapon(4), &["2", "1", "2", "1"], &scrolls()).unwrap();
        let distinct = plan.distinct_enhancements();
        let ids: Vec<&str> = distinct.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_reset_item_clears_steps() {
        let mut plan = Plan::from_ids(weapon(4), &["1", "2"], &scrolls()).unwrap();
        let only = vec![scrolls()[1].clone()];
        plan.reset_item(weapon(5), &only);
        assert_eq!(plan.steps().len(), 1);
        assert_eq!(plan.steps()[0].scroll.as_ref().map(|s| s.id.as_str()), Some("2"));
        assert_eq!(plan.item().slots, 5);
    }
}
