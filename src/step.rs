//! Planned scroll applications.
//!
//! A `Step` names the scroll to use and what to do after it lands or
//! fails. Steps are built declaratively:
//!
//! ```rust
//! use scrollsim::{Branch, Enhancement, Step};
//!
//! let scroll = Enhancement::new("1", "Scroll for Weapon for ATT 60%", "weapon", 0.6);
//! let step = Step::using(scroll)
//!     .on_success(Branch::Advance)
//!     .on_failure(Branch::Advance)
//!     .failure_limit(2);
//!
//! assert_eq!(step.failure_limit, 2);
//! ```

use crate::item::Enhancement;
use serde::{Deserialize, Serialize};

/// What a trial does after a step resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    /// Move on to the next step.
    #[serde(rename = "next")]
    Advance,
    /// End the trial here.
    #[serde(rename = "stop")]
    Halt,
}

/// One planned scroll attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// The scroll to apply. `None` is an incomplete step and halts a trial.
    pub scroll: Option<Enhancement>,
    pub on_success: Branch,
    pub on_failure: Branch,
    /// Cumulative failures across the run after which it stops. 0 = no limit.
    #[serde(default)]
    pub failure_limit: u32,
}

impl Default for Step {
    fn default() -> Self {
        Self::empty()
    }
}

impl Step {
    /// A step with no scroll chosen yet: advance on success, halt on failure.
    pub fn empty() -> Self {
        Self {
            scroll: None,
            on_success: Branch::Advance,
            on_failure: Branch::Halt,
            failure_limit: 0,
        }
    }

    /// A step applying `scroll`, with the same default branches as `empty`.
    pub fn using(scroll: Enhancement) -> Self {
        Self {
            scroll: Some(scroll),
            ..Self::empty()
        }
    }

    pub fn on_success(mut self, branch: Branch) -> Self {
        self.on_success = branch;
        self
    }

    pub fn on_failure(mut self, branch: Branch) -> Self {
        self.on_failure = branch;
        self
    }

    pub fn failure_limit(mut self, limit: u32) -> Self {
        self.failure_limit = limit;
        self
    }

    /// Whether a scroll has been chosen.
    pub fn is_complete(&self) -> bool {
        self.scroll.is_some()
    }

    /// True once `failures` cumulative failures reach this step's limit.
    pub fn limit_reached(&self, failures: u32) -> bool {
        self.failure_limit > 0 && failures >= self.failure_limit
    }
}
