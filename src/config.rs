//! Run configuration.
//!
//! Out-of-range values are clamped rather than rejected, so a config is
//! always runnable once `normalized` has been applied.

use crate::error::ScrollError;
use serde::{Deserialize, Serialize};

/// Fewest trials a run may request.
pub const MIN_TRIALS: u32 = 1;
/// Most trials a run may request.
pub const MAX_TRIALS: u32 = 10_000;
/// Trials requested when nothing is specified.
pub const DEFAULT_TRIALS: u32 = 1_000;
/// Trials processed per scheduler slice.
pub const DEFAULT_SLICE_SIZE: u32 = 100;

/// Settings for one simulation run.
///
/// # Examples
///
/// ```rust
/// use scrollsim::SimulationConfig;
///
/// let config = SimulationConfig::from_json(r#"{ "trials": 50000, "seed": 7 }"#).unwrap();
/// assert_eq!(config.trials, 10_000);
/// assert_eq!(config.slice_size, 100);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: u32,
    pub slice_size: u32,
    /// Seed for a replayable run; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            slice_size: DEFAULT_SLICE_SIZE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// A default config running `trials` trials.
    pub fn with_trials(trials: u32) -> Self {
        Self {
            trials,
            ..Self::default()
        }
        .normalized()
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn slice_size(mut self, slice_size: u32) -> Self {
        self.slice_size = slice_size;
        self.normalized()
    }

    /// Parse a JSON config, defaulting missing fields and clamping the rest.
    pub fn from_json(json: &str) -> Result<Self, ScrollError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp the trial count into range and the slice size to at least 1.
    pub fn normalized(self) -> Self {
        Self {
            trials: clamp_trials(self.trials),
            slice_size: self.slice_size.max(1),
            seed: self.seed,
        }
    }
}

/// Clamp a trial count into `MIN_TRIALS..=MAX_TRIALS`.
pub fn clamp_trials(trials: u32) -> u32 {
    trials.clamp(MIN_TRIALS, MAX_TRIALS)
}

/// Parse a user-entered trial count.
///
/// Non-digit characters are dropped first, so `"5,000"` reads as 5000.
/// Input with no digits falls to the minimum; too many digits to parse
/// clamps to the maximum.
///
/// # Examples
///
/// ```rust
/// use scrollsim::config::sanitize_trial_count;
///
/// assert_eq!(sanitize_trial_count("5,000"), 5_000);
/// assert_eq!(sanitize_trial_count("999999"), 10_000);
/// assert_eq!(sanitize_trial_count("abc"), 1);
/// ```
pub fn sanitize_trial_count(input: &str) -> u32 {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return MIN_TRIALS;
    }
    digits.parse::<u32>().map_or(MAX_TRIALS, clamp_trials)
}
