//! Error types for the catalog and plan boundaries.
//!
//! The simulation itself never fails: a missing scroll halts a trial and
//! empty selections average to zero. Errors only arise where untyped data
//! enters the crate or where a plan is checked before a run.

use thiserror::Error;

/// Format a list of ids as a readable string.
fn format_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        return String::from("(none)");
    }
    ids.join(", ")
}

/// Errors raised at the edges of the simulator.
///
/// # Examples
///
/// ```rust
/// use scrollsim::ScrollError;
///
/// let err = ScrollError::IncompleteStep { index: 2 };
/// assert_eq!(err.to_string(), "Step 3 has no scroll selected");
/// ```
#[derive(Debug, Error)]
pub enum ScrollError {
    /// A catalog payload or config document was not valid JSON, or not the expected shape.
    #[error("Malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The spreadsheet response did not wrap a JSON body in parentheses.
    #[error("Catalog response has no JSON body")]
    MissingCatalogBody,

    /// More steps than the item has upgrade slots.
    #[error("Plan has {steps} steps but the item only has {slots} slots")]
    TooManySteps { steps: usize, slots: u32 },

    /// A step has no scroll. `index` is zero-based.
    #[error("Step {} has no scroll selected", .index + 1)]
    IncompleteStep { index: usize },

    /// A step's scroll is for a different equipment category.
    #[error(
        "Step {} uses a `{scroll_type}` scroll on a `{item_type}` item",
        .index + 1
    )]
    CategoryMismatch {
        index: usize,
        item_type: String,
        scroll_type: String,
    },

    /// Scroll ids referenced by a plan that the catalog does not contain.
    #[error("Unknown scroll ids: {}", format_ids(.0))]
    UnknownScrolls(Vec<String>),
}
