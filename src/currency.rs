//! In-game currency amounts.
//!
//! Costs and valuations are non-negative integers in the smallest currency
//! unit. Free-form user input passes through `sanitize_amount` before it
//! reaches the analyzer, so the core never sees a malformed number.

/// An amount of mesos.
pub type Mesos = u64;

/// Parse a user-entered amount, falling back to 0.
///
/// Surrounding whitespace and digit-group separators (`,` `_` and spaces)
/// are ignored. Anything else that is not a non-negative integer yields 0.
///
/// # Examples
///
/// ```rust
/// use scrollsim::currency::sanitize_amount;
///
/// assert_eq!(sanitize_amount("1,500,000"), 1_500_000);
/// assert_eq!(sanitize_amount(" 42 "), 42);
/// assert_eq!(sanitize_amount("-5"), 0);
/// assert_eq!(sanitize_amount("lots"), 0);
/// assert_eq!(sanitize_amount(""), 0);
/// ```
pub fn sanitize_amount(input: &str) -> Mesos {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    digits.parse::<Mesos>().unwrap_or(0)
}

/// Render an amount with comma digit grouping.
///
/// # Examples
///
/// ```rust
/// use scrollsim::currency::format_amount;
///
/// assert_eq!(format_amount(0), "0");
/// assert_eq!(format_amount(1_234_567), "1,234,567");
/// ```
pub fn format_amount(amount: Mesos) -> String {
    let raw = amount.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (idx, ch) in raw.chars().enumerate() {
        if idx > 0 && (raw.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a derived (possibly fractional) amount rounded to whole mesos.
///
/// Negative values keep their sign so that losses read naturally.
pub fn format_signed(amount: f64) -> String {
    if !amount.is_finite() {
        return String::from("0");
    }
    let rounded = amount.round();
    let magnitude = format_amount(rounded.abs() as Mesos);
    if rounded < 0.0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}
