//! # Money Helpers
//!
//! Guarded float arithmetic and lenient deserialization for monetary fields.
//!
//! ## Why f64 and not integer cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The remote API stores every amount as a JSON double (Mongo Number).   │
//! │  This crate never originates amounts - it only re-aggregates what the  │
//! │  server already recorded. Re-encoding those doubles as cents would     │
//! │  round figures the rest of the system reports verbatim.                │
//! │                                                                         │
//! │  The hazards of float math are contained instead:                      │
//! │    • every division goes through `ratio` (zero denominator → 0)        │
//! │    • presentation values go through `round2`                           │
//! │    • NaN / infinity can never escape a reducer                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// =============================================================================
// Guarded Arithmetic
// =============================================================================

/// Rounds a value to 2 decimal places for presentation.
///
/// Intermediate arithmetic keeps full precision; only values handed to the
/// UI (or submitted back to the API, like a refund amount) are rounded.
///
/// ## Example
/// ```rust
/// use noir_core::money::round2;
///
/// assert_eq!(round2(180.004), 180.0);
/// assert_eq!(round2(1.005 * 100.0), 100.5);
/// ```
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Divides `numerator` by `denominator`, returning `0.0` for a degenerate
/// denominator (zero, negative, NaN).
///
/// Every proportional allocation in this crate funnels through here, so a
/// sale with a zero grand total can never produce NaN in a report.
///
/// ## Example
/// ```rust
/// use noir_core::money::ratio;
///
/// assert_eq!(ratio(250.0, 1000.0), 0.25);
/// assert_eq!(ratio(250.0, 0.0), 0.0);
/// ```
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Applies a percentage rate to an amount (`rate` is in percent, not a
/// fraction: `percent_of(5000.0, 2.5)` is 125.0).
#[inline]
pub fn percent_of(amount: f64, rate: f64) -> f64 {
    amount * rate / 100.0
}

// =============================================================================
// Lenient Deserialization
// =============================================================================
// The API has grown organically: some documents store amounts as numbers,
// some as strings (form inputs posted verbatim), some omit the field
// entirely. A malformed amount reads as zero; it never fails the whole
// array fetch.

/// Deserializes a monetary amount leniently: number, numeric string, or
/// null/absent all succeed; anything unparseable reads as `0.0`.
///
/// Use with `#[serde(default, deserialize_with = "lenient_amount")]`.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) => Ok(s.trim().parse().unwrap_or(0.0)),
        _ => Ok(0.0),
    }
}

/// Deserializes an item quantity leniently (number or numeric string),
/// defaulting to `0` when absent or unparseable.
pub fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Ok(n.as_i64().unwrap_or_else(|| {
            // Quantities occasionally arrive as doubles ("2.0")
            n.as_f64().map(|f| f as i64).unwrap_or(0)
        })),
        Some(Value::String(s)) => Ok(s.trim().parse().unwrap_or(0)),
        _ => Ok(0),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
