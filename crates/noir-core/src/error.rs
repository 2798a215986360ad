//! # Error Types
//!
//! Domain-specific error types for noir-core.
//!
//! ## Error Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Almost everything in this crate degrades instead of failing:          │
//! │                                                                         │
//! │  malformed amount      → reads as 0          (never an error)          │
//! │  unmatched cashier     → excluded from report (never an error)         │
//! │  zero denominator      → guarded, result 0    (never an error)         │
//! │  empty input arrays    → all-zero summary     (never an error)         │
//! │                                                                         │
//! │  The ONLY fallible surface is building a sales-return submission,      │
//! │  where a bad request must be rejected before it reaches the API.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations caught while composing a
/// sales-return submission. They should be translated to user-facing
/// messages by the UI layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A return submission with no positively-returned line.
    ///
    /// ## When This Occurs
    /// - "Calculate Refund" / submit clicked with every quantity at 0
    /// - All entered quantities were cleared before submitting
    #[error("return request contains no returned items")]
    EmptyReturn,

    /// A returned quantity exceeds what the sale actually sold.
    #[error("cannot return {requested} of {product_id}: only {sold} sold")]
    ReturnExceedsSold {
        product_id: String,
        sold: i64,
        requested: i64,
    },

    /// A returned product id does not appear on the selected sale.
    #[error("product not on sale: {0}")]
    ProductNotInSale(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller-supplied parameters (month keys, rates,
/// quantities) don't meet requirements - caught before any arithmetic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., a month key that is not `YYYY-MM`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
