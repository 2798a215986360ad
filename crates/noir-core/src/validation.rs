//! # Validation Module
//!
//! Input validation for caller-supplied parameters.
//!
//! Record arrays themselves are never validated - malformed fields read as
//! zero by design. Validation applies to the handful of values a caller
//! types or picks: a month key for the dashboard's month view, a commission
//! rate on a user form, a returned quantity on the sales-return page.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Month Keys
// =============================================================================

/// Validates a `YYYY-MM` calendar month key.
///
/// ## Rules
/// - Exactly 7 characters, `-` at position 4
/// - Year and month parts numeric, month 01-12
///
/// ## Example
/// ```rust
/// use noir_core::validation::validate_month_key;
///
/// assert!(validate_month_key("2024-05").is_ok());
/// assert!(validate_month_key("2024-13").is_err());
/// assert!(validate_month_key("05/2024").is_err());
/// ```
pub fn validate_month_key(key: &str) -> ValidationResult<()> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ValidationError::Required {
            field: "month".to_string(),
        });
    }

    let valid = key.len() == 7
        && key.as_bytes()[4] == b'-'
        && key[..4].chars().all(|c| c.is_ascii_digit())
        && key[5..].chars().all(|c| c.is_ascii_digit())
        && matches!(key[5..].parse::<u32>(), Ok(1..=12));

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: "expected YYYY-MM".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a commission rate in percent.
///
/// ## Rules
/// - Must be between 0 and 100 (a rate over 100% would pay out more than
///   the sale itself)
pub fn validate_commission_rate(rate: f64) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: "commission rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a returned quantity against the quantity originally sold.
///
/// ## Rules
/// - Must be positive (> 0); zero-quantity lines are dropped before this runs
/// - Must not exceed the quantity sold on that line
pub fn validate_return_quantity(sold: i64, requested: i64) -> ValidationResult<()> {
    if requested <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "returned quantity".to_string(),
        });
    }

    if requested > sold {
        return Err(ValidationError::OutOfRange {
            field: "returned quantity".to_string(),
            min: 1,
            max: sold,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_month_key() {
        assert!(validate_month_key("2024-05").is_ok());
        assert!(validate_month_key("1999-12").is_ok());

        assert!(validate_month_key("").is_err());
        assert!(validate_month_key("2024-13").is_err());
        assert!(validate_month_key("2024-00").is_err());
        assert!(validate_month_key("2024-5").is_err());
        assert!(validate_month_key("2024/05").is_err());
        assert!(validate_month_key("abcd-ef").is_err());
    }

    #[test]
    fn test_validate_commission_rate() {
        assert!(validate_commission_rate(0.0).is_ok());
        assert!(validate_commission_rate(2.5).is_ok());
        assert!(validate_commission_rate(100.0).is_ok());

        assert!(validate_commission_rate(-1.0).is_err());
        assert!(validate_commission_rate(101.0).is_err());
        assert!(validate_commission_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_return_quantity() {
        assert!(validate_return_quantity(5, 1).is_ok());
        assert!(validate_return_quantity(5, 5).is_ok());

        assert!(validate_return_quantity(5, 0).is_err());
        assert!(validate_return_quantity(5, -1).is_err());
        assert!(validate_return_quantity(5, 6).is_err());
    }
}
