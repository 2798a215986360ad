//! # Proportional Refund Calculator
//!
//! Computes the refund owed for a partial sales return, allocating the
//! sale's flat discount proportionally across the returned items.
//!
//! ## Why Proportional?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale:    5 × Mug @ 100  +  2 × Glass @ 50   line total = 600          │
//! │  Discount: 60 on the whole sale              discount ratio = 0.10     │
//! │                                                                         │
//! │  Customer returns 2 Mugs:                                               │
//! │    gross returned = 2 × 100           = 200                             │
//! │    refund         = 200 × (1 − 0.10)  = 180                             │
//! │                                                                         │
//! │  Refunding the gross 200 would hand back discount the customer         │
//! │  never paid; the ratio removes exactly the discounted share.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precondition
//! The calculator itself does not clamp: a returned quantity above the
//! quantity sold is the caller's bug. Use [`build_return_request`] to get
//! that validation before submitting to the API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{ratio, round2};
use crate::records::{ReturnRequest, ReturnedItem, Sale};
use crate::validation::validate_return_quantity;

/// Reason string recorded on each returned line, as the API expects it.
pub const RETURN_REASON: &str = "Customer returned";

// =============================================================================
// Quote
// =============================================================================

/// The refund computation broken into its parts, for display next to the
/// "Calculate Refund" button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuote {
    /// Pre-discount value of the whole sale (`Σ price × quantity`).
    pub total_sale_value: f64,
    /// `discount / total_sale_value`, 0 for a zero-value sale.
    pub discount_ratio: f64,
    /// Pre-discount value of the returned items.
    pub gross_returned: f64,
    /// Refund owed, unrounded. Use [`RefundQuote::rounded`] for display
    /// and submission.
    pub refund_amount: f64,
}

impl RefundQuote {
    /// Refund rounded to 2 decimal places for presentation/submission.
    #[inline]
    pub fn rounded(&self) -> f64 {
        round2(self.refund_amount)
    }
}

/// Quotes a refund for a set of returned items against their sale.
///
/// Lines with a zero or negative quantity contribute nothing. Pure and
/// infallible: degenerate sales (no lines, zero value) quote a zero refund.
///
/// ## Example
/// ```rust
/// use noir_core::refund::refund_quote;
/// use noir_core::{ReturnedItem, Sale};
///
/// let sale: Sale = serde_json::from_str(r#"{
///     "discount": 60,
///     "products": [
///         {"productId": "p1", "price": 100, "quantity": 5},
///         {"productId": "p2", "price": 50, "quantity": 2}
///     ]
/// }"#).unwrap();
/// let returned: Vec<ReturnedItem> = serde_json::from_str(r#"[
///     {"productId": "p1", "productName": "Mug", "quantity": 2,
///      "price": 100, "reason": "Customer returned"}
/// ]"#).unwrap();
///
/// let quote = refund_quote(&sale, &returned);
/// assert_eq!(quote.discount_ratio, 0.1);
/// assert_eq!(quote.refund_amount, 180.0);
/// ```
pub fn refund_quote(sale: &Sale, returned: &[ReturnedItem]) -> RefundQuote {
    let total_sale_value: f64 = sale.products.iter().map(|line| line.line_value()).sum();
    let discount_ratio = ratio(sale.discount.max(0.0), total_sale_value);

    let gross_returned: f64 = returned
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| item.price * item.quantity as f64)
        .sum();

    RefundQuote {
        total_sale_value,
        discount_ratio,
        gross_returned,
        refund_amount: gross_returned * (1.0 - discount_ratio),
    }
}

/// Refund owed for a set of returned items, unrounded.
///
/// Convenience wrapper over [`refund_quote`] for callers that only need the
/// number.
pub fn calculate_refund(sale: &Sale, returned: &[ReturnedItem]) -> f64 {
    refund_quote(sale, returned).refund_amount
}

// =============================================================================
// Return Request Builder
// =============================================================================

/// Builds the `POST /sales/{id}/return` body from per-product returned
/// quantities, validating the submission first.
///
/// ## Rules
/// - Quantities of 0 (or products absent from the map) are dropped, not
///   submitted
/// - Every requested product must appear on the sale
/// - No requested quantity may exceed the quantity sold on its line
/// - At least one line must remain after dropping zeros
///
/// The attached `refund_amount` is rounded to 2 decimal places, matching
/// what the receipt prints.
pub fn build_return_request(
    sale: &Sale,
    quantities: &HashMap<String, i64>,
) -> CoreResult<ReturnRequest> {
    let mut returned_items = Vec::new();

    for line in &sale.products {
        let requested = quantities.get(&line.product_id).copied().unwrap_or(0);
        if requested == 0 {
            continue;
        }

        match validate_return_quantity(line.units(), requested) {
            Ok(()) => {}
            Err(ValidationError::OutOfRange { .. }) => {
                return Err(CoreError::ReturnExceedsSold {
                    product_id: line.product_id.clone(),
                    sold: line.units(),
                    requested,
                });
            }
            Err(err) => return Err(err.into()),
        }

        returned_items.push(ReturnedItem {
            product_id: line.product_id.clone(),
            product_name: line.name.clone(),
            quantity: requested,
            price: line.price,
            reason: RETURN_REASON.to_string(),
        });
    }

    // Requested products that aren't on the sale at all.
    for (product_id, requested) in quantities {
        if *requested > 0 && !sale.products.iter().any(|l| &l.product_id == product_id) {
            return Err(CoreError::ProductNotInSale(product_id.clone()));
        }
    }

    if returned_items.is_empty() {
        return Err(CoreError::EmptyReturn);
    }

    let refund_amount = refund_quote(sale, &returned_items).rounded();

    Ok(ReturnRequest {
        sale_id: sale.id.clone(),
        returned_items,
        refund_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Two line items (100×5, 50×2), flat discount 60 → ratio 0.1.
    fn sample_sale() -> Sale {
        serde_json::from_value(json!({
            "_id": "sale-1",
            "discount": 60,
            "products": [
                {"productId": "p1", "name": "Mug", "price": 100, "quantity": 5},
                {"productId": "p2", "name": "Glass", "price": 50, "quantity": 2}
            ]
        }))
        .unwrap()
    }

    fn returned(product_id: &str, quantity: i64, price: f64) -> ReturnedItem {
        ReturnedItem {
            product_id: product_id.to_string(),
            product_name: String::new(),
            quantity,
            price,
            reason: RETURN_REASON.to_string(),
        }
    }

    #[test]
    fn test_refund_proportionality() {
        let sale = sample_sale();
        let quote = refund_quote(&sale, &[returned("p1", 2, 100.0)]);

        assert_eq!(quote.total_sale_value, 600.0);
        assert_eq!(quote.discount_ratio, 0.1);
        assert_eq!(quote.gross_returned, 200.0);
        assert_eq!(quote.refund_amount, 180.0);
        assert_eq!(quote.rounded(), 180.0);
    }

    #[test]
    fn test_full_return_yields_post_discount_value() {
        let sale = sample_sale();
        let items = vec![returned("p1", 5, 100.0), returned("p2", 2, 50.0)];

        let quote = refund_quote(&sale, &items);
        // 600 × (1 − 0.1) = the sale's post-discount value
        assert_eq!(quote.refund_amount, 540.0);
    }

    #[test]
    fn test_zero_quantity_lines_contribute_nothing() {
        let sale = sample_sale();
        let items = vec![returned("p1", 0, 100.0), returned("p2", 1, 50.0)];

        let quote = refund_quote(&sale, &items);
        assert_eq!(quote.gross_returned, 50.0);
        assert_eq!(quote.refund_amount, 45.0);
    }

    #[test]
    fn test_zero_value_sale_quotes_zero_without_dividing() {
        let sale: Sale = serde_json::from_value(json!({"discount": 10, "products": []})).unwrap();
        let quote = refund_quote(&sale, &[]);

        assert_eq!(quote.discount_ratio, 0.0);
        assert_eq!(quote.refund_amount, 0.0);
        assert!(quote.refund_amount.is_finite());
    }

    #[test]
    fn test_calculate_refund_matches_quote() {
        let sale = sample_sale();
        let items = vec![returned("p1", 2, 100.0)];
        assert_eq!(calculate_refund(&sale, &items), 180.0);
    }

    #[test]
    fn test_build_return_request_happy_path() {
        let sale = sample_sale();
        let quantities = HashMap::from([("p1".to_string(), 2)]);

        let request = build_return_request(&sale, &quantities).unwrap();

        assert_eq!(request.sale_id, "sale-1");
        assert_eq!(request.returned_items.len(), 1);
        assert_eq!(request.returned_items[0].product_name, "Mug");
        assert_eq!(request.returned_items[0].reason, RETURN_REASON);
        assert_eq!(request.refund_amount, 180.0);
    }

    #[test]
    fn test_build_return_request_drops_zero_quantities() {
        let sale = sample_sale();
        let quantities = HashMap::from([("p1".to_string(), 2), ("p2".to_string(), 0)]);

        let request = build_return_request(&sale, &quantities).unwrap();
        assert_eq!(request.returned_items.len(), 1);
        assert_eq!(request.returned_items[0].product_id, "p1");
    }

    #[test]
    fn test_build_return_request_rejects_empty_submission() {
        let sale = sample_sale();

        let err = build_return_request(&sale, &HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyReturn));

        let zeros = HashMap::from([("p1".to_string(), 0)]);
        let err = build_return_request(&sale, &zeros).unwrap_err();
        assert!(matches!(err, CoreError::EmptyReturn));
    }

    #[test]
    fn test_build_return_request_rejects_over_return() {
        let sale = sample_sale();
        let quantities = HashMap::from([("p1".to_string(), 6)]);

        let err = build_return_request(&sale, &quantities).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ReturnExceedsSold { sold: 5, requested: 6, .. }
        ));
    }

    #[test]
    fn test_build_return_request_rejects_negative_quantity() {
        let sale = sample_sale();
        let quantities = HashMap::from([("p1".to_string(), -1)]);

        let err = build_return_request(&sale, &quantities).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_build_return_request_rejects_unknown_product() {
        let sale = sample_sale();
        let quantities = HashMap::from([("nope".to_string(), 1)]);

        let err = build_return_request(&sale, &quantities).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotInSale(_)));
    }
}
