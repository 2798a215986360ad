//! # Record Types
//!
//! The record shapes exactly as the remote REST API serves them.
//!
//! ## Ownership
//! Every record here is a **read-only input**: the remote API owns creation,
//! mutation, and persistence. This crate only re-aggregates fetched arrays.
//!
//! ## Field Naming
//! The API is a Mongo/Express backend with camelCase keys and a few legacy
//! spellings that still appear in older documents:
//!
//! | Current field        | Legacy fallback   | Rule                          |
//! |----------------------|-------------------|-------------------------------|
//! | `totalRefundAmount`  | `refundAmount`    | non-zero current wins         |
//! | `netProfit`          | `totalProfit`     | non-zero `netProfit` wins     |
//! | `createdAt`          | `date`            | `createdAt` wins when present |
//!
//! The fallback rules are kept bug-for-bug compatible with what the admin SPA
//! always did, so historical documents keep reporting the same figures.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::money::{lenient_amount, lenient_quantity, ratio};

// =============================================================================
// Timestamp Parsing
// =============================================================================
// Timestamps arrive as strings in a handful of shapes: full RFC 3339
// ("2024-05-01T10:30:00.000Z"), naive datetimes, or bare dates from form
// inputs. Everything is normalized to UTC; calendar bucket keys are always
// derived from UTC fields so a record buckets identically on every machine.

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Deserializes a timestamp leniently; an absent or unparseable value reads
/// as `None` rather than failing the whole array fetch.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(parse_timestamp(&s)),
        _ => Ok(None),
    }
}

/// Formats a UTC timestamp as a `YYYY-MM` calendar month key.
#[inline]
pub fn month_key_of(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

/// Formats a UTC timestamp as a `YYYY-MM-DD` calendar day key.
#[inline]
pub fn day_key_of(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

// =============================================================================
// Sale
// =============================================================================

/// A line item on a sale, frozen at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Product this line refers to.
    #[serde(default)]
    pub product_id: String,

    /// Product name at time of sale (frozen).
    #[serde(default)]
    pub name: String,

    /// Product code at time of sale (frozen).
    #[serde(default)]
    pub code: String,

    /// Unit price at time of sale (frozen).
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: f64,

    /// Quantity sold.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,

    /// Line total as recorded by the API (price × quantity at sale time).
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_price: f64,
}

impl SaleLine {
    /// Quantity with the legacy "missing means one unit" rule applied.
    ///
    /// Old sale documents omitted `quantity` for single-unit lines; the SPA
    /// always read those as 1 and the refund math depends on it.
    #[inline]
    pub fn units(&self) -> i64 {
        if self.quantity > 0 {
            self.quantity
        } else {
            1
        }
    }

    /// Line value from the frozen unit price (`price × units`).
    #[inline]
    pub fn line_value(&self) -> f64 {
        self.price * self.units() as f64
    }
}

/// A sale record as served by `GET /sales`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Mongo document id.
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub customer_phone: String,

    /// Cashier identifier - a free-text string (typically an email) used to
    /// attribute this sale to a user record.
    #[serde(default)]
    pub cashier: String,

    /// Line items.
    #[serde(default)]
    pub products: Vec<SaleLine>,

    /// Net price charged for the sale, before any later refunds.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub grand_total: f64,

    /// Flat discount applied to the whole sale.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub discount: f64,

    /// Amount the customer actually paid.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub paid: f64,

    /// Cumulative amount refunded against this sale so far.
    /// Invariant: `0 ≤ totalRefundAmount ≤ grandTotal`.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_refund_amount: f64,

    /// Legacy refund field; consulted when `totalRefundAmount` is zero/absent.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub refund_amount: f64,

    /// Profit attributed to this sale at time of sale, BEFORE any refund
    /// adjustment. See [`Sale::adjusted_profit`].
    #[serde(default, deserialize_with = "lenient_amount")]
    pub net_profit: f64,

    /// Legacy profit field; consulted when `netProfit` is zero/absent.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_profit: f64,

    #[serde(default)]
    pub payment_type: Option<String>,

    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Primary timestamp.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    /// Legacy timestamp; consulted when `createdAt` is absent.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl Sale {
    /// Effective timestamp: `createdAt` with `date` as the legacy fallback.
    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.date)
    }

    /// `YYYY-MM` calendar month key (UTC), if the record has a timestamp.
    pub fn month_key(&self) -> Option<String> {
        self.timestamp().map(month_key_of)
    }

    /// `YYYY-MM-DD` calendar day key (UTC), if the record has a timestamp.
    pub fn day_key(&self) -> Option<String> {
        self.timestamp().map(day_key_of)
    }

    /// Cumulative refund: `totalRefundAmount`, falling back to the legacy
    /// `refundAmount` field, clamped so negative garbage reads as zero.
    pub fn refund(&self) -> f64 {
        let refund = if self.total_refund_amount != 0.0 {
            self.total_refund_amount
        } else {
            self.refund_amount
        };
        refund.max(0.0)
    }

    /// Raw profit as recorded at sale time: `netProfit`, falling back to the
    /// legacy `totalProfit` when `netProfit` is zero or absent.
    pub fn raw_profit(&self) -> f64 {
        if self.net_profit != 0.0 {
            self.net_profit
        } else {
            self.total_profit
        }
    }

    /// The share of recorded profit attributable to the refunded portion of
    /// this sale.
    ///
    /// A sale's profit field is written once at sale time and does not shrink
    /// when a partial refund happens later. The refunded share is allocated
    /// proportionally:
    ///
    /// ```text
    /// refunded_share = grand_total > 0 ? (refund / grand_total) × raw_profit : 0
    /// ```
    pub fn refunded_profit_share(&self) -> f64 {
        ratio(self.refund(), self.grand_total) * self.raw_profit()
    }

    /// Profit net of the refund's proportional share.
    ///
    /// ## Example
    /// ```rust
    /// use noir_core::Sale;
    ///
    /// let sale: Sale = serde_json::from_str(
    ///     r#"{"grandTotal": 1000, "totalRefundAmount": 250, "netProfit": 300}"#,
    /// ).unwrap();
    /// assert_eq!(sale.adjusted_profit(), 225.0);
    /// assert_eq!(sale.adjusted_sales_value(), 750.0);
    /// ```
    pub fn adjusted_profit(&self) -> f64 {
        self.raw_profit() - self.refunded_profit_share()
    }

    /// Sales value net of refunds (`grandTotal − totalRefundAmount`).
    pub fn adjusted_sales_value(&self) -> f64 {
        self.grand_total - self.refund()
    }
}

/// Grand total for a sale being composed in the sales form:
/// line values summed, minus the flat discount, floored at zero.
pub fn sale_grand_total(lines: &[SaleLine], discount: f64) -> f64 {
    let subtotal: f64 = lines.iter().map(SaleLine::line_value).sum();
    (subtotal - discount.max(0.0)).max(0.0)
}

// =============================================================================
// Purchase
// =============================================================================

/// A line item on a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: f64,

    #[serde(default, deserialize_with = "lenient_quantity")]
    pub qty: i64,

    /// Per-line flat discount.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub discount: f64,

    /// Line total as recorded (`price × qty − discount`).
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: f64,
}

impl PurchaseLine {
    /// Recomputes the line total from its parts (`price × qty − discount`).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.price * self.qty as f64 - self.discount
    }
}

/// A purchase record as served by `GET /purchases`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub supplier: String,

    #[serde(default)]
    pub warehouse: String,

    #[serde(default)]
    pub items: Vec<PurchaseLine>,

    /// Tax in percent, applied to the discounted subtotal.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tax: f64,

    /// Flat discount on the whole purchase.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub discount: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub grand_total: f64,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Effective timestamp: `createdAt` with `date` as the legacy fallback.
    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.date)
    }

    /// `YYYY-MM` calendar month key (UTC), if the record has a timestamp.
    pub fn month_key(&self) -> Option<String> {
        self.timestamp().map(month_key_of)
    }

    /// `YYYY-MM-DD` calendar day key (UTC), if the record has a timestamp.
    pub fn day_key(&self) -> Option<String> {
        self.timestamp().map(day_key_of)
    }
}

/// Grand total for a purchase being composed in the purchases form:
/// `sub − discount + (sub − discount) × tax%`.
pub fn purchase_grand_total(items: &[PurchaseLine], discount: f64, tax_percent: f64) -> f64 {
    let sub: f64 = items.iter().map(PurchaseLine::line_total).sum();
    let discounted = sub - discount;
    discounted + discounted * tax_percent / 100.0
}

// =============================================================================
// Purchase Return
// =============================================================================

/// A purchase-return record as served by `GET /purchase-returns`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReturn {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub supplier: String,

    #[serde(default)]
    pub warehouse: String,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub items: Vec<PurchaseLine>,

    /// Refund-equivalent value of the returned goods.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: f64,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PurchaseReturn {
    /// `YYYY-MM-DD` calendar day key (UTC), if the record has a timestamp.
    pub fn day_key(&self) -> Option<String> {
        self.created_at.map(day_key_of)
    }
}

// =============================================================================
// User
// =============================================================================

/// Role of a back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// An employee record as served by `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_salary: f64,

    /// Whether this employee earns commission. Records created before the
    /// flag existed omit it; those employees were always paid commission, so
    /// absence means enabled.
    #[serde(default)]
    pub commission_enabled: Option<bool>,

    /// Commission rate in percent. Absent on older records; the caller's
    /// [`CommissionPolicy`](crate::commission::CommissionPolicy) supplies
    /// the default.
    #[serde(default)]
    pub commission_rate: Option<f64>,
}

impl User {
    /// Resolves the enablement flag with the legacy default (absent ⇒ enabled).
    #[inline]
    pub fn is_commission_enabled(&self) -> bool {
        self.commission_enabled.unwrap_or(true)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// An expense record as served by `GET /expenses`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub details: String,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Return Request (ephemeral, built client-side)
// =============================================================================

/// One returned line in a sales-return submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnedItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    pub reason: String,
}

/// The body posted to `POST /sales/{id}/return`. Built once via
/// [`build_return_request`](crate::refund::build_return_request), submitted,
/// and discarded - never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub sale_id: String,
    pub returned_items: Vec<ReturnedItem>,
    /// Refund owed, rounded to 2 decimal places for submission.
    pub refund_amount: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
