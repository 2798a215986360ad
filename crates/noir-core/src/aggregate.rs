//! # Period Aggregation & Profit Engine
//!
//! Reduces the full sale / purchase / purchase-return arrays into the
//! dashboard's scalar cards and chart series.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dashboard Aggregation                               │
//! │                                                                         │
//! │  GET /sales ────────┐                                                   │
//! │  GET /purchases ────┼──► aggregate(…, Window) ──► Summary               │
//! │  GET /purchase- ────┘         │                    ├── total cards      │
//! │       returns                 │                    ├── avg margin       │
//! │                               │                    └── buckets[] ──► bar│
//! │                               │                                   chart │
//! │  GET /sales ──► monthly_trend() ──► TrendPoint[] ──► line chart         │
//! │                                                                         │
//! │  Summary ──► profit_composition() ──► Composition ──► pie chart         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Profit Adjustment
//! Every windowed figure uses refund-adjusted values ([`Sale::adjusted_profit`],
//! [`Sale::adjusted_sales_value`]) - EXCEPT [`monthly_trend`], which
//! deliberately reports raw recorded profit (see its docs).
//!
//! ## Bucketing
//! Records bucket by the **UTC calendar month/day** of their timestamp
//! (`createdAt`, falling back to `date`), never by elapsed-time math. A sale
//! at 23:59 UTC on the last day of a month belongs to that month. Keys are
//! zero-padded `YYYY-MM` / `YYYY-MM-DD`, so lexical order is chronological
//! order; buckets accumulate in a `BTreeMap` and come out ascending.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{ratio, round2};
use crate::records::{day_key_of, month_key_of, Purchase, PurchaseReturn, Sale};
use crate::validation::{validate_month_key, ValidationResult};
use crate::{DASHBOARD_TREND_DAYS, DASHBOARD_TREND_MONTHS};

// =============================================================================
// Window
// =============================================================================

/// The time window an aggregation covers.
///
/// Reference dates are part of the window value, not read from the clock
/// inside the reducer - aggregating the same data with the same window is
/// always idempotent. The convenience constructors capture `Utc::now()`
/// once, at the call edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// Every record, regardless of (even missing) timestamp.
    AllTime,
    /// Records whose UTC calendar day equals the given day.
    Day(NaiveDate),
    /// Records whose UTC calendar month equals the given `YYYY-MM` key.
    Month(String),
    /// One bucket per calendar month, from `count - 1` months before
    /// `today`'s month up to the latest record. Older records are excluded.
    LastMonths { count: u32, today: NaiveDate },
    /// One bucket per calendar day, from `count - 1` days before `today`
    /// up to the latest record. Older records are excluded.
    LastDays { count: u32, today: NaiveDate },
}

impl Window {
    /// "Today" window for the current UTC day.
    pub fn today() -> Self {
        Window::Day(Utc::now().date_naive())
    }

    /// Validated selected-month window.
    ///
    /// ## Example
    /// ```rust
    /// use noir_core::aggregate::Window;
    ///
    /// assert!(Window::month("2024-05").is_ok());
    /// assert!(Window::month("2024-13").is_err());
    /// ```
    pub fn month(key: &str) -> ValidationResult<Self> {
        validate_month_key(key)?;
        Ok(Window::Month(key.trim().to_string()))
    }

    /// Rolling window for the dashboard's 6-month bar chart.
    pub fn last_six_months() -> Self {
        Window::LastMonths {
            count: DASHBOARD_TREND_MONTHS,
            today: Utc::now().date_naive(),
        }
    }

    /// Rolling window for the dashboard's 7-day chart.
    pub fn last_seven_days() -> Self {
        Window::LastDays {
            count: DASHBOARD_TREND_DAYS,
            today: Utc::now().date_naive(),
        }
    }

    /// Whether a record with this timestamp falls inside the window.
    /// Records without a parseable timestamp only count toward `AllTime`.
    fn contains(&self, ts: Option<DateTime<Utc>>) -> bool {
        match self {
            Window::AllTime => true,
            Window::Day(day) => ts.map(|t| t.date_naive() == *day).unwrap_or(false),
            Window::Month(key) => ts.map(|t| month_key_of(t) == *key).unwrap_or(false),
            Window::LastMonths { count, today } => ts
                .map(|t| month_key_of(t) >= month_cutoff_key(*today, *count))
                .unwrap_or(false),
            Window::LastDays { count, today } => ts
                .map(|t| t.date_naive() >= day_cutoff(*today, *count))
                .unwrap_or(false),
        }
    }

    /// Bucket key for a record inside a rolling window; scalar windows
    /// produce no buckets.
    fn bucket_key(&self, ts: Option<DateTime<Utc>>) -> Option<String> {
        match self {
            Window::LastMonths { .. } => ts.map(month_key_of),
            Window::LastDays { .. } => ts.map(day_key_of),
            _ => None,
        }
    }
}

/// First month key inside a `LastMonths` window: `count - 1` calendar months
/// before `today`'s month.
fn month_cutoff_key(today: NaiveDate, count: u32) -> String {
    let back = count.saturating_sub(1) as i32;
    let months = today.year() * 12 + today.month0() as i32 - back;
    format!("{:04}-{:02}", months.div_euclid(12), months.rem_euclid(12) + 1)
}

/// First day inside a `LastDays` window: `count - 1` days before `today`.
fn day_cutoff(today: NaiveDate, count: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(count.saturating_sub(1) as u64))
        .unwrap_or(today)
}

// =============================================================================
// Outputs
// =============================================================================

/// One chart bucket, keyed by calendar month (`YYYY-MM`) or day
/// (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub period: String,
    /// Refund-adjusted sales value.
    pub sales: f64,
    /// Gross purchases (no return netting inside buckets).
    pub purchases: f64,
    /// Refund-adjusted profit.
    pub profit: f64,
}

/// Aggregated figures for one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Refund-adjusted sales value (`Σ grandTotal − totalRefundAmount`).
    pub total_sales: f64,
    /// Refund-adjusted profit.
    pub total_profit: f64,
    /// Purchases total. Net of purchase returns for `AllTime` only; the
    /// day/month/rolling views report gross purchases.
    pub total_purchases: f64,
    /// Refunds issued against sales in the window.
    pub total_refund: f64,
    /// Purchase-return value in the window.
    pub total_purchase_returns: f64,
    /// `total_profit / total_sales × 100`, 0 when there are no sales.
    pub average_profit_margin: f64,
    /// Chart buckets, ascending by period. Empty for scalar windows.
    pub buckets: Vec<Bucket>,
}

/// One point of the unbounded monthly profit trend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub profit: f64,
}

/// Profit-vs-costs split for the pie chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub gross_profit: f64,
    pub costs: f64,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregates full record arrays into a [`Summary`] for one window.
///
/// Pure: same inputs and window always produce the same summary. Empty
/// arrays produce an all-zero summary with no buckets - never an error.
///
/// ## Example
/// ```rust
/// use noir_core::aggregate::{aggregate, Window};
/// use noir_core::Sale;
///
/// let sales: Vec<Sale> = serde_json::from_str(r#"[
///     {"grandTotal": 1000, "totalRefundAmount": 250, "netProfit": 300,
///      "createdAt": "2024-05-10T12:00:00Z"}
/// ]"#).unwrap();
///
/// let summary = aggregate(&sales, &[], &[], &Window::AllTime);
/// assert_eq!(summary.total_sales, 750.0);
/// assert_eq!(summary.total_profit, 225.0);
/// assert_eq!(summary.average_profit_margin, 30.0);
/// ```
pub fn aggregate(
    sales: &[Sale],
    purchases: &[Purchase],
    purchase_returns: &[PurchaseReturn],
    window: &Window,
) -> Summary {
    let mut summary = Summary::default();
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

    for sale in sales {
        let ts = sale.timestamp();
        if !window.contains(ts) {
            continue;
        }

        summary.total_sales += sale.adjusted_sales_value();
        summary.total_profit += sale.adjusted_profit();
        summary.total_refund += sale.refund();

        if let Some(period) = window.bucket_key(ts) {
            let bucket = buckets.entry(period.clone()).or_insert_with(|| Bucket {
                period,
                ..Bucket::default()
            });
            bucket.sales += sale.adjusted_sales_value();
            bucket.profit += sale.adjusted_profit();
        }
    }

    for purchase in purchases {
        let ts = purchase.timestamp();
        if !window.contains(ts) {
            continue;
        }

        summary.total_purchases += purchase.grand_total;

        if let Some(period) = window.bucket_key(ts) {
            let bucket = buckets.entry(period.clone()).or_insert_with(|| Bucket {
                period,
                ..Bucket::default()
            });
            bucket.purchases += purchase.grand_total;
        }
    }

    for ret in purchase_returns {
        if !window.contains(ret.created_at) {
            continue;
        }
        summary.total_purchase_returns += ret.total;
    }

    // The all-time purchases card nets out returned goods; the day/month
    // views show gross purchases next to a separate returns card.
    if matches!(window, Window::AllTime) {
        summary.total_purchases -= summary.total_purchase_returns;
    }

    summary.average_profit_margin = ratio(summary.total_profit, summary.total_sales) * 100.0;
    summary.buckets = buckets.into_values().collect();
    summary
}

/// Monthly profit trend across every month present in the data, ascending.
///
/// Deliberately sums **raw** recorded profit, not refund-adjusted profit:
/// this series has always mirrored the figures written at sale time, and
/// changing it would silently move historical points users compare against.
/// Every other view adjusts for refunds.
pub fn monthly_trend(sales: &[Sale]) -> Vec<TrendPoint> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();

    for sale in sales {
        if let Some(key) = sale.month_key() {
            *months.entry(key).or_insert(0.0) += sale.raw_profit();
        }
    }

    months
        .into_iter()
        .map(|(period, profit)| TrendPoint { period, profit })
        .collect()
}

/// Splits a window's figures into gross profit vs. costs for the pie chart.
///
/// `costs = total_purchases − total_profit`; can go negative when profit
/// exceeds purchases in the window, which the chart renders as zero-width.
pub fn profit_composition(summary: &Summary) -> Composition {
    Composition {
        gross_profit: round2(summary.total_profit),
        costs: round2(summary.total_purchases - summary.total_profit),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale(created: &str, grand: f64, refund: f64, profit: f64) -> Sale {
        serde_json::from_value(json!({
            "grandTotal": grand,
            "totalRefundAmount": refund,
            "netProfit": profit,
            "createdAt": created,
        }))
        .unwrap()
    }

    fn purchase(created: &str, grand: f64) -> Purchase {
        serde_json::from_value(json!({
            "grandTotal": grand,
            "createdAt": created,
        }))
        .unwrap()
    }

    fn purchase_return(created: &str, total: f64) -> PurchaseReturn {
        serde_json::from_value(json!({
            "total": total,
            "createdAt": created,
        }))
        .unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_all_time_adjusts_profit_and_nets_purchase_returns() {
        let sales = vec![
            sale("2024-05-10T12:00:00Z", 1000.0, 250.0, 300.0),
            sale("2024-06-01T09:00:00Z", 500.0, 0.0, 100.0),
        ];
        let purchases = vec![purchase("2024-05-02T08:00:00Z", 2000.0)];
        let returns = vec![purchase_return("2024-05-20T08:00:00Z", 300.0)];

        let summary = aggregate(&sales, &purchases, &returns, &Window::AllTime);

        assert_eq!(summary.total_sales, 1250.0); // 750 + 500
        assert_eq!(summary.total_profit, 325.0); // 225 + 100
        assert_eq!(summary.total_purchases, 1700.0); // 2000 - 300
        assert_eq!(summary.total_refund, 250.0);
        assert_eq!(summary.total_purchase_returns, 300.0);
        assert_eq!(summary.average_profit_margin, 26.0);
        assert!(summary.buckets.is_empty());
    }

    #[test]
    fn test_empty_inputs_produce_zero_summary() {
        let summary = aggregate(&[], &[], &[], &Window::AllTime);
        assert_eq!(summary, Summary::default());
        assert!(summary.average_profit_margin.is_finite());
    }

    #[test]
    fn test_all_zero_sales_margin_is_zero_not_nan() {
        let sales = vec![sale("2024-05-10T12:00:00Z", 0.0, 0.0, 0.0)];
        let summary = aggregate(&sales, &[], &[], &Window::AllTime);
        assert_eq!(summary.average_profit_margin, 0.0);
    }

    #[test]
    fn test_day_window_filters_by_utc_day() {
        let sales = vec![
            sale("2024-05-10T23:59:00Z", 100.0, 0.0, 20.0),
            sale("2024-05-11T00:01:00Z", 900.0, 0.0, 90.0),
        ];
        let summary = aggregate(&sales, &[], &[], &Window::Day(day("2024-05-10")));
        assert_eq!(summary.total_sales, 100.0);
        assert_eq!(summary.total_profit, 20.0);
    }

    #[test]
    fn test_month_window_keeps_gross_purchases() {
        let purchases = vec![purchase("2024-05-02T08:00:00Z", 2000.0)];
        let returns = vec![purchase_return("2024-05-20T08:00:00Z", 300.0)];

        let summary = aggregate(&[], &purchases, &returns, &Window::Month("2024-05".into()));

        // Selected-month purchases are reported gross; returns show separately.
        assert_eq!(summary.total_purchases, 2000.0);
        assert_eq!(summary.total_purchase_returns, 300.0);
    }

    #[test]
    fn test_month_boundary_sale_buckets_by_calendar_month() {
        let sales = vec![sale("2024-05-31T23:59:59Z", 100.0, 0.0, 10.0)];
        let may = aggregate(&sales, &[], &[], &Window::Month("2024-05".into()));
        let june = aggregate(&sales, &[], &[], &Window::Month("2024-06".into()));
        assert_eq!(may.total_sales, 100.0);
        assert_eq!(june.total_sales, 0.0);
    }

    #[test]
    fn test_last_months_window_buckets_ascending() {
        let window = Window::LastMonths {
            count: 6,
            today: day("2024-06-15"),
        };
        let sales = vec![
            sale("2024-06-01T10:00:00Z", 600.0, 0.0, 60.0),
            sale("2024-01-20T10:00:00Z", 100.0, 0.0, 10.0),
            sale("2024-03-05T10:00:00Z", 300.0, 0.0, 30.0),
            // Before the cutoff (2024-01): excluded entirely.
            sale("2023-12-31T23:59:00Z", 999.0, 0.0, 99.0),
        ];
        let purchases = vec![purchase("2024-03-10T10:00:00Z", 150.0)];

        let summary = aggregate(&sales, &purchases, &[], &window);

        let periods: Vec<&str> = summary.buckets.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-03", "2024-06"]);
        assert_eq!(summary.total_sales, 1000.0);
        assert_eq!(summary.buckets[1].sales, 300.0);
        assert_eq!(summary.buckets[1].purchases, 150.0);
    }

    #[test]
    fn test_last_months_cutoff_crosses_year_boundary() {
        let window = Window::LastMonths {
            count: 6,
            today: day("2024-02-10"),
        };
        // 6 buckets back from Feb 2024 reaches Sep 2023.
        let inside = sale("2023-09-01T00:00:00Z", 100.0, 0.0, 0.0);
        let outside = sale("2023-08-31T23:59:00Z", 100.0, 0.0, 0.0);

        let summary = aggregate(&[inside, outside], &[], &[], &window);
        assert_eq!(summary.total_sales, 100.0);
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.buckets[0].period, "2023-09");
    }

    #[test]
    fn test_last_days_window_uses_day_buckets() {
        let window = Window::LastDays {
            count: 7,
            today: day("2024-05-10"),
        };
        let sales = vec![
            sale("2024-05-04T00:00:00Z", 40.0, 0.0, 4.0),
            sale("2024-05-10T10:00:00Z", 100.0, 0.0, 10.0),
            sale("2024-05-03T23:59:00Z", 999.0, 0.0, 99.0), // excluded
        ];

        let summary = aggregate(&sales, &[], &[], &window);
        let periods: Vec<&str> = summary.buckets.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-05-04", "2024-05-10"]);
        assert_eq!(summary.total_sales, 140.0);
    }

    #[test]
    fn test_bucketing_is_idempotent() {
        let sales = vec![
            sale("2024-06-01T10:00:00Z", 600.0, 50.0, 60.0),
            sale("2024-03-05T10:00:00Z", 300.0, 0.0, 30.0),
        ];
        let window = Window::LastMonths {
            count: 6,
            today: day("2024-06-15"),
        };

        let first = aggregate(&sales, &[], &[], &window);
        let second = aggregate(&sales, &[], &[], &window);
        assert_eq!(first, second);
    }

    #[test]
    fn test_records_without_timestamps_only_count_all_time() {
        let undated: Sale = serde_json::from_value(json!({"grandTotal": 100, "netProfit": 10}))
            .unwrap();
        let sales = vec![undated];

        let all_time = aggregate(&sales, &[], &[], &Window::AllTime);
        assert_eq!(all_time.total_sales, 100.0);

        let today = aggregate(&sales, &[], &[], &Window::Day(day("2024-05-10")));
        assert_eq!(today.total_sales, 0.0);
    }

    #[test]
    fn test_monthly_trend_uses_raw_profit() {
        // Refund of 50% would halve the adjusted profit; the trend must not.
        let sales = vec![
            sale("2024-05-10T12:00:00Z", 1000.0, 500.0, 300.0),
            sale("2024-04-01T12:00:00Z", 200.0, 0.0, 40.0),
        ];

        let trend = monthly_trend(&sales);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].period, "2024-04");
        assert_eq!(trend[0].profit, 40.0);
        assert_eq!(trend[1].period, "2024-05");
        assert_eq!(trend[1].profit, 300.0);
    }

    #[test]
    fn test_profit_composition() {
        let summary = Summary {
            total_profit: 225.0,
            total_purchases: 2000.0,
            ..Summary::default()
        };
        let pie = profit_composition(&summary);
        assert_eq!(pie.gross_profit, 225.0);
        assert_eq!(pie.costs, 1775.0);
    }

    #[test]
    fn test_window_month_constructor_validates() {
        assert!(Window::month("2024-05").is_ok());
        assert!(Window::month("2024-13").is_err());
    }

    #[test]
    fn test_month_cutoff_key() {
        assert_eq!(month_cutoff_key(day("2024-06-15"), 6), "2024-01");
        assert_eq!(month_cutoff_key(day("2024-02-10"), 6), "2023-09");
        assert_eq!(month_cutoff_key(day("2024-06-15"), 1), "2024-06");
    }
}
