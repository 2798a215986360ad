//! # Report Summaries
//!
//! Date-range filtered totals backing the Sales/Purchases report page and
//! the expenses screen. Same reducer discipline as the dashboard: full
//! arrays in, scalar summary out, empty input means zero totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::records::{Expense, Purchase, Sale};

// =============================================================================
// Filters
// =============================================================================

/// Inclusive calendar-day range (UTC). Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportRange {
    /// Whether a record timestamp falls inside the range. Records without a
    /// timestamp only pass a fully open range.
    pub fn contains(&self, ts: Option<DateTime<Utc>>) -> bool {
        match ts {
            Some(ts) => {
                let day = ts.date_naive();
                self.start.map(|s| day >= s).unwrap_or(true)
                    && self.end.map(|e| day <= e).unwrap_or(true)
            }
            None => self.start.is_none() && self.end.is_none(),
        }
    }
}

/// Filters for the sales report.
#[derive(Debug, Clone, Default)]
pub struct SalesReportFilter {
    pub range: ReportRange,
    /// Case-insensitive substring match on the customer name.
    pub customer: Option<String>,
    /// Exact payment type ("Cash", "Card", "Online").
    pub payment_type: Option<String>,
}

impl SalesReportFilter {
    fn matches(&self, sale: &Sale) -> bool {
        if !self.range.contains(sale.timestamp()) {
            return false;
        }
        if let Some(customer) = &self.customer {
            if !sale
                .customer_name
                .to_lowercase()
                .contains(&customer.to_lowercase())
            {
                return false;
            }
        }
        if let Some(payment_type) = &self.payment_type {
            if sale.payment_type.as_deref() != Some(payment_type.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Filters for the purchases report.
#[derive(Debug, Clone, Default)]
pub struct PurchasesReportFilter {
    pub range: ReportRange,
    /// Case-insensitive substring match on the supplier.
    pub supplier: Option<String>,
}

impl PurchasesReportFilter {
    fn matches(&self, purchase: &Purchase) -> bool {
        if !self.range.contains(purchase.timestamp()) {
            return false;
        }
        if let Some(supplier) = &self.supplier {
            if !purchase
                .supplier
                .to_lowercase()
                .contains(&supplier.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Totals row of the sales report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportSummary {
    pub transaction_count: usize,
    /// `Σ grandTotal` of matched sales.
    pub gross_sales: f64,
    pub total_discount: f64,
    pub total_refunded: f64,
    /// `gross_sales − total_refunded`.
    pub net_sales: f64,
}

/// Totals row of the purchases report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesReportSummary {
    pub purchase_count: usize,
    /// `Σ grandTotal` of matched purchases.
    pub gross_purchases: f64,
    pub total_discount: f64,
}

/// Summarizes sales matching the filter.
pub fn sales_report(sales: &[Sale], filter: &SalesReportFilter) -> SalesReportSummary {
    let mut summary = SalesReportSummary::default();

    for sale in sales.iter().filter(|s| filter.matches(s)) {
        summary.transaction_count += 1;
        summary.gross_sales += sale.grand_total;
        summary.total_discount += sale.discount;
        summary.total_refunded += sale.refund();
    }

    summary.net_sales = summary.gross_sales - summary.total_refunded;
    summary
}

/// Summarizes purchases matching the filter.
pub fn purchases_report(
    purchases: &[Purchase],
    filter: &PurchasesReportFilter,
) -> PurchasesReportSummary {
    let mut summary = PurchasesReportSummary::default();

    for purchase in purchases.iter().filter(|p| filter.matches(p)) {
        summary.purchase_count += 1;
        summary.gross_purchases += purchase.grand_total;
        summary.total_discount += purchase.discount;
    }

    summary
}

/// Total expenses inside a date range.
pub fn expense_total(expenses: &[Expense], range: &ReportRange) -> f64 {
    expenses
        .iter()
        .filter(|e| range.contains(e.created_at))
        .map(|e| e.amount)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
