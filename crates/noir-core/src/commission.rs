//! # Commission Attribution Engine
//!
//! Computes per-cashier commission payouts from the full sale and user
//! arrays.
//!
//! ## Attribution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Employee Commission Report                                │
//! │                                                                         │
//! │  sales[] ──► group by sale.cashier ──► Σ grandTotal per identifier      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  users[] ──► exact email match (case-sensitive)                         │
//! │                        │                                                │
//! │          no match ─────┼──► excluded silently (sale not attributed)    │
//! │          disabled ─────┼──► excluded silently                           │
//! │                        ▼                                                │
//! │  commission   = totalSales × rate / 100                                 │
//! │  totalPayable = monthlySalary + commission                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales totals here are **raw** `grandTotal`, not refund-adjusted: the
//! cashier earned the commission when the sale was rung up, and a later
//! return does not claw it back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{percent_of, round2};
use crate::records::{Sale, User};
use crate::validation::{validate_commission_rate, ValidationResult};
use crate::DEFAULT_COMMISSION_RATE;

// =============================================================================
// Policy
// =============================================================================

/// Commission policy knobs.
///
/// The per-user `commissionRate` always wins; the policy supplies the rate
/// for older user records that predate the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPolicy {
    /// Rate in percent applied when a user has no explicit rate.
    pub default_rate: f64,
}

impl CommissionPolicy {
    /// Creates a policy with a validated default rate (0-100).
    pub fn new(default_rate: f64) -> ValidationResult<Self> {
        validate_commission_rate(default_rate)?;
        Ok(CommissionPolicy { default_rate })
    }

    /// Resolves the effective rate for one user.
    fn rate_for(&self, user: &User) -> f64 {
        user.commission_rate.unwrap_or(self.default_rate)
    }
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        CommissionPolicy {
            default_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// One row of the commission report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommissionLine {
    pub email: String,
    /// Raw attributed sales (`Σ grandTotal`, no refund adjustment).
    pub total_sales: f64,
    pub base_salary: f64,
    /// Commission payout, rounded to 2 decimal places.
    pub commission: f64,
    /// `base_salary + commission`, rounded to 2 decimal places.
    pub total_payable: f64,
}

/// Computes the commission report: one line per cashier identifier that both
/// appears on at least one sale and matches a commission-enabled user.
///
/// The result is keyed and iterated by cashier email in ascending order, so
/// report rows render deterministically.
///
/// ## Example
/// ```rust
/// use noir_core::commission::{commission_report, CommissionPolicy};
/// use noir_core::{Sale, User};
///
/// let sales: Vec<Sale> = serde_json::from_str(r#"[
///     {"cashier": "a@x.com", "grandTotal": 2000},
///     {"cashier": "a@x.com", "grandTotal": 3000}
/// ]"#).unwrap();
/// let users: Vec<User> = serde_json::from_str(r#"[
///     {"email": "a@x.com", "monthlySalary": 1000,
///      "commissionEnabled": true, "commissionRate": 2.5}
/// ]"#).unwrap();
///
/// let report = commission_report(&sales, &users, &CommissionPolicy::default());
/// let line = &report["a@x.com"];
/// assert_eq!(line.commission, 125.0);
/// assert_eq!(line.total_payable, 1125.0);
/// ```
pub fn commission_report(
    sales: &[Sale],
    users: &[User],
    policy: &CommissionPolicy,
) -> BTreeMap<String, CommissionLine> {
    // Pass 1: attribute raw sales value to each cashier identifier.
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for sale in sales {
        *totals.entry(sale.cashier.as_str()).or_insert(0.0) += sale.grand_total;
    }

    // Pass 2: match identifiers to users and compute payouts.
    let mut report = BTreeMap::new();
    for (cashier, total) in totals {
        let Some(user) = users.iter().find(|u| u.email == cashier) else {
            // Ghost identifier: the sale's value is simply not attributed.
            continue;
        };
        if !user.is_commission_enabled() {
            continue;
        }

        let commission = percent_of(total, policy.rate_for(user));
        report.insert(
            user.email.clone(),
            CommissionLine {
                email: user.email.clone(),
                total_sales: total,
                base_salary: user.monthly_salary,
                commission: round2(commission),
                total_payable: round2(user.monthly_salary + commission),
            },
        );
    }

    report
}

// =============================================================================
// Unit Tests
// =============================================================================
