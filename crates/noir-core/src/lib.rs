//! # noir-core: Pure Business Logic for the Noir POS Back Office
//!
//! This crate is the **heart** of the Noir POS back office. It contains the
//! financial aggregation and attribution logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Noir POS Back-Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin SPA (React)                            │   │
//! │  │    Dashboard ──► Commission Report ──► Sales Return ──► Reports │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ fetched JSON arrays                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    noir-store (Snapshot Layer)                  │   │
//! │  │    full-replacement snapshots, last-writer-wins refreshes       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ noir-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  records  │  │ aggregate │  │commission │  │  refund   │  │   │
//! │  │   │   Sale    │  │  Window   │  │  Policy   │  │  Quote    │  │   │
//! │  │   │ Purchase  │  │  Summary  │  │  Report   │  │  Request  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`records`] - Record shapes as the remote API serves them (Sale, Purchase, User, ...)
//! - [`money`] - Guarded float arithmetic and lenient amount deserialization
//! - [`aggregate`] - Period bucketing and refund-adjusted profit totals
//! - [`commission`] - Per-cashier commission attribution
//! - [`refund`] - Discount-proportional refund calculation for sales returns
//! - [`report`] - Date-range report summaries (sales, purchases, expenses)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every reducer is deterministic - same input = same output.
//!    Reference dates ("today") are passed in by the caller, never read from the clock
//!    inside a computation.
//! 2. **Snapshot Inputs**: Every function takes the full record arrays, never deltas.
//! 3. **Degrade, Never Throw**: Missing or malformed monetary fields read as zero;
//!    degenerate denominators produce zero, never NaN or infinity.
//! 4. **Explicit Errors**: Where errors exist at all (return submissions), they are
//!    typed enum variants, never strings or panics.
//!
//! ## Example Usage
//!
//! ```rust
//! use noir_core::aggregate::{aggregate, Window};
//!
//! // Empty data is not an error: all figures degrade to zero.
//! let summary = aggregate(&[], &[], &[], &Window::AllTime);
//! assert_eq!(summary.total_sales, 0.0);
//! assert_eq!(summary.average_profit_margin, 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod commission;
pub mod error;
pub mod money;
pub mod records;
pub mod refund;
pub mod report;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use noir_core::Sale` instead of
// `use noir_core::records::Sale`

pub use error::{CoreError, CoreResult, ValidationError};
pub use records::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default commission rate (percent) applied when a user record carries no
/// explicit `commissionRate`.
///
/// ## Why a constant?
/// Older user records predate the configurable rate field. The flat 2.5%
/// policy they were created under is preserved as the fallback; newer records
/// override it per user.
pub const DEFAULT_COMMISSION_RATE: f64 = 2.5;

/// Number of months shown in the dashboard's rolling bar chart.
pub const DASHBOARD_TREND_MONTHS: u32 = 6;

/// Number of days shown in the dashboard's rolling daily chart.
pub const DASHBOARD_TREND_DAYS: u32 = 7;
