//! # Snapshot Store
//!
//! The concurrency-safe holder of the current [`DataSnapshot`], with
//! last-writer-wins refresh semantics and read-side recomputation.
//!
//! ## Why a ticket instead of cancellation?
//! The fetch layer may fire overlapping refreshes (page load racing a
//! date-picker change). Cancelling in-flight HTTP is not worth the
//! machinery; it is enough that a stale response can never overwrite a
//! newer one. Tickets are issued monotonically and a commit older than the
//! last committed one is dropped.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use noir_core::aggregate::{aggregate, monthly_trend, Summary, TrendPoint, Window};
use noir_core::commission::{commission_report, CommissionLine, CommissionPolicy};
use noir_core::refund::build_return_request;
use noir_core::{CoreError, ReturnRequest, Sale};

use crate::snapshot::DataSnapshot;

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by the snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A refresh resolved after a newer one already committed.
    #[error("stale refresh dropped: ticket {ticket} ≤ committed {committed}")]
    StaleRefresh { ticket: u64, committed: u64 },

    /// A sale id that is not in the current snapshot.
    #[error("sale not found: {0}")]
    SaleNotFound(String),

    /// Business rule violation from noir-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Refresh Ticket
// =============================================================================

/// Handle identifying one refresh cycle. Obtain via
/// [`SnapshotStore::begin_refresh`] *before* issuing the fetches, so a
/// ticket's age reflects when the refresh started, not when it resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

// =============================================================================
// Store
// =============================================================================

struct Inner {
    snapshot: DataSnapshot,
    committed: u64,
}

/// Concurrency-safe holder of the current data snapshot.
///
/// Reads take the lock briefly, clone nothing but what they return, and
/// recompute derived outputs through noir-core's pure reducers - so every
/// read reflects exactly one committed snapshot.
pub struct SnapshotStore {
    inner: RwLock<Inner>,
    next_ticket: AtomicU64,
}

impl SnapshotStore {
    /// Creates a store with an empty snapshot (all-zero dashboards).
    pub fn new() -> Self {
        SnapshotStore {
            inner: RwLock::new(Inner {
                snapshot: DataSnapshot::default(),
                committed: 0,
            }),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Issues a ticket for a refresh that is about to start fetching.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Commits a completed refresh, replacing the whole snapshot.
    ///
    /// Returns [`StoreError::StaleRefresh`] (and logs a warning) when a
    /// newer refresh committed first; the caller should discard the stale
    /// data and do nothing else.
    pub async fn commit(
        &self,
        ticket: RefreshTicket,
        snapshot: DataSnapshot,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if ticket.0 <= inner.committed {
            warn!(
                ticket = ticket.0,
                committed = inner.committed,
                "dropping stale snapshot refresh"
            );
            return Err(StoreError::StaleRefresh {
                ticket: ticket.0,
                committed: inner.committed,
            });
        }

        let (sales, purchases, purchase_returns, users) = snapshot.counts();
        debug!(
            ticket = ticket.0,
            sales, purchases, purchase_returns, users, "snapshot replaced"
        );

        inner.snapshot = snapshot;
        inner.committed = ticket.0;
        Ok(())
    }

    /// Dashboard summary for a window, computed from the current snapshot.
    pub async fn dashboard(&self, window: &Window) -> Summary {
        let inner = self.inner.read().await;
        aggregate(
            &inner.snapshot.sales,
            &inner.snapshot.purchases,
            &inner.snapshot.purchase_returns,
            window,
        )
    }

    /// Unbounded monthly profit trend from the current snapshot.
    pub async fn monthly_trend(&self) -> Vec<TrendPoint> {
        let inner = self.inner.read().await;
        monthly_trend(&inner.snapshot.sales)
    }

    /// Commission report from the current snapshot.
    pub async fn commission_report(
        &self,
        policy: &CommissionPolicy,
    ) -> BTreeMap<String, CommissionLine> {
        let inner = self.inner.read().await;
        commission_report(&inner.snapshot.sales, &inner.snapshot.users, policy)
    }

    /// Looks up a sale by id in the current snapshot (for the sales-return
    /// page's sale picker).
    pub async fn sale(&self, id: &str) -> Option<Sale> {
        let inner = self.inner.read().await;
        inner.snapshot.sales.iter().find(|s| s.id == id).cloned()
    }

    /// Builds a validated return submission against a sale in the current
    /// snapshot.
    pub async fn return_request(
        &self,
        sale_id: &str,
        quantities: &HashMap<String, i64>,
    ) -> Result<ReturnRequest, StoreError> {
        let sale = self
            .sale(sale_id)
            .await
            .ok_or_else(|| StoreError::SaleNotFound(sale_id.to_string()))?;
        Ok(build_return_request(&sale, quantities)?)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("noir_store=debug")
            .try_init();
    }

    fn snapshot_with_sale(grand: f64) -> DataSnapshot {
        DataSnapshot {
            sales: serde_json::from_value(json!([
                {"_id": "s1", "grandTotal": grand, "netProfit": grand / 10.0,
                 "cashier": "a@x.com",
                 "products": [{"productId": "p1", "name": "Mug",
                               "price": grand, "quantity": 1}],
                 "createdAt": "2024-05-10T12:00:00Z"}
            ]))
            .unwrap(),
            ..DataSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_empty_store_serves_zero_dashboard() {
        let store = SnapshotStore::new();
        let summary = store.dashboard(&Window::AllTime).await;
        assert_eq!(summary.total_sales, 0.0);
        assert!(summary.buckets.is_empty());
    }

    #[tokio::test]
    async fn test_commit_replaces_whole_snapshot() {
        init_tracing();
        let store = SnapshotStore::new();

        let t1 = store.begin_refresh();
        store.commit(t1, snapshot_with_sale(1000.0)).await.unwrap();
        assert_eq!(store.dashboard(&Window::AllTime).await.total_sales, 1000.0);

        let t2 = store.begin_refresh();
        store.commit(t2, snapshot_with_sale(500.0)).await.unwrap();

        // Full replacement: the old sale is gone, not merged.
        let summary = store.dashboard(&Window::AllTime).await;
        assert_eq!(summary.total_sales, 500.0);
    }

    #[tokio::test]
    async fn test_stale_refresh_is_dropped() {
        init_tracing();
        let store = SnapshotStore::new();

        let older = store.begin_refresh();
        let newer = store.begin_refresh();

        // The newer refresh resolves first.
        store.commit(newer, snapshot_with_sale(500.0)).await.unwrap();

        // The older one resolves late and must not overwrite it.
        let err = store.commit(older, snapshot_with_sale(9999.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleRefresh { .. }));

        assert_eq!(store.dashboard(&Window::AllTime).await.total_sales, 500.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_prior_state_untouched() {
        let store = SnapshotStore::new();

        let t1 = store.begin_refresh();
        store.commit(t1, snapshot_with_sale(1000.0)).await.unwrap();

        // A refresh whose fetches fail simply never commits.
        let _abandoned = store.begin_refresh();

        assert_eq!(store.dashboard(&Window::AllTime).await.total_sales, 1000.0);
    }

    #[tokio::test]
    async fn test_commission_report_from_snapshot() {
        let store = SnapshotStore::new();
        let mut snapshot = snapshot_with_sale(5000.0);
        snapshot.users = serde_json::from_value(json!([
            {"email": "a@x.com", "monthlySalary": 1000,
             "commissionEnabled": true, "commissionRate": 2.5}
        ]))
        .unwrap();

        let ticket = store.begin_refresh();
        store.commit(ticket, snapshot).await.unwrap();

        let report = store.commission_report(&CommissionPolicy::default()).await;
        assert_eq!(report["a@x.com"].commission, 125.0);
        assert_eq!(report["a@x.com"].total_payable, 1125.0);
    }

    #[tokio::test]
    async fn test_monthly_trend_from_snapshot() {
        let store = SnapshotStore::new();
        let ticket = store.begin_refresh();
        store.commit(ticket, snapshot_with_sale(1000.0)).await.unwrap();

        let trend = store.monthly_trend().await;
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].period, "2024-05");
        assert_eq!(trend[0].profit, 100.0);
    }

    #[tokio::test]
    async fn test_return_request_for_missing_sale() {
        let store = SnapshotStore::new();
        let err = store
            .return_request("nope", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SaleNotFound(_)));
    }

    #[tokio::test]
    async fn test_return_request_happy_path() {
        let store = SnapshotStore::new();
        let ticket = store.begin_refresh();
        store.commit(ticket, snapshot_with_sale(1000.0)).await.unwrap();

        let quantities = HashMap::from([("p1".to_string(), 1)]);
        let request = store.return_request("s1", &quantities).await.unwrap();

        assert_eq!(request.sale_id, "s1");
        assert_eq!(request.returned_items.len(), 1);
        assert_eq!(request.refund_amount, 1000.0);
    }
}
