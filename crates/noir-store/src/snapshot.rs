//! # Data Snapshot
//!
//! One complete, internally consistent copy of every record array the back
//! office works from.

use serde::{Deserialize, Serialize};

use noir_core::{Purchase, PurchaseReturn, Sale, User};

/// A full replacement data set, as fetched in one refresh cycle.
///
/// ## Snapshot, Never Delta
/// Each refresh fetches the complete arrays and swaps them in atomically.
/// There is no merge step: the remote API is the single source of truth,
/// and re-aggregation always starts from a whole data set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub purchase_returns: Vec<PurchaseReturn>,
    pub users: Vec<User>,
}

impl DataSnapshot {
    /// Record counts, for refresh logging.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.sales.len(),
            self.purchases.len(),
            self.purchase_returns.len(),
            self.users.len(),
        )
    }
}
