//! # noir-store: Snapshot State Layer
//!
//! Owns the latest complete data set fetched from the remote API and serves
//! recomputed derived outputs from it.
//!
//! ## Refresh Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Refresh Protocol                            │
//! │                                                                         │
//! │  Fetch layer                          SnapshotStore                     │
//! │  ───────────                          ─────────────                     │
//! │                                                                         │
//! │  t1 = begin_refresh() ───────────────► ticket #1 issued                 │
//! │  t2 = begin_refresh() ───────────────► ticket #2 issued                 │
//! │                                                                         │
//! │  GET /sales … (slow, for #1)                                            │
//! │  GET /sales … (fast, for #2)                                            │
//! │                                                                         │
//! │  commit(t2, snapshot) ───────────────► replaces state (committed = 2)   │
//! │  commit(t1, snapshot) ───────────────► DROPPED, stale (1 ≤ 2) + warn    │
//! │                                                                         │
//! │  Readers always see one complete snapshot - never a mix of arrays      │
//! │  from different refreshes, never partially-applied state.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fetch that fails never reaches `commit`, so the previously computed
//! figures stay on screen while the UI surfaces the failure.

pub mod snapshot;
pub mod store;

pub use snapshot::DataSnapshot;
pub use store::{RefreshTicket, SnapshotStore, StoreError};
