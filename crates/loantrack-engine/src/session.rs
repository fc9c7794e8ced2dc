//! # Dashboard Session
//!
//! The products and open loans one dashboard session is looking at.
//!
//! ## Refresh Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan / return ──► LoanEngine ──► outcome                              │
//! │                                      │                                  │
//! │                       touched a product?                                │
//! │                                      │ yes                              │
//! │                                      ▼                                  │
//! │                    list_products + list_open_loans(sort)               │
//! │                          │                     │                        │
//! │                        Ok ▼                 Err ▼                        │
//! │                  swap snapshot         log, keep previous               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each session re-queries after its own transitions. Sessions do not
//! notify each other; a stale snapshot shows up as a `Conflict` or
//! `NoActiveLoan` outcome on the next scan, which triggers a refresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use loantrack_core::{sort_open_loans, OpenLoan, Product, ScanOutcome, SortOrder};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::engine::LoanEngine;
use crate::error::EngineResult;
use crate::store::LoanStore;

/// Last fetched dashboard state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub products: Vec<Product>,
    pub open_loans: Vec<OpenLoan>,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
    pub sort: SortOrder,
}

impl DashboardSnapshot {
    /// Number of registered products.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

/// One dashboard's view over a shared engine.
pub struct DashboardSession<S> {
    engine: Arc<LoanEngine<S>>,
    snapshot: RwLock<DashboardSnapshot>,
    /// Held from fetch to swap so overlapping refreshes apply in order.
    refresh_lock: Mutex<()>,
}

impl<S: LoanStore> DashboardSession<S> {
    /// Creates a session with an empty snapshot. Call [`refresh`](Self::refresh)
    /// to load it.
    pub fn new(engine: Arc<LoanEngine<S>>) -> Self {
        DashboardSession {
            engine,
            snapshot: RwLock::new(DashboardSnapshot::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &LoanEngine<S> {
        &self.engine
    }

    /// Copy of the current snapshot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn sort(&self) -> SortOrder {
        self.snapshot.read().await.sort
    }

    /// Re-queries products and open loans.
    ///
    /// On failure the error is logged and returned, and the previous
    /// snapshot stays in place. Refreshes run one at a time, so a slow
    /// fetch can never overwrite the result of a later one.
    pub async fn refresh(&self) -> EngineResult<()> {
        let _serial = self.refresh_lock.lock().await;
        let sort = self.sort().await;

        let fetched = async {
            let products = self.engine.list_products().await?;
            let open_loans = self.engine.list_open_loans(sort).await?;
            Ok::<_, crate::StoreError>((products, open_loans))
        }
        .await;

        let (products, open_loans) = match fetched {
            Ok(lists) => lists,
            Err(e) => {
                error!(error = %e, "Dashboard refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        let mut snapshot = self.snapshot.write().await;
        let current = snapshot.sort;
        snapshot.products = products;
        snapshot.open_loans = open_loans;
        // Sort may have been toggled while the queries ran
        sort_open_loans(&mut snapshot.open_loans, current);
        snapshot.refreshed_at = Some(Utc::now());

        debug!(
            products = snapshot.products.len(),
            open_loans = snapshot.open_loans.len(),
            "Dashboard refreshed"
        );
        Ok(())
    }

    /// Processes a scan, then refreshes if a product was involved.
    pub async fn scan(&self, raw: &str, user_id: &str) -> EngineResult<ScanOutcome> {
        let outcome = self.engine.process_scan(raw, user_id).await?;
        self.refresh_after(&outcome).await;
        Ok(outcome)
    }

    /// Per-row return action, then refresh.
    pub async fn return_loan(&self, loan_id: &str) -> EngineResult<ScanOutcome> {
        let outcome = self.engine.return_loan(loan_id).await?;
        self.refresh_after(&outcome).await;
        Ok(outcome)
    }

    /// Changes the open-loan order and re-sorts the snapshot in memory.
    pub async fn set_sort(&self, order: SortOrder) {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.sort != order {
            snapshot.sort = order;
            sort_open_loans(&mut snapshot.open_loans, order);
        }
    }

    async fn refresh_after(&self, outcome: &ScanOutcome) {
        let touched_product = !matches!(
            outcome,
            ScanOutcome::NoCode | ScanOutcome::NoMatch { .. } | ScanOutcome::UserScanned { .. }
        );

        if touched_product {
            // Failure is already logged; the transition itself succeeded
            let _ = self.refresh().await;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
