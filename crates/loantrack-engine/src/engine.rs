//! # Loan Engine
//!
//! Interprets scans and drives the checkout/return transitions.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw input                                                              │
//! │     │ trim                                                              │
//! │     ▼                                                                   │
//! │  empty? ──yes──► NoCode              (no store call)                   │
//! │     │ no                                                                │
//! │     ▼                                                                   │
//! │  find_product_by_barcode                                               │
//! │     │                                                                   │
//! │     ├── None, starts with U/u ──► UserScanned                          │
//! │     ├── None ───────────────────► NoMatch                              │
//! │     ▼                                                                   │
//! │  Some(product)                                                          │
//! │     ├── available ──► checkout ──► CheckedOut | Conflict               │
//! │     │                              | OpenLoanExists                     │
//! │     └── on loan ────► return ────► Returned   | NoActiveLoan           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The direction of a product scan comes from the product's availability,
//! never from an explicit mode. The store's compare-and-swap keeps two
//! sessions from both checking out the same item.

use chrono::Utc;
use loantrack_core::scan::classify_unmatched;
use loantrack_core::validation::validate_user_id;
use loantrack_core::{
    CheckoutResult, OpenLoan, Product, ReturnResult, ScanCode, ScanIntent,
    ScanOutcome, ScanResolution, SortOrder, Unmatched, DEFAULT_BORROWER_ID,
};
use tracing::{debug, error, info, warn};

use crate::error::{EngineResult, StoreError};
use crate::store::LoanStore;

/// Scan interpreter over a [`LoanStore`].
#[derive(Debug, Clone)]
pub struct LoanEngine<S> {
    store: S,
}

impl<S: LoanStore> LoanEngine<S> {
    pub fn new(store: S) -> Self {
        LoanEngine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classifies raw scanner input.
    ///
    /// Blank input resolves to `Unmatched(NoCode)` without touching the
    /// store. Otherwise the trimmed code is looked up as an exact barcode.
    pub async fn resolve_scan(&self, raw: &str) -> EngineResult<ScanResolution> {
        let Some(code) = ScanCode::parse(raw) else {
            return Ok(ScanResolution::Unmatched(Unmatched::NoCode));
        };

        let found = self
            .store
            .find_product_by_barcode(code.as_str())
            .await
            .inspect_err(|e| error!(code = %code, error = %e, "Barcode lookup failed"))?;

        Ok(match found {
            Some(product) => ScanResolution::Product(product),
            None => classify_unmatched(&code),
        })
    }

    /// Processes one scan on behalf of `user_id`.
    ///
    /// Available products are checked out, unavailable ones returned.
    /// Every non-error result is an informational [`ScanOutcome`].
    pub async fn process_scan(&self, raw: &str, user_id: &str) -> EngineResult<ScanOutcome> {
        let outcome = match self.resolve_scan(raw).await? {
            ScanResolution::Unmatched(unmatched) => ScanOutcome::from(unmatched),
            ScanResolution::UserToken(code) => {
                debug!(code = %code, "User badge scanned");
                ScanOutcome::UserScanned { code }
            }
            ScanResolution::Product(product) => match ScanIntent::for_product(&product) {
                ScanIntent::Checkout => self.checkout(product, user_id).await?,
                ScanIntent::Return => self.return_product(product).await?,
            },
        };

        debug!(outcome = %outcome, "Scan processed");
        Ok(outcome)
    }

    /// Closes a specific open loan (the per-row return action).
    ///
    /// Unknown or already-closed loans yield `NoActiveLoan`.
    pub async fn return_loan(&self, loan_id: &str) -> EngineResult<ScanOutcome> {
        let result = self
            .store
            .return_loan(loan_id, Utc::now())
            .await
            .inspect_err(|e| error!(loan_id = %loan_id, error = %e, "Return failed"))?;

        match result {
            ReturnResult::Closed(loan) => {
                let product_name = match self.store.find_product(&loan.product_id).await {
                    Ok(Some(product)) => product.name,
                    Ok(None) => loan.product_id.clone(),
                    Err(e) => {
                        // The loan is already closed, only the label is missing
                        warn!(product_id = %loan.product_id, error = %e, "Product lookup failed after return");
                        loan.product_id.clone()
                    }
                };

                info!(loan_id = %loan.id, product = %product_name, "Loan returned");
                Ok(ScanOutcome::Returned {
                    product_id: loan.product_id,
                    product_name,
                    loan_id: loan.id,
                })
            }
            ReturnResult::NoOpenLoan => {
                debug!(loan_id = %loan_id, "No open loan with this id");
                Ok(ScanOutcome::NoActiveLoan {
                    product_id: None,
                    product_name: None,
                })
            }
        }
    }

    /// Open loans, sorted by loan date.
    pub async fn list_open_loans(&self, order: SortOrder) -> EngineResult<Vec<OpenLoan>> {
        self.store
            .list_open_loans(order)
            .await
            .inspect_err(|e| error!(error = %e, "Listing open loans failed"))
    }

    /// All products, newest registration first.
    pub async fn list_products(&self) -> EngineResult<Vec<Product>> {
        self.store
            .list_products()
            .await
            .inspect_err(|e| error!(error = %e, "Listing products failed"))
    }

    async fn checkout(&self, product: Product, user_id: &str) -> EngineResult<ScanOutcome> {
        let user_id = if validate_user_id(user_id).is_ok() {
            user_id.trim()
        } else {
            warn!("No current user, lending to the default borrower");
            DEFAULT_BORROWER_ID
        };

        let result = self
            .store
            .checkout(&product.id, user_id, Utc::now())
            .await;

        match result {
            Ok(CheckoutResult::Opened(loan)) => {
                info!(
                    loan_id = %loan.id,
                    product = %product.name,
                    user_id = %user_id,
                    "Loan opened"
                );
                Ok(ScanOutcome::CheckedOut {
                    product_id: product.id,
                    product_name: product.name,
                    loan_id: loan.id,
                })
            }
            Ok(CheckoutResult::Unavailable) => {
                warn!(product_id = %product.id, "Product was checked out by another session");
                Ok(Self::conflict(product))
            }
            Err(StoreError::Conflict(reason)) => self.checkout_rejected(product, &reason).await,
            Err(e) => {
                error!(product_id = %product.id, error = %e, "Checkout failed");
                Err(e)
            }
        }
    }

    async fn return_product(&self, product: Product) -> EngineResult<ScanOutcome> {
        let result = self
            .store
            .return_for_product(&product.id, Utc::now())
            .await
            .inspect_err(|e| error!(product_id = %product.id, error = %e, "Return failed"))?;

        match result {
            ReturnResult::Closed(loan) => {
                info!(loan_id = %loan.id, product = %product.name, "Loan returned");
                Ok(ScanOutcome::Returned {
                    product_id: product.id,
                    product_name: product.name,
                    loan_id: loan.id,
                })
            }
            ReturnResult::NoOpenLoan => {
                warn!(
                    product_id = %product.id,
                    "Product marked on loan but has no open loan"
                );
                Ok(ScanOutcome::NoActiveLoan {
                    product_id: Some(product.id),
                    product_name: Some(product.name),
                })
            }
        }
    }

    /// Checkout was refused by the store (open-loan index). Re-reads the
    /// product to tell a lost race from a product that is stuck available
    /// while an open loan exists.
    async fn checkout_rejected(&self, product: Product, reason: &str) -> EngineResult<ScanOutcome> {
        match self.store.find_product(&product.id).await {
            Ok(Some(current)) if current.available => {
                error!(
                    product_id = %product.id,
                    reason = %reason,
                    "Product marked available but already has an open loan"
                );
                Ok(ScanOutcome::OpenLoanExists {
                    product_id: product.id,
                    product_name: product.name,
                })
            }
            Ok(_) => {
                warn!(product_id = %product.id, reason = %reason, "Checkout lost a race");
                Ok(Self::conflict(product))
            }
            Err(e) => {
                warn!(product_id = %product.id, error = %e, "Product re-read failed after rejected checkout");
                Ok(Self::conflict(product))
            }
        }
    }

    fn conflict(product: Product) -> ScanOutcome {
        ScanOutcome::Conflict {
            product_id: product.id,
            product_name: product.name,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::MockLoanStore;

    async fn engine_with_drill() -> (LoanEngine<MemoryStore>, Product) {
        let store = MemoryStore::new();
        let drill = store.add_product("Cordless Drill", "A1").await;
        (LoanEngine::new(store), drill)
    }

    #[tokio::test]
    async fn test_empty_scan_makes_no_store_calls() {
        // Any store call on a mock without expectations panics
        let engine = LoanEngine::new(MockLoanStore::new());

        let outcome = engine.process_scan("   ", "u-1").await.unwrap();
        assert_eq!(outcome, ScanOutcome::NoCode);
        assert_eq!(outcome.message(), "no code supplied");
    }

    #[tokio::test]
    async fn test_unknown_barcode_is_no_match() {
        let (engine, _) = engine_with_drill().await;

        let outcome = engine.process_scan("XYZ999", "u-1").await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::NoMatch {
                code: "XYZ999".to_string()
            }
        );
        assert!(engine.store().loans().await.is_empty());
    }

    #[tokio::test]
    async fn test_user_badge_is_informational() {
        let (engine, drill) = engine_with_drill().await;

        let outcome = engine.process_scan("U12345", "u-1").await.unwrap();
        assert_eq!(outcome.message(), "user scanned: U12345");
        assert!(!outcome.is_mutation());
        assert!(engine.store().loans().await.is_empty());
        assert!(engine.store().product(&drill.id).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_scan_available_product_checks_out() {
        let (engine, drill) = engine_with_drill().await;

        let outcome = engine.process_scan(" A1 ", "u-1").await.unwrap();
        assert!(matches!(outcome, ScanOutcome::CheckedOut { .. }));
        assert!(outcome.message().contains("Cordless Drill"));

        let loans = engine.store().loans().await;
        assert_eq!(loans.len(), 1);
        assert!(loans[0].is_open());
        assert_eq!(loans[0].user_id, "u-1");
        assert!(!engine.store().product(&drill.id).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_rescan_returns_the_open_loan() {
        let (engine, drill) = engine_with_drill().await;

        engine.process_scan("A1", "u-1").await.unwrap();
        let outcome = engine.process_scan("A1", "u-1").await.unwrap();

        assert_eq!(outcome.message(), "returned: Cordless Drill");
        let loans = engine.store().loans().await;
        assert_eq!(loans.len(), 1);
        assert!(loans[0].returned);
        assert!(loans[0].return_date.is_some());
        assert!(engine.store().product(&drill.id).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_repeated_scans_alternate() {
        let (engine, drill) = engine_with_drill().await;

        for round in 0..6 {
            let outcome = engine.process_scan("A1", "u-1").await.unwrap();
            if round % 2 == 0 {
                assert!(matches!(outcome, ScanOutcome::CheckedOut { .. }));
            } else {
                assert!(matches!(outcome, ScanOutcome::Returned { .. }));
            }

            let open = engine
                .store()
                .loans()
                .await
                .into_iter()
                .filter(|l| l.product_id == drill.id && l.is_open())
                .count();
            assert!(open <= 1);
        }
        assert_eq!(engine.store().loans().await.len(), 3);
    }

    #[tokio::test]
    async fn test_stale_unavailable_product_has_no_active_loan() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let stale = Product {
            id: "p-stale".to_string(),
            name: "Projector".to_string(),
            barcode: "P1".to_string(),
            available: false,
            created_at: now,
            updated_at: now,
        };
        store.insert_product(stale.clone()).await;
        let engine = LoanEngine::new(store);

        let outcome = engine.process_scan("P1", "u-1").await.unwrap();

        assert!(matches!(outcome, ScanOutcome::NoActiveLoan { .. }));
        assert!(outcome.message().starts_with("no active loan found"));
        assert!(engine.store().loans().await.is_empty());
        assert!(!engine.store().product("p-stale").await.unwrap().available);
    }

    #[tokio::test]
    async fn test_lost_race_is_reported_as_conflict() {
        let now = Utc::now();
        let drill = Product {
            id: "p-1".to_string(),
            name: "Cordless Drill".to_string(),
            barcode: "A1".to_string(),
            available: true,
            created_at: now,
            updated_at: now,
        };

        let mut store = MockLoanStore::new();
        let found = drill.clone();
        store
            .expect_find_product_by_barcode()
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_checkout()
            .times(1)
            .returning(|_, _, _| Ok(CheckoutResult::Unavailable));

        let engine = LoanEngine::new(store);
        let outcome = engine.process_scan("A1", "u-1").await.unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::Conflict {
                product_id: "p-1".to_string(),
                product_name: "Cordless Drill".to_string(),
            }
        );
        assert!(!outcome.is_mutation());
    }

    fn available_drill() -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Cordless Drill".to_string(),
            barcode: "A1".to_string(),
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn store_rejecting_checkout(current: Product) -> MockLoanStore {
        let mut store = MockLoanStore::new();
        let found = available_drill();
        store
            .expect_find_product_by_barcode()
            .returning(move |_| Ok(Some(found.clone())));
        store.expect_checkout().times(1).returning(|_, _, _| {
            Err(StoreError::Conflict(
                "Duplicate loans.product_id: 'unknown' already exists".to_string(),
            ))
        });
        store
            .expect_find_product()
            .times(1)
            .returning(move |_| Ok(Some(current.clone())));
        store
    }

    #[tokio::test]
    async fn test_available_product_with_open_loan_is_reported() {
        // Product row still says available, so every retry hits the index
        let engine = LoanEngine::new(store_rejecting_checkout(available_drill()));

        let outcome = engine.process_scan("A1", "u-1").await.unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::OpenLoanExists {
                product_id: "p-1".to_string(),
                product_name: "Cordless Drill".to_string(),
            }
        );
        assert_eq!(outcome.kind(), "open_loan_exists");
        assert!(outcome.message().contains("return it from the loan list"));
        assert!(!outcome.is_mutation());
    }

    #[tokio::test]
    async fn test_rejected_checkout_on_taken_product_is_conflict() {
        let taken = Product {
            available: false,
            ..available_drill()
        };
        let engine = LoanEngine::new(store_rejecting_checkout(taken));

        let outcome = engine.process_scan("A1", "u-1").await.unwrap();

        assert_eq!(outcome.kind(), "conflict");
    }

    #[tokio::test]
    async fn test_blank_user_falls_back_to_default_borrower() {
        let (engine, _) = engine_with_drill().await;

        engine.process_scan("A1", "  ").await.unwrap();

        let loans = engine.store().loans().await;
        assert_eq!(loans[0].user_id, DEFAULT_BORROWER_ID);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let (engine, _) = engine_with_drill().await;
        engine.store().set_offline(true);

        let err = engine.process_scan("A1", "u-1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_return_loan_by_id() {
        let (engine, drill) = engine_with_drill().await;
        let ScanOutcome::CheckedOut { loan_id, .. } =
            engine.process_scan("A1", "u-1").await.unwrap()
        else {
            panic!("expected a checkout");
        };

        let outcome = engine.return_loan(&loan_id).await.unwrap();
        assert_eq!(outcome.message(), "returned: Cordless Drill");
        assert!(engine.store().product(&drill.id).await.unwrap().available);

        let again = engine.return_loan(&loan_id).await.unwrap();
        assert_eq!(again.message(), "no active loan found");
    }

    #[tokio::test]
    async fn test_list_open_loans_sorted() {
        let store = MemoryStore::new();
        let drill = store.add_product("Drill", "A1").await;
        let ladder = store.add_product("Ladder", "L1").await;
        let tent = store.add_product("Tent", "T1").await;

        let t0 = Utc::now();
        store
            .checkout(&drill.id, "u-1", t0 + chrono::Duration::minutes(10))
            .await
            .unwrap();
        store.checkout(&ladder.id, "u-1", t0).await.unwrap();
        store
            .checkout(&tent.id, "u-1", t0 + chrono::Duration::minutes(5))
            .await
            .unwrap();
        let engine = LoanEngine::new(store);

        let newest = engine.list_open_loans(SortOrder::Newest).await.unwrap();
        assert!(newest.windows(2).all(|w| w[0].loan_date >= w[1].loan_date));
        assert_eq!(newest[0].product_name, "Drill");

        let oldest = engine.list_open_loans(SortOrder::Oldest).await.unwrap();
        assert!(oldest.windows(2).all(|w| w[0].loan_date <= w[1].loan_date));
        assert_eq!(oldest[0].product_name, "Ladder");
    }
}
