//! # In-Memory Store
//!
//! A [`LoanStore`] kept entirely in process. Used by tests and demos where
//! a database file is unwanted.
//!
//! All state sits behind one mutex, so each transition is atomic in the
//! same sense as the SQLite transactions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loantrack_core::{
    sort_open_loans, CheckoutResult, Loan, OpenLoan, Product, ReturnResult, SortOrder,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{EngineResult, StoreError};
use crate::store::LoanStore;

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    loans: Vec<Loan>,
    /// user id → display name
    users: HashMap<String, String>,
}

/// In-process store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an available product.
    pub async fn add_product(&self, name: &str, barcode: &str) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            barcode: barcode.to_string(),
            available: true,
            created_at: now,
            updated_at: now,
        };
        self.insert_product(product.clone()).await;
        product
    }

    /// Inserts a product exactly as given, including stale availability.
    pub async fn insert_product(&self, product: Product) {
        self.tables.lock().await.products.push(product);
    }

    pub async fn add_user(&self, id: &str, name: &str) {
        self.tables
            .lock()
            .await
            .users
            .insert(id.to_string(), name.to_string());
    }

    /// Current state of a product.
    pub async fn product(&self, product_id: &str) -> Option<Product> {
        let tables = self.tables.lock().await;
        tables.products.iter().find(|p| p.id == product_id).cloned()
    }

    /// Every loan ever recorded, in insertion order.
    pub async fn loans(&self) -> Vec<Loan> {
        self.tables.lock().await.loans.clone()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> EngineResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl Tables {
    fn close_loan(&mut self, index: usize, at: DateTime<Utc>) -> EngineResult<ReturnResult> {
        let product_id = self.loans[index].product_id.clone();
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StoreError::Conflict(format!("Product not found: {product_id}")))?;

        product.available = true;
        product.updated_at = at;

        let loan = &mut self.loans[index];
        loan.returned = true;
        loan.return_date = Some(at);

        Ok(ReturnResult::Closed(loan.clone()))
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn find_product_by_barcode(&self, barcode: &str) -> EngineResult<Option<Product>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.products.iter().find(|p| p.barcode == barcode).cloned())
    }

    async fn find_product(&self, product_id: &str) -> EngineResult<Option<Product>> {
        self.ensure_online()?;
        Ok(self.product(product_id).await)
    }

    async fn list_products(&self) -> EngineResult<Vec<Product>> {
        self.ensure_online()?;
        let mut products = self.tables.lock().await.products.clone();
        // Insertion order reversed first so equal timestamps still list newest first
        products.reverse();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn checkout(
        &self,
        product_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<CheckoutResult> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;

        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StoreError::Conflict(format!("Product not found: {product_id}")))?;

        if !product.available {
            return Ok(CheckoutResult::Unavailable);
        }
        product.available = false;
        product.updated_at = at;

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            loan_date: at,
            return_date: None,
            returned: false,
        };
        tables.loans.push(loan.clone());

        Ok(CheckoutResult::Opened(loan))
    }

    async fn return_for_product(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<ReturnResult> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;

        let open = tables
            .loans
            .iter()
            .position(|l| l.product_id == product_id && l.is_open());

        match open {
            Some(index) => tables.close_loan(index, at),
            None => Ok(ReturnResult::NoOpenLoan),
        }
    }

    async fn return_loan(&self, loan_id: &str, at: DateTime<Utc>) -> EngineResult<ReturnResult> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;

        let open = tables.loans.iter().position(|l| l.id == loan_id && l.is_open());

        match open {
            Some(index) => tables.close_loan(index, at),
            None => Ok(ReturnResult::NoOpenLoan),
        }
    }

    async fn list_open_loans(&self, order: SortOrder) -> EngineResult<Vec<OpenLoan>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;

        let mut open: Vec<OpenLoan> = tables
            .loans
            .iter()
            .filter(|l| l.is_open())
            .filter_map(|l| {
                let product = tables.products.iter().find(|p| p.id == l.product_id)?;
                Some(OpenLoan {
                    id: l.id.clone(),
                    product_id: l.product_id.clone(),
                    product_name: product.name.clone(),
                    user_id: l.user_id.clone(),
                    borrower_name: tables.users.get(&l.user_id).cloned(),
                    loan_date: l.loan_date,
                })
            })
            .collect();

        sort_open_loans(&mut open, order);
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkout_then_return() {
        let store = MemoryStore::new();
        let drill = store.add_product("Drill", "A1").await;

        let opened = store.checkout(&drill.id, "u-1", Utc::now()).await.unwrap();
        assert!(matches!(opened, CheckoutResult::Opened(_)));
        assert!(!store.product(&drill.id).await.unwrap().available);

        let again = store.checkout(&drill.id, "u-2", Utc::now()).await.unwrap();
        assert_eq!(again, CheckoutResult::Unavailable);

        let closed = store.return_for_product(&drill.id, Utc::now()).await.unwrap();
        assert!(matches!(closed, ReturnResult::Closed(_)));
        assert!(store.product(&drill.id).await.unwrap().available);
        assert_eq!(store.loans().await.len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);

        let err = store.list_products().await.unwrap_err();
        assert!(err.is_unavailable());

        store.set_offline(false);
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_loans_use_user_names() {
        let store = MemoryStore::new();
        store.add_user("u-1", "Kari").await;
        let drill = store.add_product("Drill", "A1").await;
        let ladder = store.add_product("Ladder", "L1").await;

        store.checkout(&drill.id, "u-1", Utc::now()).await.unwrap();
        store.checkout(&ladder.id, "u-9", Utc::now()).await.unwrap();

        let open = store.list_open_loans(SortOrder::Oldest).await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].borrower_display(), "Kari");
        assert_eq!(open[1].borrower_display(), "Unknown user");
    }
}
