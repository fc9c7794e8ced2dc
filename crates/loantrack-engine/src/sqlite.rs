//! SQLite-backed [`LoanStore`] over `loantrack-db`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loantrack_core::{CheckoutResult, OpenLoan, Product, ReturnResult, SortOrder};
use loantrack_db::Database;

use crate::error::EngineResult;
use crate::store::LoanStore;

/// Production store. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl LoanStore for SqliteStore {
    async fn find_product_by_barcode(&self, barcode: &str) -> EngineResult<Option<Product>> {
        Ok(self.db.products().get_by_barcode(barcode).await?)
    }

    async fn find_product(&self, product_id: &str) -> EngineResult<Option<Product>> {
        Ok(self.db.products().get_by_id(product_id).await?)
    }

    async fn list_products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    async fn checkout(
        &self,
        product_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<CheckoutResult> {
        Ok(self.db.loans().checkout(product_id, user_id, at).await?)
    }

    async fn return_for_product(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<ReturnResult> {
        Ok(self.db.loans().return_for_product(product_id, at).await?)
    }

    async fn return_loan(&self, loan_id: &str, at: DateTime<Utc>) -> EngineResult<ReturnResult> {
        Ok(self.db.loans().return_by_id(loan_id, at).await?)
    }

    async fn list_open_loans(&self, order: SortOrder) -> EngineResult<Vec<OpenLoan>> {
        Ok(self.db.loans().list_open(order).await?)
    }
}
