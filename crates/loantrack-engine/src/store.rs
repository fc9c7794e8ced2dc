//! # Store Seam
//!
//! The data-access interface the engine consumes.
//!
//! Both transition methods are atomic: the loan row and the product's
//! availability change together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loantrack_core::{CheckoutResult, OpenLoan, Product, ReturnResult, SortOrder};

use crate::error::EngineResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Exact barcode match.
    async fn find_product_by_barcode(&self, barcode: &str) -> EngineResult<Option<Product>>;

    async fn find_product(&self, product_id: &str) -> EngineResult<Option<Product>>;

    /// All products, newest registration first.
    async fn list_products(&self) -> EngineResult<Vec<Product>>;

    /// Opens a loan if the product is still available.
    async fn checkout(
        &self,
        product_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<CheckoutResult>;

    /// Closes the open loan of a product.
    async fn return_for_product(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<ReturnResult>;

    /// Closes a specific open loan.
    async fn return_loan(&self, loan_id: &str, at: DateTime<Utc>) -> EngineResult<ReturnResult>;

    /// Open loans joined with product and borrower names.
    async fn list_open_loans(&self, order: SortOrder) -> EngineResult<Vec<OpenLoan>>;
}
