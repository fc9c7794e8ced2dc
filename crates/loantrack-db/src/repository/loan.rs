//! # Loan Repository
//!
//! Checkout and return transitions, plus the open-loan listing.
//!
//! ## Paired Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   CHECKOUT (single transaction)                         │
//! │                                                                         │
//! │  1. UPDATE products SET available = 0                                  │
//! │     WHERE id = ? AND available = 1        ◄── compare-and-swap         │
//! │        │                                                                │
//! │        ├── 0 rows ──► ROLLBACK ──► CheckoutResult::Unavailable          │
//! │        ▼                                                                │
//! │  2. INSERT INTO loans (..., returned = 0)                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  COMMIT ──► CheckoutResult::Opened(loan)                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                   RETURN (single transaction)                           │
//! │                                                                         │
//! │  1. UPDATE loans SET returned = 1, return_date = ?                     │
//! │     WHERE product_id = ? AND returned = 0 RETURNING *                  │
//! │        │                                                                │
//! │        ├── no row ──► ROLLBACK ──► ReturnResult::NoOpenLoan             │
//! │        ▼                                                                │
//! │  2. UPDATE products SET available = 1 WHERE id = ?                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  COMMIT ──► ReturnResult::Closed(loan)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two sessions racing on the same product cannot both open a loan: the
//! second checkout's compare-and-swap matches no row. The partial unique
//! index `idx_loans_one_open_per_product` backs this up at the schema level.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use loantrack_core::{CheckoutResult, Loan, OpenLoan, ReturnResult, SortOrder};

const LOAN_COLUMNS: &str = "id, product_id, user_id, loan_date, return_date, returned";

const OPEN_LOANS_NEWEST: &str = r#"
    SELECT
        l.id,
        l.product_id,
        p.name AS product_name,
        l.user_id,
        u.name AS borrower_name,
        l.loan_date
    FROM loans l
    INNER JOIN products p ON p.id = l.product_id
    LEFT JOIN users u ON u.id = l.user_id
    WHERE l.returned = 0
    ORDER BY l.loan_date DESC, l.id
"#;

const OPEN_LOANS_OLDEST: &str = r#"
    SELECT
        l.id,
        l.product_id,
        p.name AS product_name,
        l.user_id,
        u.name AS borrower_name,
        l.loan_date
    FROM loans l
    INNER JOIN products p ON p.id = l.product_id
    LEFT JOIN users u ON u.id = l.user_id
    WHERE l.returned = 0
    ORDER BY l.loan_date ASC, l.id
"#;

/// Repository for loan database operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Opens a loan for an available product.
    ///
    /// ## Returns
    /// * `Ok(Opened(loan))` - Loan inserted, product now unavailable
    /// * `Ok(Unavailable)` - Product was already on loan. Nothing changed
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn checkout(
        &self,
        product_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<CheckoutResult> {
        debug!(product_id = %product_id, user_id = %user_id, "Opening loan");

        let mut tx = self.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE products
            SET available = 0, updated_at = ?2
            WHERE id = ?1 AND available = 1
            "#,
        )
        .bind(product_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return match exists {
                Some(_) => Ok(CheckoutResult::Unavailable),
                None => Err(DbError::not_found("Product", product_id)),
            };
        }

        let loan = Loan {
            id: generate_id(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            loan_date: at,
            return_date: None,
            returned: false,
        };

        sqlx::query(
            r#"
            INSERT INTO loans (id, product_id, user_id, loan_date, return_date, returned)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.product_id)
        .bind(&loan.user_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .bind(loan.returned)
        .execute(&mut *tx)
        .await?;

        Self::commit(tx).await?;

        debug!(loan_id = %loan.id, "Loan opened");
        Ok(CheckoutResult::Opened(loan))
    }

    /// Closes the open loan of a product and marks the product available.
    pub async fn return_for_product(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<ReturnResult> {
        debug!(product_id = %product_id, "Closing loan for product");

        let sql = format!(
            r#"
            UPDATE loans
            SET returned = 1, return_date = ?2
            WHERE product_id = ?1 AND returned = 0
            RETURNING {LOAN_COLUMNS}
            "#
        );

        let mut tx = self.begin().await?;
        let closed = sqlx::query_as::<_, Loan>(&sql)
            .bind(product_id)
            .bind(at)
            .fetch_optional(&mut *tx)
            .await?;

        Self::finish_return(tx, closed, at).await
    }

    /// Closes a specific loan (the per-row return action).
    ///
    /// Unknown or already-closed loans yield `NoOpenLoan`.
    pub async fn return_by_id(&self, loan_id: &str, at: DateTime<Utc>) -> DbResult<ReturnResult> {
        debug!(loan_id = %loan_id, "Closing loan by id");

        let sql = format!(
            r#"
            UPDATE loans
            SET returned = 1, return_date = ?2
            WHERE id = ?1 AND returned = 0
            RETURNING {LOAN_COLUMNS}
            "#
        );

        let mut tx = self.begin().await?;
        let closed = sqlx::query_as::<_, Loan>(&sql)
            .bind(loan_id)
            .bind(at)
            .fetch_optional(&mut *tx)
            .await?;

        Self::finish_return(tx, closed, at).await
    }

    /// Gets a loan by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1");
        let loan = sqlx::query_as::<_, Loan>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(loan)
    }

    /// Gets the open loan of a product, if any.
    pub async fn find_open_for_product(&self, product_id: &str) -> DbResult<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE product_id = ?1 AND returned = 0");
        let loan = sqlx::query_as::<_, Loan>(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(loan)
    }

    /// Lists open loans joined with product and borrower names.
    pub async fn list_open(&self, order: SortOrder) -> DbResult<Vec<OpenLoan>> {
        let sql = match order {
            SortOrder::Newest => OPEN_LOANS_NEWEST,
            SortOrder::Oldest => OPEN_LOANS_OLDEST,
        };

        let loans = sqlx::query_as::<_, OpenLoan>(sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = loans.len(), order = %order, "Listed open loans");
        Ok(loans)
    }

    /// Full loan history of a product, oldest first.
    pub async fn history_for_product(&self, product_id: &str) -> DbResult<Vec<Loan>> {
        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE product_id = ?1 ORDER BY loan_date ASC, id"
        );
        let loans = sqlx::query_as::<_, Loan>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(loans)
    }

    /// Counts open loans.
    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE returned = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction helpers
    // =========================================================================

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| match DbError::from(e) {
            DbError::Internal(msg) => DbError::TransactionFailed(msg),
            other => other,
        })
    }

    async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    async fn finish_return(
        mut tx: Transaction<'static, Sqlite>,
        closed: Option<Loan>,
        at: DateTime<Utc>,
    ) -> DbResult<ReturnResult> {
        let Some(loan) = closed else {
            tx.rollback().await?;
            return Ok(ReturnResult::NoOpenLoan);
        };

        let flipped = sqlx::query(
            r#"
            UPDATE products
            SET available = 1, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(&loan.product_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            // FK guarantees the product exists, so this means the row vanished
            warn!(product_id = %loan.product_id, "Product missing while closing loan");
            tx.rollback().await?;
            return Err(DbError::not_found("Product", &loan.product_id));
        }

        Self::commit(tx).await?;

        debug!(loan_id = %loan.id, "Loan closed");
        Ok(ReturnResult::Closed(loan))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use loantrack_core::Product;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, barcode: &str) -> Product {
        db.products().create(name, barcode).await.unwrap()
    }

    #[tokio::test]
    async fn test_checkout_opens_loan_and_flips_availability() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;

        let result = db.loans().checkout(&drill.id, "u-1", Utc::now()).await.unwrap();
        let CheckoutResult::Opened(loan) = result else {
            panic!("expected an opened loan");
        };

        assert!(loan.is_open());
        assert_eq!(loan.product_id, drill.id);
        assert!(!db.products().get_by_id(&drill.id).await.unwrap().unwrap().available);
        assert_eq!(
            db.loans().find_open_for_product(&drill.id).await.unwrap(),
            Some(loan)
        );
    }

    #[tokio::test]
    async fn test_second_checkout_is_rejected_without_changes() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;

        db.loans().checkout(&drill.id, "u-1", Utc::now()).await.unwrap();
        let second = db.loans().checkout(&drill.id, "u-2", Utc::now()).await.unwrap();

        assert_eq!(second, CheckoutResult::Unavailable);
        assert_eq!(db.loans().count_open().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_checkout_unknown_product_is_not_found() {
        let db = setup().await;
        let err = db.loans().checkout("missing", "u-1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_return_closes_loan_and_restores_availability() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;
        let opened_at = Utc::now();
        db.loans().checkout(&drill.id, "u-1", opened_at).await.unwrap();

        let returned_at = opened_at + Duration::minutes(30);
        let result = db.loans().return_for_product(&drill.id, returned_at).await.unwrap();
        let ReturnResult::Closed(loan) = result else {
            panic!("expected a closed loan");
        };

        assert!(loan.returned);
        assert_eq!(loan.return_date, Some(returned_at));
        assert!(db.products().get_by_id(&drill.id).await.unwrap().unwrap().available);
        assert_eq!(db.loans().count_open().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_loan_index_rejects_checkout_of_stuck_product() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;
        db.loans().checkout(&drill.id, "u-1", Utc::now()).await.unwrap();

        // Stale state: flagged available while its loan is still open
        sqlx::query("UPDATE products SET available = 1 WHERE id = ?1")
            .bind(&drill.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.loans().checkout(&drill.id, "u-2", Utc::now()).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        // Rolled back: availability and the single open loan are untouched
        assert!(db.products().get_by_id(&drill.id).await.unwrap().unwrap().available);
        assert_eq!(db.loans().count_open().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_return_without_open_loan_changes_nothing() {
        let db = setup().await;
        let now = Utc::now();
        // Stale state: flagged unavailable but no loan row
        let stale = Product {
            id: generate_id(),
            name: "Projector".to_string(),
            barcode: "P1".to_string(),
            available: false,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&stale).await.unwrap();

        let result = db.loans().return_for_product(&stale.id, now).await.unwrap();

        assert_eq!(result, ReturnResult::NoOpenLoan);
        assert!(!db.products().get_by_id(&stale.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn test_return_by_id_only_closes_once() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;
        let CheckoutResult::Opened(loan) =
            db.loans().checkout(&drill.id, "u-1", Utc::now()).await.unwrap()
        else {
            panic!("expected an opened loan");
        };

        let first = db.loans().return_by_id(&loan.id, Utc::now()).await.unwrap();
        assert!(matches!(first, ReturnResult::Closed(_)));

        let second = db.loans().return_by_id(&loan.id, Utc::now()).await.unwrap();
        assert_eq!(second, ReturnResult::NoOpenLoan);

        let unknown = db.loans().return_by_id("missing", Utc::now()).await.unwrap();
        assert_eq!(unknown, ReturnResult::NoOpenLoan);
    }

    #[tokio::test]
    async fn test_list_open_joins_names_and_sorts() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;
        let ladder = product(&db, "Ladder", "L1").await;
        let kari = db
            .users()
            .create("Kari", "kari@example.com")
            .await
            .unwrap();

        let t0 = Utc::now();
        db.loans().checkout(&drill.id, &kari.id, t0).await.unwrap();
        db.loans()
            .checkout(&ladder.id, "no-such-user", t0 + Duration::minutes(5))
            .await
            .unwrap();

        let newest = db.loans().list_open(SortOrder::Newest).await.unwrap();
        assert_eq!(newest.len(), 2);
        assert_eq!(newest[0].product_name, "Ladder");
        assert_eq!(newest[0].borrower_display(), "Unknown user");
        assert_eq!(newest[1].borrower_name.as_deref(), Some("Kari"));

        let oldest = db.loans().list_open(SortOrder::Oldest).await.unwrap();
        assert_eq!(oldest[0].product_name, "Drill");
    }

    #[tokio::test]
    async fn test_history_keeps_closed_loans() {
        let db = setup().await;
        let drill = product(&db, "Drill", "A1").await;
        let t0 = Utc::now();

        db.loans().checkout(&drill.id, "u-1", t0).await.unwrap();
        db.loans().return_for_product(&drill.id, t0 + Duration::minutes(1)).await.unwrap();
        db.loans().checkout(&drill.id, "u-2", t0 + Duration::minutes(2)).await.unwrap();

        let history = db.loans().history_for_product(&drill.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].returned);
        assert!(history[1].is_open());
        assert_eq!(history[1].user_id, "u-2");
    }
}
