//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Exact barcode lookup (every scan starts here)
//! - Dashboard listing, newest registration first
//! - Registration
//!
//! Availability is NOT updated here. It only changes inside the loan
//! transactions in [`LoanRepository`](super::loan::LoanRepository), so the
//! flag and the loan rows cannot drift apart.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, CreateError};
use loantrack_core::validation::{validate_barcode, validate_product_name};
use loantrack_core::{CoreError, Product};

const PRODUCT_COLUMNS: &str = "id, name, barcode, available, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let drill = repo.create("Cordless Drill", "A1").await?;
/// let same = repo.get_by_barcode("A1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, most recently registered first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by exact barcode match.
    ///
    /// The caller is expected to pass an already-trimmed code.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Looking up product by barcode");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Registers a new, available product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(DbError::UniqueViolation)` - Barcode already in use
    pub async fn create(&self, name: &str, barcode: &str) -> Result<Product, CreateError> {
        validate_product_name(name).map_err(CoreError::from)?;
        validate_barcode(barcode).map_err(CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: name.trim().to_string(),
            barcode: barcode.trim().to_string(),
            available: true,
            created_at: now,
            updated_at: now,
        };

        Ok(self.insert(&product).await?)
    }

    /// Inserts a product exactly as given.
    ///
    /// Used by seeding and tests that need a product in a specific state.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(barcode = %product.barcode, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (id, name, barcode, available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(product.clone()),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { field, .. } if field.ends_with("barcode") => {
                    Err(DbError::duplicate("barcode", &product.barcode))
                }
                other => Err(other),
            },
        }
    }

    /// Counts registered products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
