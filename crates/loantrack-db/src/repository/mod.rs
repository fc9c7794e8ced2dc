//! # Repository Module
//!
//! Database repository implementations for Loantrack.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Engine / server                                                       │
//! │       │  db.loans().checkout(product_id, user_id, now)                 │
//! │       ▼                                                                 │
//! │  LoanRepository                                                        │
//! │  ├── checkout(...)            ─┐                                       │
//! │  ├── return_for_product(...)   ├─ product + loan row in ONE transaction│
//! │  ├── return_by_id(...)        ─┘                                       │
//! │  └── list_open(order)                                                  │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product registration and lookup
//! - [`LoanRepository`](loan::LoanRepository) - Checkout/return transitions and listings
//! - [`UserRepository`](user::UserRepository) - Borrower records

pub mod loan;
pub mod product;
pub mod user;

use loantrack_core::CoreError;
use uuid::Uuid;

use crate::error::DbError;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Errors from the `create` helpers, which validate before inserting.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}
