//! # loantrack-engine: Loan Consistency Engine
//!
//! Keeps product availability and loan records consistent as barcodes are
//! scanned.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        loantrack-engine                                 │
//! │                                                                         │
//! │  DashboardSession ── snapshot (products, open loans, sort)             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  LoanEngine<S: LoanStore>                                              │
//! │  ├── resolve_scan(code)                                                │
//! │  ├── process_scan(code, user)                                          │
//! │  ├── return_loan(loan_id)                                              │
//! │  ├── list_open_loans(order)                                            │
//! │  └── list_products()                                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  LoanStore (trait)                                                     │
//! │  ├── SqliteStore  ── loantrack-db, one transaction per transition      │
//! │  └── MemoryStore  ── in process, tests and demos                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let engine = LoanEngine::new(SqliteStore::new(db));
//!
//! let outcome = engine.process_scan("A1", &user_id).await?;
//! println!("{}", outcome); // "checked out: Cordless Drill"
//! ```

pub mod engine;
pub mod error;
pub mod memory;
pub mod session;
pub mod sqlite;
pub mod store;

pub use engine::LoanEngine;
pub use error::{EngineResult, StoreError};
pub use memory::MemoryStore;
pub use session::{DashboardSession, DashboardSnapshot};
pub use sqlite::SqliteStore;
pub use store::LoanStore;
