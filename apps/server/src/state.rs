//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState (Clone, cheap)                                                │
//! │  ├── session: Arc<DashboardSession<SqliteStore>>                       │
//! │  │      └── engine ──► SqliteStore ──► Database (pool)                 │
//! │  └── default_borrower_id                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::http::HeaderMap;
use loantrack_db::Database;
use loantrack_engine::{DashboardSession, LoanEngine, SqliteStore};

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    session: Arc<DashboardSession<SqliteStore>>,
    default_borrower_id: Arc<str>,
}

impl AppState {
    pub fn new(db: Database, default_borrower_id: &str) -> Self {
        let engine = Arc::new(LoanEngine::new(SqliteStore::new(db)));
        AppState {
            session: Arc::new(DashboardSession::new(engine)),
            default_borrower_id: Arc::from(default_borrower_id),
        }
    }

    pub fn session(&self) -> &DashboardSession<SqliteStore> {
        &self.session
    }

    pub fn engine(&self) -> &LoanEngine<SqliteStore> {
        self.session.engine()
    }

    pub fn database(&self) -> &Database {
        self.engine().store().database()
    }

    /// Borrower for this request: the `x-user-id` header, or the configured
    /// default when the header is missing or blank.
    pub fn borrower_id(&self, headers: &HeaderMap) -> String {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&*self.default_borrower_id)
            .to_string()
    }
}
