//! # loantrack-server
//!
//! HTTP surface over the loan engine.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard (browser)                                                    │
//! │       │  POST /api/scan { "code": "A1" }   x-user-id: <user>           │
//! │       ▼                                                                 │
//! │  routes::scan::scan                                                    │
//! │       │  state.session().scan(code, borrower)                          │
//! │       ▼                                                                 │
//! │  DashboardSession ──► LoanEngine ──► SqliteStore ──► SQLite            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 { kind: "checked_out", message: "checked out: Cordless Drill" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the full router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", routes::api_router())
        .with_state(state)
}
