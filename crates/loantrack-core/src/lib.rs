//! # loantrack-core: Pure Domain Logic for Loantrack
//!
//! This crate holds the rules that decide what a barcode scan means and how
//! loans are presented. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Loantrack Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard (web front end)                       │   │
//! │  │    Scan input ──► Product list ──► Open loans (newest/oldest)   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              loantrack-server  ─►  loantrack-engine             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ loantrack-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   scan    │  │ validation│                  │   │
//! │  │   │  Product  │  │ ScanCode  │  │   rules   │                  │   │
//! │  │   │   Loan    │  │ Outcome   │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 loantrack-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Loan, OpenLoan, User, SortOrder)
//! - [`scan`] - Scan code normalisation, classification and outcomes
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use loantrack_core::scan::{classify_unmatched, ScanCode, ScanResolution, Unmatched};
//!
//! let code = ScanCode::parse("  u12345 ").unwrap();
//! assert_eq!(code.as_str(), "u12345");
//! assert!(code.is_user_badge());
//!
//! // Blank input never reaches the database
//! assert!(ScanCode::parse("   ").is_none());
//!
//! let unknown = ScanCode::parse("XYZ999").unwrap();
//! assert!(matches!(
//!     classify_unmatched(&unknown),
//!     ScanResolution::Unmatched(Unmatched::NoMatch(_))
//! ));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod scan;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use scan::{ScanCode, ScanIntent, ScanOutcome, ScanResolution, Unmatched};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix that marks a scanned code as a user badge (matched case-insensitively).
///
/// Only consulted after the barcode lookup failed, so a product whose barcode
/// happens to start with `U` still resolves to the product.
pub const USER_BADGE_PREFIX: &str = "U";

/// Borrower id used when no authenticated user is attached to a scan.
///
/// The nil UUID. Loans opened with it show up as "Unknown user" unless a
/// user row with this id exists.
pub const DEFAULT_BORROWER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Maximum accepted barcode length.
pub const MAX_BARCODE_LEN: usize = 64;
