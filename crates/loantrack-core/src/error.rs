//! # Error Types
//!
//! Domain-specific error types for loantrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  loantrack-core (this file)                                            │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  loantrack-db         └── DbError     - Database operation failures    │
//! │  loantrack-engine     └── StoreError  - Data access as seen by engine  │
//! │  loantrack-server     └── ApiError    - What the dashboard sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → StoreError → ApiError   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Informational scan results ("no match", "no active loan found") are NOT
//! errors. They are [`ScanOutcome`](crate::scan::ScanOutcome) variants.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown sort order keyword.
    #[error("Unknown sort order '{0}', expected 'newest' or 'oldest'")]
    InvalidSortOrder(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., whitespace inside a barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
