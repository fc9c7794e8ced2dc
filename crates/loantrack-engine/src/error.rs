//! # Engine Error Types
//!
//! Failures of the data-access collaborator as the engine sees them.
//!
//! Informational results ("no match", "no active loan found") are never
//! errors; they are [`ScanOutcome`](loantrack_core::ScanOutcome) variants.

use loantrack_db::DbError;
use thiserror::Error;

/// Data-access failures surfaced to the caller. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached (closed pool, timeout, I/O).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query ran and failed.
    #[error("Store query failed: {0}")]
    Query(String),

    /// A write lost a race against another session.
    #[error("Conflicting write: {0}")]
    Conflict(String),
}

impl StoreError {
    /// True for transient failures where the previous snapshot stays valid.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Maps database errors onto the three store failure kinds.
///
/// ```text
/// ConnectionFailed / PoolExhausted   → Unavailable
/// UniqueViolation / NotFound         → Conflict  (state moved under us)
/// everything else                    → Query
/// ```
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            return StoreError::Unavailable(err.to_string());
        }

        match err {
            DbError::UniqueViolation { .. } | DbError::NotFound { .. } => {
                StoreError::Conflict(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        assert!(StoreError::from(DbError::PoolExhausted).is_unavailable());
        assert!(StoreError::from(DbError::ConnectionFailed("closed".into())).is_unavailable());
        assert!(matches!(
            StoreError::from(DbError::duplicate("loans.product_id", "p-1")),
            StoreError::Conflict(_)
        ));
        assert!(matches!(
            StoreError::from(DbError::QueryFailed("syntax".into())),
            StoreError::Query(_)
        ));
    }
}
