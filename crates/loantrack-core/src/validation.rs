//! # Validation Module
//!
//! Input validation for data entering Loantrack.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Server handler   ── request shape (serde)                    │
//! │  Layer 2: THIS MODULE      ── field rules (length, characters)         │
//! │  Layer 3: SQLite           ── UNIQUE barcode, one open loan/product    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scanned codes are NOT validated here: an odd scan is an informational
//! "no match", not an error. These rules apply when products and users are
//! registered.

use crate::error::ValidationError;
use crate::MAX_BARCODE_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum product/user name length.
pub const MAX_NAME_LEN: usize = 200;

/// Validates a product barcode.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_BARCODE_LEN`] characters
/// - No interior whitespace (scanners never produce it)
///
/// ```rust
/// use loantrack_core::validation::validate_barcode;
///
/// assert!(validate_barcode("4006381333931").is_ok());
/// assert!(validate_barcode("A1").is_ok());
/// assert!(validate_barcode(" ").is_err());
/// assert!(validate_barcode("A 1").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a user's display name.
pub fn validate_user_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a borrower id handed over by the authentication layer.
///
/// Ids are opaque; only emptiness is rejected.
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }
    Ok(())
}

/// Validates a user's email address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        }),
    }
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("A1").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode(&"9".repeat(MAX_BARCODE_LEN + 1)).is_err());
        assert!(matches!(
            validate_barcode("A\t1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Cordless Drill").is_ok());
        assert!(validate_product_name("  ").is_err());
        assert!(validate_product_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id(crate::DEFAULT_BORROWER_ID).is_ok());
        assert!(validate_user_id("").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("kari@example.com").is_ok());
        assert!(validate_email("kari").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("kari@localhost").is_err());
    }
}
