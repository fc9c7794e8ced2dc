//! # Scan Module
//!
//! Everything a scan means before and after the database is consulted.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Scan, One Toggle                             │
//! │                                                                         │
//! │  raw input "  A1 \n"                                                   │
//! │       │ ScanCode::parse (trim)                                          │
//! │       ├── empty ─────────────────────────────► Unmatched::NoCode        │
//! │       ▼                                                                 │
//! │  barcode lookup (engine + store)                                       │
//! │       ├── found ──► ScanIntent::for_product                             │
//! │       │               ├── available   ──► Checkout                      │
//! │       │               └── unavailable ──► Return                        │
//! │       ▼                                                                 │
//! │  classify_unmatched                                                     │
//! │       ├── starts with U/u ──────────────────► UserToken(code)           │
//! │       └── otherwise ────────────────────────► Unmatched::NoMatch        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The direction of a product scan is derived from the product's current
//! availability, never from an explicit mode selector.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;
use crate::USER_BADGE_PREFIX;

// =============================================================================
// Scan Code
// =============================================================================

/// A trimmed, non-empty scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanCode(String);

impl ScanCode {
    /// Trims surrounding whitespace. Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ScanCode(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when the code carries the user badge prefix (any case).
    pub fn is_user_badge(&self) -> bool {
        self.0
            .get(..USER_BADGE_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(USER_BADGE_PREFIX))
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Why a scan resolved to nothing actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unmatched {
    /// Input was empty after trimming. No lookup was made.
    NoCode,
    /// No product has this barcode and it is not a user badge.
    NoMatch(String),
}

/// What a scanned code refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResolution {
    Product(Product),
    /// A user badge. Only the raw code is carried; no user lookup is made.
    UserToken(String),
    Unmatched(Unmatched),
}

/// Classifies a code for which the barcode lookup found no product.
pub fn classify_unmatched(code: &ScanCode) -> ScanResolution {
    if code.is_user_badge() {
        ScanResolution::UserToken(code.as_str().to_string())
    } else {
        ScanResolution::Unmatched(Unmatched::NoMatch(code.as_str().to_string()))
    }
}

// =============================================================================
// Intent
// =============================================================================

/// Which transition a product scan triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanIntent {
    Checkout,
    Return,
}

impl ScanIntent {
    /// Available items are checked out, unavailable ones returned.
    pub fn for_product(product: &Product) -> Self {
        if product.available {
            ScanIntent::Checkout
        } else {
            ScanIntent::Return
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of processing a scan or a return action.
///
/// Every variant is displayable to the operator; none of them is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Empty input.
    NoCode,
    /// Unknown barcode that is not a user badge.
    NoMatch { code: String },
    /// A user badge was scanned. Informational only.
    UserScanned { code: String },
    /// A loan was opened and the product marked unavailable.
    CheckedOut {
        product_id: String,
        product_name: String,
        loan_id: String,
    },
    /// The open loan was closed and the product marked available.
    Returned {
        product_id: String,
        product_name: String,
        loan_id: String,
    },
    /// A return was requested but no open loan exists. Nothing changed.
    NoActiveLoan {
        product_id: Option<String>,
        product_name: Option<String>,
    },
    /// The product changed availability between lookup and write
    /// (another session got there first). Nothing changed.
    Conflict {
        product_id: String,
        product_name: String,
    },
    /// The product is marked available yet already has an open loan, so
    /// checkout keeps failing. Nothing changed; the loan has to be closed
    /// from the open-loans list.
    OpenLoanExists {
        product_id: String,
        product_name: String,
    },
}

impl ScanOutcome {
    /// True when the outcome changed stored state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ScanOutcome::CheckedOut { .. } | ScanOutcome::Returned { .. }
        )
    }

    /// Message for the scan box.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable machine-readable tag, same as the serde `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanOutcome::NoCode => "no_code",
            ScanOutcome::NoMatch { .. } => "no_match",
            ScanOutcome::UserScanned { .. } => "user_scanned",
            ScanOutcome::CheckedOut { .. } => "checked_out",
            ScanOutcome::Returned { .. } => "returned",
            ScanOutcome::NoActiveLoan { .. } => "no_active_loan",
            ScanOutcome::Conflict { .. } => "conflict",
            ScanOutcome::OpenLoanExists { .. } => "open_loan_exists",
        }
    }
}

impl From<Unmatched> for ScanOutcome {
    fn from(unmatched: Unmatched) -> Self {
        match unmatched {
            Unmatched::NoCode => ScanOutcome::NoCode,
            Unmatched::NoMatch(code) => ScanOutcome::NoMatch { code },
        }
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::NoCode => write!(f, "no code supplied"),
            ScanOutcome::NoMatch { code } => write!(f, "no match: {}", code),
            ScanOutcome::UserScanned { code } => write!(f, "user scanned: {}", code),
            ScanOutcome::CheckedOut { product_name, .. } => {
                write!(f, "checked out: {}", product_name)
            }
            ScanOutcome::Returned { product_name, .. } => write!(f, "returned: {}", product_name),
            ScanOutcome::NoActiveLoan { product_name, .. } => match product_name {
                Some(name) => write!(f, "no active loan found: {}", name),
                None => write!(f, "no active loan found"),
            },
            ScanOutcome::Conflict { product_name, .. } => {
                write!(f, "{} changed state in another session, scan again", product_name)
            }
            ScanOutcome::OpenLoanExists { product_name, .. } => write!(
                f,
                "{} already has an open loan, return it from the loan list",
                product_name
            ),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
