//! # Domain Types
//!
//! Core domain types used throughout Loantrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Loan       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  product_id     │   │  id (UUID)      │       │
//! │  │  barcode        │   │  user_id ───────┼──►│  name           │       │
//! │  │  name           │   │  loan_date      │   │  email          │       │
//! │  │  available      │   │  return_date?   │   └─────────────────┘       │
//! │  └─────────────────┘   │  returned       │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  OpenLoan = Loan (returned = false) + product name + borrower name     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Availability Invariant
//! `product.available == false` exactly when one open loan references the
//! product. Only the engine's checkout/return transitions change either side.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Product
// =============================================================================

/// A physical item that can be lent out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the dashboard.
    pub name: String,

    /// Barcode printed on the item. Unique across products.
    pub barcode: String,

    /// Whether the item is on the shelf (no open loan).
    pub available: bool,

    /// When the product was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product last changed availability.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Label shown in the availability badge.
    pub fn status_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "On loan"
        }
    }
}

// =============================================================================
// Loan
// =============================================================================

/// A record of one item lent to one borrower.
///
/// Created open by a checkout, closed exactly once by a return, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Loan {
    pub id: String,
    pub product_id: String,
    /// Opaque borrower id handed over by the authentication layer.
    pub user_id: String,
    #[ts(as = "String")]
    pub loan_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub return_date: Option<DateTime<Utc>>,
    pub returned: bool,
}

impl Loan {
    /// Returns true while the item has not come back.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.returned
    }
}

// =============================================================================
// Transition Results
// =============================================================================

/// Result of an atomic checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutResult {
    /// The loan was inserted and the product flipped to unavailable.
    Opened(Loan),
    /// The product was not available when the write ran. Nothing changed.
    Unavailable,
}

/// Result of an atomic return attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnResult {
    /// The loan was closed and its product flipped to available.
    Closed(Loan),
    /// There was no open loan to close. Nothing changed.
    NoOpenLoan,
}

// =============================================================================
// Open Loan (read model)
// =============================================================================

/// An open loan joined with the names the dashboard displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OpenLoan {
    /// Loan id (target of the per-row return action).
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub user_id: String,
    /// `None` when the borrower has no user record.
    pub borrower_name: Option<String>,
    #[ts(as = "String")]
    pub loan_date: DateTime<Utc>,
}

impl OpenLoan {
    /// Borrower name, or "Unknown user" when the borrower has no record.
    pub fn borrower_display(&self) -> &str {
        self.borrower_name.as_deref().unwrap_or("Unknown user")
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered borrower.
///
/// Account management lives with the authentication provider; this record
/// only supplies display names for the loan list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: String,
    pub role: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sort Order
// =============================================================================

/// Ordering of the open-loans list by `loan_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent loan first.
    #[default]
    Newest,
    /// Oldest loan first.
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            other => Err(CoreError::InvalidSortOrder(other.to_string())),
        }
    }
}

/// Sorts an already-fetched open-loan list in place.
///
/// Stable: loans with equal `loan_date` keep their relative order.
pub fn sort_open_loans(loans: &mut [OpenLoan], order: SortOrder) {
    match order {
        SortOrder::Newest => loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date)),
        SortOrder::Oldest => loans.sort_by(|a, b| a.loan_date.cmp(&b.loan_date)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
