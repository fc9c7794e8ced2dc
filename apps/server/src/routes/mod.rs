//! # HTTP Routes
//!
//! | Method | Path                      | Handler                     |
//! |--------|---------------------------|-----------------------------|
//! | GET    | `/health`                 | [`health::health`]          |
//! | POST   | `/api/scan`               | [`scan::scan`]              |
//! | GET    | `/api/products`           | [`products::list_products`] |
//! | GET    | `/api/loans?sort=`        | [`loans::list_open_loans`]  |
//! | POST   | `/api/loans/{id}/return`  | [`loans::return_loan`]      |
//! | GET    | `/api/dashboard?sort=`    | [`dashboard::dashboard`]    |
//! | POST   | `/api/dashboard/sort`     | [`dashboard::set_sort`]     |

pub mod dashboard;
pub mod health;
pub mod loans;
pub mod products;
pub mod scan;

use axum::routing::{get, post};
use axum::Router;
use loantrack_core::{OpenLoan, Product, SortOrder};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan::scan))
        .route("/products", get(products::list_products))
        .route("/loans", get(loans::list_open_loans))
        .route("/loans/{id}/return", post(loans::return_loan))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/sort", post(dashboard::set_sort))
}

// =============================================================================
// Shared DTOs
// =============================================================================

/// `?sort=newest|oldest`
#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

impl SortQuery {
    /// Parsed order, `None` when not given.
    pub fn order(&self) -> Result<Option<SortOrder>, ApiError> {
        self.sort
            .as_deref()
            .map(|s| s.parse::<SortOrder>().map_err(ApiError::from))
            .transpose()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub barcode: String,
    pub available: bool,
    pub status: &'static str,
    pub created_at: String,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        ProductDto {
            id: product.id.clone(),
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            available: product.available,
            status: product.status_label(),
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenLoanDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub user_id: String,
    pub borrower: String,
    pub loan_date: String,
}

impl From<&OpenLoan> for OpenLoanDto {
    fn from(loan: &OpenLoan) -> Self {
        OpenLoanDto {
            id: loan.id.clone(),
            product_id: loan.product_id.clone(),
            product_name: loan.product_name.clone(),
            user_id: loan.user_id.clone(),
            borrower: loan.borrower_display().to_string(),
            loan_date: loan.loan_date.to_rfc3339(),
        }
    }
}
