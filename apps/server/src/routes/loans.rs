use axum::extract::{Path, Query, State};
use axum::Json;
use loantrack_core::SortOrder;
use serde::Serialize;

use super::scan::OutcomeResponse;
use super::{OpenLoanDto, SortQuery};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OpenLoansResponse {
    pub sort: SortOrder,
    pub count: usize,
    pub loans: Vec<OpenLoanDto>,
}

/// `GET /api/loans?sort=newest|oldest`
///
/// Always queries the store. Defaults to newest first.
pub async fn list_open_loans(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<OpenLoansResponse>, ApiError> {
    let sort = query.order()?.unwrap_or_default();
    let loans = state.engine().list_open_loans(sort).await?;

    Ok(Json(OpenLoansResponse {
        sort,
        count: loans.len(),
        loans: loans.iter().map(OpenLoanDto::from).collect(),
    }))
}

/// `POST /api/loans/{id}/return`
pub async fn return_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let outcome = state.session().return_loan(&loan_id).await?;
    Ok(Json(outcome.into()))
}
