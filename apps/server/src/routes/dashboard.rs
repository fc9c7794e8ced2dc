//! Dashboard endpoints: the session snapshot and its sort toggle.

use axum::extract::{Query, State};
use axum::Json;
use loantrack_core::{sort_open_loans, SortOrder};
use serde::{Deserialize, Serialize};

use super::{OpenLoanDto, ProductDto, SortQuery};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub product_count: usize,
    pub products: Vec<ProductDto>,
    pub open_loans: Vec<OpenLoanDto>,
    pub sort: SortOrder,
    /// `None` until the snapshot has loaded once.
    pub refreshed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort: String,
}

/// `GET /api/dashboard?sort=`
///
/// Serves the snapshot. A `sort` parameter orders this response only; the
/// session keeps its own order. The snapshot is loaded on first use.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let view = query.order()?;
    let session = state.session();

    if session.snapshot().await.refreshed_at.is_none() {
        // Nothing to fall back to yet, so a failed first load is an error
        session.refresh().await?;
    }

    let mut snapshot = session.snapshot().await;
    if let Some(order) = view {
        sort_open_loans(&mut snapshot.open_loans, order);
        snapshot.sort = order;
    }

    Ok(Json(DashboardResponse {
        product_count: snapshot.product_count(),
        products: snapshot.products.iter().map(ProductDto::from).collect(),
        open_loans: snapshot.open_loans.iter().map(OpenLoanDto::from).collect(),
        sort: snapshot.sort,
        refreshed_at: snapshot.refreshed_at.map(|at| at.to_rfc3339()),
    }))
}

/// `POST /api/dashboard/sort` body `{ "sort": "oldest" }`
///
/// Changes the session's order for every later read.
pub async fn set_sort(
    State(state): State<AppState>,
    Json(request): Json<SortRequest>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let order: SortOrder = request.sort.parse()?;
    state.session().set_sort(order).await;

    dashboard(State(state), Query(SortQuery::default())).await
}
