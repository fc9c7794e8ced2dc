//! Scan endpoint: the barcode input box.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use loantrack_core::ScanOutcome;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    /// Raw scanner input. A missing field is treated like an empty scan.
    #[serde(default)]
    pub code: String,
}

/// Outcome of a scan or return, as shown in the scan box.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResponse {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,
}

impl From<ScanOutcome> for OutcomeResponse {
    fn from(outcome: ScanOutcome) -> Self {
        let kind = outcome.kind();
        let message = outcome.message();

        let (product_id, loan_id) = match outcome {
            ScanOutcome::CheckedOut {
                product_id,
                loan_id,
                ..
            }
            | ScanOutcome::Returned {
                product_id,
                loan_id,
                ..
            } => (Some(product_id), Some(loan_id)),
            ScanOutcome::NoActiveLoan { product_id, .. } => (product_id, None),
            ScanOutcome::Conflict { product_id, .. }
            | ScanOutcome::OpenLoanExists { product_id, .. } => (Some(product_id), None),
            ScanOutcome::NoCode
            | ScanOutcome::NoMatch { .. }
            | ScanOutcome::UserScanned { .. } => (None, None),
        };

        OutcomeResponse {
            kind,
            message,
            product_id,
            loan_id,
        }
    }
}

/// `POST /api/scan`
pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ScanRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let borrower = state.borrower_id(&headers);
    debug!(borrower = %borrower, "Scan received");

    let outcome = state.session().scan(&request.code, &borrower).await?;
    Ok(Json(outcome.into()))
}
