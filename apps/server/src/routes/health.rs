use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::state::AppState;

/// Health check endpoint. 503 when the database cannot run a query.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.database().health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}
