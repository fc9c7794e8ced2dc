use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ProductDto;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    /// "Registered products" card.
    pub count: usize,
    pub products: Vec<ProductDto>,
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.engine().list_products().await?;

    Ok(Json(ProductListResponse {
        count: products.len(),
        products: products.iter().map(ProductDto::from).collect(),
    }))
}
