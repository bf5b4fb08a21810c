//! # Inventory Handlers

use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// `PUT /inventory/{id}/stock?quantity=`, a signed delta.
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub quantity: i64,
}

/// Liquors at or below their reorder threshold, lowest stock first.
#[get("/inventory/low-stock")]
pub async fn low_stock(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let products = state.db().products().low_stock().await?;
    Ok(HttpResponse::Ok().json(products))
}

#[put("/inventory/{id}/stock")]
pub async fn adjust_stock(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    query: web::Query<StockQuery>,
) -> ApiResult<HttpResponse> {
    let product = state
        .db()
        .products()
        .adjust_stock(id.into_inner(), query.quantity, state.stock_policy())
        .await?;

    Ok(HttpResponse::Ok().json(product))
}
