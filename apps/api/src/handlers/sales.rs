//! # Sale Handlers
//!
//! `POST /sales` is the only multi-row write in the API: header, lines and
//! stock decrements commit together or not at all.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use liquor_core::{NewSale, Pagination, SaleStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /sales?skip=&limit=&customer_id=`
#[derive(Debug, Deserialize)]
pub struct SaleQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub customer_id: Option<String>,
}

/// `PUT /sales/{id}/status?status=`
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[post("/sales")]
pub async fn create_sale(state: web::Data<AppState>, body: web::Json<NewSale>) -> ApiResult<HttpResponse> {
    let sale = state
        .db()
        .sales()
        .create_sale(&body, state.stock_policy())
        .await?;

    Ok(HttpResponse::Created().json(sale))
}

#[get("/sales")]
pub async fn list_sales(state: web::Data<AppState>, query: web::Query<SaleQuery>) -> ApiResult<HttpResponse> {
    let page = Pagination::new(query.skip, query.limit)?;
    let sales = state
        .db()
        .sales()
        .list(page, query.customer_id.as_deref())
        .await?;

    debug!(count = sales.len(), "Listed sales");
    Ok(HttpResponse::Ok().json(sales))
}

#[get("/sales/{id}")]
pub async fn get_sale(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let sale = state
        .db()
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", id))?;

    Ok(HttpResponse::Ok().json(sale))
}

/// Any status may follow any other. Stock is never restored.
#[put("/sales/{id}/status")]
pub async fn update_sale_status(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    query: web::Query<StatusQuery>,
) -> ApiResult<HttpResponse> {
    let status: SaleStatus = query.status.parse()?;
    let sale = state.db().sales().update_status(id.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(sale))
}

/// Removes the sale and its lines; echoes the deleted sale.
#[delete("/sales/{id}")]
pub async fn delete_sale(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let sale = state.db().sales().delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sale))
}
