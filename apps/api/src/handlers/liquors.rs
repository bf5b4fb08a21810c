//! # Liquor Handlers
//!
//! Catalog CRUD. Bodies are `NewProduct` / `ProductUpdate`; responses echo
//! the stored `Product` with its id and timestamps.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use liquor_core::{LiquorCategory, NewProduct, Pagination, ProductUpdate};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /liquors?skip=&limit=&category=`
#[derive(Debug, Deserialize)]
pub struct LiquorQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<LiquorCategory>,
}

#[post("/liquors")]
pub async fn create_liquor(
    state: web::Data<AppState>,
    body: web::Json<NewProduct>,
) -> ApiResult<HttpResponse> {
    let product = state.db().products().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

#[get("/liquors")]
pub async fn list_liquors(
    state: web::Data<AppState>,
    query: web::Query<LiquorQuery>,
) -> ApiResult<HttpResponse> {
    let page = Pagination::new(query.skip, query.limit)?;
    let products = state.db().products().list(page, query.category).await?;

    debug!(count = products.len(), "Listed liquors");
    Ok(HttpResponse::Ok().json(products))
}

#[get("/liquors/{id}")]
pub async fn get_liquor(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let product = state
        .db()
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Liquor", id))?;

    Ok(HttpResponse::Ok().json(product))
}

/// Partial update: only the fields present in the body change.
#[put("/liquors/{id}")]
pub async fn update_liquor(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<ProductUpdate>,
) -> ApiResult<HttpResponse> {
    let product = state.db().products().update(id.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// Echoes the deleted liquor. 409 while recorded sales reference it.
#[delete("/liquors/{id}")]
pub async fn delete_liquor(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let product = state.db().products().delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}
