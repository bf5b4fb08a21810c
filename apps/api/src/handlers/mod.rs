//! # HTTP Handlers
//!
//! One module per resource. Handlers only translate between HTTP and the
//! repositories; every rule lives in `liquor-core` or `liquor-db`.
//!
//! | Method | Path                        | Handler                         |
//! |--------|-----------------------------|---------------------------------|
//! | POST   | /liquors                    | [`liquors::create_liquor`]      |
//! | GET    | /liquors                    | [`liquors::list_liquors`]       |
//! | GET    | /liquors/{id}               | [`liquors::get_liquor`]         |
//! | PUT    | /liquors/{id}               | [`liquors::update_liquor`]      |
//! | DELETE | /liquors/{id}               | [`liquors::delete_liquor`]      |
//! | POST   | /sales                      | [`sales::create_sale`]          |
//! | GET    | /sales                      | [`sales::list_sales`]           |
//! | GET    | /sales/{id}                 | [`sales::get_sale`]             |
//! | PUT    | /sales/{id}/status          | [`sales::update_sale_status`]   |
//! | DELETE | /sales/{id}                 | [`sales::delete_sale`]          |
//! | GET    | /inventory/low-stock        | [`inventory::low_stock`]        |
//! | PUT    | /inventory/{id}/stock       | [`inventory::adjust_stock`]     |
//! | GET    | /health                     | [`health`]                      |

pub mod inventory;
pub mod liquors;
pub mod sales;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Liveness plus a database round trip. 503 when the database is down.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database_ok = state.db().health_check().await;

    let body = json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": if database_ok { "ok" } else { "unavailable" },
        "checked_at": Utc::now(),
    });

    if database_ok {
        HttpResponse::Ok().json(body)
    } else {
        tracing::warn!("Health check failed: database unavailable");
        HttpResponse::ServiceUnavailable().json(body)
    }
}
