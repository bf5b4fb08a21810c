//! # liquor-api
//!
//! actix-web HTTP layer for the liquor store backend.
//!
//! ## Module Organization
//! ```text
//! liquor_api/
//! ├── lib.rs          ◄─── Route table, extractor configs, CORS, tracing setup
//! ├── main.rs         ◄─── Binary: config → database → HttpServer
//! ├── config.rs       ◄─── ApiConfig from the environment
//! ├── error.rs        ◄─── ApiError + ResponseError
//! ├── middleware.rs   ◄─── Per-request tracing span
//! ├── state.rs        ◄─── AppState (Database + StockPolicy)
//! └── handlers/
//!     ├── mod.rs      ◄─── /health
//!     ├── liquors.rs  ◄─── /liquors
//!     ├── sales.rs    ◄─── /sales
//!     └── inventory.rs◄─── /inventory
//! ```
//!
//! ## Building an App
//! ```rust,ignore
//! App::new()
//!     .app_data(web::Data::new(AppState::new(db, StockPolicy::default())))
//!     .wrap(liquor_api::cors())
//!     .wrap(middleware::from_fn(request_span))
//!     .configure(liquor_api::configure)
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use actix_cors::Cors;
use actix_web::{web, HttpRequest};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::error::ApiError;

pub use config::{ApiConfig, ConfigError};
pub use middleware::request_span;
pub use state::AppState;

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,liquor=debug,sqlx=warn";

/// Registers every route plus the extractor configs that turn malformed
/// input into `VALIDATION_ERROR` responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(handlers::health)
        // liquors
        .service(handlers::liquors::create_liquor)
        .service(handlers::liquors::list_liquors)
        .service(handlers::liquors::get_liquor)
        .service(handlers::liquors::update_liquor)
        .service(handlers::liquors::delete_liquor)
        // sales
        .service(handlers::sales::create_sale)
        .service(handlers::sales::list_sales)
        .service(handlers::sales::get_sale)
        .service(handlers::sales::update_sale_status)
        .service(handlers::sales::delete_sale)
        // inventory
        .service(handlers::inventory::low_stock)
        .service(handlers::inventory::adjust_stock);
}

/// CORS for browser front ends served from other origins: any origin,
/// method and header. The request origin is echoed back.
pub fn cors() -> Cors {
    Cors::permissive()
}

fn rejected(kind: &str, req: &HttpRequest, detail: String) -> actix_web::Error {
    warn!(path = %req.path(), "Rejected {kind}: {detail}");
    ApiError::validation(detail).into()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| rejected("body", req, err.to_string()))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| rejected("query", req, err.to_string()))
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| rejected("path", req, err.to_string()))
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides
/// [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
