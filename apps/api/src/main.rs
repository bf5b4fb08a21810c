//! # Liquor Store API
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. .env (optional) ─► environment                                     │
//! │  2. tracing subscriber (RUST_LOG or default filter)                    │
//! │  3. ApiConfig::from_env()                                              │
//! │  4. Database::new() ─► pool + migrations                               │
//! │  5. HttpServer with one App per worker, sharing AppState               │
//! │  6. Ctrl+C / SIGTERM ─► actix drains workers ─► pool closed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::info;

use liquor_api::{configure, cors, init_tracing, request_span, ApiConfig, AppState};
use liquor_db::Database;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is normal outside development
    let dotenv = dotenvy::dotenv().ok();

    init_tracing();
    info!("Starting liquor store API");
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded .env");
    }

    let config = ApiConfig::from_env().context("invalid configuration")?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path.display(),
        allow_oversell = config.allow_oversell,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("failed to open database")?;

    let state = web::Data::new(AppState::new(db.clone(), config.stock_policy()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors())
            .wrap(middleware::from_fn(request_span))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
