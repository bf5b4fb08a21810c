//! # Application State
//!
//! Shared by every actix worker through `web::Data<AppState>`.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is already `Send + Sync` and
//! cheap to clone. Handlers run queries concurrently without extra locking.
//!
//! ```rust,ignore
//! #[get("/liquors/{id}")]
//! async fn get_liquor(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult<HttpResponse> {
//!     let product = state.db().products().get_by_id(*id).await?;
//!     // ...
//! }
//! ```

use liquor_core::StockPolicy;
use liquor_db::Database;

/// Everything a handler may need, built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    stock_policy: StockPolicy,
}

impl AppState {
    pub fn new(db: Database, stock_policy: StockPolicy) -> Self {
        AppState { db, stock_policy }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Policy applied to sale creation and stock adjustment.
    pub fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }
}
