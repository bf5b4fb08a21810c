//! # Product Repository
//!
//! Database operations for the liquor catalog.
//!
//! ## Key Operations
//! - CRUD with partial updates
//! - Paginated listing, optionally filtered by category
//! - Low-stock advisory
//! - Signed stock adjustment under a [`StockPolicy`]
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Stock is always written as a delta, never as an absolute value:   │
//! │                                                                     │
//! │     UPDATE liquors SET stock = stock + ?1 ...                      │
//! │                                                                     │
//! │  Sale A: sells 3 → stock - 3                                       │
//! │  Sale B: sells 2 → stock - 2                                       │
//! │  Both land, in whichever order SQLite's writer lock grants.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use liquor_core::{CoreError, LiquorCategory, NewProduct, Pagination, Product, ProductUpdate, StockPolicy};

use super::corrupt;
use crate::error::{DbError, DbResult};

const LIQUOR_COLUMNS: &str = "id, name, brand, description, category, price_cents, \
     alcohol_content, volume_ml, stock, is_available, supplier, minimum_stock, \
     created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

/// One `liquors` row as stored.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    brand: String,
    description: String,
    category: String,
    price_cents: i64,
    alcohol_content: f64,
    volume_ml: i64,
    stock: i64,
    is_available: bool,
    supplier: String,
    minimum_stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: LiquorCategory = row
            .category
            .parse()
            .map_err(|_| corrupt("Liquor", row.id, format!("unknown category {:?}", row.category)))?;

        Ok(Product {
            id: row.id,
            name: row.name,
            brand: row.brand,
            description: row.description,
            category,
            price_cents: row.price_cents,
            alcohol_content: row.alcohol_content,
            volume_ml: row.volume_ml,
            stock: row.stock,
            is_available: row.is_available,
            supplier: row.supplier,
            minimum_stock: row.minimum_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

// =============================================================================
// Connection-level helpers (shared with the sale transaction)
// =============================================================================

/// Loads one product on an already-acquired connection or transaction.
pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {LIQUOR_COLUMNS} FROM liquors WHERE id = ?1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Product::try_from).transpose()
}

/// Adds `delta` to a product's stock and re-derives `is_available` in the
/// same statement. Right-hand `stock` refers to the pre-update value.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE liquors
        SET
            stock = stock + ?1,
            is_available = (stock + ?1) > 0,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Liquor", id));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for liquor catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = Pagination::new(Some(0), Some(20))?;
/// let rums = repo.list(page, Some(LiquorCategory::Rum)).await?;
///
/// let product = repo.get_by_id(42).await?; // Option<Product>
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products by ascending id, optionally restricted to a category.
    pub async fn list(&self, page: Pagination, category: Option<LiquorCategory>) -> DbResult<Vec<Product>> {
        debug!(skip = page.skip, limit = page.limit, category = ?category, "Listing liquors");

        let rows = match category {
            Some(category) => {
                let sql = format!("SELECT {LIQUOR_COLUMNS} FROM liquors WHERE category = ?1 ORDER BY id LIMIT ?2 OFFSET ?3");
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(category.as_str())
                    .bind(page.limit)
                    .bind(page.skip)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {LIQUOR_COLUMNS} FROM liquors ORDER BY id LIMIT ?1 OFFSET ?2");
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(page.limit)
                    .bind(page.skip)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        into_products(rows)
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product with that id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        debug!(id, "Fetching liquor");

        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Validates and inserts a new product, returning it with its generated
    /// id and timestamps.
    pub async fn create(&self, new_product: NewProduct) -> DbResult<Product> {
        debug!(name = %new_product.name, "Creating liquor");

        new_product.validate().map_err(CoreError::from)?;

        // id 0 is a placeholder; the stored row carries the real one
        let draft = new_product.into_product(0, Utc::now());

        let sql = format!(
            r#"
            INSERT INTO liquors (
                name, brand, description, category, price_cents,
                alcohol_content, volume_ml, stock, is_available, supplier,
                minimum_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            RETURNING {LIQUOR_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&draft.name)
            .bind(&draft.brand)
            .bind(&draft.description)
            .bind(draft.category.as_str())
            .bind(draft.price_cents)
            .bind(draft.alcohol_content)
            .bind(draft.volume_ml)
            .bind(draft.stock)
            .bind(draft.is_available)
            .bind(&draft.supplier)
            .bind(draft.minimum_stock)
            .bind(draft.created_at)
            .bind(draft.updated_at)
            .fetch_one(&self.pool)
            .await?;

        let product = Product::try_from(row)?;
        info!(id = product.id, name = %product.name, "Liquor created");
        Ok(product)
    }

    /// Applies a partial update. Fields absent from `update` keep their
    /// stored values; `updated_at` is always refreshed.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no product with that id
    /// * `DbError::Domain(Validation)` - a supplied field is invalid
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id, "Updating liquor");

        update.validate().map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Liquor", id))?;

        update.apply_to(&mut product, Utc::now());

        sqlx::query(
            r#"
            UPDATE liquors SET
                name = ?2,
                brand = ?3,
                description = ?4,
                category = ?5,
                price_cents = ?6,
                alcohol_content = ?7,
                volume_ml = ?8,
                stock = ?9,
                is_available = ?10,
                supplier = ?11,
                minimum_stock = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.description)
        .bind(product.category.as_str())
        .bind(product.price_cents)
        .bind(product.alcohol_content)
        .bind(product.volume_ml)
        .bind(product.stock)
        .bind(product.is_available)
        .bind(&product.supplier)
        .bind(product.minimum_stock)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id, "Liquor updated");
        Ok(product)
    }

    /// Deletes a product and returns it as it was.
    ///
    /// Recorded sale lines keep the `liquor_id`; they hold no foreign key
    /// to the catalog.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no product with that id
    pub async fn delete(&self, id: i64) -> DbResult<Product> {
        debug!(id, "Deleting liquor");

        let mut tx = self.pool.begin().await?;

        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Liquor", id))?;

        sqlx::query("DELETE FROM liquors WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %product.name, "Liquor deleted");
        Ok(product)
    }

    /// Products at or below their reorder threshold, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        debug!("Querying low-stock liquors");

        let sql = format!("SELECT {LIQUOR_COLUMNS} FROM liquors WHERE stock <= minimum_stock ORDER BY stock, id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    /// Adds a signed `delta` to a product's stock, re-deriving availability.
    ///
    /// Under [`StockPolicy::RejectOversell`] a delta that would leave stock
    /// negative fails with `InsufficientStock` and nothing is written. Deltas
    /// beyond `MAX_STOCK_ADJUSTMENT`, or results beyond `MAX_STOCK`, fail
    /// validation.
    pub async fn adjust_stock(&self, id: i64, delta: i64, policy: StockPolicy) -> DbResult<Product> {
        debug!(id, delta, policy = ?policy, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let current = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Liquor", id))?;

        let expected = policy.check_adjustment(id, current.stock, delta)?;
        debug!(id, from = current.stock, to = expected, "Stock adjustment accepted");

        apply_stock_delta(&mut tx, id, delta, Utc::now()).await?;

        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Liquor", id))?;

        tx.commit().await?;

        info!(id, delta, stock = product.stock, "Stock adjusted");
        Ok(product)
    }

    /// Counts catalog rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM liquors")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
