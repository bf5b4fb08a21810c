//! # Sale Repository
//!
//! Database operations for sales and their lines.
//!
//! ## Sale Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Recording a Sale                                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO sales ... RETURNING id                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each line, in order:                                              │
//! │  ├── load liquor (missing → ProductNotFound)                           │
//! │  ├── StockPolicy::check_decrement                                      │
//! │  ├── INSERT INTO sale_lines                                            │
//! │  └── UPDATE liquors SET stock = stock - qty, is_available = ...        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction: no header, no lines, no stock change │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use liquor_core::{CoreError, NewSale, Pagination, Sale, SaleLine, SaleStatus, StockPolicy};

use super::corrupt;
use super::product::{apply_stock_delta, fetch_product};
use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = "id, customer_name, customer_id, total_cents, payment_method, sale_date, status";

const SALE_LINE_COLUMNS: &str = "id, sale_id, liquor_id, quantity, unit_price_cents, subtotal_cents";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    customer_name: String,
    customer_id: Option<String>,
    total_cents: i64,
    payment_method: String,
    sale_date: DateTime<Utc>,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    id: i64,
    sale_id: i64,
    liquor_id: i64,
    quantity: i64,
    unit_price_cents: i64,
    subtotal_cents: i64,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        SaleLine {
            id: row.id,
            sale_id: row.sale_id,
            liquor_id: row.liquor_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            subtotal_cents: row.subtotal_cents,
        }
    }
}

impl SaleRow {
    /// Attaches the already-loaded lines and decodes the status column.
    fn into_sale(self, sale_lines: Vec<SaleLine>) -> DbResult<Sale> {
        let status: SaleStatus = self
            .status
            .parse()
            .map_err(|_| corrupt("Sale", self.id, format!("unknown status {:?}", self.status)))?;

        Ok(Sale {
            id: self.id,
            customer_name: self.customer_name,
            customer_id: self.customer_id,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            sale_date: self.sale_date,
            status,
            sale_lines,
        })
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

async fn fetch_sale(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
    let Some(row) = sqlx::query_as::<_, SaleRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let sql = format!("SELECT {SALE_LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY id");
    let lines = sqlx::query_as::<_, SaleLineRow>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    let lines = lines.into_iter().map(SaleLine::from).collect();
    row.into_sale(lines).map(Some)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = SaleRepository::new(pool);
///
/// let sale = repo.create_sale(&new_sale, StockPolicy::AllowNegative).await?;
/// repo.update_status(sale.id, SaleStatus::Cancelled).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale, its lines and the matching stock decrements as one
    /// unit of work.
    ///
    /// Prices and the declared total are stored as given. A total that
    /// differs from the sum of line subtotals is logged, not rejected.
    ///
    /// ## Errors
    /// * `DbError::Domain(Validation)` - malformed input, nothing written
    /// * `DbError::Domain(ProductNotFound)` - a line names a missing liquor
    /// * `DbError::Domain(InsufficientStock)` - rejected by `policy`
    ///
    /// On any error the transaction is rolled back.
    pub async fn create_sale(&self, new_sale: &NewSale, policy: StockPolicy) -> DbResult<Sale> {
        debug!(
            customer = %new_sale.customer_name,
            lines = new_sale.sale_lines.len(),
            "Creating sale"
        );

        new_sale.validate().map_err(CoreError::from)?;

        let lines_total = new_sale.lines_total();
        if lines_total != new_sale.declared_total() {
            warn!(
                declared = %new_sale.declared_total(),
                lines = %lines_total,
                "Declared sale total differs from line subtotals"
            );
        }

        let now = Utc::now();
        let status = SaleStatus::default();

        let mut tx = self.pool.begin().await?;

        let sale_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (customer_name, customer_id, total_cents, payment_method, sale_date, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            "#,
        )
        .bind(new_sale.customer_name.trim())
        .bind(new_sale.customer_id.as_deref().map(str::trim))
        .bind(new_sale.total_cents)
        .bind(new_sale.payment_method.trim())
        .bind(now)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let insert_line = format!(
            r#"
            INSERT INTO sale_lines (sale_id, liquor_id, quantity, unit_price_cents, subtotal_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {SALE_LINE_COLUMNS}
            "#
        );

        let mut sale_lines = Vec::with_capacity(new_sale.sale_lines.len());

        for line in &new_sale.sale_lines {
            if line.subtotal() != line.expected_subtotal() {
                warn!(
                    liquor_id = line.liquor_id,
                    declared = %line.subtotal(),
                    expected = %line.expected_subtotal(),
                    "Line subtotal differs from unit price times quantity"
                );
            }

            let product = fetch_product(&mut tx, line.liquor_id)
                .await?
                .ok_or(CoreError::ProductNotFound(line.liquor_id))?;

            if let Err(err) = policy.check_decrement(product.id, product.stock, line.quantity) {
                warn!(sale_id, liquor_id = product.id, "Sale rejected: {err}");
                return Err(err.into());
            }

            let row = sqlx::query_as::<_, SaleLineRow>(&insert_line)
                .bind(sale_id)
                .bind(line.liquor_id)
                .bind(line.quantity)
                .bind(line.unit_price_cents)
                .bind(line.subtotal_cents)
                .fetch_one(&mut *tx)
                .await?;

            apply_stock_delta(&mut tx, product.id, -line.quantity, now).await?;

            debug!(
                sale_id,
                liquor_id = product.id,
                quantity = line.quantity,
                remaining = product.stock.saturating_sub(line.quantity),
                "Sale line recorded"
            );
            sale_lines.push(SaleLine::from(row));
        }

        tx.commit().await?;

        let sale = Sale {
            id: sale_id,
            customer_name: new_sale.customer_name.trim().to_string(),
            customer_id: new_sale.customer_id.as_deref().map(|c| c.trim().to_string()),
            total_cents: new_sale.total_cents,
            payment_method: new_sale.payment_method.trim().to_string(),
            sale_date: now,
            status,
            sale_lines,
        };

        info!(
            sale_id = sale.id,
            total = %sale.total(),
            lines = sale.sale_lines.len(),
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Gets a sale with its lines.
    ///
    /// ## Returns
    /// * `Ok(Some(Sale))` - Sale found
    /// * `Ok(None)` - No sale with that id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        debug!(id, "Fetching sale");

        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Lists sales by ascending id, each with its lines, optionally
    /// restricted to one customer.
    pub async fn list(&self, page: Pagination, customer_id: Option<&str>) -> DbResult<Vec<Sale>> {
        debug!(skip = page.skip, limit = page.limit, customer_id = ?customer_id, "Listing sales");

        let rows = match customer_id {
            Some(customer_id) => {
                let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE customer_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3");
                sqlx::query_as::<_, SaleRow>(&sql)
                    .bind(customer_id)
                    .bind(page.limit)
                    .bind(page.skip)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY id LIMIT ?1 OFFSET ?2");
                sqlx::query_as::<_, SaleRow>(&sql)
                    .bind(page.limit)
                    .bind(page.skip)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut lines_by_sale = self.lines_for(rows.iter().map(|r| r.id)).await?;

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(lines)
            })
            .collect()
    }

    /// Loads the lines of several sales in one query, grouped by sale id.
    async fn lines_for(&self, sale_ids: impl Iterator<Item = i64>) -> DbResult<HashMap<i64, Vec<SaleLine>>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SALE_LINE_COLUMNS} FROM sale_lines WHERE sale_id IN ("));
        let mut separated = builder.separated(", ");
        for id in sale_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY sale_id, id");

        let rows = builder
            .build_query_as::<SaleLineRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<SaleLine>> = HashMap::new();
        for row in rows {
            grouped.entry(row.sale_id).or_default().push(SaleLine::from(row));
        }
        Ok(grouped)
    }

    /// Sets a sale's status. Any status may follow any other; stock is not
    /// touched.
    pub async fn update_status(&self, id: i64, status: SaleStatus) -> DbResult<Sale> {
        debug!(id, status = %status, "Updating sale status");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE sales SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        tx.commit().await?;

        info!(id, status = %status, "Sale status updated");
        Ok(sale)
    }

    /// Deletes a sale and, by cascade, its lines. Returns the sale as it
    /// was. Stock is not restored.
    pub async fn delete(&self, id: i64) -> DbResult<Sale> {
        debug!(id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, lines = sale.sale_lines.len(), "Sale deleted");
        Ok(sale)
    }

    /// Counts recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
