//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! HTTP handler
//!      │  db.sales().create_sale(new_sale, policy)
//!      ▼
//! SaleRepository ──► one transaction ──► SQLite
//! ```
//!
//! Rows are read into private `*Row` structs and converted to the
//! `liquor_core` types with `TryFrom`, so the core crate stays free of any
//! storage dependency.
//!
//! - [`product::ProductRepository`] - catalog CRUD, low stock, stock adjustment
//! - [`sale::SaleRepository`] - atomic sale recording, lookups, status

pub mod product;
pub mod sale;

use std::fmt::Display;

use crate::error::DbError;

/// Maps a stored value that no longer parses into the domain type.
pub(crate) fn corrupt(entity: &str, id: i64, reason: impl Display) -> DbError {
    DbError::CorruptRow {
        entity: entity.to_string(),
        id,
        reason: reason.to_string(),
    }
}
