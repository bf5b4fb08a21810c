//! # liquor-core: Pure Domain Logic for the Liquor Store Backend
//!
//! This crate holds the domain model of the store: products (liquors), sales
//! and their lines, the money type, input validation and the stock policy.
//! It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Liquor Store Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (actix-web)                         │   │
//! │  │    /liquors ──► /sales ──► /inventory                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ liquor-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  liquor-db (Database Layer)                     │   │
//! │  │        SQLite queries, migrations, repositories, transactions   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleLine, StockPolicy, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use liquor_core::money::Money;
//!
//! let unit_price = Money::from_cents(2599); // $25.99
//! let subtotal = unit_price.multiply_quantity(3);
//! assert_eq!(subtotal.cents(), 7797);
//! ```

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reorder threshold applied when a product is created without one.
pub const DEFAULT_MINIMUM_STOCK: i64 = 5;

/// Page size used when a listing request does not specify `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Upper bound for `limit` on any listing.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Maximum number of lines accepted in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Upper bound for any money amount (price, total, unit price, subtotal):
/// $100,000,000.00. A sale of `MAX_SALE_LINES` such lines still sums
/// within `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Upper bound for stock on hand, and for its magnitude after an oversell.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Largest signed delta accepted by a single stock adjustment.
pub const MAX_STOCK_ADJUSTMENT: i64 = 1_000_000;

/// Maximum quantity of a single sale line.
///
/// ## Business Reason
/// Catches typos (10000 instead of 10) while still allowing case sales.
pub const MAX_LINE_QUANTITY: i64 = 9_999;
