//! # Validation Module
//!
//! Field-level rules applied before any storage work runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (actix-web + serde)                          │
//! │  ├── Malformed JSON, wrong types, unknown enum values                  │
//! │  └── Rejected as VALIDATION_ERROR before handlers run                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Price > 0, stock >= 0, quantity > 0, ...                          │
//! │  └── Called from NewProduct / ProductUpdate / NewSale ::validate       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use liquor_core::validation::{validate_price_cents, validate_quantity};
//!
//! assert!(validate_price_cents(2599).is_ok());
//! assert!(validate_price_cents(0).is_err());
//! assert!(validate_quantity(3).is_ok());
//! ```

use crate::error::ValidationError;
use crate::{
    MAX_AMOUNT_CENTS, MAX_LINE_QUANTITY, MAX_PAGE_LIMIT, MAX_SALE_LINES, MAX_STOCK, MAX_STOCK_ADJUSTMENT,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Product name: required, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, 200)
}

/// Brand: required, at most 200 characters.
pub fn validate_brand(brand: &str) -> ValidationResult<()> {
    validate_required_text("brand", brand, 200)
}

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_required_text("customer_name", name, 100)
}

/// Customer identity document. Optional on a sale, but not blank when given.
pub fn validate_customer_id(customer_id: &str) -> ValidationResult<()> {
    validate_required_text("customer_id", customer_id, 50)
}

pub fn validate_payment_method(method: &str) -> ValidationResult<()> {
    validate_required_text("payment_method", method, 50)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Shelf price in cents. Must be strictly positive.
///
/// ```rust
/// use liquor_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::must_be_positive("price"));
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Declared money amounts on a sale (total, unit price, subtotal).
/// Zero is allowed for giveaways.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

fn validate_stock_level(field: &str, stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }

    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Stock supplied on create or update. Adjustments by delta go through
/// [`validate_stock_adjustment`] and [`StockPolicy`](crate::StockPolicy).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    validate_stock_level("stock", stock)
}

pub fn validate_minimum_stock(minimum: i64) -> ValidationResult<()> {
    validate_stock_level("minimum_stock", minimum)
}

/// Signed delta of `PUT /inventory/{id}/stock`, sent as `quantity`.
pub fn validate_stock_adjustment(delta: i64) -> ValidationResult<()> {
    if !(-MAX_STOCK_ADJUSTMENT..=MAX_STOCK_ADJUSTMENT).contains(&delta) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_STOCK_ADJUSTMENT,
            max: MAX_STOCK_ADJUSTMENT,
        });
    }

    Ok(())
}

/// Alcohol by volume, in percent.
pub fn validate_alcohol_content(abv: f64) -> ValidationResult<()> {
    // NaN fails the range check too
    if !(0.0..=100.0).contains(&abv) {
        return Err(ValidationError::OutOfRange {
            field: "alcohol_content".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

pub fn validate_volume_ml(volume: i64) -> ValidationResult<()> {
    if volume <= 0 {
        return Err(ValidationError::must_be_positive("volume_ml"));
    }

    Ok(())
}

/// Sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// A sale needs at least one line and at most MAX_SALE_LINES.
pub fn validate_sale_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::required("sale_lines"));
    }

    if count > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "sale_lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

pub fn validate_pagination(skip: i64, limit: i64) -> ValidationResult<()> {
    if skip < 0 {
        return Err(ValidationError::must_not_be_negative("skip"));
    }

    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
