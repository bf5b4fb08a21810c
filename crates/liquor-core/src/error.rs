//! # Error Types
//!
//! Domain-specific error types for liquor-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  liquor-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  liquor-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (JSON body + status)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product (liquor) does not exist.
    #[error("Liquor not found: {0}")]
    ProductNotFound(i64),

    /// Sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// A stock decrement would leave the product below zero while the
    /// store runs with [`StockPolicy::RejectOversell`](crate::StockPolicy).
    ///
    /// ## User Workflow
    /// ```text
    /// POST /sales (line: liquor 7, qty 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// 409 + whole sale rolled back
    /// ```
    #[error("Insufficient stock for liquor {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage work runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive { field: field.into() }
    }

    pub fn must_not_be_negative(field: impl Into<String>) -> Self {
        ValidationError::MustNotBeNegative { field: field.into() }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
