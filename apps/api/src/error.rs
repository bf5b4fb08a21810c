//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  Extractor rejects body/query/path ──────────────┐                     │
//! │                                                   │                     │
//! │  Handler                                          │                     │
//! │  Result<HttpResponse, ApiError>                   │                     │
//! │         │                                         │                     │
//! │         ▼                                         ▼                     │
//! │  DbError / CoreError / ValidationError ──► ApiError ──► status + JSON  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! { "code": "NOT_FOUND", "message": "Liquor not found: 42" }
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use liquor_core::{CoreError, ValidationError};
use liquor_db::DbError;
use serde::Serialize;
use std::fmt;

/// Error returned from every handler.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Malformed or out-of-range input (422)
    ValidationError,

    /// Sale or adjustment refused by the stock policy (409)
    InsufficientStock,

    /// Write refused by a foreign key (409)
    Conflict,

    /// Storage failure; details are logged, not returned (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InsufficientStock | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    fn database() -> Self {
        ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::Domain(core) => core.into(),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::Conflict, "Write conflicts with related records")
            }
            DbError::ConstraintViolation { message } => {
                tracing::warn!("Constraint violation: {}", message);
                ApiError::validation("Value rejected by a storage constraint")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database error: {}", other);
                ApiError::database()
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Liquor", id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(err) => err.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorCode::InsufficientStock.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DatabaseError.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_db_errors() {
        let err: ApiError = DbError::not_found("Sale", 3).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Sale not found: 3");

        let err: ApiError = DbError::Domain(CoreError::ProductNotFound(8)).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Liquor not found: 8");

        let err: ApiError = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::QueryFailed("disk I/O error at /secret/path".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("/secret/path"));
    }

    #[test]
    fn test_core_errors() {
        let err: ApiError = CoreError::InsufficientStock {
            product_id: 1,
            available: 0,
            requested: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("requested 2"));

        let err: ApiError = CoreError::Validation(ValidationError::required("customer_name")).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Liquor", 42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": "NOT_FOUND", "message": "Liquor not found: 42" })
        );
    }
}
