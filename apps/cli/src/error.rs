//! # Console Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  AppResult<T>                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Database Error? ─── DbError::QueryFailed("...") ──┐                    │
//! │         │                                          │                    │
//! │         ▼                                          ▼                    │
//! │  Domain Error? ───── CoreError::EmptyCart ─────── AppError             │
//! │         │                                          │                    │
//! │         ▼                                          ▼                    │
//! │  File Error? ─────── io::Error / csv::Error ──►  notice                │
//! │                                                                         │
//! │  `till pos`:   the notice is printed, the session continues             │
//! │  one-shot:     the notice goes to stderr, exit status is non-zero       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage internals are logged with `tracing::error!` and the operator only
//! sees a generic message.

use serde::Serialize;
use thiserror::Error;
use till_core::CoreError;
use till_db::DbError;

/// Error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Only 3 items available in stock."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the operator
    pub message: String,
}

/// Error codes for console failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or sale not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Malformed command or missing confirmation
    Usage,

    /// Database operation failed
    DatabaseError,

    /// Cart operation rejected
    CartError,

    /// Not enough stock for the requested quantity
    InsufficientStock,

    /// Export could not be produced or written
    ExportError,

    /// Internal error
    Internal,
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Usage, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to console errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                AppError::validation(format!("{field} '{value}' already exists"))
            }
            DbError::ConstraintViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                AppError::validation("Value rejected by the database")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(
                    ErrorCode::DatabaseError,
                    "Transaction failed, nothing was recorded",
                )
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Domain(e) => e.into(),
        }
    }
}

/// Converts core errors to console errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => AppError::not_found("Product", &id),
            CoreError::OutOfStock { name } => {
                AppError::new(ErrorCode::CartError, format!("{name} is out of stock!"))
            }
            CoreError::InsufficientStock { available, .. } => AppError::new(
                ErrorCode::InsufficientStock,
                format!("Only {available} items available in stock."),
            ),
            CoreError::AmountOverflow => {
                AppError::validation("Amount is too large to record")
            }
            CoreError::EmptyCart => AppError::new(ErrorCode::CartError, "Cart is empty!"),
            CoreError::NothingToExport => {
                AppError::new(ErrorCode::ExportError, "No sales data to export")
            }
            CoreError::Export(e) => {
                tracing::error!("Export formatting failed: {}", e);
                AppError::new(ErrorCode::ExportError, "Export failed")
            }
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", err);
        AppError::new(ErrorCode::ExportError, format!("Could not write file: {err}"))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        tracing::error!("CSV error: {}", err);
        AppError::new(ErrorCode::ExportError, "Export failed")
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("Could not encode JSON: {err}"))
    }
}

/// Convenience type alias for console results.
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::ValidationError;

    #[test]
    fn test_insufficient_stock_message() {
        let err: AppError = CoreError::InsufficientStock {
            name: "Tea".to_string(),
            available: 3,
            requested: 4,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Only 3 items available in stock.");
    }

    #[test]
    fn test_domain_error_unwraps_through_db_error() {
        let err: AppError = DbError::Domain(CoreError::EmptyCart).into();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.message, "Cart is empty!");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err: AppError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: AppError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "[NotFound] Product not found: abc");
    }
}
