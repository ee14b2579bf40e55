//! # CLI Error Types
//!
//! What the operator sees when a command fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Handling Flow                                  │
//! │                                                                         │
//! │  Command handler                                                       │
//! │       │                                                                 │
//! │       │ Returns Result<T, AppError>                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  AppError { code, message }                                     │   │
//! │  │  • code: ErrorCode enum (NOT_FOUND, VALIDATION_ERROR, ...)      │   │
//! │  │  • message: one line, no internals                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ├── one-shot command → stderr, exit code 1                       │
//! │       └── register session → printed, session continues               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL messages, I/O errors) are logged with `tracing`
//! and replaced by a generic message.

use std::fmt;

use copyshop_core::{CoreError, CurrencyFormat, ValidationError};
use copyshop_db::DbError;
use serde::Serialize;

/// Error returned by command handlers.
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, transaction, withdrawal or order not found
    NotFound,

    /// Input failed validation (empty name, negative price, bad amount)
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violation (e.g. reference matches several records)
    BusinessLogic,

    /// Cart operation failed (empty cart, line not in cart)
    CartError,

    /// Payment missing or less than the total
    PaymentError,

    /// Withdrawal not positive or above the available balance
    BalanceError,

    /// Receipt could not be handed to the printer
    PrinterError,

    /// Unexpected internal error
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn printer(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::PrinterError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::Ambiguous { entity, reference } => AppError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "{} reference '{}' matches several records, type more characters",
                    entity, reference
                ),
            ),
            DbError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rejected(core) => core.into(),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::LineNotInCart(_) | CoreError::EmptyCart => {
                AppError::new(ErrorCode::CartError, message)
            }
            CoreError::PaymentRequired | CoreError::InsufficientPayment { .. } => {
                AppError::new(ErrorCode::PaymentError, message)
            }
            CoreError::WithdrawalNotPositive | CoreError::InsufficientBalance { .. } => {
                AppError::new(ErrorCode::BalanceError, message)
            }
            CoreError::ItemNotInTransaction { .. } => {
                AppError::new(ErrorCode::BusinessLogic, message)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl AppError {
    /// Maps a core error, writing amounts in the shop's currency instead of
    /// the default format `CoreError` messages use.
    pub fn from_core(err: CoreError, currency: &CurrencyFormat) -> Self {
        match err {
            CoreError::InsufficientPayment { total, payment } => AppError::new(
                ErrorCode::PaymentError,
                format!(
                    "Payment {} is less than total {}",
                    currency.format(payment),
                    currency.format(total)
                ),
            ),
            CoreError::InsufficientBalance {
                requested,
                available,
            } => AppError::new(
                ErrorCode::BalanceError,
                format!(
                    "Withdrawal {} exceeds available balance {}",
                    currency.format(requested),
                    currency.format(available)
                ),
            ),
            other => other.into(),
        }
    }

    /// Maps a database error; rejected operations go through [`AppError::from_core`].
    pub fn from_db(err: DbError, currency: &CurrencyFormat) -> Self {
        match err {
            DbError::Rejected(core) => AppError::from_core(core, currency),
            other => other.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", err);
        AppError::internal(format!("I/O error: {}", err.kind()))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization failed: {}", err);
        AppError::internal("Could not render JSON output")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for command handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use copyshop_core::Money;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: AppError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: AppError = CoreError::InsufficientPayment {
            total: Money::from_minor(3000),
            payment: Money::from_minor(1000),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(err.message, "Payment Rp 1.000 is less than total Rp 3.000");
    }

    #[test]
    fn test_amounts_use_shop_currency() {
        let dollars = CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 2,
            thousands_separator: ',',
            decimal_separator: '.',
        };

        let err = AppError::from_core(
            CoreError::InsufficientPayment {
                total: Money::from_minor(1099),
                payment: Money::from_minor(1000),
            },
            &dollars,
        );
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(err.message, "Payment $10.00 is less than total $10.99");

        let err = AppError::from_db(
            DbError::Rejected(CoreError::InsufficientBalance {
                requested: Money::from_minor(250_000),
                available: Money::from_minor(123_456),
            }),
            &dollars,
        );
        assert_eq!(err.code, ErrorCode::BalanceError);
        assert_eq!(
            err.message,
            "Withdrawal $2,500.00 exceeds available balance $1,234.56"
        );

        let err = AppError::from_core(CoreError::EmptyCart, &dollars);
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_rejected_db_error_uses_core_mapping() {
        let err: AppError = DbError::Rejected(CoreError::WithdrawalNotPositive).into();
        assert_eq!(err.code, ErrorCode::BalanceError);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: AppError = DbError::QueryFailed("no such column: foo".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("foo"));
    }

    #[test]
    fn test_validation_error_code() {
        let err: AppError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.to_string(), "name is required");
    }
}
