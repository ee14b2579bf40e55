//! # Error Types
//!
//! Domain-specific error types for copyshop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  copyshop-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  copyshop-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → Terminal     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A failed operation leaves the cart, ledger or board it was applied to
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The cart has no line for the given product.
    #[error("Product {0} is not in the cart")]
    LineNotInCart(String),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout was attempted without entering a payment amount.
    #[error("Payment amount is required")]
    PaymentRequired,

    /// The customer paid less than the cart total.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total: 3.000
    ///      │
    ///      ▼
    /// pay 2.500
    ///      │
    ///      ▼
    /// InsufficientPayment { total: 3.000, payment: 2.500 }
    ///      │
    ///      ▼
    /// Cart untouched, cashier asks for more cash
    /// ```
    #[error("Payment {payment} is less than total {total}")]
    InsufficientPayment { total: Money, payment: Money },

    /// Withdrawal amount must be greater than zero.
    #[error("Withdrawal amount must be positive")]
    WithdrawalNotPositive,

    /// Withdrawal would exceed the available balance.
    #[error("Withdrawal {requested} exceeds available balance {available}")]
    InsufficientBalance { requested: Money, available: Money },

    /// An edit referenced an item that is not part of the transaction.
    #[error("Item {item_id} does not belong to transaction {transaction_id}")]
    ItemNotInTransaction {
        transaction_id: String,
        item_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Amount does not fit in the money range.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., unparseable amount, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_payment_message() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_minor(3000),
            payment: Money::from_minor(2500),
        };
        assert_eq!(
            err.to_string(),
            "Payment Rp 2.500 is less than total Rp 3.000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
