//! # Validation Module
//!
//! Input validation for Copyshop POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Presence of required arguments                                    │
//! │  └── Amount parsing via CurrencyFormat                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE product code                                               │
//! │  └── Foreign keys on transaction items                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use copyshop_core::validation::{validate_product_code, validate_quantity};
//!
//! validate_product_code("P001").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_within(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Only letters, digits, hyphens, underscores
///
/// ## Example
/// ```rust
/// use copyshop_core::validation::validate_product_code;
///
/// assert!(validate_product_code("P001").is_ok());
/// assert!(validate_product_code("FC-A4").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("has space").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    required_within("code", code, 20)?;

    if !code
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (also used for cart display-name overrides).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_within("name", name, 200)
}

/// Validates a withdrawal label.
pub fn validate_withdrawal_label(label: &str) -> ValidationResult<()> {
    required_within("label", label, 200)
}

/// Validates a printing order's customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_within("customer name", name, 100)
}

/// Validates a printing order's description.
pub fn validate_order_description(description: &str) -> ValidationResult<()> {
    required_within("description", description, 500)
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional: empty is allowed
/// - At most 20 characters
/// - Digits, spaces, `+` and `-` only
///
/// ## Example
/// ```rust
/// use copyshop_core::validation::validate_phone;
///
/// assert!(validate_phone("").is_ok());
/// assert!(validate_phone("+62 812-3456-7890").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.chars().count() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity entered for an existing item.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Cart quantities can reach zero through [`crate::Cart::adjust_quantity`],
/// which removes the line instead of storing a zero.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free service)
///
/// ## Example
/// ```rust
/// use copyshop_core::money::Money;
/// use copyshop_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_minor(500)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_minor(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
