//! # Domain Types
//!
//! Records kept by the copy shop.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  transaction_id │       │
//! │  │  code (P001)    │   │  total_amount   │   │  code snapshot  │       │
//! │  │  name           │   │  payment_amount │   │  name snapshot  │       │
//! │  │  price          │   │  change_amount  │   │  qty × price    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   Withdrawal    │   │ PrintingOrder   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  date           │   │  customer/phone │                             │
//! │  │  label          │   │  description    │                             │
//! │  │  amount         │   │  is_paid        │                             │
//! │  └─────────────────┘   │  is_completed   │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! Products carry a UUID `id` for relations and a human-readable `code` the
//! cashier types. Everything else is addressed by UUID only.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Generates a new record ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A product or service in the catalog ("Fotokopi A4", "Jilid Spiral", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier typed at the register (`P001`).
    pub code: String,

    /// Display name shown at the register and on receipts.
    pub name: String,

    /// Unit price, never negative.
    pub price: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh ID and current timestamps.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Product {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale.
///
/// ## Invariant
/// `total_amount` equals the sum of its items' subtotals and
/// `change_amount == payment_amount - total_amount`. Both hold by
/// construction ([`crate::Cart::checkout`], [`crate::reconcile`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub total_amount: Money,
    pub payment_amount: Money,
    pub change_amount: Money,
}

impl Transaction {
    /// Short receipt number derived from the ID (`TRX-1A2B3C4D`).
    pub fn receipt_number(&self) -> String {
        let short: String = self
            .id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect();
        format!("TRX-{}", short.to_uppercase())
    }
}

/// A line item of a completed sale.
///
/// Uses the snapshot pattern: code, name and price are frozen at the time of
/// sale so later catalog edits don't rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    /// Catalog product this line came from; `None` once the product is deleted.
    pub product_id: Option<String>,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity.
    pub subtotal: Money,
}

// =============================================================================
// Withdrawal
// =============================================================================

/// Cash taken out of the till by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Withdrawal {
    pub id: String,
    pub date: NaiveDate,
    /// Free text ("Beli kertas", "Bayar listrik").
    pub label: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl Withdrawal {
    pub fn new(date: NaiveDate, label: impl Into<String>, amount: Money) -> Self {
        Withdrawal {
            id: new_id(),
            date,
            label: label.into(),
            amount,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Printing Order
// =============================================================================

/// A printing job taken at the counter and picked up later.
///
/// ## Lifecycle
/// ```text
/// created (unpaid, incomplete)
///      │
///      ├── toggle_paid() ──────► is_paid flips
///      ├── toggle_completed() ─► is_completed flips
///      │
///      ▼
/// deleted
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PrintingOrder {
    pub id: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub description: String,
    pub is_paid: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrintingOrder {
    /// Creates an unpaid, incomplete order.
    pub fn new(
        customer_name: impl Into<String>,
        phone: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        PrintingOrder {
            id: new_id(),
            customer_name: customer_name.into(),
            phone,
            description: description.into(),
            is_paid: false,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_flags(self.is_paid, self.is_completed)
    }

    pub fn toggle_paid(&mut self) {
        self.is_paid = !self.is_paid;
        self.updated_at = Utc::now();
    }

    pub fn toggle_completed(&mut self) {
        self.is_completed = !self.is_completed;
        self.updated_at = Utc::now();
    }
}

/// Combined view of an order's two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Neither paid nor completed.
    Pending,
    /// Paid, still being printed.
    Paid,
    /// Printed, waiting for payment.
    Completed,
    /// Paid and completed.
    Done,
}

impl OrderStatus {
    pub const fn from_flags(is_paid: bool, is_completed: bool) -> Self {
        match (is_paid, is_completed) {
            (false, false) => OrderStatus::Pending,
            (true, false) => OrderStatus::Paid,
            (false, true) => OrderStatus::Completed,
            (true, true) => OrderStatus::Done,
        }
    }

    /// Anything other than `Done` still needs attention.
    pub const fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Done)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Done => "done",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
