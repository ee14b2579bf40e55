//! # copyshop-core: Pure Business Logic for Copyshop POS
//!
//! This crate holds the business logic of the copy shop register as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Copyshop POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    copyshop CLI (apps/cli)                      │   │
//! │  │    register ──► sell ──► report ──► withdraw ──► order          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ copyshop-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ receipt │ │ balance │ │reconcile│ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO PRINTER • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                copyshop-db (Database Layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money and currency formatting
//! - [`types`] - Records: Product, Transaction, Withdrawal, PrintingOrder
//! - [`cart`] - The register cart and checkout
//! - [`receipt`] - Fixed-width receipt document
//! - [`balance`] - Revenue minus withdrawals
//! - [`reconcile`] - Recomputing a transaction after its items are edited
//! - [`report`] - Revenue summaries over a set of transactions
//! - [`catalog`] - Product code generation
//! - [`validation`] - Field validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use copyshop_core::{Cart, Money, Product};
//!
//! let copy = Product::new("P001", "Fotokopi A4", Money::from_minor(500));
//! let bind = Product::new("P002", "Jilid Spiral", Money::from_minor(2000));
//!
//! let mut cart = Cart::new();
//! cart.add_line(&copy);
//! cart.add_line(&copy);
//! cart.add_line(&bind);
//!
//! let checkout = cart.checkout(Some(Money::from_minor(5000))).unwrap();
//! assert_eq!(checkout.transaction.total_amount, Money::from_minor(3000));
//! assert_eq!(checkout.transaction.change_amount, Money::from_minor(2000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod receipt;
pub mod reconcile;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use balance::BalanceSheet;
pub use cart::{Cart, CartLine, Checkout};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use receipt::{Receipt, ReceiptLayout};
pub use reconcile::{ItemEdit, Reconciliation};
pub use report::{DailyTotal, ReportSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of auto-generated product codes (`P001`, `P002`, ...).
pub const PRODUCT_CODE_PREFIX: &str = "P";

/// Minimum number of digits in an auto-generated product code.
pub const PRODUCT_CODE_DIGITS: usize = 3;

/// Default receipt width in characters (58mm thermal paper).
pub const DEFAULT_RECEIPT_WIDTH: usize = 32;
