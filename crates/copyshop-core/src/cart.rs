//! # Cart
//!
//! The register's in-memory cart and its checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action          Cart Method              State Change         │
//! │  ───────────────          ───────────              ────────────         │
//! │                                                                         │
//! │  Pick product ───────────► add_line() ───────────► qty + 1 or push     │
//! │                                                                         │
//! │  +/- buttons ────────────► adjust_quantity() ────► qty + delta,        │
//! │                                                     0 removes the line  │
//! │                                                                         │
//! │  Edit price / name ──────► set_display_price() ──► override only       │
//! │                            set_display_name()       (catalog untouched) │
//! │                                                                         │
//! │  Pay ────────────────────► checkout() ───────────► Checkout record     │
//! │                                                     (cart untouched)    │
//! │                                                                         │
//! │  After saving ───────────► clear() ──────────────► lines.clear()       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout is pure: it builds the transaction and its items but does not
//! clear the cart. The caller clears it once the transaction is saved, so a
//! failed save leaves the sale on screen for another try.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{new_id, Product, Transaction, TransactionItem};
use crate::validation::{validate_price, validate_product_name};

/// A line in the cart.
///
/// ## Design Notes
/// - `product_id` identifies the line: a product appears at most once
/// - `display_price` / `display_name` start as copies of the catalog values
///   and can be overridden per sale (a discounted job, a custom description)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub product_code: String,
    pub display_name: String,
    pub display_price: Money,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line at quantity 1 from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_code: product.code.clone(),
            display_name: product.name.clone(),
            display_price: product.price,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// display_price × quantity, saturating. Use for display.
    pub fn subtotal(&self) -> Money {
        self.display_price.multiply_quantity(self.quantity)
    }

    /// display_price × quantity, or an error if it does not fit.
    pub fn checked_subtotal(&self) -> CoreResult<Money> {
        self.display_price
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| too_large("subtotal"))
    }
}

/// The register cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every stored line has quantity > 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1
    /// - Otherwise: new line at quantity 1, display price/name from the product
    ///
    /// Returns the line's quantity after the add.
    pub fn add_line(&mut self, product: &Product) -> i64 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine::from_product(product));
        1
    }

    /// Changes a line's quantity by `delta`.
    ///
    /// ## Behavior
    /// - The result is clamped at 0
    /// - Reaching 0 removes the line
    ///
    /// Returns the new quantity (0 when the line was removed).
    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<i64> {
        let index = self.index_of(product_id)?;

        let line = &mut self.lines[index];
        let quantity = line.quantity.saturating_add(delta).max(0);

        if quantity == 0 {
            self.lines.remove(index);
        } else {
            line.quantity = quantity;
        }

        Ok(quantity)
    }

    /// Removes a line regardless of its quantity.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let index = self.index_of(product_id)?;
        self.lines.remove(index);
        Ok(())
    }

    /// Overrides the price charged for a line. Must not be negative.
    pub fn set_display_price(&mut self, product_id: &str, price: Money) -> CoreResult<()> {
        validate_price(price)?;
        let index = self.index_of(product_id)?;
        self.lines[index].display_price = price;
        Ok(())
    }

    /// Overrides the name printed for a line. Must not be blank.
    pub fn set_display_name(&mut self, product_id: &str, name: &str) -> CoreResult<()> {
        validate_product_name(name)?;
        let index = self.index_of(product_id)?;
        self.lines[index].display_name = name.trim().to_string();
        Ok(())
    }

    fn index_of(&self, product_id: &str) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::LineNotInCart(product_id.to_string()))
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Finds a line by the product code it was added with.
    pub fn line_by_code(&self, code: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.product_code.eq_ignore_ascii_case(code))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of display_price × quantity. No tax, no discounts.
    ///
    /// Saturates instead of overflowing; [`Cart::checkout`] goes through
    /// [`Cart::checked_total`] and rejects a cart that does not fit.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Like [`Cart::total`], but fails with [`ValidationError::TooLarge`]
    /// when a subtotal or the sum overflows.
    pub fn checked_total(&self) -> CoreResult<Money> {
        let subtotals = self
            .lines
            .iter()
            .map(CartLine::checked_subtotal)
            .collect::<CoreResult<Vec<_>>>()?;
        Money::checked_sum(subtotals).ok_or_else(|| too_large("total"))
    }

    /// Builds the transaction for this cart.
    ///
    /// ## Rules
    /// - Empty cart → [`CoreError::EmptyCart`]
    /// - No payment entered → [`CoreError::PaymentRequired`]
    /// - Total too large for the money range → [`ValidationError::TooLarge`]
    /// - Payment below total → [`CoreError::InsufficientPayment`]
    /// - Otherwise change = payment − total
    ///
    /// The cart itself is not modified.
    pub fn checkout(&self, payment: Option<Money>) -> CoreResult<Checkout> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let payment = payment.ok_or(CoreError::PaymentRequired)?;
        let total = self.checked_total()?;

        if payment < total {
            return Err(CoreError::InsufficientPayment { total, payment });
        }

        let transaction = Transaction {
            id: new_id(),
            created_at: Utc::now(),
            total_amount: total,
            payment_amount: payment,
            change_amount: payment - total,
        };

        let items = self
            .lines
            .iter()
            .map(|line| {
                Ok(TransactionItem {
                    id: new_id(),
                    transaction_id: transaction.id.clone(),
                    product_id: Some(line.product_id.clone()),
                    product_code: line.product_code.clone(),
                    product_name: line.display_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.display_price,
                    subtotal: line.checked_subtotal()?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Checkout { transaction, items })
    }
}

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}

/// A transaction ready to be saved, with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
