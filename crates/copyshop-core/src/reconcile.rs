//! # Report Edit Reconciliation
//!
//! Recomputes a saved transaction after its items are edited from the
//! reports screen.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored transaction + items                                            │
//! │          │                                                             │
//! │          ▼                                                             │
//! │  apply ItemEdit(s) ──► new quantity and/or unit price per item         │
//! │          │                                                             │
//! │          ▼                                                             │
//! │  subtotal = unit_price × quantity   (every item)                       │
//! │  total    = Σ subtotal                                                 │
//! │  change   = payment − total         (payment never changes)            │
//! │          │                                                             │
//! │          ▼                                                             │
//! │  Reconciliation ──► saved in one store transaction                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A new total above the recorded payment gives a negative change: the
//! amount the customer still owes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Transaction, TransactionItem};
use crate::validation::{validate_price, validate_quantity};

/// A correction to one item of a saved transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEdit {
    pub item_id: String,
    /// New quantity, must be > 0.
    pub quantity: Option<i64>,
    /// New unit price, must be ≥ 0.
    pub unit_price: Option<Money>,
}

impl ItemEdit {
    pub fn new(item_id: impl Into<String>) -> Self {
        ItemEdit {
            item_id: item_id.into(),
            quantity: None,
            unit_price: None,
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    fn validate(&self) -> CoreResult<()> {
        if self.quantity.is_none() && self.unit_price.is_none() {
            return Err(ValidationError::Required {
                field: "quantity or price".to_string(),
            }
            .into());
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(price) = self.unit_price {
            validate_price(price)?;
        }
        Ok(())
    }
}

/// The transaction and items after edits, with recomputed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    /// Total before the edits.
    pub previous_total: Money,
}

impl Reconciliation {
    /// True when the new total exceeds what the customer paid.
    pub fn is_underpaid(&self) -> bool {
        self.transaction.change_amount.is_negative()
    }

    /// New total minus old total.
    pub fn total_difference(&self) -> Money {
        self.transaction.total_amount - self.previous_total
    }
}

/// Applies `edits` to a transaction's items and recomputes its totals.
///
/// ## Rules
/// - Every edit must name an item of this transaction
///   ([`CoreError::ItemNotInTransaction`] otherwise)
/// - Edits are validated before anything is applied
/// - Items not named keep their quantity and price
/// - Later edits to the same item win
pub fn reconcile(
    transaction: &Transaction,
    items: &[TransactionItem],
    edits: &[ItemEdit],
) -> CoreResult<Reconciliation> {
    for edit in edits {
        edit.validate()?;
        let belongs = items
            .iter()
            .any(|i| i.id == edit.item_id && i.transaction_id == transaction.id);
        if !belongs {
            return Err(CoreError::ItemNotInTransaction {
                transaction_id: transaction.id.clone(),
                item_id: edit.item_id.clone(),
            });
        }
    }

    let mut items = items.to_vec();
    for edit in edits {
        if let Some(item) = items.iter_mut().find(|i| i.id == edit.item_id) {
            if let Some(quantity) = edit.quantity {
                item.quantity = quantity;
            }
            if let Some(price) = edit.unit_price {
                item.unit_price = price;
            }
        }
    }

    for item in &mut items {
        item.subtotal = item
            .unit_price
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(|| too_large("subtotal"))?;
    }

    let total = Money::checked_sum(items.iter().map(|i| i.subtotal))
        .ok_or_else(|| too_large("total"))?;
    let mut updated = transaction.clone();
    updated.total_amount = total;
    updated.change_amount = transaction.payment_amount - total;

    Ok(Reconciliation {
        transaction: updated,
        items,
        previous_total: transaction.total_amount,
    })
}

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}
