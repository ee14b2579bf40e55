//! # Balance
//!
//! Cash available for withdrawal: everything sold minus everything already
//! taken out.
//!
//! ```text
//!   Σ transactions.total_amount     (revenue)
//! − Σ withdrawals.amount            (withdrawals)
//! ─────────────────────────────────
//! = available balance
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Transaction, Withdrawal};

/// Revenue and withdrawal totals at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    total_revenue: Money,
    total_withdrawals: Money,
}

impl BalanceSheet {
    /// Builds a sheet from totals already summed by the store.
    pub const fn new(total_revenue: Money, total_withdrawals: Money) -> Self {
        BalanceSheet {
            total_revenue,
            total_withdrawals,
        }
    }

    /// Builds a sheet by summing full ledgers.
    pub fn from_records(transactions: &[Transaction], withdrawals: &[Withdrawal]) -> Self {
        BalanceSheet {
            total_revenue: transactions.iter().map(|t| t.total_amount).sum(),
            total_withdrawals: withdrawals.iter().map(|w| w.amount).sum(),
        }
    }

    pub const fn total_revenue(&self) -> Money {
        self.total_revenue
    }

    pub const fn total_withdrawals(&self) -> Money {
        self.total_withdrawals
    }

    pub fn available_balance(&self) -> Money {
        self.total_revenue - self.total_withdrawals
    }

    /// Checks a withdrawal against the available balance.
    ///
    /// ## Rules
    /// - amount ≤ 0 → [`CoreError::WithdrawalNotPositive`]
    /// - amount > available → [`CoreError::InsufficientBalance`]
    ///
    /// Withdrawing the whole balance is allowed.
    pub fn validate_withdrawal(&self, amount: Money) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CoreError::WithdrawalNotPositive);
        }

        let available = self.available_balance();
        if amount > available {
            return Err(CoreError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        Ok(())
    }

    /// Sheet after a validated withdrawal.
    pub fn withdraw(&self, amount: Money) -> CoreResult<BalanceSheet> {
        self.validate_withdrawal(amount)?;
        Ok(BalanceSheet {
            total_revenue: self.total_revenue,
            total_withdrawals: self.total_withdrawals + amount,
        })
    }
}
