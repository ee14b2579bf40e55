//! # Withdrawal Repository
//!
//! Database operations for the withdrawal ledger and the till balance.
//!
//! ## Checked Withdrawal
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │    SUM(transactions.total_amount)   ─┐                                 │
//! │    SUM(withdrawals.amount)          ─┴─► BalanceSheet                  │
//! │                                            │                           │
//! │                                  validate_withdrawal(amount)           │
//! │                                     │                 │                │
//! │                                   Ok(())            Err ──► ROLLBACK   │
//! │                                     │                                  │
//! │    INSERT INTO withdrawals ◄────────┘                                  │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read and insert share one SQLite transaction. If another connection
//! writes in between, the insert fails with a busy error instead of
//! committing against a stale balance.

use copyshop_core::{BalanceSheet, Money, Withdrawal};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::resolve_id;
use crate::error::{DbError, DbResult};

const REVENUE_SQL: &str = "SELECT COALESCE(SUM(total_amount), 0) FROM transactions";
const WITHDRAWN_SQL: &str = "SELECT COALESCE(SUM(amount), 0) FROM withdrawals";

/// Repository for the withdrawal ledger.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    pool: SqlitePool,
}

impl WithdrawalRepository {
    /// Creates a new WithdrawalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WithdrawalRepository { pool }
    }

    /// Lists withdrawals, most recent date first.
    pub async fn list(&self) -> DbResult<Vec<Withdrawal>> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, date, label, amount, created_at
            FROM withdrawals
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }

    /// Gets a withdrawal by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Withdrawal>> {
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, date, label, amount, created_at
            FROM withdrawals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(withdrawal)
    }

    /// Resolves a full id or id prefix to a withdrawal id.
    pub async fn resolve(&self, reference: &str) -> DbResult<String> {
        resolve_id(&self.pool, "withdrawals", "Withdrawal", reference).await
    }

    /// Sum of all withdrawals.
    pub async fn total(&self) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(WITHDRAWN_SQL)
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_minor(total))
    }

    /// Current revenue and withdrawal totals.
    pub async fn balance(&self) -> DbResult<BalanceSheet> {
        let revenue: i64 = sqlx::query_scalar(REVENUE_SQL)
            .fetch_one(&self.pool)
            .await?;
        let withdrawn: i64 = sqlx::query_scalar(WITHDRAWN_SQL)
            .fetch_one(&self.pool)
            .await?;

        Ok(BalanceSheet::new(
            Money::from_minor(revenue),
            Money::from_minor(withdrawn),
        ))
    }

    /// Records a withdrawal after checking it against the balance.
    ///
    /// ## Returns
    /// * `Ok(BalanceSheet)` - The balance after the withdrawal
    /// * `Err(DbError::Rejected(..))` - Amount not positive or over the balance
    pub async fn record_checked(&self, withdrawal: &Withdrawal) -> DbResult<BalanceSheet> {
        debug!(
            id = %withdrawal.id,
            amount = withdrawal.amount.minor(),
            "Recording withdrawal"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let revenue: i64 = sqlx::query_scalar(REVENUE_SQL)
            .fetch_one(&mut *tx)
            .await?;
        let withdrawn: i64 = sqlx::query_scalar(WITHDRAWN_SQL)
            .fetch_one(&mut *tx)
            .await?;

        let sheet = BalanceSheet::new(Money::from_minor(revenue), Money::from_minor(withdrawn));
        let after = sheet.withdraw(withdrawal.amount).inspect_err(|e| {
            warn!(amount = withdrawal.amount.minor(), error = %e, "Withdrawal rejected");
        })?;

        sqlx::query(
            r#"
            INSERT INTO withdrawals (id, date, label, amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&withdrawal.id)
        .bind(withdrawal.date)
        .bind(&withdrawal.label)
        .bind(withdrawal.amount)
        .bind(withdrawal.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %withdrawal.id,
            amount = withdrawal.amount.minor(),
            available = after.available_balance().minor(),
            "Withdrawal recorded"
        );
        Ok(after)
    }

    /// Deletes a withdrawal, returning the amount to the balance.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting withdrawal");

        let result = sqlx::query("DELETE FROM withdrawals WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Withdrawal", id));
        }

        info!(id = %id, "Withdrawal deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use copyshop_core::{Cart, CoreError, Product};

    async fn db_with_revenue(amount: i64) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = Product::new("P001", "Print", Money::from_minor(amount));
        db.products().insert(&product).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&product);
        let sale = cart.checkout(Some(Money::from_minor(amount))).unwrap();
        db.transactions().save(&sale).await.unwrap();
        db
    }

    fn withdrawal(label: &str, amount: i64) -> Withdrawal {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        Withdrawal::new(date, label, Money::from_minor(amount))
    }

    #[tokio::test]
    async fn test_checked_withdrawals_against_balance() {
        let db = db_with_revenue(100_000).await;
        let repo = db.withdrawals();

        let after = repo
            .record_checked(&withdrawal("Beli kertas", 30_000))
            .await
            .unwrap();
        assert_eq!(after.available_balance(), Money::from_minor(70_000));

        let err = repo
            .record_checked(&withdrawal("Bayar sewa", 80_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientBalance { .. })
        ));

        let sheet = repo.balance().await.unwrap();
        assert_eq!(sheet.total_revenue(), Money::from_minor(100_000));
        assert_eq!(sheet.total_withdrawals(), Money::from_minor(30_000));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_withdrawal_rejected() {
        let db = db_with_revenue(10_000).await;
        let err = db
            .withdrawals()
            .record_checked(&withdrawal("Nothing", 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::WithdrawalNotPositive)
        ));
    }

    #[tokio::test]
    async fn test_list_order_and_delete() {
        let db = db_with_revenue(50_000).await;
        let repo = db.withdrawals();

        let mut early = withdrawal("Tinta", 5_000);
        early.date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        repo.record_checked(&early).await.unwrap();
        let late = withdrawal("Listrik", 10_000);
        repo.record_checked(&late).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].id, late.id);
        assert_eq!(listed[1].date, early.date);
        assert_eq!(repo.total().await.unwrap(), Money::from_minor(15_000));

        let id = repo.resolve(&late.id[..8]).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert_eq!(repo.total().await.unwrap(), Money::from_minor(5_000));
        assert!(repo.get_by_id(&late.id).await.unwrap().is_none());
    }
}
