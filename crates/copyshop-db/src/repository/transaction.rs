//! # Transaction Repository
//!
//! Database operations for the transaction ledger (sale headers and items).
//!
//! ## Transaction Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Transaction Lifecycle                               │
//! │                                                                         │
//! │  1. SAVE                                                               │
//! │     └── save(&Checkout) → header + items in one store transaction      │
//! │                                                                         │
//! │  2. REVIEW                                                             │
//! │     └── list(range) / receipt(id)                                      │
//! │                                                                         │
//! │  3. (OPTIONAL) EDIT                                                    │
//! │     └── apply_edits(id, edits) → reconcile() + rewrite items/header    │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete(id) → items go with it (ON DELETE CASCADE)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use copyshop_core::reconcile::reconcile;
use copyshop_core::{
    Checkout, ItemEdit, Money, Receipt, Reconciliation, Transaction, TransactionItem,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::resolve_id;
use crate::error::{DbError, DbResult};

/// Half-open time window `[from, to)`; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub const fn all() -> Self {
        DateRange {
            from: None,
            to: None,
        }
    }

    pub const fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        DateRange { from, to }
    }
}

/// Repository for the transaction ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Saves a checkout: the header and all its items, or nothing.
    pub async fn save(&self, checkout: &Checkout) -> DbResult<()> {
        let header = &checkout.transaction;
        debug!(id = %header.id, items = checkout.items.len(), "Saving transaction");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, created_at, total_amount, payment_amount, change_amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&header.id)
        .bind(header.created_at)
        .bind(header.total_amount)
        .bind(header.payment_amount)
        .bind(header.change_amount)
        .execute(&mut *tx)
        .await?;

        for item in &checkout.items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id, product_code, product_name,
                    quantity, unit_price, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.product_code)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %header.id,
            total = header.total_amount.minor(),
            "Transaction saved"
        );
        Ok(())
    }

    /// Gets a transaction header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, created_at, total_amount, payment_amount, change_amount
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Resolves a full id, id prefix or receipt number to a transaction id.
    pub async fn resolve(&self, reference: &str) -> DbResult<String> {
        resolve_id(&self.pool, "transactions", "Transaction", reference).await
    }

    /// Items of a transaction, in the order they were rung up.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT
                id, transaction_id, product_id, product_code, product_name,
                quantity, unit_price, subtotal
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Header and items of a transaction, ready to print.
    pub async fn receipt(&self, id: &str) -> DbResult<Receipt> {
        let transaction = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;
        let items = self.get_items(id).await?;

        Ok(Receipt::new(transaction, items))
    }

    /// Lists transactions in a time window, newest first.
    pub async fn list(&self, range: DateRange) -> DbResult<Vec<Transaction>> {
        debug!(from = ?range.from, to = ?range.to, "Listing transactions");

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, created_at, total_amount, payment_amount, change_amount
            FROM transactions
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at < ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Sum of all transaction totals.
    pub async fn total_revenue(&self) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_amount), 0) FROM transactions")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_minor(total))
    }

    /// Applies item edits to a saved transaction.
    ///
    /// ## What This Does
    /// 1. Loads header and items inside a store transaction
    /// 2. Recomputes subtotals, total and change with [`reconcile`]
    /// 3. Rewrites the items and the header, then commits
    ///
    /// A business-rule failure ([`DbError::Rejected`]) leaves the
    /// transaction untouched.
    pub async fn apply_edits(&self, id: &str, edits: &[ItemEdit]) -> DbResult<Reconciliation> {
        debug!(id = %id, edits = edits.len(), "Applying report edits");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, created_at, total_amount, payment_amount, change_amount
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Transaction", id))?;

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT
                id, transaction_id, product_id, product_code, product_name,
                quantity, unit_price, subtotal
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = reconcile(&transaction, &items, edits)?;

        for item in &result.items {
            sqlx::query(
                r#"
                UPDATE transaction_items SET
                    quantity = ?2,
                    unit_price = ?3,
                    subtotal = ?4
                WHERE id = ?1
                "#,
            )
            .bind(&item.id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE transactions SET
                total_amount = ?2,
                change_amount = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(result.transaction.total_amount)
        .bind(result.transaction.change_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if result.is_underpaid() {
            warn!(
                id = %id,
                total = result.transaction.total_amount.minor(),
                payment = result.transaction.payment_amount.minor(),
                "Edited transaction total exceeds the payment"
            );
        }

        info!(
            id = %id,
            previous_total = result.previous_total.minor(),
            total = result.transaction.total_amount.minor(),
            "Transaction edited"
        );
        Ok(result)
    }

    /// Deletes a transaction and its items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting transaction");

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        info!(id = %id, "Transaction deleted");
        Ok(())
    }

    /// Counts transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use copyshop_core::{Cart, CoreError, Product};

    async fn setup() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let copy = Product::new("P001", "Fotokopi A4", Money::from_minor(500));
        let bind = Product::new("P002", "Jilid Spiral", Money::from_minor(2000));
        db.products().insert(&copy).await.unwrap();
        db.products().insert(&bind).await.unwrap();
        (db, copy, bind)
    }

    fn checkout(copy: &Product, bind: &Product) -> Checkout {
        let mut cart = Cart::new();
        cart.add_line(copy);
        cart.add_line(copy);
        cart.add_line(bind);
        cart.checkout(Some(Money::from_minor(5000))).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);

        repo.save(&sale).await.unwrap();

        let receipt = repo.receipt(&sale.transaction.id).await.unwrap();
        assert_eq!(receipt.transaction.total_amount, Money::from_minor(3000));
        assert_eq!(receipt.transaction.change_amount, Money::from_minor(2000));
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items[0].product_code, "P001");
        assert_eq!(receipt.items[0].quantity, 2);
        assert_eq!(receipt.items[1].product_code, "P002");

        assert_eq!(repo.total_revenue().await.unwrap(), Money::from_minor(3000));
    }

    #[tokio::test]
    async fn test_resolve_by_receipt_number_and_prefix() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);
        repo.save(&sale).await.unwrap();

        let number = sale.transaction.receipt_number();
        assert_eq!(repo.resolve(&number).await.unwrap(), sale.transaction.id);
        assert_eq!(
            repo.resolve(&sale.transaction.id[..6]).await.unwrap(),
            sale.transaction.id
        );
        assert!(repo.resolve("zzzz").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_range() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();

        let mut old = checkout(&copy, &bind);
        old.transaction.created_at = Utc::now() - Duration::days(3);
        repo.save(&old).await.unwrap();

        let recent = checkout(&copy, &bind);
        repo.save(&recent).await.unwrap();

        assert_eq!(repo.list(DateRange::all()).await.unwrap().len(), 2);

        let since_yesterday = DateRange::new(Some(Utc::now() - Duration::days(1)), None);
        let listed = repo.list(since_yesterday).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, recent.transaction.id);

        let before_yesterday = DateRange::new(None, Some(Utc::now() - Duration::days(1)));
        let listed = repo.list(before_yesterday).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, old.transaction.id);
    }

    #[tokio::test]
    async fn test_apply_edits_updates_items_and_header() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);
        repo.save(&sale).await.unwrap();

        let edit = ItemEdit::new(sale.items[0].id.clone()).quantity(4);
        let result = repo
            .apply_edits(&sale.transaction.id, &[edit])
            .await
            .unwrap();
        assert_eq!(result.transaction.total_amount, Money::from_minor(4000));

        let stored = repo.receipt(&sale.transaction.id).await.unwrap();
        assert_eq!(stored.transaction.total_amount, Money::from_minor(4000));
        assert_eq!(stored.transaction.change_amount, Money::from_minor(1000));
        assert_eq!(stored.items[0].quantity, 4);
        assert_eq!(stored.items[0].subtotal, Money::from_minor(2000));

        let sum: Money = stored.items.iter().map(|i| i.subtotal).sum();
        assert_eq!(sum, stored.transaction.total_amount);
    }

    #[tokio::test]
    async fn test_rejected_edit_leaves_transaction_untouched() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);
        repo.save(&sale).await.unwrap();

        let edits = [
            ItemEdit::new(sale.items[0].id.clone()).quantity(10),
            ItemEdit::new("not-an-item").quantity(1),
        ];
        let err = repo
            .apply_edits(&sale.transaction.id, &edits)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::ItemNotInTransaction { .. })
        ));

        let stored = repo.receipt(&sale.transaction.id).await.unwrap();
        assert_eq!(stored.transaction.total_amount, Money::from_minor(3000));
        assert_eq!(stored.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);
        repo.save(&sale).await.unwrap();

        repo.delete(&sale.transaction.id).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.get_items(&sale.transaction.id).await.unwrap().is_empty());
        assert_eq!(repo.total_revenue().await.unwrap(), Money::zero());
        assert!(repo.delete(&sale.transaction.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deleting_product_keeps_item_snapshot() {
        let (db, copy, bind) = setup().await;
        let repo = db.transactions();
        let sale = checkout(&copy, &bind);
        repo.save(&sale).await.unwrap();

        db.products().delete(&copy.id).await.unwrap();

        let items = repo.get_items(&sale.transaction.id).await.unwrap();
        assert_eq!(items[0].product_id, None);
        assert_eq!(items[0].product_code, "P001");
        assert_eq!(items[0].product_name, "Fotokopi A4");
        assert_eq!(items[1].product_id.as_deref(), Some(bind.id.as_str()));
    }
}
