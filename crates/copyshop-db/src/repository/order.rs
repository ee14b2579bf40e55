//! # Printing Order Repository
//!
//! Database operations for the printing-order board.
//!
//! ## Board Lifecycle
//! ```text
//! insert() ──► pending ──toggle_paid()──────► paid ─────┐
//!                 │                                     │ toggle_completed()
//!                 └──toggle_completed()──► completed ───┤
//!                                                       ▼
//!                                                     done ──► delete()
//! ```
//! Both toggles are single `UPDATE ... SET flag = NOT flag` statements, so
//! two clients flipping the same flag never lose an update.

use chrono::Utc;
use copyshop_core::{OrderStatus, PrintingOrder};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::resolve_id;
use crate::error::{DbError, DbResult};

/// Which orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    /// Everything not yet both paid and completed.
    Open,
    Status(OrderStatus),
}

impl OrderFilter {
    pub fn matches(&self, order: &PrintingOrder) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Open => order.status().is_open(),
            OrderFilter::Status(status) => order.status() == *status,
        }
    }
}

/// Repository for printing orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists orders matching `filter`, newest first.
    pub async fn list(&self, filter: OrderFilter) -> DbResult<Vec<PrintingOrder>> {
        debug!(filter = ?filter, "Listing printing orders");

        let orders = sqlx::query_as::<_, PrintingOrder>(
            r#"
            SELECT
                id, customer_name, phone, description,
                is_paid, is_completed, created_at, updated_at
            FROM printing_orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PrintingOrder>> {
        let order = sqlx::query_as::<_, PrintingOrder>(
            r#"
            SELECT
                id, customer_name, phone, description,
                is_paid, is_completed, created_at, updated_at
            FROM printing_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Resolves a full id or id prefix to an order id.
    pub async fn resolve(&self, reference: &str) -> DbResult<String> {
        resolve_id(&self.pool, "printing_orders", "Printing order", reference).await
    }

    /// Inserts a new order.
    pub async fn insert(&self, order: &PrintingOrder) -> DbResult<PrintingOrder> {
        debug!(id = %order.id, customer = %order.customer_name, "Inserting printing order");

        sqlx::query(
            r#"
            INSERT INTO printing_orders (
                id, customer_name, phone, description,
                is_paid, is_completed, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(&order.description)
        .bind(order.is_paid)
        .bind(order.is_completed)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %order.id, "Printing order created");
        Ok(order.clone())
    }

    /// Flips the paid flag and returns the updated order.
    pub async fn toggle_paid(&self, id: &str) -> DbResult<PrintingOrder> {
        self.toggle(id, "is_paid").await
    }

    /// Flips the completed flag and returns the updated order.
    pub async fn toggle_completed(&self, id: &str) -> DbResult<PrintingOrder> {
        self.toggle(id, "is_completed").await
    }

    async fn toggle(&self, id: &str, column: &'static str) -> DbResult<PrintingOrder> {
        debug!(id = %id, column, "Toggling printing order flag");

        let sql = format!(
            "UPDATE printing_orders SET {column} = NOT {column}, updated_at = ?2 WHERE id = ?1"
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printing order", id));
        }

        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Printing order", id))?;

        info!(id = %id, status = %order.status(), "Printing order updated");
        Ok(order)
    }

    /// Deletes an order from the board.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting printing order");

        let result = sqlx::query("DELETE FROM printing_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printing order", id));
        }

        info!(id = %id, "Printing order deleted");
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

    async fn repo() -> OrderRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().orders()
    }

    #[tokio::test]
    async fn test_insert_and_toggle() {
        let repo = repo().await;
        let order = PrintingOrder::new("Siti", Some("0812345".to_string()), "Print undangan 200");
        repo.insert(&order).await.unwrap();

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
        assert_eq!(stored.phone.as_deref(), Some("0812345"));

        let paid = repo.toggle_paid(&order.id).await.unwrap();
        assert!(paid.is_paid);
        assert!(!paid.is_completed);

        let done = repo.toggle_completed(&order.id).await.unwrap();
        assert_eq!(done.status(), OrderStatus::Done);

        let unpaid = repo.toggle_paid(&order.id).await.unwrap();
        assert_eq!(unpaid.status(), OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let repo = repo().await;
        let pending = PrintingOrder::new("A", None, "Jilid");
        let done = PrintingOrder::new("B", None, "Laminating");
        repo.insert(&pending).await.unwrap();
        repo.insert(&done).await.unwrap();
        repo.toggle_paid(&done.id).await.unwrap();
        repo.toggle_completed(&done.id).await.unwrap();

        assert_eq!(repo.list(OrderFilter::All).await.unwrap().len(), 2);

        let open = repo.list(OrderFilter::Open).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, pending.id);

        let finished = repo
            .list(OrderFilter::Status(OrderStatus::Done))
            .await
            .unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].customer_name, "B");
    }

    #[tokio::test]
    async fn test_missing_order() {
        let repo = repo().await;
        assert!(repo.toggle_paid("missing").await.unwrap_err().is_not_found());
        assert!(repo.delete("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let order = PrintingOrder::new("C", None, "Scan dokumen");
        repo.insert(&order).await.unwrap();

        let id = repo.resolve(&order.id[..8]).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(repo.list(OrderFilter::All).await.unwrap().is_empty());
    }
}
