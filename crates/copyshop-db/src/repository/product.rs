//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Listing and substring search over code and name
//! - Lookup by code (what the cashier types) or id
//! - CRUD, with the code kept unique (case-insensitive)
//!
//! ## Deleting Products
//! Deletion is a hard delete. Sold items keep their code/name/price
//! snapshot; their `product_id` is set to NULL by the foreign key.

use chrono::Utc;
use copyshop_core::catalog::next_product_code;
use copyshop_core::Product;
use sqlx::SqlitePool;
use tracing::debug;

use super::escape_like;
use crate::error::{DbError, DbResult};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("fotokopi").await?;
/// let product = repo.get_by_code("P001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, price, created_at, updated_at
            FROM products
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products whose code or name contains `query`
    /// (case-insensitive). An empty query lists everything.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", escape_like(query));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, price, created_at, updated_at
            FROM products
            WHERE code LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\'
            ORDER BY code
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, price, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its code (case-insensitive).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, price, created_at, updated_at
            FROM products
            WHERE code = ?1
            "#,
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Like [`get_by_code`](Self::get_by_code), but a missing product is an error.
    pub async fn require_by_code(&self, code: &str) -> DbResult<Product> {
        self.get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Product", code.trim()))
    }

    /// Code for the next product created without one (`P001`, `P002`, ...).
    pub async fn next_code(&self) -> DbResult<String> {
        let codes: Vec<String> = sqlx::query_scalar("SELECT code FROM products")
            .fetch_all(&self.pool)
            .await?;

        Ok(next_product_code(codes))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, code, name, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e.into(), &product.code))?;

        Ok(product.clone())
    }

    /// Updates code, name and price of an existing product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as stored, with a fresh `updated_at`
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New code already taken
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, code = %product.code, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                price = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e.into(), &product.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        let mut updated = product.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Deletes a product from the catalog.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fills in the offending code on a unique violation.
fn with_code(err: DbError, code: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
