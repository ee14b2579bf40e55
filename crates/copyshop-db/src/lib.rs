//! # copyshop-db: Database Layer for Copyshop POS
//!
//! This crate provides the record store for the copy shop register.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Copyshop POS Data Flow                            │
//! │                                                                         │
//! │  CLI command (copyshop sell ...)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   copyshop-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ Product        │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Transaction    │   │ 001_initial  │  │   │
//! │  │   │               │    │ Withdrawal     │   │ _schema.sql  │  │   │
//! │  │   │               │    │ Order          │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        <data dir>/copyshop/copyshop.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use copyshop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("copyshop.db")).await?;
//!
//! let products = db.products().search("fotokopi").await?;
//! let balance = db.withdrawals().balance().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::product::ProductRepository;
pub use repository::transaction::{DateRange, TransactionRepository};
pub use repository::withdrawal::WithdrawalRepository;
