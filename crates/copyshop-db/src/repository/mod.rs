//! # Repository Module
//!
//! Database repository implementations for Copyshop POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Repository per Record Collection                 │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.transactions().save(&checkout)                             │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐ ┌──────────────────────┐                         │
//! │  │ProductRepository │ │TransactionRepository │                         │
//! │  │ products         │ │ transactions + items │                         │
//! │  └──────────────────┘ └──────────────────────┘                         │
//! │  ┌──────────────────┐ ┌──────────────────────┐                         │
//! │  │WithdrawalRepo... │ │ OrderRepository      │                         │
//! │  │ withdrawals      │ │ printing_orders      │                         │
//! │  └──────────────────┘ └──────────────────────┘                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories only move records in and out. Totals, change and balance
//! rules come from copyshop-core; multi-row writes run in one transaction.

pub mod order;
pub mod product;
pub mod transaction;
pub mod withdrawal;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Resolves a full id, an id prefix or a receipt number (`TRX-1A2B3C4D`)
/// to exactly one record id in `table`.
///
/// ## Results
/// - No match → [`DbError::NotFound`]
/// - Several matches → [`DbError::Ambiguous`]
pub(crate) async fn resolve_id(
    pool: &SqlitePool,
    table: &'static str,
    entity: &'static str,
    reference: &str,
) -> DbResult<String> {
    let trimmed = reference.trim();
    let needle = trimmed
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("TRX-"))
        .map_or(trimmed, |_| &trimmed[4..])
        .to_lowercase();

    if needle.is_empty() {
        return Err(DbError::not_found(entity, reference));
    }

    debug!(table, reference = %needle, "Resolving reference");

    let sql = format!(
        "SELECT id FROM {} WHERE id = ?1 OR id LIKE ?2 ESCAPE '\\' LIMIT 2",
        table
    );
    let ids: Vec<String> = sqlx::query_scalar(&sql)
        .bind(&needle)
        .bind(format!("{}%", escape_like(&needle)))
        .fetch_all(pool)
        .await?;

    if let Some(exact) = ids.iter().find(|id| **id == needle) {
        return Ok(exact.clone());
    }

    match ids.as_slice() {
        [] => Err(DbError::not_found(entity, reference)),
        [id] => Ok(id.clone()),
        _ => Err(DbError::Ambiguous {
            entity: entity.to_string(),
            reference: reference.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("fotokopi"), "fotokopi");
    }
}
