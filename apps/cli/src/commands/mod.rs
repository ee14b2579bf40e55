//! # Command Handlers
//!
//! One module per command group.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── dispatch, status, output helpers
//! ├── product.rs   ◄─── catalog CRUD
//! ├── sale.rs      ◄─── one-shot sale, shared checkout + print
//! ├── register.rs  ◄─── interactive cart session
//! ├── report.rs    ◄─── transaction ledger review and edits
//! ├── withdraw.rs  ◄─── withdrawal ledger and balance
//! └── order.rs     ◄─── printing-order board
//! ```
//!
//! Every handler takes the [`AppContext`], its parsed arguments and the
//! writer it reports to. Tests pass a `Vec<u8>` and inspect the output.

pub mod order;
pub mod product;
pub mod register;
pub mod report;
pub mod sale;
pub mod withdraw;

use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::debug;

use crate::cli::Command;
use crate::error::AppResult;
use crate::state::AppContext;
use copyshop_db::{DateRange, OrderFilter};

/// Runs one parsed command.
///
/// `input` is only read by the interactive register.
pub async fn dispatch(
    ctx: &AppContext,
    command: Command,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> AppResult<()> {
    debug!(?command, "Dispatching command");

    match command {
        Command::Product(cmd) => product::run(ctx, cmd, out).await,
        Command::Sell(args) => sale::sell(ctx, args, out).await,
        Command::Register => register::run(ctx, input, out).await,
        Command::Report(cmd) => report::run(ctx, cmd, out).await,
        Command::Withdraw(cmd) => withdraw::run(ctx, cmd, out).await,
        Command::Order(cmd) => order::run(ctx, cmd, out).await,
        Command::Status => status(ctx, out).await,
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    healthy: bool,
    migrations_applied: usize,
    migrations_total: usize,
    products: i64,
    transactions: i64,
    withdrawals: usize,
    open_orders: usize,
    total_revenue: i64,
    total_withdrawals: i64,
    available_balance: i64,
}

/// Database health and a one-screen overview of the ledgers.
pub async fn status(ctx: &AppContext, out: &mut dyn Write) -> AppResult<()> {
    let db = &ctx.db;
    let healthy = db.health_check().await;
    let (migrations_total, migrations_applied) = db.migration_status().await?;
    let balance = db.withdrawals().balance().await?;

    let report = StatusReport {
        healthy,
        migrations_applied,
        migrations_total,
        products: db.products().count().await?,
        transactions: db.transactions().count().await?,
        withdrawals: db.withdrawals().list().await?.len(),
        open_orders: db.orders().list(OrderFilter::Open).await?.len(),
        total_revenue: balance.total_revenue().minor(),
        total_withdrawals: balance.total_withdrawals().minor(),
        available_balance: balance.available_balance().minor(),
    };

    if ctx.json {
        return write_json(out, &report);
    }

    let currency = &ctx.config.currency;
    writeln!(out, "Database     : {}", if healthy { "ok" } else { "unreachable" })?;
    writeln!(out, "Migrations   : {}/{}", migrations_applied, migrations_total)?;
    writeln!(out, "Products     : {}", report.products)?;
    writeln!(out, "Transactions : {}", report.transactions)?;
    writeln!(out, "Withdrawals  : {}", report.withdrawals)?;
    writeln!(out, "Open orders  : {}", report.open_orders)?;
    writeln!(out, "Revenue      : {}", currency.format(balance.total_revenue()))?;
    writeln!(out, "Withdrawn    : {}", currency.format(balance.total_withdrawals()))?;
    writeln!(out, "Balance      : {}", currency.format(balance.available_balance()))?;
    Ok(())
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Writes rows as a left-aligned table; columns listed in `right` are
/// right-aligned.
pub(crate) fn write_table(
    out: &mut dyn Write,
    headers: &[&str],
    rows: &[Vec<String>],
    right: &[usize],
) -> AppResult<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                if right.contains(&i) {
                    format!("{:>width$}", cell, width = width)
                } else {
                    format!("{:<width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", format_row(headers.to_vec()))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for row in rows {
        writeln!(out, "{}", format_row(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

/// First 8 characters of an id, enough to reference it on the command line.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Human description of a report range for headings.
pub(crate) fn describe_range(range: &DateRange) -> String {
    match (range.from, range.to) {
        (None, None) => "all time".to_string(),
        _ => format!(
            "{} .. {}",
            range.from.map(|d| d.to_rfc3339()).unwrap_or_else(|| "start".to_string()),
            range.to.map(|d| d.to_rfc3339()).unwrap_or_else(|| "now".to_string()),
        ),
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use copyshop_core::CurrencyFormat;
    use copyshop_db::{Database, DbConfig};

    use crate::state::{AppContext, ShopConfig};

    /// In-memory database with Rupiah defaults at UTC+7.
    pub async fn context() -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ShopConfig {
            utc_offset: chrono::FixedOffset::east_opt(7 * 3600).unwrap(),
            ..ShopConfig::default()
        };
        AppContext::new(db, config, false)
    }

    /// Like [`context`], with dollars and cents.
    pub async fn dollar_context() -> AppContext {
        let mut ctx = context().await;
        ctx.config.currency = CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 2,
            thousands_separator: ',',
            decimal_separator: '.',
        };
        ctx
    }

    pub fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }
}
