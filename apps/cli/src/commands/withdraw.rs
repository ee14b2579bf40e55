//! # Withdrawal Commands
//!
//! Cash taken out of the till, checked against the available balance.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use copyshop_core::validation::validate_withdrawal_label;
use copyshop_core::{BalanceSheet, Withdrawal};
use serde::Serialize;
use tracing::info;

use super::{short_id, write_json, write_table};
use crate::cli::WithdrawCommand;
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

pub async fn run(ctx: &AppContext, command: WithdrawCommand, out: &mut dyn Write) -> AppResult<()> {
    match command {
        WithdrawCommand::List => list(ctx, out).await,
        WithdrawCommand::Balance => balance(ctx, out).await,
        WithdrawCommand::Add {
            amount,
            label,
            date,
        } => add(ctx, &amount, &label, date, out).await,
        WithdrawCommand::Delete { id } => delete(ctx, &id, out).await,
    }
}

async fn list(ctx: &AppContext, out: &mut dyn Write) -> AppResult<()> {
    let withdrawals = ctx.db.withdrawals().list().await?;

    if ctx.json {
        return write_json(out, &withdrawals);
    }

    if withdrawals.is_empty() {
        writeln!(out, "No withdrawals")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = withdrawals
        .iter()
        .map(|w| {
            vec![
                short_id(&w.id).to_string(),
                w.date.to_string(),
                w.label.clone(),
                ctx.config.currency.format(w.amount),
            ]
        })
        .collect();
    write_table(out, &["ID", "Date", "Label", "Amount"], &rows, &[3])
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    total_revenue: i64,
    total_withdrawals: i64,
    available_balance: i64,
}

impl From<BalanceSheet> for BalanceResponse {
    fn from(sheet: BalanceSheet) -> Self {
        BalanceResponse {
            total_revenue: sheet.total_revenue().minor(),
            total_withdrawals: sheet.total_withdrawals().minor(),
            available_balance: sheet.available_balance().minor(),
        }
    }
}

fn write_balance(ctx: &AppContext, sheet: &BalanceSheet, out: &mut dyn Write) -> AppResult<()> {
    let currency = &ctx.config.currency;
    writeln!(out, "Revenue     : {}", currency.format(sheet.total_revenue()))?;
    writeln!(out, "Withdrawals : {}", currency.format(sheet.total_withdrawals()))?;
    writeln!(out, "Available   : {}", currency.format(sheet.available_balance()))?;
    Ok(())
}

async fn balance(ctx: &AppContext, out: &mut dyn Write) -> AppResult<()> {
    let sheet = ctx.db.withdrawals().balance().await?;

    if ctx.json {
        return write_json(out, &BalanceResponse::from(sheet));
    }
    write_balance(ctx, &sheet, out)
}

async fn add(
    ctx: &AppContext,
    amount: &str,
    label: &str,
    date: Option<NaiveDate>,
    out: &mut dyn Write,
) -> AppResult<()> {
    validate_withdrawal_label(label)?;
    let amount = ctx.config.currency.parse("amount", amount)?;
    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&ctx.config.utc_offset).date_naive());

    let withdrawal = Withdrawal::new(date, label.trim(), amount);
    let after = ctx
        .db
        .withdrawals()
        .record_checked(&withdrawal)
        .await
        .map_err(|e| AppError::from_db(e, &ctx.config.currency))?;

    info!(id = %withdrawal.id, amount = amount.minor(), "Withdrawal added");

    if ctx.json {
        return write_json(out, &BalanceResponse::from(after));
    }

    writeln!(
        out,
        "Withdrew {} for '{}' on {}",
        ctx.config.currency.format(amount),
        withdrawal.label,
        withdrawal.date
    )?;
    write_balance(ctx, &after, out)
}

async fn delete(ctx: &AppContext, reference: &str, out: &mut dyn Write) -> AppResult<()> {
    let withdrawals = ctx.db.withdrawals();
    let id = withdrawals.resolve(reference).await?;
    withdrawals.delete(&id).await?;

    writeln!(out, "Deleted withdrawal {}", short_id(&id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use copyshop_core::{Cart, Money, Product};

    async fn revenue(ctx: &AppContext, amount: i64) {
        let product = Product::new("P001", "Print", Money::from_minor(amount));
        ctx.db.products().insert(&product).await.unwrap();
        let mut cart = Cart::new();
        cart.add_line(&product);
        let checkout = cart.checkout(Some(Money::from_minor(amount))).unwrap();
        ctx.db.transactions().save(&checkout).await.unwrap();
    }

    #[tokio::test]
    async fn test_withdraw_within_balance() {
        let ctx = context().await;
        revenue(&ctx, 100_000).await;

        let mut out = Vec::new();
        add(&ctx, "30.000", "Beli kertas", None, &mut out).await.unwrap();
        assert!(text(out).contains("Available   : Rp 70.000"));

        let mut out = Vec::new();
        list(&ctx, &mut out).await.unwrap();
        assert!(text(out).contains("Beli kertas"));
    }

    #[tokio::test]
    async fn test_withdraw_over_balance_rejected() {
        let ctx = context().await;
        revenue(&ctx, 100_000).await;
        add(&ctx, "30000", "Listrik", None, &mut Vec::new()).await.unwrap();

        let err = add(&ctx, "80000", "Sewa", None, &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BalanceError);
        assert_eq!(ctx.db.withdrawals().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_balance_error_uses_shop_currency() {
        let ctx = dollar_context().await;
        revenue(&ctx, 1_099).await;

        let err = add(&ctx, "20.00", "Paper", None, &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BalanceError);
        assert_eq!(
            err.message,
            "Withdrawal $20.00 exceeds available balance $10.99"
        );
    }

    #[tokio::test]
    async fn test_zero_and_blank_label_rejected() {
        let ctx = context().await;
        revenue(&ctx, 10_000).await;

        let err = add(&ctx, "0", "Kosong", None, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BalanceError);

        let err = add(&ctx, "100", " ", None, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_restores_balance() {
        let ctx = context().await;
        revenue(&ctx, 50_000).await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);
        add(&ctx, "20000", "Tinta", date, &mut Vec::new()).await.unwrap();

        let id = ctx.db.withdrawals().list().await.unwrap()[0].id.clone();
        delete(&ctx, &id[..8], &mut Vec::new()).await.unwrap();

        let mut out = Vec::new();
        balance(&ctx, &mut out).await.unwrap();
        assert!(text(out).contains("Available   : Rp 50.000"));
    }
}
