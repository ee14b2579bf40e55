//! # Report Commands
//!
//! Review and correction of the transaction ledger.
//!
//! ## Editing a Sale
//! ```text
//! report show TRX-1A2B3C4D
//!   #  Item      Code  Name          Qty   Price  Subtotal
//!   1  5f0c2e11  P001  Fotokopi A4    20     250     5.000
//!   2  9d41aa07  P004  Jilid Spiral    1   7.000     7.000
//!
//! report edit TRX-1A2B3C4D --item 1*25 --item 2@6.500
//!   → subtotals, total and change recomputed in one store transaction
//! ```
//! The payment amount never changes. If the new total is above it, the
//! change goes negative and the command says how much is still owed.

use std::io::Write;

use chrono::FixedOffset;
use copyshop_core::report::summarize;
use copyshop_core::validation::{validate_price, validate_quantity};
use copyshop_core::{ItemEdit, Receipt, Transaction, TransactionItem};
use serde::Serialize;
use tracing::{debug, info};

use super::{describe_range, short_id, write_json, write_table};
use crate::cli::{ItemEditArg, RangeArgs, ReportCommand};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::printer::printer_for;
use crate::state::AppContext;

pub async fn run(ctx: &AppContext, command: ReportCommand, out: &mut dyn Write) -> AppResult<()> {
    match command {
        ReportCommand::List { range } => list(ctx, range, out).await,
        ReportCommand::Show { id } => show(ctx, &id, out).await,
        ReportCommand::Edit { id, items } => edit(ctx, &id, &items, out).await,
        ReportCommand::Delete { id } => delete(ctx, &id, out).await,
        ReportCommand::Summary { range } => summary(ctx, range, out).await,
        ReportCommand::Reprint { id } => reprint(ctx, &id, out).await,
    }
}

fn local_time(tx: &Transaction, offset: FixedOffset) -> String {
    tx.created_at
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

async fn list(ctx: &AppContext, range: RangeArgs, out: &mut dyn Write) -> AppResult<()> {
    let offset = ctx.config.utc_offset;
    let range = range.to_date_range(offset)?;
    let transactions = ctx.db.transactions().list(range).await?;

    debug!(count = transactions.len(), "Listing transactions");

    if ctx.json {
        return write_json(out, &transactions);
    }

    if transactions.is_empty() {
        writeln!(out, "No transactions ({})", describe_range(&range))?;
        return Ok(());
    }

    let currency = &ctx.config.currency;
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|tx| {
            vec![
                tx.receipt_number(),
                local_time(tx, offset),
                currency.format(tx.total_amount),
                currency.format(tx.payment_amount),
                currency.format(tx.change_amount),
            ]
        })
        .collect();
    write_table(
        out,
        &["Receipt", "Date", "Total", "Payment", "Change"],
        &rows,
        &[2, 3, 4],
    )
}

fn write_items(ctx: &AppContext, items: &[TransactionItem], out: &mut dyn Write) -> AppResult<()> {
    let currency = &ctx.config.currency;
    let rows: Vec<Vec<String>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                (i + 1).to_string(),
                short_id(&item.id).to_string(),
                item.product_code.clone(),
                item.product_name.clone(),
                item.quantity.to_string(),
                currency.format_number(item.unit_price),
                currency.format_number(item.subtotal),
            ]
        })
        .collect();
    write_table(
        out,
        &["#", "Item", "Code", "Name", "Qty", "Price", "Subtotal"],
        &rows,
        &[0, 4, 5, 6],
    )
}

fn write_totals(ctx: &AppContext, tx: &Transaction, out: &mut dyn Write) -> AppResult<()> {
    let currency = &ctx.config.currency;
    writeln!(out, "Total   : {}", currency.format(tx.total_amount))?;
    writeln!(out, "Payment : {}", currency.format(tx.payment_amount))?;
    writeln!(out, "Change  : {}", currency.format(tx.change_amount))?;
    if tx.change_amount.is_negative() {
        writeln!(
            out,
            "Customer still owes {}",
            currency.format(tx.change_amount.abs())
        )?;
    }
    Ok(())
}

async fn show(ctx: &AppContext, reference: &str, out: &mut dyn Write) -> AppResult<()> {
    let transactions = ctx.db.transactions();
    let id = transactions.resolve(reference).await?;
    let receipt = transactions.receipt(&id).await?;

    if ctx.json {
        return write_json(out, &receipt);
    }

    writeln!(
        out,
        "{}  {}",
        receipt.number(),
        local_time(&receipt.transaction, ctx.config.utc_offset)
    )?;
    writeln!(out, "ID: {}", receipt.transaction.id)?;
    writeln!(out)?;
    write_items(ctx, &receipt.items, out)?;
    writeln!(out)?;
    write_totals(ctx, &receipt.transaction, out)
}

/// Turns `ITEM[*QTY][@PRICE]` arguments into edits against the stored items.
///
/// ITEM is the 1-based position shown by `report show` (up to three digits),
/// or a prefix of the item id.
fn build_edits(
    ctx: &AppContext,
    items: &[TransactionItem],
    args: &[ItemEditArg],
) -> AppResult<Vec<ItemEdit>> {
    args
        .iter()
        .map(|arg| {
            let item = find_item(items, &arg.item)?;
            let mut edit = ItemEdit::new(item.id.clone());
            if let Some(quantity) = arg.quantity {
                validate_quantity(quantity)?;
                edit = edit.quantity(quantity);
            }
            if let Some(price) = &arg.price {
                let price = ctx.config.currency.parse("price", price)?;
                validate_price(price)?;
                edit = edit.unit_price(price);
            }
            Ok(edit)
        })
        .collect()
}

fn find_item<'a>(items: &'a [TransactionItem], reference: &str) -> AppResult<&'a TransactionItem> {
    if reference.len() < 4 {
        if let Ok(position) = reference.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| items.get(i))
                .ok_or_else(|| AppError::not_found("Item", reference));
        }
    }

    let reference = reference.to_ascii_lowercase();
    let mut matches = items.iter().filter(|item| item.id.starts_with(&reference));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => Err(AppError::new(
            ErrorCode::BusinessLogic,
            format!("Item '{}' matches several items, type more characters", reference),
        )),
        (None, _) => Err(AppError::not_found("Item", &reference)),
    }
}

async fn edit(
    ctx: &AppContext,
    reference: &str,
    args: &[ItemEditArg],
    out: &mut dyn Write,
) -> AppResult<()> {
    let transactions = ctx.db.transactions();
    let id = transactions.resolve(reference).await?;
    let items = transactions.get_items(&id).await?;
    let edits = build_edits(ctx, &items, args)?;

    let result = transactions.apply_edits(&id, &edits).await?;

    info!(
        receipt = %result.transaction.receipt_number(),
        difference = result.total_difference().minor(),
        "Report edited"
    );

    if ctx.json {
        return write_json(out, &result);
    }

    let currency = &ctx.config.currency;
    writeln!(
        out,
        "{} updated: total {} -> {}",
        result.transaction.receipt_number(),
        currency.format(result.previous_total),
        currency.format(result.transaction.total_amount)
    )?;
    write_items(ctx, &result.items, out)?;
    writeln!(out)?;
    write_totals(ctx, &result.transaction, out)
}

async fn delete(ctx: &AppContext, reference: &str, out: &mut dyn Write) -> AppResult<()> {
    let transactions = ctx.db.transactions();
    let id = transactions.resolve(reference).await?;
    let tx = transactions
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction", &id))?;

    transactions.delete(&id).await?;

    info!(receipt = %tx.receipt_number(), "Report deleted");
    writeln!(
        out,
        "Deleted {} ({})",
        tx.receipt_number(),
        ctx.config.currency.format(tx.total_amount)
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    #[serde(flatten)]
    summary: copyshop_core::ReportSummary,
    average_sale: copyshop_core::Money,
}

async fn summary(ctx: &AppContext, range: RangeArgs, out: &mut dyn Write) -> AppResult<()> {
    let offset = ctx.config.utc_offset;
    let date_range = range.to_date_range(offset)?;
    let transactions = ctx.db.transactions().list(date_range).await?;
    let summary = summarize(&transactions, offset);

    if ctx.json {
        let average_sale = summary.average_sale();
        return write_json(
            out,
            &SummaryResponse {
                summary,
                average_sale,
            },
        );
    }

    let currency = &ctx.config.currency;
    let period = match (range.from, range.to) {
        (None, None) => "all time".to_string(),
        (from, to) => format!(
            "{} to {}",
            from.map(|d| d.to_string()).unwrap_or_else(|| "start".to_string()),
            to.map(|d| d.to_string()).unwrap_or_else(|| "today".to_string())
        ),
    };

    writeln!(out, "Period       : {}", period)?;
    writeln!(out, "Transactions : {}", summary.count)?;
    writeln!(out, "Revenue      : {}", currency.format(summary.revenue))?;
    writeln!(out, "Average sale : {}", currency.format(summary.average_sale()))?;
    writeln!(out, "Cash in      : {}", currency.format(summary.payments))?;
    writeln!(out, "Change given : {}", currency.format(summary.change))?;

    if !summary.days.is_empty() {
        writeln!(out)?;
        let rows: Vec<Vec<String>> = summary
            .days
            .iter()
            .map(|day| {
                vec![
                    day.date.to_string(),
                    day.count.to_string(),
                    currency.format(day.revenue),
                ]
            })
            .collect();
        write_table(out, &["Date", "Sales", "Revenue"], &rows, &[1, 2])?;
    }
    Ok(())
}

async fn reprint(ctx: &AppContext, reference: &str, out: &mut dyn Write) -> AppResult<()> {
    let transactions = ctx.db.transactions();
    let id = transactions.resolve(reference).await?;
    let receipt: Receipt = transactions.receipt(&id).await?;

    info!(receipt = %receipt.number(), "Reprinting receipt");
    printer_for(&ctx.config).print(&receipt, &ctx.config.receipt_layout(), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use copyshop_core::{Cart, Money, Product};
    use copyshop_db::DateRange;

    /// Stores a sale of 2 x 500 + 1 x 2000 paid with 5000.
    async fn sale(ctx: &AppContext) -> Transaction {
        let copy = Product::new("P001", "Fotokopi A4", Money::from_minor(500));
        let bind = Product::new("P002", "Jilid Spiral", Money::from_minor(2000));
        ctx.db.products().insert(&copy).await.unwrap();
        ctx.db.products().insert(&bind).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&copy);
        cart.add_line(&copy);
        cart.add_line(&bind);
        let checkout = cart.checkout(Some(Money::from_minor(5000))).unwrap();
        ctx.db.transactions().save(&checkout).await.unwrap();
        checkout.transaction
    }

    fn args(items: &[&str]) -> Vec<ItemEditArg> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_list_and_show_by_receipt_number() {
        let ctx = context().await;
        let tx = sale(&ctx).await;

        let mut out = Vec::new();
        list(&ctx, RangeArgs::default(), &mut out).await.unwrap();
        assert!(text(out).contains(&tx.receipt_number()));

        let mut out = Vec::new();
        show(&ctx, &tx.receipt_number(), &mut out).await.unwrap();
        let text = text(out);
        assert!(text.contains("Jilid Spiral"));
        assert!(text.contains("Change  : Rp 2.000"));
    }

    #[tokio::test]
    async fn test_edit_by_position_recomputes_totals() {
        let ctx = context().await;
        let tx = sale(&ctx).await;

        let mut out = Vec::new();
        edit(&ctx, &tx.receipt_number(), &args(&["1*4", "2@1.500"]), &mut out)
            .await
            .unwrap();
        assert!(text(out).contains("total Rp 3.000 -> Rp 3.500"));

        let stored = ctx.db.transactions().get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, Money::from_minor(3500));
        assert_eq!(stored.payment_amount, Money::from_minor(5000));
        assert_eq!(stored.change_amount, Money::from_minor(1500));
    }

    #[tokio::test]
    async fn test_edit_can_leave_customer_owing() {
        let ctx = context().await;
        let tx = sale(&ctx).await;

        let mut out = Vec::new();
        edit(&ctx, &tx.id, &args(&["2*3"]), &mut out).await.unwrap();

        let text = text(out);
        assert!(text.contains("Change  : -Rp 2.000"));
        assert!(text.contains("Customer still owes Rp 2.000"));
    }

    #[tokio::test]
    async fn test_edit_by_item_id_prefix() {
        let ctx = context().await;
        let tx = sale(&ctx).await;
        let items = ctx.db.transactions().get_items(&tx.id).await.unwrap();
        let prefix = items[1].id[..8].to_string();

        edit(&ctx, &tx.id, &args(&[&format!("{}*2", prefix)]), &mut Vec::new())
            .await
            .unwrap();

        let items = ctx.db.transactions().get_items(&tx.id).await.unwrap();
        assert_eq!(items[1].quantity, 2);
        assert_eq!(items[1].subtotal, Money::from_minor(4000));
    }

    #[tokio::test]
    async fn test_edit_unknown_item_changes_nothing() {
        let ctx = context().await;
        let tx = sale(&ctx).await;

        let err = edit(&ctx, &tx.id, &args(&["9*2"]), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let stored = ctx.db.transactions().get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, Money::from_minor(3000));
    }

    #[tokio::test]
    async fn test_summary_and_delete() {
        let ctx = context().await;
        let tx = sale(&ctx).await;
        sale_again(&ctx).await;

        let mut out = Vec::new();
        summary(&ctx, RangeArgs::default(), &mut out).await.unwrap();
        let text_out = text(out);
        assert!(text_out.contains("Transactions : 2"));
        assert!(text_out.contains("Revenue      : Rp 3.500"));

        delete(&ctx, &tx.receipt_number(), &mut Vec::new()).await.unwrap();
        let remaining = ctx.db.transactions().list(DateRange::all()).await.unwrap();
        assert_eq!(remaining.len(), 1);
    }

    /// Second sale of the P001 product already in the catalog.
    async fn sale_again(ctx: &AppContext) {
        let copy = ctx.db.products().require_by_code("P001").await.unwrap();
        let mut cart = Cart::new();
        cart.add_line(&copy);
        let checkout = cart.checkout(Some(Money::from_minor(500))).unwrap();
        ctx.db.transactions().save(&checkout).await.unwrap();
    }

    #[tokio::test]
    async fn test_reprint() {
        let ctx = context().await;
        let tx = sale(&ctx).await;

        let mut out = Vec::new();
        reprint(&ctx, &tx.receipt_number(), &mut out).await.unwrap();
        let text = text(out);
        assert!(text.contains(&tx.receipt_number()));
        assert!(text.contains("PAYMENT"));
    }

    #[tokio::test]
    async fn test_summary_json() {
        let mut ctx = context().await;
        sale(&ctx).await;
        ctx.json = true;

        let mut out = Vec::new();
        summary(&ctx, RangeArgs::default(), &mut out).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["revenue"], 3000);
        assert_eq!(value["average_sale"], 3000);
    }

    #[test]
    fn test_find_item_rejects_unknown() {
        assert!(find_item(&[], "1").is_err());
        assert!(find_item(&[], "abcd").is_err());
    }
}
