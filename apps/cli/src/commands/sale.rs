//! # Sale Commands
//!
//! Checkout shared by the one-shot `sell` command and the register session.
//!
//! ```text
//! Cart ──checkout(payment)──► Checkout ──save()──► ledger
//!                                 │
//!                                 └──► Receipt ──printer──► console / html / lp
//!                                         │
//!                                         └──► cart cleared
//! ```
//! The cart is only cleared after the transaction is stored. A rejected
//! checkout (empty cart, payment short) leaves it as it was.

use std::io::Write;

use copyshop_core::{Cart, Money, Receipt};
use serde::Serialize;
use tracing::{info, warn};

use super::write_json;
use crate::cli::{ItemArg, SellArgs};
use crate::error::{AppError, AppResult};
use crate::printer::printer_for;
use crate::state::{AppContext, PrinterKind};

#[derive(Debug, Serialize)]
struct SaleResponse<'a> {
    receipt_number: String,
    #[serde(flatten)]
    receipt: &'a Receipt,
}

/// `copyshop sell --pay AMOUNT ITEM...`
pub async fn sell(ctx: &AppContext, args: SellArgs, out: &mut dyn Write) -> AppResult<()> {
    let mut cart = Cart::new();
    for arg in &args.items {
        add_item(ctx, &mut cart, arg).await?;
    }

    let payment = ctx.config.currency.parse("payment", &args.pay)?;
    complete_sale(ctx, &mut cart, payment, out).await?;
    Ok(())
}

/// Adds one `CODE[*QTY][@PRICE][:NAME]` item to the cart.
async fn add_item(ctx: &AppContext, cart: &mut Cart, arg: &ItemArg) -> AppResult<()> {
    let product = ctx.db.products().require_by_code(&arg.code).await?;

    cart.add_line(&product);
    if arg.quantity > 1 {
        cart.adjust_quantity(&product.id, arg.quantity - 1)?;
    }
    if let Some(price) = &arg.price {
        let price = ctx.config.currency.parse("price", price)?;
        cart.set_display_price(&product.id, price)?;
    }
    if let Some(name) = &arg.name {
        cart.set_display_name(&product.id, name)?;
    }
    Ok(())
}

/// Checks out the cart, stores the transaction, prints the receipt and
/// clears the cart.
///
/// ## Returns
/// * `Ok(Receipt)` - The stored sale; a printer failure is reported on `out`
///   but does not fail the sale
/// * `Err(AppError)` - Checkout rejected or not stored; the cart is untouched
pub async fn complete_sale(
    ctx: &AppContext,
    cart: &mut Cart,
    payment: Money,
    out: &mut dyn Write,
) -> AppResult<Receipt> {
    let checkout = cart
        .checkout(Some(payment))
        .map_err(|e| AppError::from_core(e, &ctx.config.currency))?;
    ctx.db.transactions().save(&checkout).await?;

    let receipt = Receipt::from(checkout);
    cart.clear();

    info!(
        receipt = %receipt.number(),
        total = receipt.transaction.total_amount.minor(),
        change = receipt.transaction.change_amount.minor(),
        "Sale completed"
    );

    if ctx.json {
        write_json(
            out,
            &SaleResponse {
                receipt_number: receipt.number(),
                receipt: &receipt,
            },
        )?;
        if ctx.config.printer == PrinterKind::Stdout {
            return Ok(receipt);
        }
    }

    let layout = ctx.config.receipt_layout();
    let printer = printer_for(&ctx.config);
    if let Err(e) = printer.print(&receipt, &layout, out) {
        warn!(receipt = %receipt.number(), error = %e, "Receipt not printed");
        writeln!(
            out,
            "Sale {} saved but the receipt was not printed: {}",
            receipt.number(),
            e
        )?;
    }

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use copyshop_core::Product;
    use copyshop_db::DateRange;

    async fn seed(ctx: &AppContext) {
        let products = ctx.db.products();
        products
            .insert(&Product::new("P001", "Fotokopi A4", Money::from_minor(500)))
            .await
            .unwrap();
        products
            .insert(&Product::new("P002", "Jilid Spiral", Money::from_minor(2000)))
            .await
            .unwrap();
    }

    fn args(pay: &str, items: &[&str]) -> SellArgs {
        SellArgs {
            pay: pay.to_string(),
            items: items.iter().map(|i| i.parse().unwrap()).collect(),
        }
    }

    #[tokio::test]
    async fn test_sell_stores_and_prints() {
        let ctx = context().await;
        seed(&ctx).await;

        let mut out = Vec::new();
        sell(&ctx, args("5000", &["P001*2", "P002"]), &mut out)
            .await
            .unwrap();

        let text = text(out);
        assert!(text.contains("TOTAL"));
        assert!(text.contains("3.000"));
        assert!(text.contains("2.000"));

        let stored = ctx.db.transactions().list(DateRange::all()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_amount, Money::from_minor(3000));
        assert_eq!(stored[0].change_amount, Money::from_minor(2000));
    }

    #[tokio::test]
    async fn test_sell_with_overrides() {
        let ctx = context().await;
        seed(&ctx).await;

        let mut out = Vec::new();
        sell(&ctx, args("10000", &["P002*2@3.500:Jilid Biru"]), &mut out)
            .await
            .unwrap();

        let tx = &ctx.db.transactions().list(DateRange::all()).await.unwrap()[0];
        let items = ctx.db.transactions().get_items(&tx.id).await.unwrap();
        assert_eq!(items[0].product_name, "Jilid Biru");
        assert_eq!(items[0].unit_price, Money::from_minor(3500));
        assert_eq!(tx.total_amount, Money::from_minor(7000));
    }

    #[tokio::test]
    async fn test_insufficient_payment_stores_nothing() {
        let ctx = context().await;
        seed(&ctx).await;

        let err = sell(&ctx, args("1000", &["P002"]), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(ctx.db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_payment_error_uses_shop_currency() {
        let ctx = dollar_context().await;
        ctx.db
            .products()
            .insert(&Product::new("P001", "Color print", Money::from_minor(1099)))
            .await
            .unwrap();

        let err = sell(&ctx, args("10", &["P001"]), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Payment $10.00 is less than total $10.99");
    }

    #[tokio::test]
    async fn test_huge_quantity_stores_nothing() {
        let ctx = context().await;
        seed(&ctx).await;

        let item = format!("P001*{}", i64::MAX);
        let err = sell(&ctx, args("1", &[item.as_str()]), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "subtotal is too large");
        assert_eq!(ctx.db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let ctx = context().await;
        let err = sell(&ctx, args("1000", &["NOPE"]), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_complete_sale_clears_cart_only_on_success() {
        let ctx = context().await;
        seed(&ctx).await;
        let product = ctx.db.products().require_by_code("P001").await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&product);

        let mut out = Vec::new();
        assert!(complete_sale(&ctx, &mut cart, Money::from_minor(100), &mut out)
            .await
            .is_err());
        assert_eq!(cart.line_count(), 1);

        let receipt = complete_sale(&ctx, &mut cart, Money::from_minor(500), &mut out)
            .await
            .unwrap();
        assert!(cart.is_empty());
        assert!(receipt.transaction.change_amount.is_zero());
    }

    #[tokio::test]
    async fn test_printer_failure_keeps_sale() {
        let mut ctx = context().await;
        seed(&ctx).await;
        ctx.config.printer = PrinterKind::System;
        ctx.config.print_command = "copyshop-no-such-printer-command".to_string();

        let mut out = Vec::new();
        sell(&ctx, args("500", &["P001"]), &mut out).await.unwrap();

        assert!(text(out).contains("receipt was not printed"));
        assert_eq!(ctx.db.transactions().count().await.unwrap(), 1);
    }
}
