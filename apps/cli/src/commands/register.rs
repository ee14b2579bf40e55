//! # Register Session
//!
//! Interactive cart for the counter. One cart per session, lost on quit.
//!
//! ```text
//! > add P001           Fotokopi A4 x1
//! > qty P001 19        Fotokopi A4 x20
//! > add P004           Jilid Spiral x1
//! > price P004 9000
//! > show
//! > pay 20000          receipt printed, cart emptied
//! > quit
//! ```
//!
//! A failing command prints its error and the session goes on.

use std::io::{BufRead, Write};

use copyshop_core::{Cart, CoreError};
use tracing::{debug, info, warn};

use super::sale::complete_sale;
use super::write_table;
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

const HELP: &str = "\
Commands:
  add CODE            add one unit (new line or +1)
  inc CODE            +1
  dec CODE            -1, removes the line at 0
  remove CODE         drop the line
  qty CODE DELTA      change quantity by DELTA (e.g. 10 or -3)
  price CODE AMOUNT   price charged for this sale only
  name CODE TEXT      name printed for this sale only
  show                show the cart
  clear               empty the cart
  pay AMOUNT          check out and print the receipt
  help                this text
  quit                leave (the cart is discarded)";

/// What the session loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the session until `quit` or end of input.
pub async fn run(ctx: &AppContext, input: &mut dyn BufRead, out: &mut dyn Write) -> AppResult<()> {
    let mut cart = Cart::new();
    info!("Register session started");

    writeln!(out, "{} register. Type 'help' for commands.", ctx.config.shop_name)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        match execute(ctx, &mut cart, line.trim(), out).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                warn!(code = ?e.code, error = %e, "Register command failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    if !cart.is_empty() {
        warn!(lines = cart.line_count(), "Register closed with unpaid cart");
        writeln!(out, "Discarded {} unpaid line(s)", cart.line_count())?;
    }
    info!("Register session ended");
    Ok(())
}

async fn execute(
    ctx: &AppContext,
    cart: &mut Cart,
    line: &str,
    out: &mut dyn Write,
) -> AppResult<Flow> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    debug!(command, "Register command");

    match command.to_ascii_lowercase().as_str() {
        "" => {}
        "add" | "inc" => {
            let code = single_arg(rest, "CODE")?;
            let existing = cart.line_by_code(code).map(|line| line.product_id.clone());
            let quantity = match existing {
                Some(id) => cart.adjust_quantity(&id, 1)?,
                None => {
                    let product = ctx.db.products().require_by_code(code).await?;
                    cart.add_line(&product)
                }
            };
            report_line(ctx, cart, code, quantity, out)?;
        }
        "dec" => {
            let code = single_arg(rest, "CODE")?;
            let id = line_id(cart, code)?;
            let quantity = cart.adjust_quantity(&id, -1)?;
            report_line(ctx, cart, code, quantity, out)?;
        }
        "remove" | "rm" => {
            let code = single_arg(rest, "CODE")?;
            let id = line_id(cart, code)?;
            cart.remove_line(&id)?;
            report_line(ctx, cart, code, 0, out)?;
        }
        "qty" => {
            let (code, delta) = two_args(rest, "CODE DELTA")?;
            let delta: i64 = delta
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid quantity change '{}'", delta)))?;
            let id = line_id(cart, code)?;
            let quantity = cart.adjust_quantity(&id, delta)?;
            report_line(ctx, cart, code, quantity, out)?;
        }
        "price" => {
            let (code, amount) = two_args(rest, "CODE AMOUNT")?;
            let price = ctx.config.currency.parse("price", amount)?;
            let id = line_id(cart, code)?;
            cart.set_display_price(&id, price)?;
            writeln!(out, "{} now {}", code, ctx.config.currency.format(price))?;
        }
        "name" => {
            let (code, name) = two_args(rest, "CODE TEXT")?;
            let id = line_id(cart, code)?;
            cart.set_display_name(&id, name)?;
            writeln!(out, "{} now '{}'", code, name.trim())?;
        }
        "show" => show(ctx, cart, out)?,
        "clear" => {
            cart.clear();
            writeln!(out, "Cart cleared")?;
        }
        "pay" => {
            if rest.is_empty() {
                return Err(AppError::from(CoreError::PaymentRequired));
            }
            let payment = ctx.config.currency.parse("payment", rest)?;
            let receipt = complete_sale(ctx, cart, payment, out).await?;
            writeln!(
                out,
                "Change: {}",
                ctx.config.currency.format(receipt.transaction.change_amount)
            )?;
        }
        "help" | "?" => writeln!(out, "{}", HELP)?,
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => {
            return Err(AppError::validation(format!(
                "Unknown command '{}', type 'help'",
                other
            )))
        }
    }

    Ok(Flow::Continue)
}

fn single_arg<'a>(rest: &'a str, usage: &str) -> AppResult<&'a str> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(AppError::validation(format!("Expected {}", usage)));
    }
    Ok(rest)
}

fn two_args<'a>(rest: &'a str, usage: &str) -> AppResult<(&'a str, &'a str)> {
    rest.split_once(char::is_whitespace)
        .map(|(first, second)| (first, second.trim()))
        .filter(|(_, second)| !second.is_empty())
        .ok_or_else(|| AppError::validation(format!("Expected {}", usage)))
}

/// Product id of the cart line added with `code`.
fn line_id(cart: &Cart, code: &str) -> AppResult<String> {
    cart.line_by_code(code)
        .map(|line| line.product_id.clone())
        .ok_or_else(|| CoreError::LineNotInCart(code.to_string()).into())
}

fn report_line(
    ctx: &AppContext,
    cart: &Cart,
    code: &str,
    quantity: i64,
    out: &mut dyn Write,
) -> AppResult<()> {
    match cart.line_by_code(code) {
        Some(line) => writeln!(
            out,
            "{} x{}  (total {})",
            line.display_name,
            quantity,
            ctx.config.currency.format(cart.total())
        )?,
        None => writeln!(
            out,
            "{} removed  (total {})",
            code,
            ctx.config.currency.format(cart.total())
        )?,
    }
    Ok(())
}

fn show(ctx: &AppContext, cart: &Cart, out: &mut dyn Write) -> AppResult<()> {
    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    let currency = &ctx.config.currency;
    let rows: Vec<Vec<String>> = cart
        .lines()
        .iter()
        .map(|line| {
            vec![
                line.product_code.clone(),
                line.display_name.clone(),
                line.quantity.to_string(),
                currency.format(line.display_price),
                currency.format(line.subtotal()),
            ]
        })
        .collect();
    write_table(out, &["Code", "Name", "Qty", "Price", "Subtotal"], &rows, &[2, 3, 4])?;
    writeln!(
        out,
        "{} item(s), total {}",
        cart.total_quantity(),
        currency.format(cart.total())
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use copyshop_core::{Money, Product};
    use copyshop_db::DateRange;
    use std::io::Cursor;

    async fn session(ctx: &AppContext, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(ctx, &mut input, &mut out).await.unwrap();
        text(out)
    }

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

    #[tokio::test]
    async fn test_full_sale_session() {
        let ctx = context().await;
        seed(&ctx).await;

        let output = session(&ctx, "add P001\ninc p001\nadd P002\nshow\npay 5000\nquit\n").await;

        assert!(output.contains("Fotokopi A4 x2"));
        assert!(output.contains("3 item(s), total Rp 3.000"));
        assert!(output.contains("Change: Rp 2.000"));

        let stored = ctx.db.transactions().list(DateRange::all()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_amount, Money::from_minor(3000));
    }

    #[tokio::test]
    async fn test_errors_do_not_end_session() {
        let ctx = context().await;
        seed(&ctx).await;

        let output = session(&ctx, "pay 1000\nadd NOPE\nfly\nadd P002\npay 1000\npay 2000\n").await;

        assert!(output.contains("Error: Cart is empty"));
        assert!(output.contains("Error: Product not found: NOPE"));
        assert!(output.contains("Unknown command 'fly'"));
        assert!(output.contains("Error: Payment Rp 1.000 is less than total Rp 2.000"));
        assert!(output.contains("Change: Rp 0"));
        assert_eq!(ctx.db.transactions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dec_to_zero_removes_line() {
        let ctx = context().await;
        seed(&ctx).await;

        let output = session(&ctx, "add P001\ndec P001\nshow\ndec P001\n").await;

        assert!(output.contains("P001 removed"));
        assert!(output.contains("Cart is empty"));
        assert!(output.contains("Error: Product P001 is not in the cart"));
    }

    #[tokio::test]
    async fn test_remove_drops_whole_line() {
        let ctx = context().await;
        seed(&ctx).await;

        let output = session(&ctx, "add P001\nqty P001 4\nadd P002\nremove P001\nshow\n").await;

        assert!(output.contains("P001 removed"));
        assert!(output.contains("1 item(s), total Rp 2.000"));
    }

    #[tokio::test]
    async fn test_overrides_and_qty() {
        let ctx = context().await;
        seed(&ctx).await;

        session(
            &ctx,
            "add P001\nqty P001 9\nprice P001 300\nname P001 Fotokopi KTP\npay Rp 3.000\n",
        )
        .await;

        let tx = &ctx.db.transactions().list(DateRange::all()).await.unwrap()[0];
        let items = ctx.db.transactions().get_items(&tx.id).await.unwrap();
        assert_eq!(items[0].quantity, 10);
        assert_eq!(items[0].unit_price, Money::from_minor(300));
        assert_eq!(items[0].product_name, "Fotokopi KTP");
        assert!(tx.change_amount.is_zero());
    }

    #[tokio::test]
    async fn test_unpaid_cart_is_reported_on_exit() {
        let ctx = context().await;
        seed(&ctx).await;

        let output = session(&ctx, "add P001\n").await;
        assert!(output.contains("Discarded 1 unpaid line(s)"));
        assert_eq!(ctx.db.transactions().count().await.unwrap(), 0);
    }
}
