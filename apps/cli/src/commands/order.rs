//! # Printing Order Commands
//!
//! The order board: jobs taken at the counter, tracked until paid and done.

use std::io::Write;

use copyshop_core::validation::{
    validate_customer_name, validate_order_description, validate_phone,
};
use copyshop_core::PrintingOrder;
use copyshop_db::OrderFilter;
use tracing::info;

use super::{short_id, write_json, write_table};
use crate::cli::OrderCommand;
use crate::error::AppResult;
use crate::state::AppContext;

pub async fn run(ctx: &AppContext, command: OrderCommand, out: &mut dyn Write) -> AppResult<()> {
    match command {
        OrderCommand::List { status } => {
            let filter = status.map(OrderFilter::from).unwrap_or_default();
            list(ctx, filter, out).await
        }
        OrderCommand::Add {
            customer,
            phone,
            description,
        } => add(ctx, &customer, phone.as_deref(), &description, out).await,
        OrderCommand::TogglePaid { id } => toggle(ctx, &id, Flag::Paid, out).await,
        OrderCommand::ToggleCompleted { id } => toggle(ctx, &id, Flag::Completed, out).await,
        OrderCommand::Delete { id } => delete(ctx, &id, out).await,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

async fn list(ctx: &AppContext, filter: OrderFilter, out: &mut dyn Write) -> AppResult<()> {
    let orders = ctx.db.orders().list(filter).await?;

    if ctx.json {
        return write_json(out, &orders);
    }

    if orders.is_empty() {
        writeln!(out, "No printing orders")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|o| {
            vec![
                short_id(&o.id).to_string(),
                o.customer_name.clone(),
                o.phone.clone().unwrap_or_default(),
                o.description.clone(),
                yes_no(o.is_paid).to_string(),
                yes_no(o.is_completed).to_string(),
                o.status().to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        &["ID", "Customer", "Phone", "Description", "Paid", "Done", "Status"],
        &rows,
        &[],
    )
}

async fn add(
    ctx: &AppContext,
    customer: &str,
    phone: Option<&str>,
    description: &str,
    out: &mut dyn Write,
) -> AppResult<()> {
    validate_customer_name(customer)?;
    validate_order_description(description)?;
    let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
        Some(phone) => {
            validate_phone(phone)?;
            Some(phone.to_string())
        }
        None => None,
    };

    let order = ctx
        .db
        .orders()
        .insert(&PrintingOrder::new(customer.trim(), phone, description.trim()))
        .await?;

    if ctx.json {
        return write_json(out, &order);
    }
    writeln!(
        out,
        "Order {} for {}: {}",
        short_id(&order.id),
        order.customer_name,
        order.description
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Paid,
    Completed,
}

async fn toggle(ctx: &AppContext, reference: &str, flag: Flag, out: &mut dyn Write) -> AppResult<()> {
    let orders = ctx.db.orders();
    let id = orders.resolve(reference).await?;
    let order = match flag {
        Flag::Paid => orders.toggle_paid(&id).await?,
        Flag::Completed => orders.toggle_completed(&id).await?,
    };

    info!(id = %order.id, ?flag, status = %order.status(), "Order toggled");

    if ctx.json {
        return write_json(out, &order);
    }
    writeln!(
        out,
        "Order {} ({}): paid {}, completed {} -> {}",
        short_id(&order.id),
        order.customer_name,
        yes_no(order.is_paid),
        yes_no(order.is_completed),
        order.status()
    )?;
    Ok(())
}

async fn delete(ctx: &AppContext, reference: &str, out: &mut dyn Write) -> AppResult<()> {
    let orders = ctx.db.orders();
    let id = orders.resolve(reference).await?;
    orders.delete(&id).await?;

    writeln!(out, "Deleted order {}", short_id(&id))?;
    Ok(())
}
