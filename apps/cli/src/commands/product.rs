//! # Product Commands
//!
//! Catalog maintenance: list/search, add, edit and delete.

use std::io::Write;

use copyshop_core::validation::{
    validate_price, validate_product_code, validate_product_name, validate_search_query,
};
use copyshop_core::Product;
use tracing::{debug, info};

use super::{write_json, write_table};
use crate::cli::ProductCommand;
use crate::error::AppResult;
use crate::state::AppContext;

pub async fn run(ctx: &AppContext, command: ProductCommand, out: &mut dyn Write) -> AppResult<()> {
    match command {
        ProductCommand::List { search } => list(ctx, search.as_deref(), out).await,
        ProductCommand::Add { code, name, price } => {
            add(ctx, code.as_deref(), &name, &price, out).await
        }
        ProductCommand::Edit {
            code,
            name,
            price,
            new_code,
        } => {
            edit(
                ctx,
                &code,
                name.as_deref(),
                price.as_deref(),
                new_code.as_deref(),
                out,
            )
            .await
        }
        ProductCommand::Delete { code } => delete(ctx, &code, out).await,
    }
}

async fn list(ctx: &AppContext, search: Option<&str>, out: &mut dyn Write) -> AppResult<()> {
    let products = match search {
        Some(query) => {
            let query = validate_search_query(query)?;
            ctx.db.products().search(&query).await?
        }
        None => ctx.db.products().list().await?,
    };

    debug!(count = products.len(), "Listing products");

    if ctx.json {
        return write_json(out, &products);
    }

    if products.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            vec![
                p.code.clone(),
                p.name.clone(),
                ctx.config.currency.format(p.price),
            ]
        })
        .collect();
    write_table(out, &["Code", "Name", "Price"], &rows, &[2])
}

async fn add(
    ctx: &AppContext,
    code: Option<&str>,
    name: &str,
    price: &str,
    out: &mut dyn Write,
) -> AppResult<()> {
    let products = ctx.db.products();

    let code = match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => code.to_string(),
        None => products.next_code().await?,
    };
    validate_product_code(&code)?;
    validate_product_name(name)?;
    let price = ctx.config.currency.parse("price", price)?;
    validate_price(price)?;

    let product = products
        .insert(&Product::new(code, name.trim(), price))
        .await?;

    info!(code = %product.code, price = product.price.minor(), "Product added");

    if ctx.json {
        return write_json(out, &product);
    }
    writeln!(
        out,
        "Added {} {} ({})",
        product.code,
        product.name,
        ctx.config.currency.format(product.price)
    )?;
    Ok(())
}

async fn edit(
    ctx: &AppContext,
    code: &str,
    name: Option<&str>,
    price: Option<&str>,
    new_code: Option<&str>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let products = ctx.db.products();
    let mut product = products.require_by_code(code).await?;

    if let Some(new_code) = new_code {
        validate_product_code(new_code)?;
        product.code = new_code.trim().to_string();
    }
    if let Some(name) = name {
        validate_product_name(name)?;
        product.name = name.trim().to_string();
    }
    if let Some(price) = price {
        let price = ctx.config.currency.parse("price", price)?;
        validate_price(price)?;
        product.price = price;
    }

    let product = products.update(&product).await?;

    info!(id = %product.id, code = %product.code, "Product updated");

    if ctx.json {
        return write_json(out, &product);
    }
    writeln!(
        out,
        "Updated {} {} ({})",
        product.code,
        product.name,
        ctx.config.currency.format(product.price)
    )?;
    Ok(())
}

async fn delete(ctx: &AppContext, code: &str, out: &mut dyn Write) -> AppResult<()> {
    let products = ctx.db.products();
    let product = products.require_by_code(code).await?;
    products.delete(&product.id).await?;

    info!(code = %product.code, "Product deleted");
    writeln!(out, "Deleted {} {}", product.code, product.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use copyshop_core::Money;

    async fn add_product(ctx: &AppContext, code: Option<&str>, name: &str, price: &str) -> String {
        let mut out = Vec::new();
        add(ctx, code, name, price, &mut out).await.unwrap();
        text(out)
    }

    #[tokio::test]
    async fn test_add_without_code_uses_next_code() {
        let ctx = context().await;
        assert!(add_product(&ctx, None, "Fotokopi A4", "250").await.contains("P001"));
        assert!(add_product(&ctx, None, "Jilid Lakban", "3.000").await.contains("P002"));

        let jilid = ctx.db.products().require_by_code("P002").await.unwrap();
        assert_eq!(jilid.price, Money::from_minor(3000));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let ctx = context().await;
        let mut out = Vec::new();

        let err = add(&ctx, Some("P001"), "  ", "100", &mut out).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add(&ctx, Some("P001"), "Print", "-5", &mut out).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        add_product(&ctx, Some("P001"), "Print", "500").await;
        let err = add(&ctx, Some("p001"), "Print lagi", "500", &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let ctx = context().await;
        add_product(&ctx, None, "Fotokopi A4", "250").await;
        add_product(&ctx, None, "Laminating KTP", "3000").await;

        let mut out = Vec::new();
        list(&ctx, Some("lamin"), &mut out).await.unwrap();
        let text = text(out);
        assert!(text.contains("Laminating KTP"));
        assert!(!text.contains("Fotokopi"));
        assert!(text.contains("Rp 3.000"));
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let ctx = context().await;
        add_product(&ctx, None, "Scan", "2000").await;

        let mut out = Vec::new();
        edit(&ctx, "p001", Some("Scan Dokumen"), Some("2.500"), Some("SCAN"), &mut out)
            .await
            .unwrap();

        let scan = ctx.db.products().require_by_code("SCAN").await.unwrap();
        assert_eq!(scan.name, "Scan Dokumen");
        assert_eq!(scan.price, Money::from_minor(2500));

        delete(&ctx, "SCAN", &mut out).await.unwrap();
        assert_eq!(ctx.db.products().count().await.unwrap(), 0);

        let err = delete(&ctx, "SCAN", &mut out).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
