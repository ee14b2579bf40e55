//! # Receipt
//!
//! Fixed-width receipt document for thermal printers and terminals.
//!
//! ## Layout (32 columns)
//! ```text
//! ┌────────────────────────────────┐
//! │      Fotokopi Maju Jaya        │  shop name, centered
//! │      Jl. Merdeka No. 10        │  address lines, centered
//! │--------------------------------│
//! │No   : TRX-1A2B3C4D             │
//! │Date : 2026-10-18 14:05         │
//! │--------------------------------│
//! │Fotokopi A4                     │  item name (wrapped)
//! │  2 x 500                  1.000│  qty x unit price, subtotal
//! │Jilid Spiral                    │
//! │  1 x 2.000                2.000│
//! │--------------------------------│
//! │TOTAL                 Rp 3.000  │
//! │PAYMENT               Rp 5.000  │
//! │CHANGE                Rp 2.000  │
//! │--------------------------------│
//! │          Terima kasih          │  footer, centered
//! └────────────────────────────────┘
//! ```
//!
//! Rendering is pure: the caller decides where the text goes
//! (stdout, an HTML file, the system print queue).

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Checkout;
use crate::money::CurrencyFormat;
use crate::types::{Transaction, TransactionItem};
use crate::DEFAULT_RECEIPT_WIDTH;

/// Narrowest paper the layout still works on.
const MIN_WIDTH: usize = 24;

/// Shop details and paper settings used when rendering.
#[derive(Debug, Clone)]
pub struct ReceiptLayout {
    /// Characters per line (32 for 58mm paper, 48 for 80mm).
    pub width: usize,
    pub shop_name: String,
    pub address_lines: Vec<String>,
    pub footer: Option<String>,
    pub currency: CurrencyFormat,
    /// Offset used to print the transaction time.
    pub utc_offset: FixedOffset,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        ReceiptLayout {
            width: DEFAULT_RECEIPT_WIDTH,
            shop_name: "Copyshop".to_string(),
            address_lines: Vec::new(),
            footer: Some("Terima kasih".to_string()),
            currency: CurrencyFormat::default(),
            utc_offset: Utc.fix(),
        }
    }
}

impl ReceiptLayout {
    fn columns(&self) -> usize {
        self.width.max(MIN_WIDTH)
    }
}

/// A saved transaction together with its items, ready to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

impl From<Checkout> for Receipt {
    fn from(checkout: Checkout) -> Self {
        Receipt {
            transaction: checkout.transaction,
            items: checkout.items,
        }
    }
}

impl Receipt {
    pub fn new(transaction: Transaction, items: Vec<TransactionItem>) -> Self {
        Receipt { transaction, items }
    }

    /// Receipt number printed in the header.
    pub fn number(&self) -> String {
        self.transaction.receipt_number()
    }

    /// Renders the plain-text document, one `\n`-terminated line per row.
    pub fn render(&self, layout: &ReceiptLayout) -> String {
        let width = layout.columns();
        let separator = "-".repeat(width);
        let currency = &layout.currency;
        let mut lines: Vec<String> = Vec::new();

        // Header
        for text in wrap(&layout.shop_name, width) {
            lines.push(center(&text, width));
        }
        for address in &layout.address_lines {
            for text in wrap(address, width) {
                lines.push(center(&text, width));
            }
        }
        lines.push(separator.clone());

        let timestamp = self
            .transaction
            .created_at
            .with_timezone(&layout.utc_offset)
            .format("%Y-%m-%d %H:%M");
        lines.push(format!("No   : {}", self.number()));
        lines.push(format!("Date : {}", timestamp));
        lines.push(separator.clone());

        // Items
        for item in &self.items {
            lines.extend(wrap(&item.product_name, width));
            let detail = format!(
                "  {} x {}",
                item.quantity,
                currency.format_number(item.unit_price)
            );
            lines.extend(two_columns(
                &detail,
                &currency.format_number(item.subtotal),
                width,
            ));
        }
        lines.push(separator.clone());

        // Summary
        let summary = [
            ("TOTAL", self.transaction.total_amount),
            ("PAYMENT", self.transaction.payment_amount),
            ("CHANGE", self.transaction.change_amount),
        ];
        for (label, amount) in summary {
            lines.extend(two_columns(label, &currency.format(amount), width));
        }
        lines.push(separator);

        if let Some(footer) = layout.footer.as_deref().filter(|f| !f.trim().is_empty()) {
            for text in wrap(footer, width) {
                lines.push(center(&text, width));
            }
        }

        let mut document = lines.join("\n");
        document.push('\n');
        document
    }

    /// Wraps the text document in a minimal HTML page.
    ///
    /// All text, including shop and product names, is escaped.
    pub fn to_html(&self, layout: &ReceiptLayout) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <title>{title}</title>\n\
             <style>body {{ margin: 0; }} pre {{ font-family: monospace; font-size: 12px; }}</style>\n\
             </head>\n\
             <body>\n\
             <pre>{body}</pre>\n\
             </body>\n\
             </html>\n",
            title = escape_html(&self.number()),
            body = escape_html(&self.render(layout)),
        )
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn center(text: &str, width: usize) -> String {
    let len = char_len(text);
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}", " ".repeat(left), text).trim_end().to_string()
}

/// Left text and right-aligned value on one line, or two lines when they
/// don't fit together.
fn two_columns(left: &str, right: &str, width: usize) -> Vec<String> {
    let used = char_len(left) + char_len(right);
    if used < width {
        return vec![format!("{}{}{}", left, " ".repeat(width - used), right)];
    }

    let mut lines = wrap(left, width);
    let pad = width.saturating_sub(char_len(right));
    lines.push(format!("{}{}", " ".repeat(pad), right));
    lines
}

/// Word-wraps text to `width`; words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if char_len(&current) + 1 + char_len(&word) <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::money::Money;
    use crate::types::Product;

    fn sample_receipt() -> Receipt {
        let copy = Product::new("P001", "Fotokopi A4", Money::from_minor(500));
        let bind = Product::new("P002", "Jilid Spiral", Money::from_minor(2000));

        let mut cart = Cart::new();
        cart.add_line(&copy);
        cart.add_line(&copy);
        cart.add_line(&bind);

        cart.checkout(Some(Money::from_minor(5000))).unwrap().into()
    }

    fn layout() -> ReceiptLayout {
        ReceiptLayout {
            shop_name: "Fotokopi Maju Jaya".to_string(),
            address_lines: vec!["Jl. Merdeka No. 10".to_string()],
            ..ReceiptLayout::default()
        }
    }

    #[test]
    fn test_render_contains_all_sections() {
        let receipt = sample_receipt();
        let text = receipt.render(&layout());

        assert!(text.contains("Fotokopi Maju Jaya"));
        assert!(text.contains("Jl. Merdeka No. 10"));
        assert!(text.contains(&receipt.number()));
        assert!(text.contains("Fotokopi A4"));
        assert!(text.contains("  2 x 500"));
        assert!(text.contains("  1 x 2.000"));
        assert!(text.contains("Terima kasih"));
    }

    #[test]
    fn test_render_summary_rows_are_right_aligned() {
        let text = sample_receipt().render(&layout());
        let lines: Vec<&str> = text.lines().collect();

        let total = lines.iter().find(|l| l.starts_with("TOTAL")).unwrap();
        let payment = lines.iter().find(|l| l.starts_with("PAYMENT")).unwrap();
        let change = lines.iter().find(|l| l.starts_with("CHANGE")).unwrap();

        assert!(total.ends_with("Rp 3.000"));
        assert!(payment.ends_with("Rp 5.000"));
        assert!(change.ends_with("Rp 2.000"));
        assert_eq!(total.chars().count(), DEFAULT_RECEIPT_WIDTH);
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let mut receipt = sample_receipt();
        receipt.items[0].product_name =
            "Print warna A3 art paper 260 gram dua sisi laminasi doff".to_string();

        for width in [24, 32, 48] {
            let layout = ReceiptLayout {
                width,
                ..layout()
            };
            for line in receipt.render(&layout).lines() {
                assert!(line.chars().count() <= width, "line too wide: {:?}", line);
            }
        }
    }

    #[test]
    fn test_empty_footer_is_skipped() {
        let layout = ReceiptLayout {
            footer: None,
            ..layout()
        };
        let text = sample_receipt().render(&layout);
        assert!(text.trim_end().ends_with(&"-".repeat(DEFAULT_RECEIPT_WIDTH)));
    }

    #[test]
    fn test_html_escapes_user_text() {
        let mut receipt = sample_receipt();
        receipt.items[0].product_name = "<b>Scan & Print</b>".to_string();

        let html = receipt.to_html(&layout());
        assert!(html.contains("&lt;b&gt;Scan &amp; Print&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("abcdefghij klm", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "klm"]);
    }
}
