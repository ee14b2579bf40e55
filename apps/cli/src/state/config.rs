//! # Shop Configuration
//!
//! Shop details and receipt settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--printer`, `--paper-width`, ...)
//! 2. Environment variables (`COPYSHOP_*`)
//! 3. Defaults (this file)
//!
//! Configuration is read-only after startup.

use std::path::PathBuf;

use chrono::{FixedOffset, Local, Offset};
use clap::ValueEnum;
use copyshop_core::{CurrencyFormat, ReceiptLayout, DEFAULT_RECEIPT_WIDTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Where finished receipts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterKind {
    /// Print the text receipt on the terminal
    #[default]
    Stdout,
    /// Write an HTML receipt file into the HTML directory
    Html,
    /// Pipe the text receipt to the system print command (`lp`)
    System,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the data directory, set COPYSHOP_DB_PATH or --db")]
    MissingDataDir,
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Shop configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Printed at the top of every receipt.
    pub shop_name: String,

    pub address_lines: Vec<String>,

    /// Printed at the bottom of every receipt; `None` prints nothing.
    pub footer: Option<String>,

    /// How amounts are written on screen and receipts, and parsed from input.
    pub currency: CurrencyFormat,

    /// Receipt width in characters (32 for 58mm paper, 48 for 80mm).
    pub paper_width: usize,

    pub printer: PrinterKind,

    /// Program that receives text receipts for [`PrinterKind::System`].
    pub print_command: String,

    /// Directory for [`PrinterKind::Html`] receipts.
    pub html_dir: PathBuf,

    /// Offset for receipt timestamps and report day boundaries.
    pub utc_offset: FixedOffset,
}

impl Default for ShopConfig {
    /// Defaults for a small Indonesian copy shop on 58mm paper.
    fn default() -> Self {
        ShopConfig {
            shop_name: "Copyshop".to_string(),
            address_lines: Vec::new(),
            footer: Some("Terima kasih".to_string()),
            currency: CurrencyFormat::default(),
            paper_width: DEFAULT_RECEIPT_WIDTH,
            printer: PrinterKind::Stdout,
            print_command: "lp".to_string(),
            html_dir: PathBuf::from("receipts"),
            utc_offset: Local::now().offset().fix(),
        }
    }
}

impl ShopConfig {
    /// Creates a ShopConfig from `COPYSHOP_*` environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `COPYSHOP_SHOP_NAME`
    /// - `COPYSHOP_ADDRESS`: address lines separated by `|`
    /// - `COPYSHOP_FOOTER`: empty disables the footer
    /// - `COPYSHOP_CURRENCY_SYMBOL`, `COPYSHOP_CURRENCY_DECIMALS`
    /// - `COPYSHOP_THOUSANDS_SEPARATOR`, `COPYSHOP_DECIMAL_SEPARATOR`
    /// - `COPYSHOP_PAPER_WIDTH`
    /// - `COPYSHOP_PRINTER`: `stdout`, `html` or `system`
    /// - `COPYSHOP_PRINT_COMMAND`, `COPYSHOP_HTML_DIR`
    /// - `COPYSHOP_UTC_OFFSET`: e.g. `+07:00`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ShopConfig::default();

        if let Some(name) = lookup("COPYSHOP_SHOP_NAME") {
            config.shop_name = name;
        }

        if let Some(address) = lookup("COPYSHOP_ADDRESS") {
            config.address_lines = address
                .split('|')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(footer) = lookup("COPYSHOP_FOOTER") {
            config.footer = Some(footer).filter(|f| !f.trim().is_empty());
        }

        if let Some(symbol) = lookup("COPYSHOP_CURRENCY_SYMBOL") {
            config.currency.symbol = symbol;
        }

        if let Some(decimals) = lookup("COPYSHOP_CURRENCY_DECIMALS") {
            config.currency.decimals = decimals
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|d| *d <= 4)
                .ok_or_else(|| invalid("COPYSHOP_CURRENCY_DECIMALS"))?;
        }

        if let Some(separator) = lookup("COPYSHOP_THOUSANDS_SEPARATOR") {
            config.currency.thousands_separator =
                single_char(&separator).ok_or_else(|| invalid("COPYSHOP_THOUSANDS_SEPARATOR"))?;
        }

        if let Some(separator) = lookup("COPYSHOP_DECIMAL_SEPARATOR") {
            config.currency.decimal_separator =
                single_char(&separator).ok_or_else(|| invalid("COPYSHOP_DECIMAL_SEPARATOR"))?;
        }

        if let Some(width) = lookup("COPYSHOP_PAPER_WIDTH") {
            config.paper_width = width
                .trim()
                .parse()
                .map_err(|_| invalid("COPYSHOP_PAPER_WIDTH"))?;
        }

        if let Some(printer) = lookup("COPYSHOP_PRINTER") {
            config.printer = PrinterKind::from_str(printer.trim(), true)
                .map_err(|_| invalid("COPYSHOP_PRINTER"))?;
        }

        if let Some(command) = lookup("COPYSHOP_PRINT_COMMAND") {
            config.print_command = command;
        }

        if let Some(dir) = lookup("COPYSHOP_HTML_DIR") {
            config.html_dir = PathBuf::from(dir);
        }

        if let Some(offset) = lookup("COPYSHOP_UTC_OFFSET") {
            config.utc_offset =
                parse_utc_offset(&offset).ok_or_else(|| invalid("COPYSHOP_UTC_OFFSET"))?;
        }

        if config.currency.thousands_separator == config.currency.decimal_separator {
            return Err(invalid("COPYSHOP_THOUSANDS_SEPARATOR"));
        }

        Ok(config)
    }

    /// Receipt layout for this shop.
    pub fn receipt_layout(&self) -> ReceiptLayout {
        ReceiptLayout {
            width: self.paper_width,
            shop_name: self.shop_name.clone(),
            address_lines: self.address_lines.clone(),
            footer: self.footer.clone(),
            currency: self.currency.clone(),
            utc_offset: self.utc_offset,
        }
    }
}

fn invalid(key: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string())
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Parses `+07:00`, `+0700`, `-05:30` or a whole number of hours (`7`).
pub fn parse_utc_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.shop_name, "Copyshop");
        assert_eq!(config.paper_width, 32);
        assert_eq!(config.printer, PrinterKind::Stdout);
        assert_eq!(config.currency, CurrencyFormat::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("COPYSHOP_SHOP_NAME", "Fotokopi Maju Jaya"),
            ("COPYSHOP_ADDRESS", "Jl. Merdeka 10 | Bandung"),
            ("COPYSHOP_FOOTER", ""),
            ("COPYSHOP_PAPER_WIDTH", "48"),
            ("COPYSHOP_PRINTER", "HTML"),
            ("COPYSHOP_UTC_OFFSET", "+07:00"),
        ]))
        .unwrap();

        assert_eq!(config.shop_name, "Fotokopi Maju Jaya");
        assert_eq!(config.address_lines, vec!["Jl. Merdeka 10", "Bandung"]);
        assert_eq!(config.footer, None);
        assert_eq!(config.paper_width, 48);
        assert_eq!(config.printer, PrinterKind::Html);
        assert_eq!(config.utc_offset.local_minus_utc(), 7 * 3600);

        let layout = config.receipt_layout();
        assert_eq!(layout.width, 48);
        assert_eq!(layout.shop_name, "Fotokopi Maju Jaya");
    }

    #[test]
    fn test_dollar_currency() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("COPYSHOP_CURRENCY_SYMBOL", "$"),
            ("COPYSHOP_CURRENCY_DECIMALS", "2"),
            ("COPYSHOP_THOUSANDS_SEPARATOR", ","),
            ("COPYSHOP_DECIMAL_SEPARATOR", "."),
        ]))
        .unwrap();

        let amount = config.currency.parse("price", "12.50").unwrap();
        assert_eq!(amount.minor(), 1250);
        assert_eq!(config.currency.format(amount), "$12.50");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for vars in [
            [("COPYSHOP_PAPER_WIDTH", "wide")],
            [("COPYSHOP_PRINTER", "fax")],
            [("COPYSHOP_CURRENCY_DECIMALS", "9")],
            [("COPYSHOP_THOUSANDS_SEPARATOR", ",,")],
            [("COPYSHOP_UTC_OFFSET", "+25:00")],
            [("COPYSHOP_THOUSANDS_SEPARATOR", ",")],
        ] {
            assert!(ShopConfig::from_lookup(lookup(&vars)).is_err(), "{:?}", vars);
        }
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+07:00").unwrap().local_minus_utc(), 25_200);
        assert_eq!(parse_utc_offset("0530").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-3").unwrap().local_minus_utc(), -10_800);
        assert!(parse_utc_offset("").is_none());
        assert!(parse_utc_offset("abc").is_none());
    }
}
