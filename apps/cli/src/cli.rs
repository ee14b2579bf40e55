//! # Command Line Definition
//!
//! `clap` derive types for the `copyshop` binary.
//!
//! ```text
//! copyshop [--db PATH] [--json] <COMMAND>
//!
//!   product   list | add | edit | delete
//!   sell      one-shot sale: sell --pay 10000 P001*2 P004
//!   register  interactive cart session
//!   report    list | show | edit | delete | summary | reprint
//!   withdraw  list | balance | add | delete
//!   order     list | add | toggle-paid | toggle-completed | delete
//!   status    database and ledger overview
//! ```
//!
//! Amounts are taken as text and parsed with the configured currency format,
//! so `12500`, `12.500` and `Rp 12.500` all mean the same in Rupiah.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use copyshop_core::OrderStatus;
use copyshop_db::{DateRange, OrderFilter};

use crate::error::{AppError, AppResult};
use crate::state::{PrinterKind, ShopConfig};

/// Point of sale for a printing and copy shop.
#[derive(Debug, Parser)]
#[command(name = "copyshop", version, about)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "COPYSHOP_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Print listings as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Where receipts go
    #[arg(long, global = true, value_enum)]
    pub printer: Option<PrinterKind>,

    /// Receipt width in characters
    #[arg(long, global = true)]
    pub paper_width: Option<usize>,

    /// Directory for HTML receipts
    #[arg(long, global = true)]
    pub html_dir: Option<PathBuf>,

    /// Shop name printed on receipts
    #[arg(long, global = true)]
    pub shop_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply_overrides(&self, config: &mut ShopConfig) {
        if let Some(printer) = self.printer {
            config.printer = printer;
        }
        if let Some(width) = self.paper_width {
            config.paper_width = width;
        }
        if let Some(dir) = &self.html_dir {
            config.html_dir = dir.clone();
        }
        if let Some(name) = &self.shop_name {
            config.shop_name = name.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the product catalog
    #[command(subcommand)]
    Product(ProductCommand),

    /// Record a sale in one step and print its receipt
    Sell(SellArgs),

    /// Start an interactive register session
    Register,

    /// Review, correct and reprint past transactions
    #[command(subcommand)]
    Report(ReportCommand),

    /// Record cash taken out of the till
    #[command(subcommand)]
    Withdraw(WithdrawCommand),

    /// Track printing jobs
    #[command(subcommand)]
    Order(OrderCommand),

    /// Show database and ledger status
    Status,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products, optionally filtered by code or name
    List {
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Add a product; a missing code gets the next P### code
    Add {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },

    /// Change a product's name, price or code
    Edit {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        new_code: Option<String>,
    },

    /// Delete a product (past transactions keep their copy)
    Delete { code: String },
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Args)]
pub struct SellArgs {
    /// Amount handed over by the customer
    #[arg(long)]
    pub pay: String,

    /// Items as CODE[*QTY][@PRICE][:NAME], e.g. P001*20 or P004@2500:Jilid biru
    #[arg(required = true)]
    pub items: Vec<ItemArg>,
}

/// One item of a one-shot sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub code: String,
    pub quantity: i64,
    /// Display price override, parsed later with the currency format.
    pub price: Option<String>,
    /// Display name override.
    pub name: Option<String>,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, name) = match s.split_once(':') {
            Some((rest, name)) => (rest, Some(name.trim().to_string())),
            None => (s, None),
        };
        let (rest, price) = split_price(rest);
        let (code, quantity) = split_quantity(rest)?;

        let code = code.trim();
        if code.is_empty() {
            return Err(format!("missing product code in '{}'", s));
        }

        Ok(ItemArg {
            code: code.to_string(),
            quantity: quantity.unwrap_or(1),
            price,
            name: name.filter(|n| !n.is_empty()),
        })
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// List transactions, newest first
    List {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Show a transaction with its items
    Show { id: String },

    /// Change item quantities or prices and recompute the totals
    Edit {
        id: String,
        /// ITEM[*QTY][@PRICE], ITEM being the item number or an item id prefix
        #[arg(long = "item", required = true)]
        items: Vec<ItemEditArg>,
    },

    /// Delete a transaction and its items
    Delete { id: String },

    /// Revenue summary with per-day totals
    Summary {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Print a transaction's receipt again
    Reprint { id: String },
}

/// One edit of a stored transaction item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEditArg {
    pub item: String,
    pub quantity: Option<i64>,
    pub price: Option<String>,
}

impl FromStr for ItemEditArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, price) = split_price(s);
        let (item, quantity) = split_quantity(rest)?;

        let item = item.trim();
        if item.is_empty() {
            return Err(format!("missing item in '{}'", s));
        }
        if quantity.is_none() && price.is_none() {
            return Err(format!("'{}' changes nothing, add *QTY or @PRICE", s));
        }

        Ok(ItemEditArg {
            item: item.to_string(),
            quantity,
            price,
        })
    }
}

/// Inclusive calendar-day range in the shop's time zone.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    /// Converts the day range to a half-open UTC range.
    pub fn to_date_range(&self, offset: FixedOffset) -> AppResult<DateRange> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::validation(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
        }

        let from = self.from.map(|d| start_of_day(d, offset)).transpose()?;
        let to = self
            .to
            .map(|d| {
                d.checked_add_days(Days::new(1))
                    .ok_or_else(|| AppError::validation("--to is out of range"))
                    .and_then(|next| start_of_day(next, offset))
            })
            .transpose()?;

        Ok(DateRange::new(from, to))
    }
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::validation(format!("Invalid date {}", date)))
}

// =============================================================================
// Withdrawals
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum WithdrawCommand {
    /// List withdrawals, newest first
    List,

    /// Show revenue, withdrawals and available balance
    Balance,

    /// Record a withdrawal if the balance covers it
    Add {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        label: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a withdrawal
    Delete { id: String },
}

// =============================================================================
// Printing Orders
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// List orders, newest first
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Put a new order on the board
    Add {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        description: String,
    },

    /// Flip the paid flag
    TogglePaid { id: String },

    /// Flip the completed flag
    ToggleCompleted { id: String },

    /// Remove an order from the board
    Delete { id: String },
}

/// Order board filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Paid,
    Completed,
    Done,
    /// Anything not yet done
    Open,
}

impl From<StatusArg> for OrderFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => OrderFilter::Status(OrderStatus::Pending),
            StatusArg::Paid => OrderFilter::Status(OrderStatus::Paid),
            StatusArg::Completed => OrderFilter::Status(OrderStatus::Completed),
            StatusArg::Done => OrderFilter::Status(OrderStatus::Done),
            StatusArg::Open => OrderFilter::Open,
        }
    }
}

// =============================================================================
// Item Argument Parsing
// =============================================================================

fn split_price(s: &str) -> (&str, Option<String>) {
    match s.split_once('@') {
        Some((rest, price)) => (rest, Some(price.trim().to_string())),
        None => (s, None),
    }
}

fn split_quantity(s: &str) -> Result<(&str, Option<i64>), String> {
    match s.split_once('*') {
        Some((rest, qty)) => {
            let qty: i64 = qty
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity '{}'", qty))?;
            if qty <= 0 {
                return Err(format!("quantity must be positive, got {}", qty));
            }
            Ok((rest, Some(qty)))
        }
        None => Ok((s, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_item_argument_forms() {
        let plain: ItemArg = "P001".parse().unwrap();
        assert_eq!(plain.code, "P001");
        assert_eq!(plain.quantity, 1);
        assert_eq!(plain.price, None);

        let full: ItemArg = "P004*3@2.500:Jilid biru".parse().unwrap();
        assert_eq!(full.code, "P004");
        assert_eq!(full.quantity, 3);
        assert_eq!(full.price.as_deref(), Some("2.500"));
        assert_eq!(full.name.as_deref(), Some("Jilid biru"));

        assert!("*2".parse::<ItemArg>().is_err());
        assert!("P001*0".parse::<ItemArg>().is_err());
        assert!("P001*x".parse::<ItemArg>().is_err());
    }

    #[test]
    fn test_item_edit_argument_forms() {
        let edit: ItemEditArg = "2*5".parse().unwrap();
        assert_eq!(edit.item, "2");
        assert_eq!(edit.quantity, Some(5));

        let edit: ItemEditArg = "a1b2@750".parse().unwrap();
        assert_eq!(edit.price.as_deref(), Some("750"));
        assert_eq!(edit.quantity, None);

        assert!("1".parse::<ItemEditArg>().is_err());
    }

    #[test]
    fn test_parse_sell_command() {
        let cli = Cli::try_parse_from(["copyshop", "--json", "sell", "--pay", "5000", "P001*2", "P002"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.pay, "5000");
                assert_eq!(args.items.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_range_is_inclusive_of_last_day() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let range = RangeArgs {
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            to: NaiveDate::from_ymd_opt(2024, 3, 1),
        }
        .to_date_range(offset)
        .unwrap();

        assert_eq!(range.from.unwrap().to_rfc3339(), "2024-02-29T17:00:00+00:00");
        assert_eq!(range.to.unwrap().to_rfc3339(), "2024-03-01T17:00:00+00:00");
    }

    #[test]
    fn test_range_rejects_reversed_days() {
        let range = RangeArgs {
            from: NaiveDate::from_ymd_opt(2024, 3, 2),
            to: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        assert!(range.to_date_range(FixedOffset::east_opt(0).unwrap()).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "copyshop",
            "--printer",
            "html",
            "--paper-width",
            "48",
            "status",
        ])
        .unwrap();
        let mut config = ShopConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.printer, PrinterKind::Html);
        assert_eq!(config.paper_width, 48);
    }
}
