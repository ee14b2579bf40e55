//! # Copyshop CLI Library
//!
//! Register and back office for the copy shop, as a command-line program.
//!
//! ## Module Organization
//! ```text
//! copyshop_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── AppContext, database path
//! │   └── config.rs   ◄─── ShopConfig from COPYSHOP_* variables
//! ├── commands/
//! │   ├── mod.rs      ◄─── dispatch, status, output helpers
//! │   ├── product.rs  ◄─── catalog
//! │   ├── sale.rs     ◄─── one-shot sale, shared checkout
//! │   ├── register.rs ◄─── interactive cart session
//! │   ├── report.rs   ◄─── transaction ledger
//! │   ├── withdraw.rs ◄─── withdrawal ledger and balance
//! │   └── order.rs    ◄─── printing-order board
//! ├── printer.rs      ◄─── receipt output surfaces
//! └── error.rs        ◄─── AppError for command handlers
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod printer;
pub mod state;

use std::io;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use copyshop_db::{Database, DbConfig};
use error::AppResult;
use state::{database_path, AppContext, ShopConfig};

/// Runs the `copyshop` command line.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info, copyshop=debug; RUST_LOG overrides                 │
/// │                                                                         │
/// │  2. Parse Arguments & Load Configuration ─────────────────────────────► │
/// │     • defaults → COPYSHOP_* variables → command-line flags              │
/// │                                                                         │
/// │  3. Determine Database Path ──────────────────────────────────────────► │
/// │     • --db / COPYSHOP_DB_PATH, else the platform data directory         │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  5. Dispatch the Command ─────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = ShopConfig::from_env()?;
    cli.apply_overrides(&mut config);

    let db_path = database_path(cli.db.clone())?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let ctx = AppContext::new(db, config, cli.json);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = commands::dispatch(&ctx, cli.command, &mut input, &mut out).await;

    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=copyshop_db=trace` - Show trace for the database crate only
/// - Default: `info,copyshop=debug,sqlx=warn`
///
/// Logs go to stderr; receipts and listings use stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,copyshop=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
