//! # State Module
//!
//! Everything a command handler needs, built once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  run()                                                                 │
//! │    ├── ShopConfig::from_env() + CLI overrides                          │
//! │    ├── Database::new(DbConfig::new(database_path()))                   │
//! │    └── AppContext { db, config, json }                                 │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   Database   │  │  ShopConfig  │  │   json flag      │              │
//! │  │  (SQLite     │  │  (read-only) │  │  (output mode)   │              │
//! │  │   pool)      │  │              │  │                  │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  The register cart is NOT here: it is owned by the register session.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

use std::path::PathBuf;

use copyshop_db::Database;
use directories::ProjectDirs;
use tracing::info;

pub use config::{parse_utc_offset, ConfigError, PrinterKind, ShopConfig};

/// Shared context passed to every command handler.
#[derive(Debug)]
pub struct AppContext {
    pub db: Database,
    pub config: ShopConfig,
    /// Render listings as JSON instead of tables.
    pub json: bool,
}

impl AppContext {
    pub fn new(db: Database, config: ShopConfig, json: bool) -> Self {
        AppContext { db, config, json }
    }
}

/// Resolves the database file path.
///
/// ## Resolution Order
/// 1. `explicit` (from `--db` or `COPYSHOP_DB_PATH`, handled by clap)
/// 2. Platform data directory:
///    - Linux: `~/.local/share/copyshop/copyshop.db`
///    - macOS: `~/Library/Application Support/com.copyshop.copyshop/copyshop.db`
///    - Windows: `%APPDATA%\copyshop\copyshop\data\copyshop.db`
pub fn database_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Using database path from arguments");
        return Ok(path);
    }

    let dirs = ProjectDirs::from("com", "copyshop", "copyshop").ok_or(ConfigError::MissingDataDir)?;
    let data_dir = dirs.data_dir();

    std::fs::create_dir_all(data_dir).map_err(|e| {
        ConfigError::InvalidValue(format!("data directory {} ({})", data_dir.display(), e))
    })?;

    Ok(data_dir.join("copyshop.db"))
}
