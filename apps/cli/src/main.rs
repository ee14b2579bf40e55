//! # Copyshop Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          copyshop binary                                │
//! │                                                                         │
//! │  main.rs ────► tokio runtime, exit code                                │
//! │                                                                         │
//! │  lib.rs ─────► logging, configuration, database, dispatch              │
//! │                                                                         │
//! │  commands/ ──► product, sell, register, report, withdraw, order        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match copyshop_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
