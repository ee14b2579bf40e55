//! # Receipt Printers
//!
//! Hands a finished receipt to an output surface.
//!
//! ```text
//! Receipt ──► printer_for(&config) ──► ┌─────────────────┐
//!                                      │ StdoutPrinter   │ text to the console
//!                                      │ HtmlFilePrinter │ receipts/TRX-xxxx.html
//!                                      │ SystemPrinter   │ text piped to `lp`
//!                                      └─────────────────┘
//! ```
//!
//! A printer failure never undoes the sale: the transaction is already saved
//! and can be reprinted with `report reprint`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use copyshop_core::{Receipt, ReceiptLayout};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::state::{PrinterKind, ShopConfig};

/// Output surface for receipts.
///
/// `out` is the operator's console; printers that send the receipt elsewhere
/// write a one-line confirmation to it.
pub trait ReceiptPrinter {
    fn print(&self, receipt: &Receipt, layout: &ReceiptLayout, out: &mut dyn Write)
        -> AppResult<()>;
}

/// Prints the text receipt on the console.
#[derive(Debug, Default)]
pub struct StdoutPrinter;

impl ReceiptPrinter for StdoutPrinter {
    fn print(
        &self,
        receipt: &Receipt,
        layout: &ReceiptLayout,
        out: &mut dyn Write,
    ) -> AppResult<()> {
        out.write_all(receipt.render(layout).as_bytes())?;
        Ok(())
    }
}

/// Writes `<receipt number>.html` into a directory, for browser printing.
#[derive(Debug)]
pub struct HtmlFilePrinter {
    dir: PathBuf,
}

impl HtmlFilePrinter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HtmlFilePrinter { dir: dir.into() }
    }

    /// Path the receipt will be written to.
    pub fn path_for(&self, receipt: &Receipt) -> PathBuf {
        self.dir.join(format!("{}.html", receipt.number()))
    }
}

impl ReceiptPrinter for HtmlFilePrinter {
    fn print(
        &self,
        receipt: &Receipt,
        layout: &ReceiptLayout,
        out: &mut dyn Write,
    ) -> AppResult<()> {
        let path = self.path_for(receipt);
        debug!(path = %path.display(), "Writing HTML receipt");

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create receipt directory");
            AppError::printer(format!("Cannot create {}", self.dir.display()))
        })?;
        std::fs::write(&path, receipt.to_html(layout)).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Cannot write HTML receipt");
            AppError::printer(format!("Cannot write {}", path.display()))
        })?;

        info!(receipt = %receipt.number(), path = %path.display(), "Receipt saved");
        writeln!(out, "Receipt saved to {}", path.display())?;
        Ok(())
    }
}

/// Pipes the text receipt to the host print command.
#[derive(Debug)]
pub struct SystemPrinter {
    command: String,
}

impl SystemPrinter {
    pub fn new(command: impl Into<String>) -> Self {
        SystemPrinter {
            command: command.into(),
        }
    }
}

impl ReceiptPrinter for SystemPrinter {
    fn print(
        &self,
        receipt: &Receipt,
        layout: &ReceiptLayout,
        out: &mut dyn Write,
    ) -> AppResult<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AppError::printer("Print command is empty"))?;

        debug!(command = %self.command, "Sending receipt to system printer");

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                warn!(command = %self.command, error = %e, "Cannot start print command");
                AppError::printer(format!("Cannot start '{}'", program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(receipt.render(layout).as_bytes()) {
                drop(stdin);
                return Err(abandon(&mut child, e));
            }
        }

        let status = child
            .wait()
            .map_err(|e| AppError::printer(format!("Print command failed: {}", e)))?;
        if !status.success() {
            warn!(command = %self.command, status = %status, "Print command failed");
            return Err(AppError::printer(format!(
                "'{}' exited with {}",
                program, status
            )));
        }

        info!(receipt = %receipt.number(), "Receipt sent to printer");
        writeln!(out, "Receipt {} sent to printer", receipt.number())?;
        Ok(())
    }
}

/// Stops a print command the receipt could not be written to and reaps it.
fn abandon(child: &mut Child, err: io::Error) -> AppError {
    warn!(error = %err, "Cannot send receipt to print command");
    // Already exited is fine; wait() still collects the status.
    let _ = child.kill();
    if let Err(e) = child.wait() {
        warn!(error = %e, "Cannot reap print command");
    }
    AppError::printer(format!("Cannot send receipt: {}", err))
}

/// Builds the printer selected in the configuration.
pub fn printer_for(config: &ShopConfig) -> Box<dyn ReceiptPrinter> {
    match config.printer {
        PrinterKind::Stdout => Box::new(StdoutPrinter),
        PrinterKind::Html => Box::new(HtmlFilePrinter::new(config.html_dir.clone())),
        PrinterKind::System => Box::new(SystemPrinter::new(config.print_command.clone())),
    }
}
