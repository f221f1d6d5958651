//! Interactive confirmation gate for destructive runs.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::error::{Error, Result};

/// Decides whether the migration may proceed.
///
/// Dry runs and `--yes` bypass the prompt; otherwise `ask` is consulted.
/// The prompt is injected so non-interactive contexts supply a fixed
/// answer instead of touching the terminal.
///
/// # Errors
///
/// Propagates a failure from `ask` (terminal unavailable, prompt
/// cancelled).
pub fn should_proceed<F>(dry_run: bool, assume_yes: bool, ask: F) -> Result<bool>
where
    F: FnOnce() -> Result<bool>,
{
    if dry_run || assume_yes {
        return Ok(true);
    }
    ask()
}

/// Prints the pre-migration warning and asks for confirmation on the
/// terminal.
///
/// # Errors
///
/// Returns an error if the terminal interaction fails.
pub fn confirm_on_terminal() -> Result<bool> {
    println!(
        "{} WARNING: Migration will modify the target server!",
        style("⚠").yellow().bold()
    );
    println!("Please ensure you have a backup before proceeding.\n");

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Continue with migration?")
        .default(false)
        .interact()
        .map_err(|e| Error::Config(format!("Confirmation cancelled: {e}")))
}
