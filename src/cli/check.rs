//! Check command implementation.
//!
//! Runs validation over the built-in registry and fails when any check
//! reports an error.

use clap::Args;

use crate::error::{ArlunioError, Result};
use crate::library;
use crate::output::{plural, Printer};
use crate::validation::validate_registry;

/// Check the built-in definitions for problems
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let registry = library::registry()?;
    printer.status(
        "Checking",
        &plural(registry.len(), "definition", "definitions"),
    );

    let result = validate_registry(&registry);
    printer.diagnostics(&result);

    if result.has_errors() || (args.strict && result.has_warnings()) {
        return Err(ArlunioError::declaration(format!(
            "Validation failed with {} and {}",
            plural(result.error_count(), "error", "errors"),
            plural(result.warning_count(), "warning", "warnings")
        )));
    }

    Ok(())
}
