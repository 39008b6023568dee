//! Miette conversion for CLI errors and per-job diagnostics.

use crate::error::CliError;
use ::miette::Report;
use typeplan::diagnostics::to_report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // Library errors carry their own codes and help text.
        CliError::Plan(e) => Report::new(e),
        CliError::Config(e) => ::miette::miette!("Configuration error: {}", e),
        _ => ::miette::miette!("{}", err),
    }
}

/// Render a compiler diagnostic with a source snippet when the file is readable.
pub fn render_diagnostic(diag: &typeplan::Diagnostic) -> String {
    format!("{:?}", Report::new(to_report(diag.clone())))
}
