//! Logging setup for the typeplan CLI.
//!
//! Library events from `typeplan` (per-job `dest...OK` lines, resolution
//! and scheduling detail) are printed through a compact `tracing`
//! formatter on stderr, so stdout stays clean for `check --json`.
//!
//! # Example
//!
//! ```rust,no_run
//! use typeplan_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified options.
///
/// The filter is chosen in this order:
/// 1. `--verbose`: debug for typeplan crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for typeplan crates
///
/// Call once, before any logging occurs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("typeplan=debug,typeplan_host=debug,typeplan_cli=debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("typeplan=info,typeplan_cli=info"))
    }
}
