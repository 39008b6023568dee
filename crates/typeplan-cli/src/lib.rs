//! typeplan CLI - plan and compile typed-script builds from typeplan.json.
//!
//! This crate provides the command-line interface for the `typeplan`
//! library: configuration loading, target selection, terminal output and
//! error reporting.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`config`] - typeplan.json loading layered with env vars and flags
//! - [`commands`] - `build` and `check`
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status lines and the build summary
//!
//! # Example
//!
//! ```rust
//! use typeplan_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, true);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
