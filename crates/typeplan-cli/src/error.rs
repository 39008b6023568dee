//! Error handling for the typeplan CLI.
//!
//! - `CliError` is returned by every command and converts from the
//!   domain-specific errors below
//! - `ConfigError` covers loading and validating typeplan.json
//! - `BuildError` covers builds that ran but did not succeed
//!
//! Planning and backend problems from the library keep their own
//! `miette::Diagnostic` codes and help text; see [`cli_error_to_miette`].

mod miette;

pub use self::miette::{cli_error_to_miette, render_diagnostic};

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid syntax, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Builds that completed with failed jobs
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Planning or backend errors from the library
    #[error(transparent)]
    Plan(#[from] typeplan::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a typeplan.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// The layered configuration could not be extracted
    #[error("Invalid configuration: {0}\n\nHint: Check typeplan.json syntax and field types")]
    Invalid(String),

    /// Requested target doesn't exist in config
    #[error("Target '{name}' not found in config\n\nHint: Available targets: {available}")]
    TargetNotFound {
        /// Requested target name
        name: String,
        /// Comma separated list of configured targets
        available: String,
    },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Build outcome errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Some jobs failed; details were already printed per job
    #[error("{failed} of {total} jobs failed\n\nHint: Fix the errors above and run the build again")]
    JobsFailed {
        /// Number of failed jobs
        failed: usize,
        /// Number of planned jobs
        total: usize,
    },

    /// The build was interrupted before every job ran
    #[error("Build interrupted: {skipped} jobs were not started")]
    Interrupted {
        /// Number of skipped jobs
        skipped: usize,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a helpful hint to the error message.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use typeplan_cli::error::{Result, ResultExt, CliError};
    /// # fn run() -> Result<()> {
    /// fn parse_config(content: &str) -> Result<()> {
    ///     Err(CliError::Custom("parsing failed".into()))
    /// }
    /// parse_config("{}").with_hint("Check for trailing commas in JSON")?;
    /// # Ok(())
    /// # }
    /// ```
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
