#![cfg_attr(docsrs, feature(doc_cfg))]

//! # typeplan
//!
//! Batch build planner for a typed-script compiler.
//!
//! A build takes `sources -> destination` mappings, plans them into jobs,
//! resolves each job's reference-directive closure and compiles the jobs
//! concurrently through a pluggable [`CompilerBackend`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use typeplan::{BuildOptions, CompilationOptions, Target};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = BuildOptions::new()
//!     .files(["src/**/*.ts"], "build/")
//!     .compilation(CompilationOptions {
//!         target: Target::Es5,
//!         sourcemap: true,
//!         ..Default::default()
//!     })
//!     .build()
//!     .await?;
//!
//! for outcome in &result.jobs {
//!     println!("{} {:?}", outcome.job.destination.display(), outcome.status);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Components
//!
//! - [`PathPlanner`] expands glob mappings into [`Job`]s
//! - [`DependencyResolver`] follows reference directives through the [`IoHost`]
//! - [`CompileScheduler`] runs jobs with bounded concurrency
//! - [`CommandBackend`] and [`InProcessBackend`] compile a single job

pub mod backend;
pub mod builder;
pub mod diagnostics;
pub mod job;
pub mod options;
pub mod planner;
pub mod resolver;
pub mod scheduler;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use backend::{
    Artifact, ArtifactKind, CommandBackend, CompilationUnit, CompileOutput, CompilerBackend,
    EmittedFile, Frontend, InProcessBackend, Stage,
};
pub use builder::{BuildOptions, DEFAULT_COMPILER, build};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use job::{FileMapping, Job, TargetShape, is_ambient};
pub use options::{CompilationOptions, ModuleKind, PlanOptions, Target};
pub use planner::PathPlanner;
pub use resolver::{DependencyResolver, Resolution};
pub use scheduler::{AbortSignal, BuildResult, CompileScheduler, JobOutcome, JobStatus};

pub use typeplan_host::{ByteOrderMark, HostError, IoHost, NativeHost, SourceFile};

use std::path::PathBuf;

/// Problems detected before any job is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A source pattern is not valid glob syntax.
    #[error("Invalid source pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A mapping cannot be planned at all.
    #[error("Invalid mapping for '{dest}': {reason}")]
    InvalidMapping { dest: String, reason: String },

    /// Two sources would be written to the same output.
    #[error(
        "Destination collision: {} and {} both compile to {}",
        .first.display(),
        .second.display(),
        .destination.display()
    )]
    DestinationCollision {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// A matched source is not below the configured base path.
    #[error("Source {} is outside base path {}", .file.display(), .base.display())]
    SourceOutsideBase { file: PathBuf, base: PathBuf },

    /// Asynchronous modules cannot be concatenated into one file.
    #[error(
        "Module kind '{module}' cannot be concatenated into {}",
        .destination.display()
    )]
    AsyncModuleConcatenation {
        module: ModuleKind,
        destination: PathBuf,
    },

    /// The compiler backend cannot be run.
    #[error("Compiler '{backend}' cannot be run: {reason}")]
    BackendUnavailable { backend: String, reason: String },
}

/// Error types for typeplan operations.
///
/// Per-job compilation failures are not errors: they are reported in
/// [`BuildResult`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration; nothing was compiled.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigurationError),

    /// Host failure outside of any job, e.g. creating output directories.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result type alias for typeplan operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(ConfigurationError::InvalidPattern { .. }) => "INVALID_PATTERN",
            Error::Config(ConfigurationError::InvalidMapping { .. }) => "INVALID_MAPPING",
            Error::Config(ConfigurationError::DestinationCollision { .. }) => {
                "DESTINATION_COLLISION"
            }
            Error::Config(ConfigurationError::SourceOutsideBase { .. }) => "SOURCE_OUTSIDE_BASE",
            Error::Config(ConfigurationError::AsyncModuleConcatenation { .. }) => {
                "ASYNC_MODULE_CONCATENATION"
            }
            Error::Config(ConfigurationError::BackendUnavailable { .. }) => "BACKEND_UNAVAILABLE",
            Error::Host(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(ConfigurationError::DestinationCollision { .. }) => Some(Box::new(
                "Disable flatten, or give the colliding sources distinct file names.",
            )),
            Error::Config(ConfigurationError::SourceOutsideBase { .. }) => Some(Box::new(
                "The base path must contain every matched source. Remove it to use their common directory.",
            )),
            Error::Config(ConfigurationError::AsyncModuleConcatenation { .. }) => Some(Box::new(
                "Use a directory destination ending in '/' so each module gets its own file.",
            )),
            Error::Config(ConfigurationError::BackendUnavailable { .. }) => Some(Box::new(
                "Try npm install -g typescript, or point the compiler option at an installed tsc.",
            )),
            Error::Config(ConfigurationError::InvalidPattern { .. }) => Some(Box::new(
                "Patterns use glob syntax: '*', '**', '?' and '[...]'.",
            )),
            Error::Config(ConfigurationError::InvalidMapping { .. }) => None,
            Error::Host(err) => err.path().map(|path| {
                Box::new(format!("Check permissions for {}", path.display()))
                    as Box<dyn std::fmt::Display>
            }),
        }
    }
}
