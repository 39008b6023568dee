//! One-call build entry point.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use typeplan_host::{IoHost, NativeHost};

use crate::backend::{CommandBackend, CompilerBackend};
use crate::job::{FileMapping, Job};
use crate::options::{CompilationOptions, PlanOptions};
use crate::planner::{PathPlanner, check_compatibility};
use crate::scheduler::{AbortSignal, BuildResult, CompileScheduler};
use crate::{ConfigurationError, Result};

/// Compiler executable used when no backend is configured.
pub const DEFAULT_COMPILER: &str = "tsc";

/// Configuration for one build.
///
/// Use the builder methods, or fill the public fields directly.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Source patterns and destinations, planned in order.
    pub mappings: Vec<FileMapping>,

    /// Flatten, base path and output extension.
    pub plan: PlanOptions,

    /// Passed unchanged to the backend for every job.
    pub compilation: CompilationOptions,

    /// Concurrent job cap (default: number of logical CPUs).
    pub max_parallel: Option<usize>,

    /// Working directory for patterns and relative paths (default: process cwd).
    ///
    /// Ignored when `host` is set.
    pub cwd: Option<PathBuf>,

    /// File system facade (default: a [`NativeHost`] at `cwd`).
    pub host: Option<Arc<dyn IoHost>>,

    /// Backend (default: the `tsc` executable on `PATH`).
    pub backend: Option<Arc<dyn CompilerBackend>>,

    /// Cancellation handle shared with the caller.
    pub abort: AbortSignal,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `sources -> destination` mapping.
    pub fn files<I, S>(mut self, src: I, dest: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mappings.push(FileMapping::new(src, dest));
        self
    }

    pub fn mapping(mut self, mapping: FileMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn flatten(mut self, enabled: bool) -> Self {
        self.plan.flatten = enabled;
        self
    }

    pub fn base_path(mut self, base: impl Into<PathBuf>) -> Self {
        self.plan.base_path = Some(base.into());
        self
    }

    pub fn compilation(mut self, options: CompilationOptions) -> Self {
        self.compilation = options;
        self
    }

    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn host(mut self, host: Arc<dyn IoHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompilerBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn abort_signal(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Check mappings are well formed. Does not touch the file system.
    pub fn validate(&self) -> Result<()> {
        for mapping in &self.mappings {
            if mapping.dest.trim().is_empty() {
                return Err(ConfigurationError::InvalidMapping {
                    dest: mapping.dest.clone(),
                    reason: "destination is empty".into(),
                }
                .into());
            }
            if mapping.src.is_empty() {
                return Err(ConfigurationError::InvalidMapping {
                    dest: mapping.dest.clone(),
                    reason: "no source patterns".into(),
                }
                .into());
            }
        }
        if self.max_parallel == Some(0) {
            return Err(ConfigurationError::InvalidMapping {
                dest: String::new(),
                reason: "max_parallel must be at least 1".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Expand mappings into jobs without compiling or creating directories.
    pub fn plan(&self) -> Result<Vec<Job>> {
        self.validate()?;
        let host = self.resolve_host()?;
        let jobs = PathPlanner::new(host.as_ref(), &self.plan).plan(&self.mappings)?;
        check_compatibility(&jobs, &self.compilation)?;
        Ok(jobs)
    }

    /// Plan, check the backend, create output directories and compile.
    ///
    /// Configuration problems abort before any job starts. Job failures do
    /// not: they are reported in the returned [`BuildResult`].
    pub async fn build(self) -> Result<BuildResult> {
        self.validate()?;
        let host = self.resolve_host()?;
        let planner = PathPlanner::new(host.as_ref(), &self.plan);
        let jobs = planner.plan(&self.mappings)?;
        check_compatibility(&jobs, &self.compilation)?;

        let backend = self
            .backend
            .clone()
            .unwrap_or_else(|| Arc::new(CommandBackend::new(DEFAULT_COMPILER)));

        if !jobs.is_empty() {
            backend.ensure_available().await?;
            planner.prepare(&jobs).await?;
        }
        debug!(jobs = jobs.len(), backend = backend.name(), "dispatching jobs");

        let mut scheduler =
            CompileScheduler::new(backend, Arc::clone(&host), Arc::new(self.compilation))
                .abort_signal(self.abort);
        if let Some(max_parallel) = self.max_parallel {
            scheduler = scheduler.max_parallel(max_parallel);
        }
        Ok(scheduler.run(jobs).await)
    }

    fn resolve_host(&self) -> Result<Arc<dyn IoHost>> {
        if let Some(host) = &self.host {
            return Ok(Arc::clone(host));
        }
        let host = match &self.cwd {
            Some(cwd) => NativeHost::new(cwd.clone()),
            None => NativeHost::from_current_dir()?,
        };
        Ok(Arc::new(host))
    }
}

/// Run a build with `options`.
pub async fn build(options: BuildOptions) -> Result<BuildResult> {
    options.build().await
}
