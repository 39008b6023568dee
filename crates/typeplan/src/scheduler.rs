//! Bounded-concurrency job execution.
//!
//! Every job runs as its own task: resolve the reference closure, read the
//! files, hand the unit to the backend. A semaphore caps how many are in
//! flight. Failures stay local to their job, and results are reported in
//! plan order regardless of completion order.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use typeplan_host::{IoHost, SourceFile};

use crate::backend::{Artifact, CompilationUnit, CompileOutput, CompilerBackend, Stage};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::job::{Job, is_ambient};
use crate::options::CompilationOptions;
use crate::resolver::DependencyResolver;

/// Cooperative cancellation for a running build.
///
/// Jobs already handed to the backend finish; jobs that have not started
/// are reported as [`JobStatus::Skipped`].
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "stage", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    Failed(Stage),
    /// Never started because the build was aborted
    Skipped,
}

/// What happened to one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    /// The job with its discovered dependencies appended
    pub job: Job,
    /// Files handed to the backend, in the order they were compiled
    pub compiled: Vec<PathBuf>,
    pub status: JobStatus,
    pub diagnostics: Vec<Diagnostic>,
    pub artifacts: Vec<Artifact>,
    pub duration: Duration,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    fn skipped(job: Job) -> Self {
        Self {
            job,
            compiled: Vec::new(),
            status: JobStatus::Skipped,
            diagnostics: Vec::new(),
            artifacts: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Outcome of a whole build, in plan order.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    pub jobs: Vec<JobOutcome>,
    /// True only if every job succeeded
    pub overall_success: bool,
}

impl BuildResult {
    fn from_outcomes(jobs: Vec<JobOutcome>) -> Self {
        let overall_success = jobs.iter().all(JobOutcome::is_success);
        Self {
            jobs,
            overall_success,
        }
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.jobs.iter().flat_map(|outcome| outcome.diagnostics.iter())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics().filter(|d| d.is_error())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Failed(_)))
    }

    pub fn succeeded_count(&self) -> usize {
        self.jobs.iter().filter(|o| o.is_success()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|o| o.status == JobStatus::Skipped)
            .count()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.jobs.iter().flat_map(|outcome| outcome.artifacts.iter())
    }
}

/// State shared by every job task.
#[derive(Debug)]
struct JobContext {
    backend: Arc<dyn CompilerBackend>,
    host: Arc<dyn IoHost>,
    options: Arc<CompilationOptions>,
}

/// Dispatches jobs to a backend with at most `max_parallel` in flight.
#[derive(Debug, Clone)]
pub struct CompileScheduler {
    backend: Arc<dyn CompilerBackend>,
    host: Arc<dyn IoHost>,
    options: Arc<CompilationOptions>,
    max_parallel: usize,
    abort: AbortSignal,
}

impl CompileScheduler {
    /// Parallelism defaults to the number of logical CPUs.
    pub fn new(
        backend: Arc<dyn CompilerBackend>,
        host: Arc<dyn IoHost>,
        options: Arc<CompilationOptions>,
    ) -> Self {
        Self {
            backend,
            host,
            options,
            max_parallel: num_cpus::get(),
            abort: AbortSignal::default(),
        }
    }

    /// Cap concurrent jobs. Zero is treated as one.
    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn abort_signal(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Run every job to completion.
    ///
    /// A failing job never cancels the others. Returns once every job has
    /// reported, with outcomes in the order `jobs` was given.
    pub async fn run(&self, jobs: Vec<Job>) -> BuildResult {
        if jobs.is_empty() {
            debug!("no jobs to run");
            return BuildResult::from_outcomes(Vec::new());
        }

        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let context = Arc::new(JobContext {
            backend: Arc::clone(&self.backend),
            host: Arc::clone(&self.host),
            options: Arc::clone(&self.options),
        });

        info!(
            jobs = total,
            max_parallel = self.max_parallel,
            backend = self.backend.name(),
            "starting compilation"
        );

        let mut join_set = JoinSet::new();
        let mut task_index = rustc_hash::FxHashMap::default();
        let mut outcomes: Vec<Option<JobOutcome>> = vec![None; total];

        for (index, job) in jobs.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let context = Arc::clone(&context);
            let abort = self.abort.clone();

            let handle = join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, JobOutcome::skipped(job));
                };
                if abort.is_aborted() {
                    debug!(destination = %job.destination.display(), "skipping job after abort");
                    return (index, JobOutcome::skipped(job));
                }
                (index, run_job(job, &context).await)
            });
            task_index.insert(handle.id(), index);
        }

        let mut remaining = total;
        while let Some(joined) = join_set.join_next().await {
            remaining -= 1;
            match joined {
                Ok((index, outcome)) => {
                    report(&outcome);
                    outcomes[index] = Some(outcome);
                }
                Err(err) => {
                    let Some(&index) = task_index.get(&err.id()) else {
                        warn!(error = %err, "lost track of a failed job task");
                        continue;
                    };
                    warn!(
                        destination = %jobs[index].destination.display(),
                        error = %err,
                        "job task panicked"
                    );
                    outcomes[index] = Some(JobOutcome {
                        job: jobs[index].clone(),
                        compiled: Vec::new(),
                        status: JobStatus::Failed(Stage::Emit),
                        diagnostics: vec![
                            Diagnostic::error(
                                DiagnosticKind::Other,
                                format!("Compilation task failed: {err}"),
                            )
                            .in_file(&jobs[index].destination),
                        ],
                        artifacts: Vec::new(),
                        duration: Duration::ZERO,
                    });
                }
            }
            debug!(remaining, "job finished");
        }

        let outcomes = outcomes
            .into_iter()
            .zip(jobs)
            .map(|(outcome, job)| outcome.unwrap_or_else(|| JobOutcome::skipped(job)))
            .collect();
        let result = BuildResult::from_outcomes(outcomes);
        info!(
            succeeded = result.succeeded_count(),
            total,
            success = result.overall_success,
            "compilation finished"
        );
        result
    }
}

fn report(outcome: &JobOutcome) {
    match outcome.status {
        JobStatus::Succeeded => info!(
            destination = %outcome.job.destination.display(),
            duration_ms = outcome.duration.as_millis() as u64,
            "{}...OK",
            outcome.job.destination.display()
        ),
        JobStatus::Failed(stage) => warn!(
            destination = %outcome.job.destination.display(),
            %stage,
            errors = outcome.diagnostics.iter().filter(|d| d.is_error()).count(),
            "job failed"
        ),
        JobStatus::Skipped => {}
    }
}

async fn run_job(mut job: Job, context: &JobContext) -> JobOutcome {
    let start = Instant::now();
    let mut diagnostics = Vec::new();

    let Prepared { unit, complete } = prepare_unit(&mut job, context, &mut diagnostics).await;
    let compiled: Vec<PathBuf> = unit.source_paths().map(Path::to_path_buf).collect();

    let output = if unit.sources.is_empty() && unit.ambient.is_empty() {
        CompileOutput::default()
    } else {
        context
            .backend
            .compile(&unit, &context.options, context.host.as_ref())
            .await
    };
    diagnostics.extend(output.diagnostics);

    let status = if !complete {
        JobStatus::Failed(Stage::Resolve)
    } else {
        match output.failed_stage {
            None => JobStatus::Succeeded,
            Some(stage) => JobStatus::Failed(stage),
        }
    };

    JobOutcome {
        job,
        compiled,
        status,
        diagnostics,
        artifacts: output.artifacts,
        duration: start.elapsed(),
    }
}

/// A unit ready for the backend. `complete` is false when some file could
/// not be read or a reference could not be resolved; the unit then holds
/// whatever was found.
struct Prepared {
    unit: CompilationUnit,
    complete: bool,
}

/// Resolve and read a job's files.
async fn prepare_unit(
    job: &mut Job,
    context: &JobContext,
    diagnostics: &mut Vec<Diagnostic>,
) -> Prepared {
    let options = &context.options;
    let host = context.host.as_ref();

    let mut seeds = Vec::with_capacity(job.sources.len() + 1);
    if let Some(lib) = options.default_lib.as_ref().filter(|_| !options.no_lib) {
        seeds.push(lib.clone());
    }
    seeds.extend(job.sources.iter().cloned());

    if options.no_resolve {
        return read_seeds(&seeds, job, host, diagnostics).await;
    }

    let resolution = DependencyResolver::new(host).resolve(&seeds).await;
    job.append_dependencies(resolution.paths().map(Path::to_path_buf));
    diagnostics.extend(resolution.diagnostics().iter().cloned());

    let sources = resolution
        .emit_order()
        .into_iter()
        .filter_map(|file| file.source.clone())
        .collect();
    let ambient = resolution
        .ambient()
        .filter_map(|file| file.source.clone())
        .collect();

    Prepared {
        unit: CompilationUnit {
            destination: job.destination.clone(),
            sources,
            ambient,
        },
        complete: !resolution.has_errors(),
    }
}

async fn read_seeds(
    seeds: &[PathBuf],
    job: &Job,
    host: &dyn IoHost,
    diagnostics: &mut Vec<Diagnostic>,
) -> Prepared {
    let mut sources: Vec<SourceFile> = Vec::new();
    let mut ambient: Vec<SourceFile> = Vec::new();
    let mut complete = true;

    for seed in seeds {
        match host.read_file(seed).await {
            Ok(file) if is_ambient(file.path()) => ambient.push(file),
            Ok(file) => {
                if !sources.iter().any(|s| s.path() == file.path()) {
                    sources.push(file);
                }
            }
            Err(err) => {
                complete = false;
                diagnostics
                    .push(Diagnostic::error(DiagnosticKind::Io, err.to_string()).in_file(seed));
            }
        }
    }

    Prepared {
        unit: CompilationUnit {
            destination: job.destination.clone(),
            sources,
            ambient,
        },
        complete,
    }
}
