//! Build command implementation.
//!
//! Plans and compiles each selected target in turn, printing compiler
//! diagnostics per failed job and a summary at the end.

use std::sync::Arc;
use std::time::Instant;
use typeplan::{AbortSignal, BuildResult, CommandBackend, CompilerBackend, JobStatus};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::ResolvedTarget;
use crate::error::{BuildError, Result, render_diagnostic};
use crate::ui;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Select targets
/// 3. Build each target: plan, probe the compiler, compile jobs in parallel
/// 4. Print diagnostics of failed jobs and a build summary
///
/// Ctrl-C stops jobs that have not started yet.
///
/// # Errors
///
/// Configuration and planning errors abort before anything is compiled.
/// A build with failed or skipped jobs returns [`BuildError`].
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    ui::info("Loading configuration...");
    let session = utils::open_session(&args.project, &args.mapping, &args.compiler)?;

    let backend: Arc<dyn CompilerBackend> =
        Arc::new(CommandBackend::new(session.config.compiler.as_str()));
    let abort = AbortSignal::new();
    let interrupt = tokio::spawn({
        let abort = abort.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, waiting for running jobs");
                abort.abort();
            }
        }
    });

    let mut results = Vec::with_capacity(session.targets.len());
    for target in &session.targets {
        let result = build_target(
            target,
            &session.cwd,
            Arc::clone(&backend),
            session.config.jobs,
            &abort,
        )
        .await;
        match result {
            Ok(result) => results.push(result),
            Err(err) => {
                interrupt.abort();
                return Err(err);
            }
        }
        if abort.is_aborted() {
            break;
        }
    }
    interrupt.abort();

    let rows: Vec<ui::SummaryRow> = results
        .iter()
        .flat_map(|result| result.jobs.iter())
        .map(|outcome| ui::SummaryRow {
            destination: utils::display_path(&outcome.job.destination, &session.cwd),
            status: outcome.status,
            duration: outcome.duration,
        })
        .collect();
    if !rows.is_empty() {
        ui::print_build_summary(&rows, start_time.elapsed());
    }

    let total = rows.len();
    let failed = rows
        .iter()
        .filter(|row| matches!(row.status, JobStatus::Failed(_)))
        .count();
    let skipped = rows
        .iter()
        .filter(|row| row.status == JobStatus::Skipped)
        .count();

    if failed > 0 {
        return Err(BuildError::JobsFailed { failed, total }.into());
    }
    if skipped > 0 || abort.is_aborted() {
        return Err(BuildError::Interrupted { skipped }.into());
    }

    if total == 0 {
        ui::warning("No source files matched; nothing to compile");
    }
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));
    Ok(())
}

async fn build_target(
    target: &ResolvedTarget,
    cwd: &std::path::Path,
    backend: Arc<dyn CompilerBackend>,
    jobs: Option<usize>,
    abort: &AbortSignal,
) -> Result<BuildResult> {
    ui::info(&format!("Building target '{}'", target.name));

    let mut options = target
        .build_options()
        .cwd(cwd)
        .backend(backend)
        .abort_signal(abort.clone());
    if let Some(jobs) = jobs {
        options = options.max_parallel(jobs);
    }

    let result = options.build().await?;
    report_failures(&result);
    Ok(result)
}

fn report_failures(result: &BuildResult) {
    for outcome in result.failed() {
        ui::error(&format!(
            "{} failed",
            outcome.job.destination.display()
        ));
        for diag in &outcome.diagnostics {
            eprintln!("{}", render_diagnostic(diag));
        }
    }
}
