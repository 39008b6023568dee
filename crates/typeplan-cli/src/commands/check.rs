//! Check command implementation.
//!
//! Validates configuration and plans every selected target without
//! compiling or creating directories.

use serde::Serialize;
use typeplan::{Job, TargetShape};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

#[derive(Debug, Serialize)]
struct PlannedTarget<'a> {
    target: &'a str,
    jobs: Vec<Job>,
}

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate typeplan.json
/// 2. Select targets
/// 3. Plan each target: expand patterns, infer destinations, detect collisions
/// 4. Print the jobs, as text on stderr or as JSON on stdout with `--json`
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let session = utils::open_session(&args.project, &args.mapping, &args.compiler)?;
    ui::success("Configuration is valid");

    let mut planned = Vec::with_capacity(session.targets.len());
    for target in &session.targets {
        let jobs = target.build_options().cwd(&session.cwd).plan()?;
        planned.push(PlannedTarget {
            target: &target.name,
            jobs,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else {
        for target in &planned {
            print_target(target, &session.cwd);
        }
    }

    let total: usize = planned.iter().map(|t| t.jobs.len()).sum();
    ui::success(&format!(
        "{} planned across {} target{}",
        pluralize(total, "job"),
        planned.len(),
        if planned.len() == 1 { "" } else { "s" }
    ));
    Ok(())
}

fn print_target(target: &PlannedTarget<'_>, cwd: &std::path::Path) {
    ui::info(&format!("Target '{}'", target.target));
    if target.jobs.is_empty() {
        ui::warning("  no source files matched");
        return;
    }
    for job in &target.jobs {
        let shape = match &job.shape {
            TargetShape::SingleFile => "file",
            TargetShape::MultiTarget { flatten: true, .. } => "flattened",
            TargetShape::MultiTarget { .. } => "mirrored",
        };
        let sources: Vec<String> = job
            .sources
            .iter()
            .map(|source| utils::display_path(source, cwd))
            .collect();
        eprintln!(
            "  {} [{}] <- {}",
            utils::display_path(&job.destination, cwd),
            shape,
            sources.join(", ")
        );
    }
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "job"), "0 jobs");
        assert_eq!(pluralize(1, "job"), "1 job");
        assert_eq!(pluralize(3, "job"), "3 jobs");
    }
}
