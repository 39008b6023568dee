//! Formatting utilities for durations and build summaries.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;
use typeplan::JobStatus;

use super::colors_enabled;

/// Format duration in human-readable format.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use typeplan_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One line of the build summary
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub destination: String,
    pub status: JobStatus,
    pub duration: Duration,
}

fn status_label(status: JobStatus) -> String {
    match status {
        JobStatus::Succeeded => "ok".to_string(),
        JobStatus::Failed(stage) => format!("failed ({stage})"),
        JobStatus::Skipped => "skipped".to_string(),
    }
}

/// Print a table of job outcomes to stderr, plus a total line.
pub fn print_build_summary(rows: &[SummaryRow], elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let colored = colors_enabled();

    if colored {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for row in rows {
        let label = status_label(row.status);
        let duration = format!("({})", format_duration(row.duration));
        if !colored {
            eprintln!("  ▸ {} {} {}", row.destination, label, duration);
            continue;
        }
        let label = match row.status {
            JobStatus::Succeeded => label.green().to_string(),
            JobStatus::Failed(_) => label.red().to_string(),
            JobStatus::Skipped => label.yellow().to_string(),
        };
        eprintln!(
            "  {} {} {} {}",
            "▸".blue(),
            row.destination.bright_white().bold(),
            label,
            duration.dimmed()
        );
    }

    eprintln!("{}", "─".repeat(width));

    let succeeded = rows
        .iter()
        .filter(|row| row.status == JobStatus::Succeeded)
        .count();
    let total = format!("{succeeded}/{} jobs", rows.len());
    let time = format_duration(elapsed);
    if colored {
        eprintln!("  {} {} in {}", "Total:".bold(), total.green(), time.green());
    } else {
        eprintln!("  Total: {total} in {time}");
    }
}
