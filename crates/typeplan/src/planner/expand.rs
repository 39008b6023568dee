//! Source pattern expansion.

use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use typeplan_host::path::normalize;

use crate::ConfigurationError;

/// Expand glob `patterns` relative to `cwd` into matched files.
///
/// Patterns are applied in order. A pattern starting with `!` removes
/// whatever earlier patterns matched. Directories never match, and every
/// file is listed once at the position of its first match.
pub fn expand_patterns(cwd: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, ConfigurationError> {
    let mut matched: IndexSet<PathBuf> = IndexSet::new();

    for pattern in patterns {
        let (exclude, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };

        let full = absolute_pattern(cwd, body);
        let entries = glob::glob(&full).map_err(|source| ConfigurationError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    let path = normalize(&path);
                    if exclude {
                        matched.shift_remove(&path);
                    } else {
                        matched.insert(path);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "skipping unreadable glob entry");
                }
            }
        }
    }

    Ok(matched.into_iter().collect())
}

fn absolute_pattern(cwd: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }
    let pattern = pattern.trim_start_matches("./");
    let root = glob::Pattern::escape(&cwd.to_string_lossy());
    format!("{}/{}", root.trim_end_matches('/'), pattern)
}
