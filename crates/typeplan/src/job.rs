//! Jobs: the unit of scheduling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name suffixes of declaration-only sources.
pub const AMBIENT_SUFFIXES: &[&str] = &[".d.ts", ".d.js"];

/// Whether `path` names a declaration-only (ambient) file.
pub fn is_ambient(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| AMBIENT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

/// One `sources -> destination` mapping as declared by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    /// Glob patterns; a leading `!` excludes earlier matches
    pub src: Vec<String>,
    /// Output file, directory (trailing separator) or wildcard pattern
    pub dest: String,
}

impl FileMapping {
    pub fn new<I, S>(src: I, dest: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            src: src.into_iter().map(Into::into).collect(),
            dest: dest.into(),
        }
    }
}

/// How a job's destination was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetShape {
    /// Every matched source concatenated into one literal output
    SingleFile,
    /// One output per source, placed relative to `base_path`
    MultiTarget { base_path: PathBuf, flatten: bool },
}

/// An ordered source list compiled into one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub destination: PathBuf,
    /// Seeds in declaration order followed by discovered dependencies
    pub sources: Vec<PathBuf>,
    pub shape: TargetShape,
}

impl Job {
    pub fn new(destination: PathBuf, sources: Vec<PathBuf>, shape: TargetShape) -> Self {
        Self {
            destination,
            sources,
            shape,
        }
    }

    /// Sources that produce output; ambient files only supply declarations.
    pub fn compile_set(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .iter()
            .map(PathBuf::as_path)
            .filter(|path| !is_ambient(path))
    }

    /// Append dependencies not already listed. Existing order is untouched.
    pub fn append_dependencies(&mut self, discovered: impl IntoIterator<Item = PathBuf>) {
        for path in discovered {
            if !self.sources.contains(&path) {
                self.sources.push(path);
            }
        }
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.shape, TargetShape::SingleFile)
    }
}
