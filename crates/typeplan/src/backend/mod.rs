//! Compiler backends.
//!
//! A backend turns one [`CompilationUnit`] into output files. Two are
//! provided: [`CommandBackend`] runs an external compiler as a subprocess,
//! [`InProcessBackend`] drives a [`Frontend`] implementation through its
//! stages and writes artifacts through the [`IoHost`].

pub mod command;
pub mod staged;

pub use command::CommandBackend;
pub use staged::{EmittedFile, Frontend, InProcessBackend};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use typeplan_host::{IoHost, SourceFile};

use crate::ConfigurationError;
use crate::diagnostics::{Diagnostic, has_errors};
use crate::options::CompilationOptions;

/// Compilation stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Resolve,
    Syntax,
    Semantic,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resolve => "resolve",
            Stage::Syntax => "syntax",
            Stage::Semantic => "semantic",
            Stage::Emit => "emit",
        })
    }
}

/// Everything a backend needs for one job.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub destination: PathBuf,
    /// Files to compile, each after the files it references
    pub sources: Vec<SourceFile>,
    /// Declaration-only files visible to the sources
    pub ambient: Vec<SourceFile>,
}

impl CompilationUnit {
    pub fn source_paths(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(SourceFile::path)
    }

    /// Ambient files first, then sources.
    pub fn all_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.ambient.iter().chain(self.sources.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Output,
    SourceMap,
    Declaration,
}

/// A file a backend wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Result of compiling one unit.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub artifacts: Vec<Artifact>,
    /// First stage that reported an error
    pub failed_stage: Option<Stage>,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        self.failed_stage.is_none()
    }

    /// Mark the output failed at `stage` unless an earlier stage already failed.
    pub fn fail(&mut self, stage: Stage) {
        self.failed_stage = Some(self.failed_stage.map_or(stage, |s| s.min(stage)));
    }

    /// Derive the failed stage from error diagnostics, earliest stage first.
    pub fn classify(&mut self) {
        if let Some(stage) = self
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.kind.stage())
            .min()
        {
            self.fail(stage);
        }
    }

    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Compiles units into output files.
///
/// Implementations are shared by every concurrently running job and must
/// not keep per-job state between calls. Failures are reported through
/// [`CompileOutput`], never by panicking.
#[async_trait]
pub trait CompilerBackend: Send + Sync + fmt::Debug {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Check the backend can run at all. Called once, before any job starts.
    async fn ensure_available(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }

    async fn compile(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        host: &dyn IoHost,
    ) -> CompileOutput;
}
