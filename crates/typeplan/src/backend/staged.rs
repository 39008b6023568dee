//! In-process backend driving a staged [`Frontend`].
//!
//! Stages run in order and stop at the first one that fails: parse,
//! check, emit, then declaration emit when requested. Emitted text is
//! written through the host so that virtual hosts capture it too.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::trace;
use typeplan_host::{ByteOrderMark, IoHost};

use super::{Artifact, ArtifactKind, CompilationUnit, CompileOutput, CompilerBackend, Stage};
use crate::diagnostics::{Diagnostic, DiagnosticKind, has_errors};
use crate::options::CompilationOptions;

/// A file produced by [`Frontend::emit`] or [`Frontend::emit_declarations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub text: String,
    pub kind: ArtifactKind,
    pub marker: ByteOrderMark,
}

impl EmittedFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            kind,
            marker: ByteOrderMark::Absent,
        }
    }
}

/// A compiler that runs inside this process.
///
/// Each stage pushes its diagnostics onto `diagnostics`. A stage fails when
/// it returns `None` (or `false`) or pushes any error.
pub trait Frontend: Send + Sync + fmt::Debug {
    type Program: Send;

    fn parse(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Self::Program>;

    fn check(
        &self,
        program: &Self::Program,
        options: &CompilationOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool;

    fn emit(
        &self,
        program: &Self::Program,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<EmittedFile>>;

    fn emit_declarations(
        &self,
        _program: &Self::Program,
        _unit: &CompilationUnit,
        _options: &CompilationOptions,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<EmittedFile>> {
        Some(Vec::new())
    }
}

/// Runs a [`Frontend`] per job and writes its output through the host.
#[derive(Debug)]
pub struct InProcessBackend<F> {
    frontend: F,
    name: String,
}

impl<F: Frontend> InProcessBackend<F> {
    pub fn new(frontend: F) -> Self {
        Self {
            frontend,
            name: "in-process".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Run every stage synchronously, collecting files to write.
    fn run_stages(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        output: &mut CompileOutput,
    ) -> Vec<EmittedFile> {
        let diagnostics = &mut output.diagnostics;

        let mark = diagnostics.len();
        let program = self.frontend.parse(unit, options, diagnostics);
        let Some(program) = program.filter(|_| !has_errors(&diagnostics[mark..])) else {
            output.failed_stage = Some(Stage::Syntax);
            return Vec::new();
        };

        let mark = diagnostics.len();
        let checked = self.frontend.check(&program, options, diagnostics);
        if !checked || has_errors(&diagnostics[mark..]) {
            output.failed_stage = Some(Stage::Semantic);
            return Vec::new();
        }

        let mark = diagnostics.len();
        let emitted = self.frontend.emit(&program, unit, options, diagnostics);
        let Some(mut files) = emitted.filter(|_| !has_errors(&diagnostics[mark..])) else {
            output.failed_stage = Some(Stage::Emit);
            return Vec::new();
        };

        if options.declaration {
            let mark = diagnostics.len();
            let declarations = self
                .frontend
                .emit_declarations(&program, unit, options, diagnostics);
            match declarations.filter(|_| !has_errors(&diagnostics[mark..])) {
                Some(declarations) => files.extend(declarations),
                None => {
                    output.failed_stage = Some(Stage::Emit);
                    return Vec::new();
                }
            }
        }

        files
    }
}

#[async_trait]
impl<F: Frontend> CompilerBackend for InProcessBackend<F> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn compile(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        host: &dyn IoHost,
    ) -> CompileOutput {
        let mut output = CompileOutput::default();
        let files = self.run_stages(unit, options, &mut output);
        if !output.is_success() {
            return output;
        }

        for file in files {
            let path = host.resolve_path(host.cwd(), &file.path);
            trace!(path = %path.display(), kind = ?file.kind, "writing artifact");
            if let Err(err) = host.write_file(&path, &file.text, file.marker).await {
                output.diagnostics.push(
                    Diagnostic::error(DiagnosticKind::Emit, err.to_string()).in_file(&path),
                );
                output.fail(Stage::Emit);
                continue;
            }
            output.artifacts.push(Artifact {
                path,
                kind: file.kind,
            });
        }
        output
    }
}
