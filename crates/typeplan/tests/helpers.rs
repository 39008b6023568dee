//! Shared test utilities for typeplan tests
//!
//! Provides a toy line-based language with a staged frontend, so builds can
//! run end to end without an external compiler:
//!
//! - `function NAME` defines NAME
//! - `call NAME` uses NAME; it must already be defined at that point
//! - `declare NAME` (in ambient files) makes NAME visible everywhere
//! - `SYNTAX_ERROR` / `TYPE_ERROR` fail the parse / check stage
//! - lines starting with `//` are comments

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use typeplan::{
    ArtifactKind, BuildOptions, CompilationOptions, CompilationUnit, Diagnostic, DiagnosticKind,
    EmittedFile, Frontend, InProcessBackend,
};

/// One parsed source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Define(String),
    Call(String),
    Declare(String),
}

#[derive(Debug)]
pub struct ToyProgram {
    /// Statements of compiled sources, in emit order
    files: Vec<(PathBuf, Vec<(u32, Statement)>)>,
    texts: Vec<String>,
    declared: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ToyFrontend;

fn parse_text(
    path: &Path,
    text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(u32, Statement)> {
    let mut statements = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index as u32 + 1;
        let trimmed = line.trim();
        if let Some(column) = line.find("SYNTAX_ERROR") {
            diagnostics.push(
                Diagnostic::error(DiagnosticKind::Syntax, "unexpected token")
                    .at(path, line_no, column as u32 + 1),
            );
            continue;
        }
        if let Some(column) = line.find("TYPE_ERROR") {
            diagnostics.push(
                Diagnostic::error(DiagnosticKind::Semantic, "type mismatch")
                    .at(path, line_no, column as u32 + 1),
            );
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let statement = if let Some(name) = trimmed.strip_prefix("function ") {
            Statement::Define(name.trim().to_string())
        } else if let Some(name) = trimmed.strip_prefix("call ") {
            Statement::Call(name.trim().to_string())
        } else if let Some(name) = trimmed.strip_prefix("declare ") {
            Statement::Declare(name.trim().to_string())
        } else {
            continue;
        };
        statements.push((line_no, statement));
    }
    statements
}

impl Frontend for ToyFrontend {
    type Program = ToyProgram;

    fn parse(
        &self,
        unit: &CompilationUnit,
        _options: &CompilationOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<ToyProgram> {
        // Type errors are reported by the checker, so parse them quietly here.
        let mut syntax = Vec::new();
        let mut files = Vec::new();
        let mut texts = Vec::new();
        for source in &unit.sources {
            let mut found = Vec::new();
            let statements = parse_text(source.path(), source.text(), &mut found);
            syntax.extend(found.into_iter().filter(|d| d.kind == DiagnosticKind::Syntax));
            files.push((source.path().to_path_buf(), statements));
            texts.push(source.text().to_string());
        }
        let mut declared = Vec::new();
        for ambient in &unit.ambient {
            for (_, statement) in parse_text(ambient.path(), ambient.text(), &mut Vec::new()) {
                if let Statement::Declare(name) = statement {
                    declared.push(name);
                }
            }
        }
        diagnostics.extend(syntax);
        Some(ToyProgram {
            files,
            texts,
            declared,
        })
    }

    fn check(
        &self,
        program: &ToyProgram,
        _options: &CompilationOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        let mut defined = program.declared.clone();
        for ((path, statements), text) in program.files.iter().zip(&program.texts) {
            let mut typed = Vec::new();
            parse_text(path, text, &mut typed);
            diagnostics.extend(typed.into_iter().filter(|d| d.kind == DiagnosticKind::Semantic));

            for (line, statement) in statements {
                match statement {
                    Statement::Define(name) | Statement::Declare(name) => {
                        defined.push(name.clone())
                    }
                    Statement::Call(name) if !defined.contains(name) => diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::Semantic,
                            format!("'{name}' is used before it is defined"),
                        )
                        .at(path, *line, 1),
                    ),
                    Statement::Call(_) => {}
                }
            }
        }
        true
    }

    fn emit(
        &self,
        program: &ToyProgram,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<EmittedFile>> {
        let mut files = vec![EmittedFile::new(
            &unit.destination,
            program.texts.join("\n"),
            ArtifactKind::Output,
        )];
        if options.sourcemap {
            let sources: Vec<String> = program
                .files
                .iter()
                .map(|(path, _)| path.display().to_string())
                .collect();
            let mut map = unit.destination.clone().into_os_string();
            map.push(".map");
            files.push(EmittedFile::new(
                map,
                sources.join("\n"),
                ArtifactKind::SourceMap,
            ));
        }
        Some(files)
    }

    fn emit_declarations(
        &self,
        program: &ToyProgram,
        unit: &CompilationUnit,
        _options: &CompilationOptions,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<EmittedFile>> {
        let names: Vec<String> = program
            .files
            .iter()
            .flat_map(|(_, statements)| statements.iter())
            .filter_map(|(_, statement)| match statement {
                Statement::Define(name) => Some(format!("declare {name}")),
                _ => None,
            })
            .collect();
        Some(vec![EmittedFile::new(
            unit.destination.with_extension("d.ts"),
            names.join("\n"),
            ArtifactKind::Declaration,
        )])
    }
}

/// Backend running the toy language in-process
pub fn toy_backend() -> Arc<InProcessBackend<ToyFrontend>> {
    Arc::new(InProcessBackend::new(ToyFrontend).with_name("toy"))
}

/// Execute emitted toy output, returning the called names in order.
///
/// Fails on the first call to a name not defined above it.
pub fn run_output(text: &str) -> Result<Vec<String>, String> {
    let mut defined = Vec::new();
    let mut calls = Vec::new();
    for (_, statement) in parse_text(Path::new("<output>"), text, &mut Vec::new()) {
        match statement {
            Statement::Define(name) | Statement::Declare(name) => defined.push(name),
            Statement::Call(name) if defined.contains(&name) => calls.push(name),
            Statement::Call(name) => return Err(format!("{name} is not defined")),
        }
    }
    Ok(calls)
}

/// A temporary project directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn file(self, relative: &str, text: &str) -> Self {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().expect("file has parent")).expect("create dirs");
        std::fs::write(path, text).expect("write fixture");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read output")
    }

    /// Build options rooted at this project using the toy backend
    pub fn options(&self) -> BuildOptions {
        BuildOptions::new().cwd(self.root()).backend(toy_backend())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}
