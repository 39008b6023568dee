//! Subprocess compiler backend.
//!
//! Runs `<program> --out <destination> <files...> <flags...>` and turns the
//! compiler's `file(line,col): error TSnnnn: message` lines into
//! diagnostics.

use async_trait::async_trait;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;
use typeplan_host::{IoHost, resolve_path};

use super::{Artifact, ArtifactKind, CompilationUnit, CompileOutput, CompilerBackend, Stage};
use crate::ConfigurationError;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::options::CompilationOptions;

static LOCATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>[^()\r\n]+)\((?P<line>\d+),(?P<column>\d+)\):\s*(?:(?P<severity>error|warning)\s+)?(?:TS(?P<code>\d+):\s*)?(?P<message>.+)$",
    )
    .expect("located diagnostic pattern is valid")
});

static GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<severity>error|warning)\s+TS(?P<code>\d+):\s*(?P<message>.+)$")
        .expect("global diagnostic pattern is valid")
});

/// Runs an external compiler executable.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
    name: String,
    extra_args: Vec<OsString>,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            name: program.display().to_string(),
            program,
            extra_args: Vec::new(),
        }
    }

    /// Argument placed before everything else, e.g. a script path for an interpreter.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for compiling `unit`.
    pub fn args(&self, unit: &CompilationUnit, options: &CompilationOptions) -> Vec<OsString> {
        let mut args = self.extra_args.clone();
        args.push("--out".into());
        args.push(unit.destination.clone().into_os_string());
        args.extend(
            unit.all_files()
                .map(|file| file.path().as_os_str().to_os_string()),
        );
        args.extend(options.to_args().into_iter().map(OsString::from));
        args
    }

    async fn collect_artifacts(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        host: &dyn IoHost,
    ) -> Vec<Artifact> {
        let mut candidates = vec![(unit.destination.clone(), ArtifactKind::Output)];
        if options.sourcemap {
            let mut map = unit.destination.clone().into_os_string();
            map.push(".map");
            candidates.push((PathBuf::from(map), ArtifactKind::SourceMap));
        }
        if options.declaration {
            candidates.push((
                unit.destination.with_extension("d.ts"),
                ArtifactKind::Declaration,
            ));
        }
        candidates
            .into_iter()
            .filter(|(path, _)| host.exists(path))
            .map(|(path, kind)| Artifact { path, kind })
            .collect()
    }
}

#[async_trait]
impl CompilerBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_available(&self) -> Result<(), ConfigurationError> {
        Command::new(&self.program)
            .args(&self.extra_args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|_| ())
            .map_err(|err| ConfigurationError::BackendUnavailable {
                backend: self.name.clone(),
                reason: err.to_string(),
            })
    }

    async fn compile(
        &self,
        unit: &CompilationUnit,
        options: &CompilationOptions,
        host: &dyn IoHost,
    ) -> CompileOutput {
        let mut output = CompileOutput::default();
        let args = self.args(unit, options);
        debug!(
            command = %format!("{} {}", self.name, args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")),
            "spawning compiler"
        );

        let result = Command::new(&self.program)
            .args(&args)
            .current_dir(host.cwd())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        let process = match result {
            Ok(process) => process,
            Err(err) => {
                output.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::Emit,
                    format!("Failed to run {}: {err}", self.name),
                ));
                output.fail(Stage::Emit);
                return output;
            }
        };

        let stdout = String::from_utf8_lossy(&process.stdout);
        let stderr = String::from_utf8_lossy(&process.stderr);
        output.diagnostics = parse_output(&stdout, host.cwd());
        output.diagnostics.extend(parse_output(&stderr, host.cwd()));
        output.classify();

        if !process.status.success() && output.is_success() {
            let raw = format!("{}\n{}", stderr.trim(), stdout.trim());
            let raw = raw.trim();
            let message = if raw.is_empty() {
                format!("{} exited with {}", self.name, process.status)
            } else {
                raw.to_string()
            };
            output
                .diagnostics
                .push(Diagnostic::error(DiagnosticKind::Emit, message).in_file(&unit.destination));
            output.fail(Stage::Emit);
        }

        if output.is_success() {
            output.artifacts = self.collect_artifacts(unit, options, host).await;
        }
        output
    }
}

/// Parse compiler output into diagnostics. Unrecognized lines are dropped.
///
/// Relative file names are taken from `cwd`.
pub fn parse_output(text: &str, cwd: &Path) -> Vec<Diagnostic> {
    text.lines()
        .filter_map(|line| parse_line(line.trim_end(), cwd))
        .collect()
}

fn parse_line(line: &str, cwd: &Path) -> Option<Diagnostic> {
    if let Some(caps) = LOCATED.captures(line) {
        let code = caps.name("code").and_then(|c| c.as_str().parse().ok());
        let mut diag = Diagnostic::error(kind_for(code), caps["message"].trim()).at(
            resolve_path(cwd, Path::new(caps["file"].trim())),
            caps["line"].parse().unwrap_or(0),
            caps["column"].parse().unwrap_or(0),
        );
        if caps.name("severity").is_some_and(|s| s.as_str() == "warning") {
            diag.severity = Severity::Warning;
        }
        return Some(diag);
    }

    let caps = GLOBAL.captures(line)?;
    let code = caps["code"].parse().ok();
    let mut diag = Diagnostic::error(kind_for(code), caps["message"].trim());
    if &caps["severity"] == "warning" {
        diag.severity = Severity::Warning;
    }
    Some(diag)
}

/// Kind from a `TSnnnn` code: 1xxx syntax, 2xxx-3xxx semantic, the rest emit.
fn kind_for(code: Option<u32>) -> DiagnosticKind {
    match code {
        None => DiagnosticKind::Semantic,
        Some(1000..=1999) => DiagnosticKind::Syntax,
        Some(2000..=3999) => DiagnosticKind::Semantic,
        Some(_) => DiagnosticKind::Emit,
    }
}
