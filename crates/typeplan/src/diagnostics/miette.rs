//! Miette rendering for diagnostics.
//!
//! Wraps a [`Diagnostic`](super::Diagnostic) together with the text of the
//! file it points at, so reports show the offending line.

use super::{Diagnostic as BuildDiagnostic, DiagnosticKind, Severity as BuildSeverity};
use miette::{Diagnostic, LabeledSpan, NamedSource, Severity, SourceSpan};
use std::fmt;

/// Convert line and column (both 1-based) to a byte offset.
///
/// Columns count characters, not bytes.
pub fn line_col_to_offset(source: &str, line: u32, column: u32) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line as usize {
            let col_bytes = if column == 0 {
                0
            } else {
                text.char_indices()
                    .nth((column - 1) as usize)
                    .map(|(pos, _)| pos)
                    .unwrap_or(text.trim_end_matches(['\r', '\n']).len())
            };
            return Some(offset + col_bytes);
        }
        offset += text.len();
    }
    None
}

/// Length of the token starting at `offset`, at least 1.
fn span_length(source: &str, offset: usize, kind: DiagnosticKind) -> usize {
    let Some(remaining) = source.get(offset..) else {
        return 1;
    };

    if kind == DiagnosticKind::UnresolvedReference {
        let quote = remaining.chars().next().filter(|c| *c == '"' || *c == '\'');
        if let Some(end) = quote.and_then(|q| remaining[1..].find(q)) {
            return end + 2;
        }
    }

    remaining
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map(|(pos, _)| pos)
        .unwrap_or(remaining.len())
        .max(1)
}

/// A diagnostic ready for miette's report handler.
#[derive(Debug)]
pub struct DiagnosticReport {
    diag: BuildDiagnostic,
    source_code: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl DiagnosticReport {
    pub fn new(diag: BuildDiagnostic, source: Option<String>) -> Self {
        let span = match (&source, diag.line, diag.column) {
            (Some(text), Some(line), Some(column)) => line_col_to_offset(text, line, column)
                .map(|offset| SourceSpan::new(offset.into(), span_length(text, offset, diag.kind))),
            _ => None,
        };
        let source_code = match (source, &diag.file) {
            (Some(text), Some(file)) if span.is_some() => {
                Some(NamedSource::new(file.display().to_string(), text))
            }
            _ => None,
        };
        Self {
            diag,
            source_code,
            span,
        }
    }

    pub fn diagnostic(&self) -> &BuildDiagnostic {
        &self.diag
    }
}

impl std::error::Error for DiagnosticReport {}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.diag.file, self.source_code.is_some()) {
            // The snippet header already names the file.
            (Some(_), true) | (None, _) => f.write_str(&self.diag.message),
            (Some(_), false) => write!(f, "{}", self.diag),
        }
    }
}

impl Diagnostic for DiagnosticReport {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        let code = match self.diag.kind {
            DiagnosticKind::Io => "typeplan::io",
            DiagnosticKind::UnresolvedReference => "typeplan::unresolved_reference",
            DiagnosticKind::Syntax => "typeplan::syntax",
            DiagnosticKind::Semantic => "typeplan::semantic",
            DiagnosticKind::Emit => "typeplan::emit",
            DiagnosticKind::Other => "typeplan::compile",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.diag.severity {
            BuildSeverity::Error => Severity::Error,
            BuildSeverity::Warning => Severity::Warning,
        })
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        self.diag
            .help
            .as_ref()
            .map(|h| Box::new(h.clone()) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|source| source as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = match self.diag.kind {
            DiagnosticKind::UnresolvedReference => "not found",
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::Semantic => "here",
            _ => "error",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(label.to_string()),
            span.offset(),
            span.len(),
        ))))
    }
}

/// Build a report, loading the referenced file from disk when possible.
pub fn to_report(diag: BuildDiagnostic) -> DiagnosticReport {
    let source = diag
        .file
        .as_ref()
        .filter(|file| file.is_file())
        .and_then(|file| std::fs::read(file).ok())
        .and_then(|raw| typeplan_host::encoding::decode(&raw).ok())
        .map(|(_, text)| text);
    DiagnosticReport::new(diag, source)
}
