//! Reference directive scanning.
//!
//! A directive is a triple-slash comment of the form
//! `/// <reference path="relative/path.ts" />`. Only the file header counts:
//! scanning stops at the first line that is neither blank nor a comment.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use typeplan_host::SourceFile;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^///\s*<reference\s+path\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("reference directive pattern is valid")
});

/// A reference found in a file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDirective {
    /// File containing the directive
    pub file: PathBuf,
    /// Path exactly as written
    pub target: String,
    /// 1-based line of the directive
    pub line: u32,
    /// 1-based column of the opening quote
    pub column: u32,
}

/// Directives in `file`, in textual order.
pub fn scan(file: &SourceFile) -> Vec<ReferenceDirective> {
    let mut directives = Vec::new();
    let mut in_block = false;

    for (index, line) in file.text().lines().enumerate() {
        if !in_block && line.trim_start().starts_with("///") {
            if let Some(directive) = parse_line(file, line, index) {
                directives.push(directive);
            }
            continue;
        }
        if has_code(line, &mut in_block) {
            break;
        }
    }

    directives
}

/// Whether `line` holds anything besides comments. `in_block` carries an
/// open `/* ... */` comment from one line to the next.
fn has_code(mut line: &str, in_block: &mut bool) -> bool {
    loop {
        if *in_block {
            let Some(end) = line.find("*/") else {
                return false;
            };
            *in_block = false;
            line = &line[end + 2..];
        }
        let rest = line.trim_start();
        if rest.is_empty() || rest.starts_with("//") {
            return false;
        }
        let Some(body) = rest.strip_prefix("/*") else {
            return true;
        };
        *in_block = true;
        line = body;
    }
}

fn parse_line(file: &SourceFile, line: &str, index: usize) -> Option<ReferenceDirective> {
    let indent = line.len() - line.trim_start().len();
    let captures = REFERENCE.captures(&line[indent..])?;
    let literal = captures.get(1).or_else(|| captures.get(2))?;

    // The capture starts after the quote.
    let quote_at = indent + literal.start() - 1;
    let column = line[..quote_at].chars().count() + 1;

    Some(ReferenceDirective {
        file: file.path().to_path_buf(),
        target: literal.as_str().to_string(),
        line: u32::try_from(index + 1).unwrap_or(u32::MAX),
        column: u32::try_from(column).unwrap_or(u32::MAX),
    })
}
