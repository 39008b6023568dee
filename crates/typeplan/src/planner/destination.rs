//! Destination shape inference and per-source output paths.

use std::path::{Component, Path, PathBuf};
use typeplan_host::{IoHost, resolve_path};

/// A destination pattern as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// One output file; every source is concatenated into it
    File(PathBuf),
    /// Outputs placed under a directory
    Directory(PathBuf),
    /// Outputs substituted into a wildcard pattern
    Pattern(String),
}

impl Destination {
    /// Classify `dest`.
    ///
    /// A trailing separator or a `*` makes a multi-target destination, as
    /// does a literal path naming an existing directory. `?` and `[` are
    /// ordinary file name characters here.
    pub fn parse(dest: &str, host: &dyn IoHost) -> Self {
        if has_wildcard(dest) {
            return Destination::Pattern(dest.to_string());
        }
        let path = resolve_path(host.cwd(), Path::new(dest));
        if is_directory_target(dest) || host.is_directory(&path) {
            Destination::Directory(path)
        } else {
            Destination::File(path)
        }
    }

    pub fn is_multi_target(&self) -> bool {
        !matches!(self, Destination::File(_))
    }

    /// Output path for a source at `relative` below the base path.
    pub fn output_for(
        &self,
        host: &dyn IoHost,
        relative: &Path,
        flatten: bool,
        extension: &str,
    ) -> PathBuf {
        let relative = if flatten {
            relative
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| relative.to_path_buf())
        } else {
            relative.to_path_buf()
        };

        match self {
            Destination::File(path) => path.clone(),
            Destination::Directory(root) => root.join(relative.with_extension(extension)),
            Destination::Pattern(pattern) => {
                let stem = slash_path(&relative.with_extension(""));
                let substituted = if pattern.contains("**/*") {
                    pattern.replacen("**/*", &stem, 1)
                } else {
                    pattern.replacen('*', &stem, 1)
                };
                resolve_path(host.cwd(), Path::new(&substituted))
            }
        }
    }
}

/// Only `*` substitutes in a destination.
pub fn has_wildcard(dest: &str) -> bool {
    dest.contains('*')
}

pub fn is_directory_target(dest: &str) -> bool {
    dest.ends_with('/') || dest.ends_with(std::path::MAIN_SEPARATOR)
}

/// Longest directory that contains every path in `paths`.
pub fn common_ancestor(paths: &[PathBuf]) -> PathBuf {
    let mut dirs = paths.iter().map(|p| p.parent().unwrap_or(Path::new("")));
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };

    let mut common: Vec<Component<'_>> = first.components().collect();
    for dir in dirs {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }
    common.iter().collect()
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
