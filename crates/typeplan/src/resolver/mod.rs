//! Dependency resolution over reference directives.
//!
//! Starting from a job's seed files, the resolver reads each file, scans
//! its header for reference directives and locates every target with the
//! host's upward search. The result is the transitive closure in
//! first-discovery order, each file listed once, plus any problems found on
//! the way. Resolution never aborts early: an unreadable file or a missing
//! reference becomes a diagnostic and the walk carries on with the rest.

pub mod directive;

pub use directive::ReferenceDirective;

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use typeplan_host::{IoHost, SourceFile};

use crate::diagnostics::{self, Diagnostic, DiagnosticKind};
use crate::job::is_ambient;

/// One file of a resolved closure.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    /// Listed by the job rather than discovered
    pub seed: bool,
    pub ambient: bool,
    /// Resolved reference targets in directive order
    pub references: Vec<PathBuf>,
    /// Decoded contents; `None` when the file could not be read
    pub source: Option<SourceFile>,
}

impl ResolvedFile {
    fn new(path: PathBuf, seed: bool) -> Self {
        Self {
            ambient: is_ambient(&path),
            path,
            seed,
            references: Vec::new(),
            source: None,
        }
    }
}

/// Transitive closure of a job's seeds.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    files: IndexMap<PathBuf, ResolvedFile>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Files in first-discovery order. Seeds come first.
    pub fn files(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.files.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Files reached only through reference directives.
    pub fn discovered(&self) -> impl Iterator<Item = &Path> {
        self.files
            .values()
            .filter(|file| !file.seed)
            .map(|file| file.path.as_path())
    }

    pub fn get(&self, path: &Path) -> Option<&ResolvedFile> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        diagnostics::has_errors(&self.diagnostics)
    }

    /// Ambient files in discovery order.
    pub fn ambient(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.files.values().filter(|file| file.ambient)
    }

    /// Non-ambient files with every file after the files it references.
    ///
    /// Depth-first post-order from each seed in seed order, following
    /// references in directive order. A cycle is cut where it is first
    /// revisited, so files in a cycle keep their discovery order.
    pub fn emit_order(&self) -> Vec<&ResolvedFile> {
        let count = self.files.len();
        let mut visited = vec![false; count];
        let mut order = Vec::with_capacity(count);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..count {
            if visited[root] || !self.files[root].seed {
                continue;
            }
            visited[root] = true;
            stack.push((root, 0));

            while let Some(&(index, next)) = stack.last() {
                match self.files[index].references.get(next) {
                    Some(reference) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        match self.files.get_index_of(reference) {
                            Some(child) if !visited[child] => {
                                visited[child] = true;
                                stack.push((child, 0));
                            }
                            _ => {}
                        }
                    }
                    None => {
                        order.push(index);
                        stack.pop();
                    }
                }
            }
        }

        order
            .into_iter()
            .map(|index| &self.files[index])
            .filter(|file| !file.ambient)
            .collect()
    }
}

/// Computes reference closures through an [`IoHost`].
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    host: &'a dyn IoHost,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(host: &'a dyn IoHost) -> Self {
        Self { host }
    }

    /// Resolve the closure of `seeds`.
    ///
    /// Relative seeds are taken from the host's working directory. The walk
    /// is breadth-first, so directly referenced files precede files they
    /// reference in turn.
    pub async fn resolve(&self, seeds: &[PathBuf]) -> Resolution {
        let mut resolution = Resolution::default();
        let mut queue = VecDeque::new();

        for seed in seeds {
            let path = self.host.resolve_path(self.host.cwd(), seed);
            if !resolution.files.contains_key(&path) {
                resolution
                    .files
                    .insert(path.clone(), ResolvedFile::new(path.clone(), true));
                queue.push_back(path);
            }
        }

        while let Some(path) = queue.pop_front() {
            let source = match self.load(&resolution, &path).await {
                Ok(source) => source,
                Err(err) => {
                    debug!(file = %path.display(), error = %err, "unreadable file in closure");
                    resolution.diagnostics.push(
                        Diagnostic::error(DiagnosticKind::Io, err.to_string()).in_file(&path),
                    );
                    continue;
                }
            };

            let mut references = Vec::new();
            for directive in directive::scan(&source) {
                let Some(target) = self
                    .locate(&directive, source.directory(), &mut resolution.diagnostics)
                    .await
                else {
                    continue;
                };

                let target_path = target.path().to_path_buf();
                if !resolution.files.contains_key(&target_path) {
                    trace!(
                        from = %path.display(),
                        target = %target_path.display(),
                        "discovered referenced file"
                    );
                    let mut entry = ResolvedFile::new(target_path.clone(), false);
                    entry.source = Some(target);
                    resolution.files.insert(target_path.clone(), entry);
                    queue.push_back(target_path.clone());
                }
                if !references.contains(&target_path) {
                    references.push(target_path);
                }
            }

            if let Some(entry) = resolution.files.get_mut(&path) {
                entry.references = references;
                entry.source = Some(source);
            }
        }

        debug!(
            seeds = seeds.len(),
            files = resolution.files.len(),
            diagnostics = resolution.diagnostics.len(),
            "resolved reference closure"
        );
        resolution
    }

    async fn load(
        &self,
        resolution: &Resolution,
        path: &Path,
    ) -> typeplan_host::HostResult<SourceFile> {
        match resolution.files.get(path).and_then(|f| f.source.clone()) {
            Some(source) => Ok(source),
            None => self.host.read_file(path).await,
        }
    }

    async fn locate(
        &self,
        directive: &ReferenceDirective,
        directory: &Path,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<SourceFile> {
        match self
            .host
            .find_file_upward(directory, Path::new(&directive.target))
            .await
        {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::UnresolvedReference,
                        format!("Cannot resolve referenced file \"{}\"", directive.target),
                    )
                    .at(&directive.file, directive.line, directive.column)
                    .with_help(format!(
                        "searched {} and each of its parent directories",
                        directory.display()
                    )),
                );
                None
            }
            Err(err) => {
                diagnostics.push(
                    Diagnostic::error(DiagnosticKind::Io, err.to_string()).at(
                        &directive.file,
                        directive.line,
                        directive.column,
                    ),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeplan_host::NativeHost;

    const ROOT: &str = "/virtual-project";

    fn host(files: &[(&str, &str)]) -> NativeHost {
        let host = NativeHost::new(ROOT);
        for (path, text) in files {
            host.add_virtual_file(path, text.as_bytes().to_vec());
        }
        host
    }

    fn abs(path: &str) -> PathBuf {
        Path::new(ROOT).join(path)
    }

    fn names<'a>(paths: impl Iterator<Item = &'a Path>) -> Vec<String> {
        paths
            .map(|p| p.strip_prefix(ROOT).unwrap().display().to_string())
            .collect()
    }

    #[tokio::test]
    async fn diamond_lists_shared_dependency_once() {
        let host = host(&[
            (
                "src/a.ts",
                "/// <reference path=\"b.ts\" />\n/// <reference path=\"c.ts\" />\nvar a;",
            ),
            ("src/b.ts", "/// <reference path=\"d.ts\" />\nvar b;"),
            ("src/c.ts", "/// <reference path=\"d.ts\" />\nvar c;"),
            ("src/d.ts", "var d;"),
        ]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("src/a.ts")])
            .await;

        assert!(!resolution.has_errors());
        assert_eq!(
            names(resolution.paths()),
            vec!["src/a.ts", "src/b.ts", "src/c.ts", "src/d.ts"]
        );
        let emit: Vec<_> = resolution.emit_order().iter().map(|f| f.path.as_path()).collect();
        assert_eq!(
            names(emit.into_iter()),
            vec!["src/d.ts", "src/b.ts", "src/c.ts", "src/a.ts"]
        );
    }

    #[tokio::test]
    async fn cycles_terminate() {
        let host = host(&[
            ("a.ts", "/// <reference path=\"b.ts\" />"),
            ("b.ts", "/// <reference path=\"a.ts\" />"),
        ]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("a.ts")])
            .await;

        assert_eq!(names(resolution.paths()), vec!["a.ts", "b.ts"]);
        let emit: Vec<_> = resolution.emit_order().iter().map(|f| f.path.as_path()).collect();
        assert_eq!(names(emit.into_iter()), vec!["b.ts", "a.ts"]);
    }

    #[tokio::test]
    async fn references_resolve_through_parent_directories() {
        let host = host(&[
            ("typings/lib.d.ts", "declare var $: any;"),
            ("src/app/main.ts", "/// <reference path=\"typings/lib.d.ts\" />\n$;"),
        ]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("src/app/main.ts")])
            .await;

        assert_eq!(
            names(resolution.discovered()),
            vec!["typings/lib.d.ts"]
        );
        assert_eq!(resolution.ambient().count(), 1);
        assert_eq!(resolution.emit_order().len(), 1);
    }

    #[tokio::test]
    async fn unresolved_reference_is_reported_and_resolution_continues() {
        let host = host(&[
            (
                "a.ts",
                "/// <reference path=\"missing-5d1c.ts\" />\n/// <reference path=\"b.ts\" />",
            ),
            ("b.ts", "var b;"),
        ]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("a.ts")])
            .await;

        assert!(resolution.has_errors());
        assert_eq!(names(resolution.paths()), vec!["a.ts", "b.ts"]);
        let diag = &resolution.diagnostics()[0];
        assert_eq!(diag.kind, DiagnosticKind::UnresolvedReference);
        assert_eq!(diag.file.as_deref(), Some(abs("a.ts").as_path()));
        assert_eq!((diag.line, diag.column), (Some(1), Some(21)));
        assert!(diag.message.contains("missing-5d1c.ts"));
    }

    #[tokio::test]
    async fn unreadable_seed_becomes_io_diagnostic() {
        let host = host(&[("ok.ts", "var ok;")]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("absent-93b2.ts"), PathBuf::from("ok.ts")])
            .await;

        assert_eq!(resolution.diagnostics().len(), 1);
        assert_eq!(resolution.diagnostics()[0].kind, DiagnosticKind::Io);
        assert!(resolution.get(&abs("absent-93b2.ts")).unwrap().source.is_none());
        assert!(resolution.get(&abs("ok.ts")).unwrap().source.is_some());
    }

    #[tokio::test]
    async fn duplicate_seeds_are_listed_once() {
        let host = host(&[("a.ts", "var a;")]);

        let resolution = DependencyResolver::new(&host)
            .resolve(&[PathBuf::from("a.ts"), PathBuf::from("./a.ts")])
            .await;

        assert_eq!(resolution.len(), 1);
    }
}
