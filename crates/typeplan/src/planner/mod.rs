//! Path planning: from glob mappings to a flat list of jobs.
//!
//! Each mapping's source patterns are expanded against the file system,
//! then its destination decides the shape:
//!
//! - a literal file path yields one job compiling every match into it
//! - a directory or wildcard destination yields one job per source, with
//!   outputs placed relative to the base path (or flattened)
//!
//! Destination collisions are configuration errors and are reported before
//! anything is compiled.

pub mod destination;
pub mod expand;

pub use destination::{Destination, common_ancestor};
pub use expand::expand_patterns;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use typeplan_host::{HostResult, IoHost, resolve_path};

use crate::ConfigurationError;
use crate::job::{FileMapping, Job, TargetShape, is_ambient};
use crate::options::{CompilationOptions, PlanOptions};

/// Expands mappings into jobs.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner<'a> {
    host: &'a dyn IoHost,
    options: &'a PlanOptions,
}

impl<'a> PathPlanner<'a> {
    pub fn new(host: &'a dyn IoHost, options: &'a PlanOptions) -> Self {
        Self { host, options }
    }

    /// Plan every mapping, in mapping order.
    ///
    /// Only reads the file system. Call [`prepare`](Self::prepare) to
    /// create output directories.
    pub fn plan(&self, mappings: &[FileMapping]) -> Result<Vec<Job>, ConfigurationError> {
        let mut jobs = Vec::new();
        for mapping in mappings {
            jobs.extend(self.plan_mapping(mapping)?);
        }
        check_collisions(&jobs)?;
        debug!(mappings = mappings.len(), jobs = jobs.len(), "planned jobs");
        Ok(jobs)
    }

    /// Create the parent directory of every job's destination.
    pub async fn prepare(&self, jobs: &[Job]) -> HostResult<()> {
        let parents: IndexSet<&Path> = jobs
            .iter()
            .filter_map(|job| job.destination.parent())
            .collect();
        for parent in parents {
            self.host.create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn plan_mapping(&self, mapping: &FileMapping) -> Result<Vec<Job>, ConfigurationError> {
        let sources = expand_patterns(self.host.cwd(), &mapping.src)?;
        if sources.is_empty() {
            debug!(dest = %mapping.dest, "no sources matched");
            return Ok(Vec::new());
        }

        match Destination::parse(&mapping.dest, self.host) {
            Destination::File(path) if is_ambient(&path) => {
                debug!(dest = %path.display(), "skipping declaration-only destination");
                Ok(Vec::new())
            }
            Destination::File(path) => Ok(vec![Job::new(path, sources, TargetShape::SingleFile)]),
            destination => self.fan_out(&destination, sources),
        }
    }

    fn fan_out(
        &self,
        destination: &Destination,
        sources: Vec<PathBuf>,
    ) -> Result<Vec<Job>, ConfigurationError> {
        let base = match &self.options.base_path {
            Some(base) => resolve_path(self.host.cwd(), base),
            None => common_ancestor(&sources),
        };

        let (ambient, compiled): (Vec<PathBuf>, Vec<PathBuf>) =
            sources.into_iter().partition(|source| is_ambient(source));

        let mut jobs = Vec::with_capacity(compiled.len());
        for source in compiled {
            let relative =
                source
                    .strip_prefix(&base)
                    .map_err(|_| ConfigurationError::SourceOutsideBase {
                        file: source.clone(),
                        base: base.clone(),
                    })?;
            let output = destination.output_for(
                self.host,
                relative,
                self.options.flatten,
                &self.options.output_extension,
            );
            if is_ambient(&output) {
                continue;
            }

            let mut seeds = Vec::with_capacity(ambient.len() + 1);
            seeds.push(source);
            seeds.extend(ambient.iter().cloned());
            jobs.push(Job::new(
                output,
                seeds,
                TargetShape::MultiTarget {
                    base_path: base.clone(),
                    flatten: self.options.flatten,
                },
            ));
        }
        Ok(jobs)
    }
}

fn check_collisions(jobs: &[Job]) -> Result<(), ConfigurationError> {
    let mut seen: FxHashMap<&Path, &Job> = FxHashMap::default();
    for job in jobs {
        if let Some(first) = seen.insert(job.destination.as_path(), job) {
            return Err(ConfigurationError::DestinationCollision {
                destination: job.destination.clone(),
                first: first.sources.first().cloned().unwrap_or_default(),
                second: job.sources.first().cloned().unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Reject option combinations that cannot produce the planned outputs.
///
/// Asynchronous modules need one output per source, so a concatenating
/// job whose destination has no extension is refused up front.
pub fn check_compatibility(
    jobs: &[Job],
    options: &CompilationOptions,
) -> Result<(), ConfigurationError> {
    if !options.module.is_asynchronous() {
        return Ok(());
    }
    match jobs
        .iter()
        .find(|job| job.is_single_file() && job.destination.extension().is_none())
    {
        Some(job) => Err(ConfigurationError::AsyncModuleConcatenation {
            module: options.module,
            destination: job.destination.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ModuleKind;
    use tempfile::TempDir;
    use typeplan_host::NativeHost;

    fn project(files: &[&str]) -> (TempDir, NativeHost) {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "var x;").unwrap();
        }
        let host = NativeHost::new(dir.path());
        (dir, host)
    }

    fn outputs(dir: &TempDir, jobs: &[Job]) -> Vec<String> {
        jobs.iter()
            .map(|job| {
                job.destination
                    .strip_prefix(dir.path())
                    .unwrap()
                    .display()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn single_target_keeps_every_source_in_one_job() {
        let (dir, host) = project(&["src/a.ts", "src/b.ts"]);
        let options = PlanOptions::default();
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/*.ts"], "build/app.js")])
            .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(outputs(&dir, &jobs), vec!["build/app.js"]);
        assert_eq!(jobs[0].sources.len(), 2);
        assert!(jobs[0].is_single_file());
    }

    #[test]
    fn no_match_means_no_jobs() {
        let (_dir, host) = project(&[]);
        let options = PlanOptions::default();
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/*.ts"], "out/")])
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn ambient_sources_travel_with_every_fan_out_job() {
        let (dir, host) = project(&["src/a.ts", "src/b.ts", "src/decl.d.ts"]);
        let options = PlanOptions::default();
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/*.ts"], "out/")])
            .unwrap();

        assert_eq!(outputs(&dir, &jobs), vec!["out/a.js", "out/b.js"]);
        for job in &jobs {
            assert_eq!(job.sources.len(), 2);
            assert!(is_ambient(&job.sources[1]));
        }
    }

    #[test]
    fn flatten_collision_names_both_sources() {
        let (dir, host) = project(&["src/x/util.ts", "src/y/util.ts"]);
        let options = PlanOptions {
            flatten: true,
            ..Default::default()
        };
        let err = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/**/*.ts"], "out/")])
            .unwrap_err();

        match err {
            ConfigurationError::DestinationCollision {
                destination,
                first,
                second,
            } => {
                assert_eq!(destination, dir.path().join("out/util.js"));
                assert_eq!(first, dir.path().join("src/x/util.ts"));
                assert_eq!(second, dir.path().join("src/y/util.ts"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_base_path_shapes_relative_outputs() {
        let (dir, host) = project(&["src/app/a.ts"]);
        let options = PlanOptions {
            base_path: Some(PathBuf::from("src")),
            ..Default::default()
        };
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/app/*.ts"], "out/")])
            .unwrap();
        assert_eq!(outputs(&dir, &jobs), vec!["out/app/a.js"]);
    }

    #[test]
    fn source_outside_base_path_is_rejected() {
        let (_dir, host) = project(&["lib/a.ts"]);
        let options = PlanOptions {
            base_path: Some(PathBuf::from("src")),
            ..Default::default()
        };
        let err = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["lib/*.ts"], "out/")])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::SourceOutsideBase { .. }));
    }

    #[test]
    fn declaration_destination_is_skipped() {
        let (_dir, host) = project(&["src/a.d.ts"]);
        let options = PlanOptions::default();
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/*.ts"], "types/all.d.ts")])
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn async_modules_reject_extensionless_concatenation() {
        let (_dir, host) = project(&["src/a.ts"]);
        let options = PlanOptions::default();
        let jobs = PathPlanner::new(&host, &options)
            .plan(&[FileMapping::new(["src/a.ts"], "build/bundle")])
            .unwrap();

        let amd = CompilationOptions {
            module: ModuleKind::Amd,
            ..Default::default()
        };
        assert!(matches!(
            check_compatibility(&jobs, &amd),
            Err(ConfigurationError::AsyncModuleConcatenation { .. })
        ));
        assert!(check_compatibility(&jobs, &CompilationOptions::default()).is_ok());
    }

    #[tokio::test]
    async fn prepare_creates_output_directories() {
        let (dir, host) = project(&["src/deep/a.ts", "src/b.ts"]);
        let options = PlanOptions::default();
        let planner = PathPlanner::new(&host, &options);
        let jobs = planner
            .plan(&[FileMapping::new(["src/**/*.ts"], "out/")])
            .unwrap();

        planner.prepare(&jobs).await.unwrap();
        assert!(dir.path().join("out/deep").is_dir());
        assert!(dir.path().join("out").is_dir());
    }
}
