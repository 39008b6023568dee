//! Shared utilities for command implementations.

use std::path::{Path, PathBuf};

use crate::cli::{CompilerArgs, MappingArgs, ProjectArgs};
use crate::config::{OptionsConfig, ResolvedTarget, TypeplanConfig};
use crate::error::Result;

/// Working directory: `--cwd`, then the config's `cwd`, then the process directory.
pub fn get_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match explicit {
        Some(path) => resolve_path(path, &current),
        None => current,
    })
}

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// `path` relative to `cwd` when below it, for display.
pub fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Everything a command needs after loading configuration.
#[derive(Debug)]
pub struct Session {
    pub cwd: PathBuf,
    pub config: TypeplanConfig,
    pub targets: Vec<ResolvedTarget>,
}

/// Load and validate configuration, then select targets.
pub fn open_session(
    project: &ProjectArgs,
    mapping: &MappingArgs,
    compiler: &CompilerArgs,
) -> Result<Session> {
    let mut cwd = get_cwd(project.cwd.as_deref())?;
    let config = TypeplanConfig::load(project, compiler, &cwd)?;
    config.validate()?;

    if project.cwd.is_none() {
        if let Some(config_cwd) = &config.cwd {
            cwd = resolve_path(config_cwd, &cwd);
        }
    }

    let flags = OptionsConfig::from_args(compiler, mapping);
    let targets = config.select_targets(&project.targets, mapping, &flags)?;
    Ok(Session {
        cwd,
        config,
        targets,
    })
}
