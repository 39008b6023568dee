use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{CompilerArgs, ProjectArgs};
use crate::config::{CONFIG_FILE, ENV_PREFIX, OptionsConfig, TypeplanConfig};
use crate::error::{ConfigError, Result};

/// Top-level values set on the command line. Unset fields are skipped so
/// they do not mask lower layers.
#[derive(Debug, Default, Serialize)]
struct CommandLineLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<usize>,
}

impl TypeplanConfig {
    /// Load configuration from multiple sources.
    ///
    /// Priority: CLI args > `TYPEPLAN_COMPILER`/`TYPEPLAN_JOBS` > config file > defaults.
    /// Option flags are applied later, on top of each target's options,
    /// see [`TypeplanConfig::select_targets`].
    pub fn load(project: &ProjectArgs, compiler: &CompilerArgs, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        if let Some(path) = config_file(project.config.as_deref(), cwd)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&["compiler", "jobs"]));
        figment = figment.merge(Serialized::defaults(CommandLineLayer {
            compiler: compiler.compiler.clone(),
            jobs: compiler.jobs,
        }));

        figment
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }
}

/// The explicit `--config` file, which must exist, or typeplan.json in `cwd` if present.
fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            if path.is_file() {
                Ok(Some(path))
            } else {
                Err(ConfigError::NotFound(path).into())
            }
        }
        None => {
            let path = cwd.join(CONFIG_FILE);
            Ok(path.is_file().then_some(path))
        }
    }
}

impl OptionsConfig {
    /// `self` with every field set in `over` replaced.
    pub fn overlay(&self, over: &OptionsConfig) -> OptionsConfig {
        OptionsConfig {
            target: over.target.or(self.target),
            module: over.module.or(self.module),
            sourcemap: over.sourcemap.or(self.sourcemap),
            declaration: over.declaration.or(self.declaration),
            comments: over.comments.or(self.comments),
            no_lib: over.no_lib.or(self.no_lib),
            no_resolve: over.no_resolve.or(self.no_resolve),
            default_lib: over.default_lib.clone().or_else(|| self.default_lib.clone()),
            flatten: over.flatten.or(self.flatten),
            base_path: over.base_path.clone().or_else(|| self.base_path.clone()),
            allow_const: over.allow_const.or(self.allow_const),
            minw: over.minw.or(self.minw),
            no_error_on_with: over.no_error_on_with.or(self.no_error_on_with),
            no_optimize_modules: over.no_optimize_modules.or(self.no_optimize_modules),
            reference: over.reference.or(self.reference),
            style: over.style.or(self.style),
            compiler_args: over
                .compiler_args
                .clone()
                .or_else(|| self.compiler_args.clone()),
        }
    }
}
