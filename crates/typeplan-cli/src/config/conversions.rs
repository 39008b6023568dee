use typeplan::{BuildOptions, CompilationOptions, FileMapping, PlanOptions};

use crate::cli::{CompilerArgs, MappingArgs};
use crate::config::{
    COMMAND_LINE_TARGET, FileMappingConfig, OptionsConfig, TargetConfig, TypeplanConfig,
};
use crate::error::{ConfigError, Result};

/// A target ready to plan: its mappings plus fully layered options.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub name: String,
    pub mappings: Vec<FileMapping>,
    pub options: OptionsConfig,
}

impl ResolvedTarget {
    /// Library build options for this target, without a backend or cwd.
    pub fn build_options(&self) -> BuildOptions {
        let mut options = BuildOptions::new().compilation(self.options.compilation());
        options.plan = self.options.plan();
        options.mappings = self.mappings.clone();
        options
    }
}

impl From<&FileMappingConfig> for FileMapping {
    fn from(mapping: &FileMappingConfig) -> Self {
        FileMapping::new(mapping.src.iter().cloned(), mapping.dest.clone())
    }
}

impl OptionsConfig {
    /// Option flags given on the command line. Absent flags stay unset.
    pub fn from_args(compiler: &CompilerArgs, mapping: &MappingArgs) -> Self {
        let flag = |set: bool| set.then_some(true);
        Self {
            target: compiler.target,
            module: compiler.module,
            sourcemap: flag(compiler.sourcemap),
            declaration: flag(compiler.declaration),
            comments: flag(compiler.comments),
            no_lib: flag(compiler.no_lib),
            no_resolve: flag(compiler.no_resolve),
            default_lib: None,
            flatten: flag(mapping.flatten),
            base_path: mapping.base_path.clone(),
            allow_const: flag(compiler.allow_const),
            minw: flag(compiler.minw),
            no_error_on_with: flag(compiler.no_error_on_with),
            no_optimize_modules: flag(compiler.no_optimize_modules),
            reference: flag(compiler.reference),
            style: flag(compiler.style),
            compiler_args: (!compiler.compiler_args.is_empty())
                .then(|| compiler.compiler_args.clone()),
        }
    }

    pub fn compilation(&self) -> CompilationOptions {
        CompilationOptions {
            target: self.target.map(Into::into).unwrap_or_default(),
            module: self.module.map(Into::into).unwrap_or_default(),
            sourcemap: self.sourcemap.unwrap_or(false),
            declaration: self.declaration.unwrap_or(false),
            comments: self.comments.unwrap_or(false),
            no_lib: self.no_lib.unwrap_or(false),
            no_resolve: self.no_resolve.unwrap_or(false),
            default_lib: self.default_lib.clone(),
            allow_const: self.allow_const.unwrap_or(false),
            minw: self.minw.unwrap_or(false),
            no_error_on_with: self.no_error_on_with.unwrap_or(false),
            no_optimize_modules: self.no_optimize_modules.unwrap_or(false),
            reference: self.reference.unwrap_or(false),
            style: self.style.unwrap_or(false),
            extra_args: self.compiler_args.clone().unwrap_or_default(),
        }
    }

    pub fn plan(&self) -> PlanOptions {
        PlanOptions {
            flatten: self.flatten.unwrap_or(false),
            base_path: self.base_path.clone(),
            ..Default::default()
        }
    }
}

impl TypeplanConfig {
    /// Pick the targets to process, in order.
    ///
    /// An ad-hoc `--src`/`--dest` mapping comes first. Named targets follow;
    /// with no names and no ad-hoc mapping, every configured target is used.
    /// `flags` override task and target options alike.
    pub fn select_targets(
        &self,
        names: &[String],
        mapping: &MappingArgs,
        flags: &OptionsConfig,
    ) -> Result<Vec<ResolvedTarget>> {
        let mut selected = Vec::new();

        if let Some(dest) = &mapping.dest {
            selected.push(ResolvedTarget {
                name: COMMAND_LINE_TARGET.to_string(),
                mappings: vec![FileMapping::new(mapping.src.iter().cloned(), dest.clone())],
                options: self.options.overlay(flags),
            });
        }

        if names.is_empty() {
            if mapping.dest.is_none() {
                if self.targets.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "targets".to_string(),
                        hint: "Add a target to typeplan.json or pass --src and --dest".to_string(),
                    }
                    .into());
                }
                for (name, target) in &self.targets {
                    selected.push(self.resolve_target(name, target, flags));
                }
            }
            return Ok(selected);
        }

        for name in names {
            let Some(target) = self.targets.get(name) else {
                return Err(ConfigError::TargetNotFound {
                    name: name.clone(),
                    available: self.available_targets(),
                }
                .into());
            };
            selected.push(self.resolve_target(name, target, flags));
        }
        Ok(selected)
    }

    fn resolve_target(
        &self,
        name: &str,
        target: &TargetConfig,
        flags: &OptionsConfig,
    ) -> ResolvedTarget {
        ResolvedTarget {
            name: name.to_string(),
            mappings: target.files.iter().map(FileMapping::from).collect(),
            options: self.options.overlay(&target.options).overlay(flags),
        }
    }

    fn available_targets(&self) -> String {
        if self.targets.is_empty() {
            return "(none)".to_string();
        }
        self.targets
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
