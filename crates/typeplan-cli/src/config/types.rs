use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::{EsTarget, Module};

/// Compiler and placement options.
///
/// Every field is optional so that layers only override what they set:
/// task-level options sit under per-target options, and command-line flags
/// sit over both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsConfig {
    /// Language level of the emitted code (default: ES3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EsTarget>,

    /// Module system (default: commonjs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<Module>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_lib: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_resolve: Option<bool>,

    /// Declaration file added to every job unless `noLib` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_lib: Option<PathBuf>,

    /// Drop source directories under multi-target destinations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten: Option<bool>,

    /// Directory that output placement is relative to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,

    /// Allow `const` declarations
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub allow_const: Option<bool>,

    /// Emit with minimal whitespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minw: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_error_on_with: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_optimize_modules: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<bool>,

    /// Extra compiler arguments, appended after every other flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_args: Option<Vec<String>>,
}

/// One `sources -> destination` mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileMappingConfig {
    /// Glob patterns, in order; `!` excludes earlier matches
    pub src: Vec<String>,

    /// File, directory (trailing `/`) or wildcard destination
    pub dest: String,
}

/// A named group of mappings sharing one set of options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetConfig {
    pub files: Vec<FileMappingConfig>,

    /// Overrides for the task-level options
    #[serde(default, skip_serializing_if = "is_default")]
    pub options: OptionsConfig,
}

fn is_default(options: &OptionsConfig) -> bool {
    *options == OptionsConfig::default()
}
