//! Configuration for typeplan with multi-source loading.
//!
//! Merges settings from CLI args, environment variables and typeplan.json.
//! Priority: CLI > Environment > File > Defaults
//!
//! ```json
//! {
//!   "compiler": "tsc",
//!   "options": { "target": "ES5", "sourcemap": true },
//!   "targets": {
//!     "app": {
//!       "files": [{ "src": ["src/**/*.ts"], "dest": "build/" }],
//!       "options": { "flatten": true }
//!     }
//!   }
//! }
//! ```

mod conversions;
mod defaults;
mod loading;
mod types;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use conversions::ResolvedTarget;
pub use defaults::*;
pub use types::*;

/// typeplan configuration, loaded from typeplan.json and the command line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeplanConfig {
    /// Compiler executable, looked up on PATH when not a path
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Maximum number of jobs compiled at once (default: logical CPUs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Options shared by every target
    #[serde(default)]
    pub options: OptionsConfig,

    /// Named targets, built in name order
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Working directory (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl TypeplanConfig {
    /// Generate JSON Schema for typeplan.json.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(TypeplanConfig)).unwrap_or_default()
    }

    /// Generate example typeplan.json content.
    pub fn example_config() -> serde_json::Result<String> {
        use crate::cli::EsTarget;

        let mut targets = BTreeMap::new();
        targets.insert(
            "app".to_string(),
            TargetConfig {
                files: vec![FileMappingConfig {
                    src: vec!["src/**/*.ts".to_string(), "!src/**/*.test.ts".to_string()],
                    dest: "build/".to_string(),
                }],
                options: OptionsConfig {
                    sourcemap: Some(true),
                    ..Default::default()
                },
            },
        );
        targets.insert(
            "bundle".to_string(),
            TargetConfig {
                files: vec![FileMappingConfig {
                    src: vec!["src/main.ts".to_string()],
                    dest: "dist/app.js".to_string(),
                }],
                options: OptionsConfig::default(),
            },
        );

        serde_json::to_string_pretty(&Self {
            compiler: default_compiler(),
            jobs: None,
            options: OptionsConfig {
                target: Some(EsTarget::Es5),
                ..Default::default()
            },
            targets,
            cwd: None,
        })
    }

    /// Get default configuration values.
    pub(crate) fn default_config() -> Self {
        Self {
            compiler: default_compiler(),
            jobs: None,
            options: OptionsConfig::default(),
            targets: BTreeMap::new(),
            cwd: None,
        }
    }
}
