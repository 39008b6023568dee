//! Build option types.
//!
//! Options are split by consumer: [`PlanOptions`] is read only by the path
//! planner, [`CompilationOptions`] is the immutable value every backend
//! call receives. Planner-only settings therefore never reach a backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Language version the backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Target {
    #[default]
    #[serde(rename = "ES3", alias = "es3")]
    Es3,
    #[serde(rename = "ES5", alias = "es5")]
    Es5,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Es3 => "ES3",
            Target::Es5 => "ES5",
        })
    }
}

/// Module emission strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Synchronous `require`-style modules
    #[default]
    #[serde(alias = "commonJs", alias = "CommonJS")]
    CommonJs,
    /// Asynchronous module definitions
    #[serde(alias = "AMD")]
    Amd,
}

impl ModuleKind {
    pub fn is_asynchronous(self) -> bool {
        matches!(self, ModuleKind::Amd)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleKind::CommonJs => "commonjs",
            ModuleKind::Amd => "amd",
        })
    }
}

/// Options shared by every job of one build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationOptions {
    pub target: Target,
    pub module: ModuleKind,
    /// Emit a source map next to each output
    pub sourcemap: bool,
    /// Emit a declaration file next to each output
    pub declaration: bool,
    /// Keep comments in emitted output
    pub comments: bool,
    /// Do not seed resolution with the default library declaration file
    pub no_lib: bool,
    /// Compile the planned sources as-is, without following reference directives
    pub no_resolve: bool,
    /// Path of the implicit standard declaration file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_lib: Option<PathBuf>,
    /// Allow `const` declarations
    #[serde(rename = "const")]
    pub allow_const: bool,
    /// Emit with minimal whitespace
    pub minw: bool,
    /// Accept `with` statements without an error
    #[serde(alias = "noerroronwith")]
    pub no_error_on_with: bool,
    #[serde(alias = "nooptimizemodules")]
    pub no_optimize_modules: bool,
    /// Emit reference comments into the output
    pub reference: bool,
    /// Enforce the compiler's style checks
    pub style: bool,
    /// Passed to the compiler verbatim, after every other flag
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl CompilationOptions {
    /// Command-line flags for a subprocess compiler.
    ///
    /// Each enabled switch becomes `--name`, then `extra_args` follow as
    /// given. `default_lib` has no flag; it only changes resolution seeds.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--target".to_string(),
            self.target.to_string(),
            "--module".to_string(),
            self.module.to_string(),
        ];
        let flags = [
            (self.sourcemap, "--sourcemap"),
            (self.declaration, "--declaration"),
            (self.comments, "--comments"),
            (self.no_lib, "--nolib"),
            (self.no_resolve, "--noresolve"),
            (self.allow_const, "--const"),
            (self.minw, "--minw"),
            (self.no_error_on_with, "--noerroronwith"),
            (self.no_optimize_modules, "--nooptimizemodules"),
            (self.reference, "--reference"),
            (self.style, "--style"),
        ];
        args.extend(
            flags
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Options read only by the path planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanOptions {
    /// Keep only file names under multi-target destinations
    pub flatten: bool,
    /// Override for the common ancestor of matched sources
    pub base_path: Option<PathBuf>,
    /// Extension given to outputs under directory destinations
    pub output_extension: String,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            flatten: false,
            base_path: None,
            output_extension: "js".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args() {
        assert_eq!(
            CompilationOptions::default().to_args(),
            vec!["--target", "ES3", "--module", "commonjs"]
        );
    }

    #[test]
    fn boolean_flags_are_appended_in_order() {
        let options = CompilationOptions {
            target: Target::Es5,
            module: ModuleKind::Amd,
            sourcemap: true,
            declaration: true,
            no_lib: true,
            default_lib: Some(PathBuf::from("lib.d.ts")),
            ..Default::default()
        };
        assert_eq!(
            options.to_args(),
            vec![
                "--target",
                "ES5",
                "--module",
                "amd",
                "--sourcemap",
                "--declaration",
                "--nolib"
            ]
        );
    }

    #[test]
    fn pass_through_switches_follow_the_core_flags() {
        let options = CompilationOptions {
            comments: true,
            allow_const: true,
            minw: true,
            no_error_on_with: true,
            no_optimize_modules: true,
            reference: true,
            style: true,
            extra_args: vec!["--locale".to_string(), "en".to_string()],
            ..Default::default()
        };
        assert_eq!(
            options.to_args()[4..],
            [
                "--comments",
                "--const",
                "--minw",
                "--noerroronwith",
                "--nooptimizemodules",
                "--reference",
                "--style",
                "--locale",
                "en"
            ]
        );
    }

    #[test]
    fn original_option_names_are_accepted() {
        let options: CompilationOptions = serde_json::from_str(
            r#"{ "const": true, "minw": true, "noerroronwith": true, "noOptimizeModules": true }"#,
        )
        .unwrap();
        assert!(options.allow_const);
        assert!(options.minw);
        assert!(options.no_error_on_with);
        assert!(options.no_optimize_modules);
        assert!(!options.style);
        assert!(options.extra_args.is_empty());
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: CompilationOptions = serde_json::from_str(
            r#"{ "target": "ES5", "module": "amd", "noLib": true, "sourcemap": true }"#,
        )
        .unwrap();
        assert_eq!(options.target, Target::Es5);
        assert!(options.module.is_asynchronous());
        assert!(options.no_lib);
        assert!(!options.declaration);
    }

    #[test]
    fn plan_defaults_to_js_outputs() {
        let plan = PlanOptions::default();
        assert_eq!(plan.output_extension, "js");
        assert!(!plan.flatten);
    }
}
