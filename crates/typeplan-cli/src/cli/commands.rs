use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::*;
use crate::cli::validation::parse_jobs;

/// Available typeplan subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile configured targets
    ///
    /// Plans every mapping into jobs, resolves reference directives and runs
    /// the compiler on each job. Exits non-zero if any job fails.
    Build(BuildArgs),

    /// Validate configuration and print the planned jobs
    ///
    /// Expands source patterns and destinations exactly like `build`, without
    /// creating directories or running the compiler.
    Check(CheckArgs),

    /// Write a starter typeplan.json
    ///
    /// With --schema, prints the JSON schema of typeplan.json instead, for
    /// editor validation.
    Init(InitArgs),
}

/// Where the project lives and which targets to use
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Targets to process (default: every target in the config file)
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Path to typeplan.json
    ///
    /// If not provided, typeplan.json in the working directory is used when
    /// present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory for patterns and relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// An ad-hoc mapping given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Source patterns; prefix with '!' to exclude
    ///
    /// Examples:
    ///   --src 'src/**/*.ts' --dest build/
    ///   --src src/main.ts --src '!src/*.test.ts' --dest app.js
    #[arg(long, value_name = "PATTERN", requires = "dest")]
    pub src: Vec<String>,

    /// Destination file, directory (trailing '/') or wildcard pattern
    #[arg(long, value_name = "DEST", requires = "src")]
    pub dest: Option<String>,

    /// Drop source directories under a multi-target destination
    #[arg(long)]
    pub flatten: bool,

    /// Directory that output placement is relative to
    ///
    /// Defaults to the deepest directory containing every matched source.
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<PathBuf>,
}

/// Options passed to the compiler
#[derive(Args, Debug, Clone, Default)]
pub struct CompilerArgs {
    /// Compiler executable (default: tsc)
    #[arg(long, value_name = "PATH")]
    pub compiler: Option<String>,

    /// Maximum number of jobs compiled at once (default: logical CPUs)
    #[arg(short, long, value_parser = parse_jobs, value_name = "N")]
    pub jobs: Option<usize>,

    /// Language level of the emitted code
    #[arg(long, value_enum, value_name = "TARGET")]
    pub target: Option<EsTarget>,

    /// Module system of the emitted code
    #[arg(long, value_enum, value_name = "KIND")]
    pub module: Option<Module>,

    /// Emit a source map next to each output
    #[arg(long)]
    pub sourcemap: bool,

    /// Emit a declaration file next to each output
    #[arg(long)]
    pub declaration: bool,

    /// Keep comments in the output
    #[arg(long)]
    pub comments: bool,

    /// Do not include the default library
    #[arg(long)]
    pub no_lib: bool,

    /// Compile planned sources only, without following references
    #[arg(long)]
    pub no_resolve: bool,

    /// Allow `const` declarations
    #[arg(long = "const")]
    pub allow_const: bool,

    /// Emit with minimal whitespace
    #[arg(long)]
    pub minw: bool,

    /// Accept `with` statements without an error
    #[arg(long)]
    pub no_error_on_with: bool,

    /// Pass --nooptimizemodules to the compiler
    #[arg(long)]
    pub no_optimize_modules: bool,

    /// Emit reference comments into the output
    #[arg(long)]
    pub reference: bool,

    /// Enforce the compiler's style checks
    #[arg(long)]
    pub style: bool,

    /// Extra argument passed to the compiler after every other flag
    ///
    /// Repeat for several arguments: --compiler-arg --locale --compiler-arg en
    #[arg(long = "compiler-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub compiler_args: Vec<String>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub mapping: MappingArgs,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub mapping: MappingArgs,

    #[command(flatten)]
    pub compiler: CompilerArgs,

    /// Print the planned jobs as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the init command
#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Directory to write typeplan.json into (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Overwrite an existing typeplan.json
    #[arg(short, long)]
    pub force: bool,

    /// Print the JSON schema of typeplan.json to stdout and exit
    #[arg(long, conflicts_with = "force")]
    pub schema: bool,
}
