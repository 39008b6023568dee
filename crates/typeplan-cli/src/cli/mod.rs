//! Command-line interface definition for typeplan.
//!
//! Uses clap's derive macros. Global flags control logging and color; each
//! subcommand carries its own project and compiler arguments.
//!
//! # Command Structure
//!
//! - `typeplan build` - Plan and compile configured targets
//! - `typeplan check` - Validate configuration and print the planned jobs
//! - `typeplan init` - Write a starter typeplan.json or print its schema

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{
    BuildArgs, CheckArgs, Command, CompilerArgs, InitArgs, MappingArgs, ProjectArgs,
};
pub use enums::*;
pub use validation::parse_jobs;

/// typeplan - batch build planner for typed-script compilers
#[derive(Parser, Debug)]
#[command(
    name = "typeplan",
    version,
    about = "Plan and compile typed-script builds",
    long_about = "typeplan expands `sources -> destination` mappings into compilation jobs,\n\
                  follows reference directives to close each job over its dependencies,\n\
                  and runs the compiler on every job in parallel."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
