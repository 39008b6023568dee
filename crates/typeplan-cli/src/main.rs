//! typeplan CLI entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use miette::Result;
use typeplan_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
        cli::Command::Init(init_args) => commands::init_execute(init_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
