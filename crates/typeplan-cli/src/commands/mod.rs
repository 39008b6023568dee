//! Command implementations for the typeplan CLI.
//!
//! - [`build`] - Plan and compile targets
//! - [`check`] - Validate configuration and print the plan
//! - [`init`] - Write a starter typeplan.json
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod build;
pub mod check;
pub mod init;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use init::execute as init_execute;
