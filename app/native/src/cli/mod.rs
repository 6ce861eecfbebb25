//! Command-line interface for Tessel.
//!
//! The CLI inspects configuration, prints the configuration schema and runs
//! the placement engine against an in-memory display server.

mod commands;
mod output;

pub use commands::Cli;

use crate::error::TesselError;

/// Executes a parsed command line.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run(cli: &Cli) -> Result<(), TesselError> { cli.execute() }
