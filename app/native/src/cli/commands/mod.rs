//! CLI command definitions using Clap.
//!
//! - `config` - configuration file inspection
//! - `simulate` - run the placement engine against an in-memory display server

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use super::output;
use crate::config::{self, TesselConfig};
use crate::error::TesselError;

pub mod config_cmd;
pub mod simulate;

pub use config_cmd::ConfigCommands;
pub use simulate::SimulateArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tessel - intelligent window placement.
#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file (JSONC).
    ///
    /// Overrides the default configuration file search paths.
    #[arg(long, short, global = true, value_name = "PATH", env = "TESSEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Output the configuration JSON Schema.
    ///
    /// Redirect to a file for editors that support JSON Schema validation.
    Schema,

    /// Configuration file commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Validate the configuration file and report the result.
    Check,

    /// Run the placement engine against simulated monitors and windows.
    #[command(after_long_help = r#"Examples:
  tessel simulate                          # 2 monitors, 6 windows
  tessel simulate -m 3 -w 12 --strategy application-aware
  tessel simulate --algorithm grid --json  # machine-readable report"#)]
    Simulate(SimulateArgs),
}

impl Cli {
    /// Log filter derived from the flags.
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "tessel=debug,tessel_lib=debug" } else { "tessel=info,tessel_lib=info" }
    }

    /// Loads the configuration named by `--config` or found on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_config(&self) -> Result<TesselConfig, TesselError> {
        let (config, _) = config::load_or_default(self.config.as_deref())?;
        Ok(config)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), TesselError> {
        match &self.command {
            Commands::Schema => {
                let schema = serde_json::to_string_pretty(&config::schema())?;
                println!("{schema}");
                Ok(())
            }
            Commands::Config(cmd) => config_cmd::execute(cmd, self.config.as_deref()),
            Commands::Check => self.check(),
            Commands::Simulate(args) => simulate::execute(args, &self.load_config()?),
        }
    }

    fn check(&self) -> Result<(), TesselError> {
        let (config, path) = config::load_or_default(self.config.as_deref())?;
        match path {
            Some(path) => println!("{} {}", "valid".green().bold(), path.display()),
            None => println!("{} no configuration file, defaults apply", "valid".green().bold()),
        }
        println!(
            "  {} rules, {} custom snap zones, {} custom layouts",
            config.rules.rules.len(),
            config.snap.custom_zones.len(),
            config.tiling.custom_layouts.len()
        );
        println!(
            "  strategy {}, animation {}, advisor {}",
            config.monitors.strategy,
            output::format_bool(config.animation.enabled),
            output::format_bool(config.advisor.enabled)
        );
        Ok(())
    }
}
