//! Config CLI commands.

use std::path::Path;

use clap::Subcommand;

use crate::cli::output;
use crate::config::{self, config_paths};
use crate::error::TesselError;

/// Config inspection commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Show where Tessel looks for its configuration file.
    ///
    /// Paths are listed in priority order; the first existing one is active.
    Path,

    /// Print the effective configuration, defaults included.
    Show {
        /// Print plain JSON without colors.
        #[arg(long)]
        raw: bool,
    },
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn execute(cmd: &ConfigCommands, custom: Option<&Path>) -> Result<(), TesselError> {
    match cmd {
        ConfigCommands::Path => {
            show_config_path(custom);
            Ok(())
        }
        ConfigCommands::Show { raw } => {
            let (config, _) = config::load_or_default(custom)?;
            let value = serde_json::to_value(&config)?;
            if *raw {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_highlighted_json(&value);
            }
            Ok(())
        }
    }
}

fn show_config_path(custom: Option<&Path>) {
    if let Some(path) = custom {
        let marker = if path.exists() { " (active)" } else { " (missing)" };
        println!("Configuration file: {}{marker}", path.display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");
    let paths = config_paths();
    let mut found = false;
    for (i, path) in paths.iter().enumerate() {
        let marker = match (path.exists(), found) {
            (true, false) => {
                found = true;
                " (active)"
            }
            (true, true) => " (shadowed)",
            _ => "",
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }
    if !found {
        println!("\nNo configuration file found; defaults apply.");
    }
}
