#![allow(clippy::multiple_crate_versions)]

//! Tessel command line.

use clap::Parser;
use tessel_lib::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(err) = cli::run(&args) {
        eprintln!("tessel: {err}");
        std::process::exit(1);
    }
}
