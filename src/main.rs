//! jnbuild - build configuration for JN516x ZigBee firmware
//!
//! Entry point for the jnbuild command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jennic_build::cli::output::{display_error, log_level};
use jennic_build::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose, cli.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run() {
        display_error(&e);
        std::process::exit(1);
    }
}
