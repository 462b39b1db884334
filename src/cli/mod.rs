//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::sync::OnceLock;

use commands::{Commands, GlobalArgs};
use output::Output;

/// Version with the git revision appended when it is known
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        let version = env!("CARGO_PKG_VERSION");
        match option_env!("VERGEN_GIT_SHA") {
            Some(sha) if sha != "VERGEN_IDEMPOTENT_OUTPUT" => format!("{version} ({sha})"),
            _ => version.to_string(),
        }
    })
}

/// jnbuild - Build configuration for NXP JN516x ZigBee firmware
///
/// Resolves compiler flags, libraries and linker scripts for a firmware
/// project and runs the SDK code generators.
#[derive(Parser, Debug)]
#[command(name = "jnbuild")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Chip part number, overrides the manifest
    #[arg(long, global = true, env = "JNBUILD_MCU")]
    pub mcu: Option<String>,

    /// Override a build option (KEY=VALUE, repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = GlobalArgs {
            mcu: self.mcu,
            overrides: self.set,
            output: Output::new(self.quiet),
        };
        if let Some(cmd) = self.command {
            cmd.run(&globals)
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
