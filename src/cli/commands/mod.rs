//! CLI command implementations
//!
//! Each command is implemented in its own submodule. All of them start from
//! a [`Session`]: the manifest of the project in the current directory, the
//! resolved options and the build plan.

pub mod check;
pub mod configure;
pub mod generate;
pub mod resolve;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::Path;

use crate::cli::output::Output;
use crate::core::chip::CHIP_OPTION;
use crate::core::options::{parse_override, read_build_options, ResolvedOptions};
use crate::core::plan::BuildPlan;
use crate::core::project::{ProjectManifest, ProjectPaths};
use crate::error::{JennicError, OptionError};
use crate::infra::dirs::resolve_sdk_layout;

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// `--mcu` value
    pub mcu: Option<String>,
    /// Raw `--set KEY=VALUE` arguments
    pub overrides: Vec<String>,
    /// Message sink
    pub output: Output,
}

impl GlobalArgs {
    /// Command-line option values; `--mcu` wins over `--set mcu=...`
    pub fn option_values(&self) -> Result<HashMap<String, toml::Value>, OptionError> {
        let mut values = self
            .overrides
            .iter()
            .map(|raw| parse_override(raw))
            .collect::<Result<HashMap<_, _>, _>>()?;
        if let Some(ref mcu) = self.mcu {
            values.insert(CHIP_OPTION.to_string(), toml::Value::String(mcu.clone()));
        }
        Ok(values)
    }
}

/// Plan output format for `resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Human readable summary
    Text,
    /// Full plan as JSON
    Json,
    /// Make variable assignments
    Make,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate options, SDK and linker script
    Check,

    /// Print the resolved build configuration
    Resolve {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: PlanFormat,
    },

    /// Run the SDK code generators
    Generate {
        /// Regenerate even when outputs are up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Validate, generate and write the build configuration files
    Configure {
        /// Regenerate even when outputs are up to date
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, globals: &GlobalArgs) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Check => check::execute(&current_dir, globals),
            Self::Resolve { format } => resolve::execute(&current_dir, globals, format),
            Self::Generate { force } => generate::execute(&current_dir, globals, force),
            Self::Configure { force } => configure::execute(&current_dir, globals, force),
        }
    }
}

/// Everything a command needs about the project
#[derive(Debug)]
pub struct Session {
    /// Loaded manifest
    pub manifest: ProjectManifest,
    /// Option values with their sources
    pub resolved: ResolvedOptions,
    /// Resolved build plan
    pub plan: BuildPlan,
}

impl Session {
    /// Load the project in `project_dir` and resolve its plan
    pub fn load(project_dir: &Path, globals: &GlobalArgs) -> Result<Self> {
        let manifest = ProjectManifest::load_from_dir(project_dir)
            .context("Failed to load project manifest")?;
        tracing::info!("Loaded project: {}", manifest.project.name);

        let cli_values = globals.option_values().map_err(JennicError::from)?;
        let (options, resolved) = read_build_options(&cli_values, &manifest.option_values())
            .map_err(JennicError::from)?;
        tracing::debug!("Options: {options}");

        let sdk = resolve_sdk_layout(&manifest.sdk);
        tracing::debug!("SDK at {}", sdk.framework_dir.display());

        let plan = BuildPlan::resolve(&manifest, options, sdk, ProjectPaths::new(project_dir))
            .map_err(JennicError::from)?;
        Ok(Self {
            manifest,
            resolved,
            plan,
        })
    }
}
