//! Check command implementation
//!
//! Implements `jnbuild check`: validate options, the SDK and the linker
//! script without running anything.

use anyhow::Result;
use std::path::Path;

use super::{GlobalArgs, Session};
use crate::core::linker::verify_linker_script;
use crate::core::plan::{option_report, BuildPlan};
use crate::error::{ArtifactError, JennicError};
use crate::infra::dirs::{verify_framework, verify_toolchain};

/// Verify each generator executable and its configuration input
pub fn verify_generators(plan: &BuildPlan) -> Result<(), ArtifactError> {
    for request in &plan.generators {
        if !request.executable.is_file() {
            return Err(ArtifactError::missing(
                format!("{} executable", request.kind),
                &request.executable,
            ));
        }
        if !request.config_file.is_file() {
            return Err(ArtifactError::missing(
                format!("{} configuration", request.kind),
                &request.config_file,
            ));
        }
    }
    Ok(())
}

/// Verify every artifact the plan depends on
pub fn verify_artifacts(plan: &BuildPlan) -> Result<(), JennicError> {
    verify_framework(&plan.sdk)?;
    verify_toolchain(&plan.sdk)?;
    verify_generators(plan)?;
    verify_linker_script(plan.linker_script.clone())?;
    Ok(())
}

/// Execute the check command
pub fn execute(project_dir: &Path, globals: &GlobalArgs) -> Result<()> {
    let out = globals.output;
    let session = Session::load(project_dir, globals)?;
    let plan = &session.plan;

    out.line(format_args!("Checking project '{}'...\n", plan.project));
    out.line("Options:");
    for (name, value, source) in option_report(&session.resolved) {
        out.line(format_args!("  {name:<16} {value:<24} ({source})"));
    }
    out.line("");
    out.success(format_args!("Options are valid ({})", plan.options));

    verify_artifacts(plan)?;
    out.success(format_args!("SDK found at {}", plan.sdk.framework_dir.display()));
    if !plan.generators.is_empty() {
        out.success(format_args!("{} code generators available", plan.generators.len()));
    }
    out.success(format_args!("Linker script {}", plan.linker_script.display()));
    Ok(())
}
