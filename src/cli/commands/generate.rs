//! Generate command implementation
//!
//! Implements `jnbuild generate`: run the SDK code generators for stale
//! outputs.

use anyhow::Result;
use std::path::Path;

use super::check::verify_generators;
use super::{GlobalArgs, Session};
use crate::cli::output::Output;
use crate::core::codegen::{run_generators, GeneratorOutcome, GeneratorRequest};
use crate::error::JennicError;
use crate::infra::dirs::verify_framework;
use crate::infra::filesystem::modified_time;
use crate::infra::generator::ProcessGenerator;

/// Run every planned generator, one spinner per tool
pub fn run_all(
    requests: &[GeneratorRequest],
    runner: Option<&str>,
    force: bool,
    out: Output,
) -> Result<Vec<GeneratorOutcome>, JennicError> {
    let tool = ProcessGenerator::from_config(runner)?;
    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        let pb = out.spinner(&format!("Running {}...", request.kind));
        let result = run_generators(std::slice::from_ref(request), &tool, force, modified_time);
        pb.finish_and_clear();
        for outcome in result? {
            if outcome.ran {
                out.success(format_args!(
                    "{}: generated {} files",
                    outcome.kind,
                    outcome.produced.len()
                ));
            } else {
                out.success(format_args!("{}: up to date", outcome.kind));
            }
            outcomes.push(outcome);
        }
    }
    Ok(outcomes)
}

/// Execute the generate command
pub fn execute(project_dir: &Path, globals: &GlobalArgs, force: bool) -> Result<()> {
    let out = globals.output;
    let session = Session::load(project_dir, globals)?;
    let plan = &session.plan;

    if plan.generators.is_empty() {
        out.info(format_args!(
            "Stack '{}' does not use generated code",
            plan.options.stack
        ));
        return Ok(());
    }

    verify_framework(&plan.sdk).map_err(JennicError::from)?;
    verify_generators(plan).map_err(JennicError::from)?;
    run_all(
        &plan.generators,
        session.manifest.sdk.runner.as_deref(),
        force,
        out,
    )?;
    Ok(())
}
