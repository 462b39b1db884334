//! Configure command implementation
//!
//! Implements `jnbuild configure`: the full pipeline. Validates the options
//! and SDK, runs the generators, collects auxiliary library sources and
//! writes the plan as JSON and as a Make fragment into the build directory.

use anyhow::{Context, Result};
use std::path::Path;

use super::check::verify_artifacts;
use super::generate::run_all;
use super::{GlobalArgs, Session};
use crate::config::defaults::{PLAN_JSON_FILE, PLAN_MAKE_FILE};
use crate::core::plan::render_sources;
use crate::error::JennicError;
use crate::infra::filesystem::write_file;
use crate::infra::sources::collect_manifest;

/// Execute the configure command
pub fn execute(project_dir: &Path, globals: &GlobalArgs, force: bool) -> Result<()> {
    let out = globals.output;
    let session = Session::load(project_dir, globals)?;
    let plan = &session.plan;

    verify_artifacts(plan)?;
    run_all(
        &plan.generators,
        session.manifest.sdk.runner.as_deref(),
        force,
        out,
    )?;

    let sources = collect_manifest(&plan.libraries)?;
    let total: usize = sources.iter().map(|(_, files)| files.len()).sum();
    tracing::info!("{} auxiliary libraries, {total} source files", sources.len());

    let build_dir = &plan.paths.build_dir;
    let json_path = build_dir.join(PLAN_JSON_FILE);
    let json = plan.to_json().context("Failed to serialise build plan")?;
    write_file(&json_path, &json).map_err(JennicError::from)?;

    let make_path = build_dir.join(PLAN_MAKE_FILE);
    let mut make = plan.to_make();
    make.push_str(&render_sources(&sources));
    write_file(&make_path, &make).map_err(JennicError::from)?;

    for line in plan.diagnostics() {
        out.line(line);
    }
    out.success(format_args!("Wrote {}", json_path.display()));
    out.success(format_args!("Wrote {}", make_path.display()));
    Ok(())
}
