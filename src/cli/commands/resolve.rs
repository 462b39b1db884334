//! Resolve command implementation
//!
//! Implements `jnbuild resolve`: print the composed plan.

use anyhow::{Context, Result};
use std::path::Path;

use super::{GlobalArgs, PlanFormat, Session};
use crate::core::plan::BuildPlan;

/// Human readable summary of a plan
pub fn render_text(plan: &BuildPlan) -> String {
    let compile = &plan.compile;
    let mut lines = vec![
        format!("Project:       {}", plan.project),
        format!("Options:       {}", plan.options),
        format!("Linker script: {}", plan.linker_script.display()),
        format!("Rules:         {}", compile.applied_rules.join(", ")),
        String::new(),
        format!("CFLAGS:   {}", compile.cc_flags.join(" ")),
        format!("CXXFLAGS: {}", compile.cxx_flags.join(" ")),
        format!("ASFLAGS:  {}", compile.assembler_command_flags().join(" ")),
        format!("LDFLAGS:  {}", compile.link_flags.join(" ")),
        String::new(),
        "Defines:".to_string(),
    ];
    lines.extend(compile.defines.iter().map(|d| format!("  {d}")));
    lines.push("Include dirs:".to_string());
    lines.extend(compile.include_dirs.iter().map(|d| format!("  {}", d.display())));
    lines.push("Library dirs:".to_string());
    lines.extend(plan.link_dirs.iter().map(|d| format!("  {}", d.display())));
    lines.push(format!("Libraries: {}", plan.link_libraries.join(" ")));
    if !plan.generators.is_empty() {
        lines.push("Generators:".to_string());
        lines.extend(
            plan.generators
                .iter()
                .map(|g| format!("  {} {}", g.kind, g.args.join(" "))),
        );
    }
    lines.join("\n")
}

/// Execute the resolve command
pub fn execute(project_dir: &Path, globals: &GlobalArgs, format: PlanFormat) -> Result<()> {
    let session = Session::load(project_dir, globals)?;
    let plan = &session.plan;
    // the plan is the command's output, so it is printed even when quiet
    let rendered = match format {
        PlanFormat::Text => render_text(plan),
        PlanFormat::Json => plan.to_json().context("Failed to serialise build plan")?,
        PlanFormat::Make => plan.to_make(),
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
