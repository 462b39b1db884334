//! Generator process invocation
//!
//! Runs the vendor configuration tools as child processes. The tools are
//! Windows executables on most hosts, so an optional runner (typically
//! `wine`) can be put in front of them.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::codegen::{GeneratorRequest, GeneratorTool};
use crate::error::ToolError;
use crate::infra::filesystem::{clear_readonly, create_dir_all, modified_time};

/// Generator backed by real processes
#[derive(Debug, Clone, Default)]
pub struct ProcessGenerator {
    runner: Option<PathBuf>,
}

impl ProcessGenerator {
    /// Run executables directly
    pub fn new() -> Self {
        Self::default()
    }

    /// Run executables through `runner`, located on `PATH`
    pub fn with_runner(runner: &str) -> Result<Self, ToolError> {
        let path = which::which(runner).map_err(|_| ToolError::RunnerNotFound {
            tool: "code generators".to_string(),
            runner: runner.to_string(),
        })?;
        Ok(Self { runner: Some(path) })
    }

    /// Build from an optional runner name; empty means none
    pub fn from_config(runner: Option<&str>) -> Result<Self, ToolError> {
        match runner.filter(|r| !r.is_empty()) {
            Some(runner) => Self::with_runner(runner),
            None => Ok(Self::new()),
        }
    }

    fn command(&self, executable: &Path) -> Command {
        match &self.runner {
            Some(runner) => {
                let mut cmd = Command::new(runner);
                cmd.arg(executable);
                cmd
            }
            None => Command::new(executable),
        }
    }
}

impl GeneratorTool for ProcessGenerator {
    fn invoke(&self, request: &GeneratorRequest) -> Result<Vec<PathBuf>, ToolError> {
        let tool = request.kind.to_string();
        if !request.executable.is_file() {
            return Err(ToolError::NotFound {
                tool,
                path: request.executable.clone(),
            });
        }
        create_dir_all(&request.output_dir).map_err(|source| ToolError::Filesystem {
            tool: tool.clone(),
            source,
        })?;

        tracing::debug!(
            "Executing {} {}",
            request.executable.display(),
            request.args.join(" ")
        );
        let output = self
            .command(&request.executable)
            .args(&request.args)
            .output()
            .map_err(|e| ToolError::Spawn {
                tool: tool.clone(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool,
                status: output.status.to_string(),
                output: combine_streams(&output.stdout, &output.stderr),
            });
        }

        for path in &request.outputs {
            if modified_time(path).is_none() {
                return Err(ToolError::MissingOutput {
                    tool,
                    path: path.clone(),
                });
            }
            clear_readonly(path).map_err(|source| ToolError::Filesystem {
                tool: tool.clone(),
                source,
            })?;
        }
        tracing::info!("{tool} wrote {} files", request.outputs.len());
        Ok(request.outputs.clone())
    }
}

/// Tool stdout followed by stderr, each kept as written
fn combine_streams(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !text.is_empty() && !stderr.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&String::from_utf8_lossy(stderr));
    text
}
