//! Error types for jennic-build
//!
//! Domain-specific error types using thiserror. Every variant is fatal for
//! the current build invocation; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Option validation errors (invalid or incompatible build options)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionError {
    /// Invalid option type
    #[error("Option '{name}' has invalid type: expected {expected}, got {got}")]
    InvalidType {
        name: String,
        expected: String,
        got: String,
    },

    /// Invalid choice value
    #[error("Option '{name}' has invalid value '{value}': must be one of {choices:?}")]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    /// Required option left unset
    #[error("Option '{name}' is required: {reason}")]
    Missing { name: String, reason: String },

    /// Out of range
    #[error("Option '{name}' value {value} is out of range (min: {min}, max: {max})")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Mutually exclusive values selected together
    #[error("Option '{name}' cannot combine '{first}' with '{second}': {reason}")]
    Incompatible {
        name: String,
        first: String,
        second: String,
        reason: String,
    },

    /// Option key not known to the resolver
    #[error("Unknown option '{name}'")]
    Unknown { name: String },

    /// Override not in KEY=VALUE form
    #[error("Malformed option override '{input}': expected KEY=VALUE")]
    MalformedOverride { input: String },
}

/// Project manifest (jennic.toml) errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Manifest file missing
    #[error("Project manifest not found at '{}'", .path.display())]
    NotFound { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Failed to parse project manifest: {0}")]
    Parse(String),

    /// Environment substitution failed
    #[error("Failed to substitute environment variables: {0}")]
    Substitution(String),
}

/// A file or directory the build depends on is absent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtifactError {
    /// Required artifact not on disk
    #[error("{what} not found: {}", .path.display())]
    Missing { what: String, path: PathBuf },
}

impl ArtifactError {
    /// Convenience constructor
    pub fn missing(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Missing {
            what: what.into(),
            path: path.into(),
        }
    }
}

/// Code generator invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Generator executable missing
    #[error("{tool} executable not found: {}", .path.display())]
    NotFound { tool: String, path: PathBuf },

    /// Launcher for the generator could not be located
    #[error("Runner '{runner}' for {tool} not found in PATH")]
    RunnerNotFound { tool: String, runner: String },

    /// Process could not be started
    #[error("Failed to start {tool}: {error}")]
    Spawn { tool: String, error: String },

    /// Process exited unsuccessfully; output is the tool's own diagnostics
    #[error("{tool} failed ({status}):\n{output}")]
    Failed {
        tool: String,
        status: String,
        output: String,
    },

    /// Declared output was not produced
    #[error("{tool} did not produce '{}'", .path.display())]
    MissingOutput { tool: String, path: PathBuf },

    /// Post-processing of outputs failed
    #[error("{tool} output handling failed: {source}")]
    Filesystem {
        tool: String,
        source: FilesystemError,
    },
}

/// Filesystem errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{}': {error}", .path.display())]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{}': {error}", .path.display())]
    WriteFile { path: PathBuf, error: String },

    /// Failed to query or change file permissions
    #[error("Failed to update permissions of '{}': {error}", .path.display())]
    Permissions { path: PathBuf, error: String },

    /// Failed to walk a directory tree
    #[error("Failed to walk '{}': {error}", .path.display())]
    Walk { path: PathBuf, error: String },
}

/// Top-level jennic-build error type
#[derive(Error, Debug)]
pub enum JennicError {
    /// Invalid or incompatible option
    #[error("Option error: {0}")]
    Option(#[from] OptionError),

    /// Project manifest error
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    /// Missing artifact
    #[error("Missing artifact: {0}")]
    Artifact(#[from] ArtifactError),

    /// External tool failure
    #[error("Code generation error: {0}")]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
