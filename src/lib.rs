//! jennic-build - build configuration for NXP/Jennic JN516x ZigBee firmware
//!
//! Resolves everything a compiler driver needs to build a JN516x application
//! from a project manifest: compiler and linker flags, preprocessor defines,
//! search paths, vendor and auxiliary libraries, the linker script, and the
//! SDK code generator runs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (option resolution, composition, planning)
//! - [`infra`] - Infrastructure layer (filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
