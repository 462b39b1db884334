//! Core business logic module
//!
//! Everything that decides what a build looks like. Apart from the linker
//! script presence check it performs no I/O; side effects belong in
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`project`] - Project manifest (jennic.toml) parsing
//! - [`chip`] - Supported chips and library name resolution
//! - [`options`] - Option resolution and validation
//! - [`sdk`] - Vendor SDK layout
//! - [`compose`] - Compiler, assembler and linker configuration
//! - [`codegen`] - Code generator planning and freshness
//! - [`libraries`] - Auxiliary static libraries
//! - [`linker`] - Linker script selection
//! - [`plan`] - The resolved build plan

pub mod chip;
pub mod codegen;
pub mod compose;
pub mod libraries;
pub mod linker;
pub mod options;
pub mod plan;
pub mod project;
pub mod sdk;
