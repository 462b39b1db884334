//! Configuration and constants
//!
//! - [`defaults`] - Default option values, file names and SDK layout names

pub mod defaults;
