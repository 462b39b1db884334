//! SDK directory discovery
//!
//! Locates the vendor SDK and toolchain packages. Each directory is taken
//! from the project manifest first, then from the environment, and finally
//! from the platform data directory:
//!
//! - `JENNIC_FRAMEWORK_DIR` - Override the SDK (framework) directory
//! - `JENNIC_TOOLCHAIN_DIR` - Override the toolchain directory
//! - default: `<data dir>/jennic-build/framework-jennic` and
//!   `<data dir>/jennic-build/toolchain-nxp-beyondstudio`

use std::env;
use std::path::{Path, PathBuf};

use crate::config::defaults::{FRAMEWORK_PACKAGE, TOOLCHAIN_PACKAGE};
use crate::core::project::SdkConfig;
use crate::core::sdk::SdkLayout;
use crate::error::ArtifactError;

/// Environment variable names for directory overrides
pub const ENV_FRAMEWORK_DIR: &str = "JENNIC_FRAMEWORK_DIR";
pub const ENV_TOOLCHAIN_DIR: &str = "JENNIC_TOOLCHAIN_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "jennic-build";

/// Resolve the SDK layout for a project
pub fn resolve_sdk_layout(config: &SdkConfig) -> SdkLayout {
    SdkLayout::new(
        resolve_dir(
            config.framework_dir.as_deref(),
            env::var(ENV_FRAMEWORK_DIR).ok(),
            FRAMEWORK_PACKAGE,
        ),
        resolve_dir(
            config.toolchain_dir.as_deref(),
            env::var(ENV_TOOLCHAIN_DIR).ok(),
            TOOLCHAIN_PACKAGE,
        ),
    )
}

/// Pick a directory: configured value, then environment, then platform default
fn resolve_dir(configured: Option<&Path>, env_value: Option<String>, package: &str) -> PathBuf {
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        return path.to_path_buf();
    }
    if let Some(path) = env_value.filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    platform_data_dir().join(package)
}

/// Get platform-specific data directory
fn platform_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".local").join("share").join(APP_NAME))
                .unwrap_or_else(|| {
                    PathBuf::from(".")
                        .join(".local")
                        .join("share")
                        .join(APP_NAME)
                })
        })
}

/// Fail unless the SDK root is an existing directory
pub fn verify_framework(layout: &SdkLayout) -> Result<(), ArtifactError> {
    if layout.framework_dir.is_dir() {
        Ok(())
    } else {
        Err(ArtifactError::missing(
            "SDK framework directory",
            &layout.framework_dir,
        ))
    }
}

/// Fail unless the toolchain root is an existing directory
pub fn verify_toolchain(layout: &SdkLayout) -> Result<(), ArtifactError> {
    if layout.toolchain_dir.is_dir() {
        Ok(())
    } else {
        Err(ArtifactError::missing("Toolchain directory", &layout.toolchain_dir))
    }
}
