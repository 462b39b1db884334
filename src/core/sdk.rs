//! Vendor SDK layout
//!
//! Path arithmetic over the JN516x SDK tree. Nothing here touches the
//! filesystem; presence checks live in [`crate::infra::dirs`].

use serde::Serialize;
use std::path::PathBuf;

use crate::core::chip::Chip;

/// Locations of the vendor SDK and toolchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkLayout {
    /// SDK root (`Stack`, `Components`, `Platform`, `Chip`, `Tools`)
    pub framework_dir: PathBuf,
    /// Toolchain root, handed to the ZPS generator
    pub toolchain_dir: PathBuf,
}

impl SdkLayout {
    /// Create a layout from the two package roots
    pub fn new(framework_dir: impl Into<PathBuf>, toolchain_dir: impl Into<PathBuf>) -> Self {
        Self {
            framework_dir: framework_dir.into(),
            toolchain_dir: toolchain_dir.into(),
        }
    }

    /// `Stack` directory
    pub fn stack_dir(&self) -> PathBuf {
        self.framework_dir.join("Stack")
    }

    /// `Components` directory
    pub fn components_dir(&self) -> PathBuf {
        self.framework_dir.join("Components")
    }

    /// `Platform` directory
    pub fn platform_dir(&self) -> PathBuf {
        self.framework_dir.join("Platform")
    }

    /// Per-chip directory
    pub fn chip_dir(&self, chip: Chip) -> PathBuf {
        self.framework_dir.join("Chip").join(chip.as_str())
    }

    /// `Tools` directory holding the generators
    pub fn tool_dir(&self) -> PathBuf {
        self.framework_dir.join("Tools")
    }

    /// Public headers of a component
    pub fn component_include(&self, component: &str) -> PathBuf {
        self.components_dir().join(component).join("Include")
    }

    /// Sources of a component
    pub fn component_source(&self, component: &str) -> PathBuf {
        self.components_dir().join(component).join("Source")
    }

    /// ZigBee cluster library root
    pub fn zcl_dir(&self) -> PathBuf {
        self.components_dir().join("ZCL")
    }

    /// Directory holding the precompiled component libraries
    pub fn library_dir(&self) -> PathBuf {
        self.components_dir().join("Library")
    }

    /// Path of a precompiled library archive, given its resolved name
    pub fn library_archive(&self, resolved_name: &str) -> PathBuf {
        self.library_dir().join(format!("lib{resolved_name}.a"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SdkLayout {
        SdkLayout::new("/sdk", "/toolchain")
    }

    #[test]
    fn test_standard_directories() {
        let sdk = layout();
        assert_eq!(sdk.stack_dir(), PathBuf::from("/sdk/Stack"));
        assert_eq!(sdk.platform_dir(), PathBuf::from("/sdk/Platform"));
        assert_eq!(sdk.chip_dir(Chip::Jn5169), PathBuf::from("/sdk/Chip/JN5169"));
        assert_eq!(sdk.tool_dir(), PathBuf::from("/sdk/Tools"));
    }

    #[test]
    fn test_component_paths() {
        let sdk = layout();
        assert_eq!(
            sdk.component_include("MMAC"),
            PathBuf::from("/sdk/Components/MMAC/Include")
        );
        assert_eq!(
            sdk.component_source("Utilities"),
            PathBuf::from("/sdk/Components/Utilities/Source")
        );
        assert_eq!(sdk.zcl_dir(), PathBuf::from("/sdk/Components/ZCL"));
    }

    #[test]
    fn test_library_archive_path() {
        assert_eq!(
            layout().library_archive("ZPSNWK_JN516x"),
            PathBuf::from("/sdk/Components/Library/libZPSNWK_JN516x.a")
        );
    }
}
