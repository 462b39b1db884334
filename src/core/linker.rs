//! Linker script selection

use std::path::PathBuf;

use crate::core::chip::Chip;
use crate::core::options::{OptionChoice, StackKind};
use crate::core::sdk::SdkLayout;
use crate::error::ArtifactError;

/// Compute the linker script for a stack and chip
///
/// The combined ZLL/HA profile ships its own scripts; every other stack uses
/// the chip directory script named after the stack.
pub fn select_linker_script(stack: StackKind, chip: Chip, sdk: &SdkLayout) -> PathBuf {
    match stack {
        StackKind::Zllha => sdk
            .stack_dir()
            .join("ZLLHA")
            .join("Build")
            .join(format!("AppBuildZLLHA_{chip}.ld")),
        StackKind::Mac | StackKind::ZbPro | StackKind::Jip => sdk
            .chip_dir(chip)
            .join("Build")
            .join(format!("AppBuild{}.ld", stack.as_str())),
    }
}

/// Fail unless the script exists
pub fn verify_linker_script(path: PathBuf) -> Result<PathBuf, ArtifactError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ArtifactError::missing("Linker script", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zllha_uses_stack_script() {
        let sdk = SdkLayout::new("/sdk", "/tc");
        assert_eq!(
            select_linker_script(StackKind::Zllha, Chip::Jn5169, &sdk),
            PathBuf::from("/sdk/Stack/ZLLHA/Build/AppBuildZLLHA_JN5169.ld")
        );
    }

    #[test]
    fn test_other_stacks_use_chip_script() {
        let sdk = SdkLayout::new("/sdk", "/tc");
        assert_eq!(
            select_linker_script(StackKind::ZbPro, Chip::Jn5168, &sdk),
            PathBuf::from("/sdk/Chip/JN5168/Build/AppBuildZBPro.ld")
        );
        assert_eq!(
            select_linker_script(StackKind::Mac, Chip::Jn5161, &sdk),
            PathBuf::from("/sdk/Chip/JN5161/Build/AppBuildMAC.ld")
        );
    }

    #[test]
    fn test_missing_script_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = SdkLayout::new(dir.path(), dir.path());
        let path = select_linker_script(StackKind::Jip, Chip::Jn5164, &sdk);
        let err = verify_linker_script(path.clone()).unwrap_err();
        assert_eq!(err, ArtifactError::missing("Linker script", path));
        assert!(err.to_string().contains("AppBuildJIP.ld"));
    }

    #[test]
    fn test_existing_script_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = SdkLayout::new(dir.path(), dir.path());
        let path = select_linker_script(StackKind::Mac, Chip::Jn5168, &sdk);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "/* script */").unwrap();
        assert_eq!(verify_linker_script(path.clone()).unwrap(), path);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every script path names the chip and ends in .ld
        #[test]
        fn prop_script_names_chip(
            stack in proptest::sample::select(StackKind::ALL.to_vec()),
            chip in proptest::sample::select(Chip::ALL.to_vec()),
        ) {
            let path = select_linker_script(stack, chip, &SdkLayout::new("/sdk", "/tc"));
            let text = path.to_string_lossy().into_owned();
            prop_assert!(text.contains(chip.as_str()));
            prop_assert!(text.ends_with(".ld"));
        }
    }
}
