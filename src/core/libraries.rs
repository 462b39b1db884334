//! Auxiliary static libraries
//!
//! Some SDK components ship as source only. Depending on the stack and the
//! enabled cluster families, those trees are compiled into static libraries
//! inside the build directory and placed ahead of the vendor archives on the
//! link line. Generated glue code becomes one more such library.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::chip::Chip;
use crate::core::options::{BuildOptions, Feature, MacKind, StackKind};
use crate::core::project::ProjectPaths;
use crate::core::sdk::SdkLayout;

/// Name of the library holding generated sources
pub const GENERATED_LIBRARY: &str = "Gen";

/// Where a library's sources come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySources {
    /// Every source file below a directory
    Tree(PathBuf),
    /// An explicit list of files
    Files(Vec<PathBuf>),
}

/// One auxiliary library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxLibrary {
    /// Link name
    pub name: String,
    /// Source location
    pub sources: LibrarySources,
    /// Archive written by the build
    pub archive: PathBuf,
}

impl AuxLibrary {
    fn tree(name: &str, dir: PathBuf, paths: &ProjectPaths) -> Self {
        Self {
            name: name.to_string(),
            sources: LibrarySources::Tree(dir),
            archive: archive_path(&paths.build_dir, name),
        }
    }
}

/// Archive path of an auxiliary library
pub fn archive_path(build_dir: &Path, name: &str) -> PathBuf {
    build_dir.join(format!("lib{name}.a"))
}

/// Ordered auxiliary libraries; order is link order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryManifest {
    pub libraries: Vec<AuxLibrary>,
}

impl LibraryManifest {
    /// Link names in order
    pub fn names(&self) -> Vec<String> {
        self.libraries.iter().map(|l| l.name.clone()).collect()
    }
}

/// Source subtree for one optional Home Automation cluster family
fn ha_family_library(feature: Feature) -> Option<(&'static str, &'static str)> {
    match feature {
        Feature::HaLighting => Some(("HALighting", "Lighting")),
        Feature::EnergyAtHome => Some(("HAEnergyAtHome", "EnergyAtHome")),
        Feature::GreenPower => Some(("HAGreenPower", "GreenPower")),
        Feature::Hvac => Some(("HAHVAC", "HVAC")),
        Feature::Ias => Some(("HAIAS", "IAS")),
        Feature::MeasurementAndSensing => Some(("HAMeasurementAndSensing", "MeasurementAndSensing")),
        Feature::Zll | Feature::Ha => None,
    }
}

/// Decide which auxiliary libraries a build needs
///
/// `generated` lists the generated sources; they form the [`GENERATED_LIBRARY`]
/// for ZigBee stacks.
pub fn assemble(
    options: &BuildOptions,
    sdk: &SdkLayout,
    paths: &ProjectPaths,
    generated: &[PathBuf],
) -> LibraryManifest {
    let zcl = sdk.zcl_dir();
    let mut libraries = Vec::new();

    if options.stack == StackKind::Zllha {
        if options.has_feature(Feature::Zll) {
            if options.features.iter().any(|f| ha_family_library(*f).is_some() || *f == Feature::Ha) {
                tracing::warn!("ZLL selected, Home Automation cluster libraries are not built");
            }
            libraries.push(AuxLibrary::tree("ZLLClusters", zcl.join("Clusters"), paths));
            libraries.push(AuxLibrary::tree(
                "ZLLProfile",
                zcl.join("Profiles").join("ZLL").join("Source"),
                paths,
            ));
            libraries.push(AuxLibrary::tree("ZCLSource", zcl.join("Source"), paths));
        } else {
            libraries.push(AuxLibrary::tree("ZCLSource", zcl.join("Source"), paths));
            libraries.push(AuxLibrary::tree(
                "HAGeneral",
                zcl.join("Clusters").join("General").join("Source"),
                paths,
            ));
            libraries.push(AuxLibrary::tree(
                "HAProfile",
                zcl.join("Profiles").join("HA").join("Common").join("Source"),
                paths,
            ));
            for (name, family) in options.features.iter().filter_map(|f| ha_family_library(*f)) {
                libraries.push(AuxLibrary::tree(
                    name,
                    zcl.join("Clusters").join(family).join("Source"),
                    paths,
                ));
            }
        }
    }

    libraries.push(AuxLibrary::tree(
        "JNUtilities",
        sdk.component_source("Utilities"),
        paths,
    ));

    if options.mac == MacKind::MiniMacShim && options.chip == Chip::Jn5169 {
        libraries.push(AuxLibrary::tree(
            "JNMiniMacShim",
            sdk.component_source("MiniMAC"),
            paths,
        ));
    }

    if options.stack.is_zigbee() {
        libraries.push(AuxLibrary {
            name: GENERATED_LIBRARY.to_string(),
            sources: LibrarySources::Files(generated.to_vec()),
            archive: archive_path(&paths.build_dir, GENERATED_LIBRARY),
        });
    }

    LibraryManifest { libraries }
}

/// Final link set: auxiliary libraries first, then the vendor libraries
pub fn link_set(manifest: &LibraryManifest, vendor_libraries: &[String]) -> Vec<String> {
    manifest
        .names()
        .into_iter()
        .chain(vendor_libraries.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{DeviceRole, PdmBackend};
    use std::collections::BTreeSet;

    fn sdk() -> SdkLayout {
        SdkLayout::new("/sdk", "/tc")
    }

    fn find<'a>(manifest: &'a LibraryManifest, name: &str) -> Option<&'a AuxLibrary> {
        manifest.libraries.iter().find(|l| l.name == name)
    }

    fn paths() -> ProjectPaths {
        ProjectPaths::new(Path::new("/p"))
    }

    fn zllha(features: &[Feature]) -> BuildOptions {
        BuildOptions {
            stack: StackKind::Zllha,
            mac: MacKind::MiniMacShim,
            role: Some(DeviceRole::Coordinator),
            pdm: PdmBackend::Eeprom,
            features: features.iter().copied().collect::<BTreeSet<_>>(),
            ..BuildOptions::new(Chip::Jn5169)
        }
    }

    #[test]
    fn test_zll_branch_libraries() {
        let generated = vec![PathBuf::from("/p/build/gen/zps_gen.c")];
        let manifest = assemble(&zllha(&[Feature::Zll, Feature::GreenPower]), &sdk(), &paths(), &generated);
        assert_eq!(
            manifest.names(),
            vec!["ZLLClusters", "ZLLProfile", "ZCLSource", "JNUtilities", "JNMiniMacShim", "Gen"]
        );
        assert_eq!(
            find(&manifest, "ZLLProfile").unwrap().sources,
            LibrarySources::Tree(PathBuf::from("/sdk/Components/ZCL/Profiles/ZLL/Source"))
        );
        assert_eq!(
            find(&manifest, "Gen").unwrap().sources,
            LibrarySources::Files(generated)
        );
    }

    #[test]
    fn test_home_automation_branch_libraries() {
        let manifest = assemble(
            &zllha(&[Feature::Ha, Feature::Ias, Feature::HaLighting]),
            &sdk(),
            &paths(),
            &[],
        );
        // features iterate in tag order
        assert_eq!(
            manifest.names(),
            vec![
                "ZCLSource",
                "HAGeneral",
                "HAProfile",
                "HALighting",
                "HAIAS",
                "JNUtilities",
                "JNMiniMacShim",
                "Gen"
            ]
        );
        assert_eq!(
            find(&manifest, "HAIAS").unwrap().archive,
            PathBuf::from("/p/build/libHAIAS.a")
        );
    }

    #[test]
    fn test_mac_only_build_needs_utilities_only() {
        let manifest = assemble(&BuildOptions::new(Chip::Jn5168), &sdk(), &paths(), &[]);
        assert_eq!(manifest.names(), vec!["JNUtilities"]);
        assert_eq!(
            manifest.libraries[0].sources,
            LibrarySources::Tree(PathBuf::from("/sdk/Components/Utilities/Source"))
        );
    }

    #[test]
    fn test_shim_library_only_on_jn5169() {
        let options = BuildOptions {
            chip: Chip::Jn5168,
            ..zllha(&[Feature::Zll])
        };
        let manifest = assemble(&options, &sdk(), &paths(), &[]);
        assert!(find(&manifest, "JNMiniMacShim").is_none());
    }

    #[test]
    fn test_link_set_prepends_aux_libraries() {
        let manifest = assemble(&BuildOptions::new(Chip::Jn5168), &sdk(), &paths(), &[]);
        let set = link_set(&manifest, &["MAC_JN516x".to_string()]);
        assert_eq!(set, vec!["JNUtilities", "MAC_JN516x"]);
    }
}
