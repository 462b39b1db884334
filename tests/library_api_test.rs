//! Library API tests: option resolution through plan resolution against a
//! temporary SDK tree

mod common;

use std::collections::HashMap;

use common::{TestProject, ZLL_LIGHT};
use jennic_build::core::chip::Chip;
use jennic_build::core::linker::verify_linker_script;
use jennic_build::core::options::{read_build_options, MacKind};
use jennic_build::core::plan::BuildPlan;
use jennic_build::core::project::{ProjectManifest, ProjectPaths};
use jennic_build::error::{JennicError, OptionError};
use jennic_build::infra::dirs::resolve_sdk_layout;

fn load(project: &TestProject) -> (ProjectManifest, BuildPlan) {
    let manifest = ProjectManifest::load_from_dir(&project.path()).unwrap();
    let (options, _) = read_build_options(&HashMap::new(), &manifest.option_values()).unwrap();
    let sdk = resolve_sdk_layout(&manifest.sdk);
    let plan = BuildPlan::resolve(&manifest, options, sdk, ProjectPaths::new(&project.path())).unwrap();
    (manifest, plan)
}

#[test]
fn test_manifest_sdk_dirs_used() {
    let project = TestProject::new();
    project.write_manifest(ZLL_LIGHT);
    let (_, plan) = load(&project);
    assert_eq!(plan.sdk.framework_dir, project.framework_dir());
    assert_eq!(plan.sdk.toolchain_dir, project.toolchain_dir());
    assert_eq!(plan.options.chip, Chip::Jn5169);
    assert_eq!(plan.options.mac, MacKind::MiniMacShim);
}

#[test]
fn test_linker_script_verified_against_sdk() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(ZLL_LIGHT);
    let (_, plan) = load(&project);
    assert!(verify_linker_script(plan.linker_script.clone()).is_ok());

    std::fs::remove_file(&plan.linker_script).unwrap();
    let err: JennicError = verify_linker_script(plan.linker_script.clone()).unwrap_err().into();
    assert!(matches!(err, JennicError::Artifact(_)));
    assert!(err.to_string().contains("AppBuildZLLHA_JN5169.ld"));
}

#[test]
fn test_unsupported_chip_fails_before_other_options() {
    let project = TestProject::new();
    project.write_manifest("[board]\nmcu = \"JN5148\"\n[build]\nstack = \"NOPE\"\n");
    let manifest = ProjectManifest::load_from_dir(&project.path()).unwrap();
    match read_build_options(&HashMap::new(), &manifest.option_values()).unwrap_err() {
        OptionError::InvalidChoice { name, value, .. } => {
            assert_eq!(name, "mcu");
            assert_eq!(value, "JN5148");
        }
        other => panic!("Expected InvalidChoice error, got {other:?}"),
    }
}
