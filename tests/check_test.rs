//! Integration tests for `jnbuild check`

mod common;

use common::{stderr, stdout, TestProject, MAC_APP, ZLL_LIGHT};

// ============================================
// Success cases
// ============================================

#[test]
fn test_check_valid_mac_project() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["check"]);
    let out = stdout(&output);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.contains("✓ Options are valid"));
    assert!(out.contains("AppBuildMAC.ld"));
}

#[test]
fn test_check_reports_option_sources() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["--set", "channel=15", "check"]);
    let out = stdout(&output);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let channel = out.lines().find(|l| l.trim_start().starts_with("channel")).unwrap();
    assert!(channel.contains("15"));
    assert!(channel.contains("(cli)"));
    let mcu = out.lines().find(|l| l.trim_start().starts_with("mcu")).unwrap();
    assert!(mcu.contains("(project)"));
}

#[test]
fn test_check_quiet_prints_nothing() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["--quiet", "check"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

// ============================================
// Failure cases
// ============================================

#[test]
fn test_check_rejects_unsupported_chip() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["--mcu", "JN5139", "check"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("✗"));
    assert!(err.contains("'mcu'"));
    assert!(err.contains("JN5139"));
}

#[test]
fn test_check_missing_manifest() {
    let project = TestProject::new();
    let output = project.jnbuild(&["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("jennic.toml"));
}

#[test]
fn test_check_missing_linker_script_names_path() {
    let project = TestProject::new();
    project.create_sdk();
    std::fs::remove_file(project.framework_dir().join("Chip/JN5168/Build/AppBuildMAC.ld")).unwrap();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["check"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("Linker script not found"));
    assert!(err.contains("Chip/JN5168/Build/AppBuildMAC.ld"));
}

#[test]
fn test_check_missing_sdk() {
    let project = TestProject::new();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("SDK framework directory not found"));
}

#[test]
fn test_check_missing_generator_executable() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(ZLL_LIGHT);

    let output = project.jnbuild(&["check"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("PDUMConfig executable not found"));
}

#[test]
fn test_check_zigbee_requires_device_type() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest("[board]\nmcu = \"JN5169\"\n[build]\nstack = \"ZBPro\"\n");

    let output = project.jnbuild(&["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'device_type' is required"));
}

#[test]
fn test_check_unknown_override_rejected() {
    let project = TestProject::new();
    project.create_sdk();
    project.write_manifest(MAC_APP);

    let output = project.jnbuild(&["--set", "turbo=yes", "check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown option 'turbo'"));
}
