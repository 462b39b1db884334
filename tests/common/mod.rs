//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a temporary
//! project directory, a fake SDK tree and a way to run `jnbuild` inside it.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding a project (`project/`) and a fake
/// SDK (`sdk/framework-jennic`, `sdk/toolchain`).
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

/// Generator executables and the files each writes
const GENERATORS: &[(&str, &[&str])] = &[
    ("PDUMConfig", &["pdum_gen.h", "pdum_gen.c", "pdum_apdu.S"]),
    (
        "OSConfig",
        &[
            "os_gen.h",
            "os_gen.c",
            "os_irq.S",
            "os_irq_alignment.S",
            "os_irq_buserror.S",
            "os_irq_illegalinstruction.S",
            "os_irq_stackoverflowexception.S",
            "os_irq_unimplementedmodule.S",
        ],
    ),
    ("ZPSConfig", &["zps_gen.h", "zps_gen.c"]),
];

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        std::fs::create_dir_all(project.path()).expect("Failed to create project directory");
        project
    }

    /// Get the path to the project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    /// SDK framework root
    pub fn framework_dir(&self) -> PathBuf {
        self.dir.path().join("sdk").join("framework-jennic")
    }

    /// Toolchain root
    pub fn toolchain_dir(&self) -> PathBuf {
        self.dir.path().join("sdk").join("toolchain")
    }

    /// Create a file in the project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a file below the SDK root
    pub fn create_sdk_file(&self, name: &str, content: &str) {
        let path = self.framework_dir().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the project
    pub fn file_exists(&self, name: &str) -> bool {
        self.path().join(name).exists()
    }

    /// Read a file from the project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read file")
    }

    /// Write jennic.toml with the SDK pointing at the fake tree
    ///
    /// `body` holds the `[board]`, `[build]` and `[config]` sections.
    pub fn write_manifest(&self, body: &str) {
        let manifest = format!(
            "[project]\nname = \"light\"\ntarget = \"Light_Node\"\n\n[sdk]\nframework_dir = \"{}\"\ntoolchain_dir = \"{}\"\n\n{body}",
            self.framework_dir().display(),
            self.toolchain_dir().display()
        );
        self.create_file("jennic.toml", &manifest);
    }

    /// Populate the fake SDK: linker scripts, component sources and the
    /// toolchain directory
    pub fn create_sdk(&self) {
        for chip in ["JN5161", "JN5164", "JN5168", "JN5169"] {
            for stack in ["MAC", "ZBPro", "JIP"] {
                self.create_sdk_file(&format!("Chip/{chip}/Build/AppBuild{stack}.ld"), "/* ld */");
            }
            self.create_sdk_file(&format!("Stack/ZLLHA/Build/AppBuildZLLHA_{chip}.ld"), "/* ld */");
        }
        for source in [
            "Components/Utilities/Source/PDM_Wrapper.c",
            "Components/MiniMAC/Source/MiniMac_Shim.c",
            "Components/ZCL/Source/zcl.c",
            "Components/ZCL/Clusters/General/Source/OnOff.c",
            "Components/ZCL/Clusters/Lighting/Source/ColourControl.c",
            "Components/ZCL/Clusters/IAS/Source/IASZone.c",
            "Components/ZCL/Profiles/ZLL/Source/zll_commission.c",
            "Components/ZCL/Profiles/HA/Common/Source/ha.c",
        ] {
            self.create_sdk_file(source, "int x;\n");
        }
        std::fs::create_dir_all(self.toolchain_dir()).expect("Failed to create toolchain dir");
    }

    /// Install shell-script generators that write read-only outputs
    #[cfg(unix)]
    pub fn create_generators(&self) {
        for (tool, outputs) in GENERATORS {
            let script = format!(
                "#!/bin/sh\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n  shift\ndone\nfor f in {}; do\n  rm -f \"$out/$f\"\n  echo \"/* generated */\" > \"$out/$f\"\n  chmod 444 \"$out/$f\"\ndone\necho \"{tool} run\" >> \"$out/../generator.log\"\n",
                outputs.join(" ")
            );
            self.install_generator(tool, &script);
        }
    }

    /// Replace one generator with a script
    #[cfg(unix)]
    pub fn install_generator(&self, tool: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.framework_dir().join(format!("Tools/{tool}/bin/{tool}.exe"));
        std::fs::create_dir_all(path.parent().expect("generator has a parent"))
            .expect("Failed to create tool dir");
        std::fs::write(&path, script).expect("Failed to write generator");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark generator executable");
    }

    /// Run jnbuild in the project directory
    pub fn jnbuild(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_jnbuild"))
            .args(args)
            .current_dir(self.path())
            .env_remove("JNBUILD_MCU")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run jnbuild")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard output as text
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Standard error as text
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// ZLL light on JN5169, coordinator, EEPROM persistence
pub const ZLL_LIGHT: &str = r#"
[board]
mcu = "JN5169"

[build]
stack = "ZLLHA"
mac = "MiniMacShim"
device_type = "ZCR"
pdm = "EEPROM"
features = ["ZLL"]

[config]
zps = "app.zpscfg"
os = "app.oscfgdiag"
"#;

/// Plain MAC application on JN5168
pub const MAC_APP: &str = r#"
[board]
mcu = "JN5168"
"#;
