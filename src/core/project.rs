//! Project manifest (jennic.toml) parsing
//!
//! The manifest carries the board, build options, generator configuration
//! files and SDK locations of a firmware project. String values may
//! reference environment variables using `${VAR}` syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    BUILD_DIR, GENERATED_SUBDIR, MANIFEST_FILE, PROJECT_INCLUDE_DIR, PROJECT_SRC_DIR,
};
use crate::core::chip::CHIP_OPTION;
use crate::error::ProjectError;

/// The project manifest (jennic.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectManifest {
    /// Project configuration
    #[serde(default)]
    pub project: ProjectConfig,

    /// Board configuration
    #[serde(default)]
    pub board: BoardConfig,

    /// Build options, validated by [`crate::core::options`]
    #[serde(default)]
    pub build: HashMap<String, toml::Value>,

    /// Generator configuration files
    #[serde(default)]
    pub config: GeneratorConfig,

    /// SDK locations
    #[serde(default)]
    pub sdk: SdkConfig,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,

    /// Target name handed to the PDUM and ZPS generators
    #[serde(default)]
    pub target: Option<String>,
}

fn default_name() -> String {
    "unnamed".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            target: None,
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    /// Chip part number
    #[serde(default)]
    pub mcu: Option<String>,
}

/// Generator input files, relative to the project source directory
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// ZigBee stack / PDU configuration (`.zpscfg`)
    #[serde(default)]
    pub zps: Option<String>,

    /// OS configuration (`.oscfgdiag`)
    #[serde(default)]
    pub os: Option<String>,
}

/// SDK locations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SdkConfig {
    /// Vendor SDK root
    #[serde(default)]
    pub framework_dir: Option<PathBuf>,

    /// Toolchain root
    #[serde(default)]
    pub toolchain_dir: Option<PathBuf>,

    /// Launcher for the generator executables (e.g. `wine`)
    #[serde(default)]
    pub runner: Option<String>,
}

impl ProjectManifest {
    /// Parse manifest from TOML string, substituting `${VAR}` references
    pub fn from_toml(content: &str) -> Result<Self, ProjectError> {
        let mut value: toml::Value =
            toml::from_str(content).map_err(|e| ProjectError::Parse(e.to_string()))?;
        substitute_in_value(&mut value)?;
        value
            .try_into()
            .map_err(|e: toml::de::Error| ProjectError::Parse(e.to_string()))
    }

    /// Load a manifest from disk
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        if !path.exists() {
            return Err(ProjectError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProjectError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load `jennic.toml` from a project directory
    pub fn load_from_dir(project_dir: &Path) -> Result<Self, ProjectError> {
        Self::load(&project_dir.join(MANIFEST_FILE))
    }

    /// Option values declared by the project, keyed by option name
    ///
    /// `board.mcu` is reported as the `mcu` option; a `mcu` key in `[build]`
    /// takes precedence over it.
    pub fn option_values(&self) -> HashMap<String, toml::Value> {
        let mut values = HashMap::new();
        if let Some(ref mcu) = self.board.mcu {
            values.insert(CHIP_OPTION.to_string(), toml::Value::String(mcu.clone()));
        }
        for (key, value) in &self.build {
            values.insert(key.clone(), value.clone());
        }
        values
    }
}

/// Substitute environment variables in a string
///
/// Unset variables expand to the empty string.
///
/// ```
/// use jennic_build::core::project::substitute_env_vars;
///
/// std::env::set_var("JENNIC_DOC_VAR", "sdk");
/// let result = substitute_env_vars("/opt/${JENNIC_DOC_VAR}/Tools").unwrap();
/// assert_eq!(result, "/opt/sdk/Tools");
/// std::env::remove_var("JENNIC_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, ProjectError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ProjectError::Substitution(format!("Invalid regex: {e}")))?;

    let output = re.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Ok(output.into_owned())
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), ProjectError> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Directories of one project build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
    /// Project root (holds jennic.toml)
    pub project_dir: PathBuf,
    /// Build output directory
    pub build_dir: PathBuf,
}

impl ProjectPaths {
    /// Standard layout below `project_dir`
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            build_dir: project_dir.join(BUILD_DIR),
        }
    }

    /// Directory the code generators write to
    pub fn generated_dir(&self) -> PathBuf {
        self.build_dir.join(GENERATED_SUBDIR)
    }

    /// Project source directory
    pub fn src_dir(&self) -> PathBuf {
        self.project_dir.join(PROJECT_SRC_DIR)
    }

    /// Project include directory
    pub fn include_dir(&self) -> PathBuf {
        self.project_dir.join(PROJECT_INCLUDE_DIR)
    }

    /// Resolve a configuration file reference against the source directory
    pub fn config_file(&self, relative: &str) -> PathBuf {
        self.src_dir().join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"
[project]
name = "light"
target = "Light_NodeJN5169"

[board]
mcu = "JN5169"

[build]
stack = "ZLLHA"
mac = "MiniMacShim"
device_type = "ZCR"
features = ["ZLL"]
debug = false

[config]
zps = "app.zpscfg"
os = "App_ZLL_Light_JN516x.oscfgdiag"

[sdk]
framework_dir = "/opt/jennic/framework-jennic"
runner = "wine"
"#;

    #[test]
    fn test_manifest_parses_all_sections() {
        let manifest = ProjectManifest::from_toml(SAMPLE).unwrap();
        assert_eq!(manifest.project.name, "light");
        assert_eq!(manifest.project.target.as_deref(), Some("Light_NodeJN5169"));
        assert_eq!(manifest.board.mcu.as_deref(), Some("JN5169"));
        assert_eq!(manifest.config.zps.as_deref(), Some("app.zpscfg"));
        assert_eq!(
            manifest.sdk.framework_dir,
            Some(PathBuf::from("/opt/jennic/framework-jennic"))
        );
        assert_eq!(manifest.sdk.runner.as_deref(), Some("wine"));
        assert_eq!(manifest.build.len(), 5);
    }

    #[test]
    fn test_manifest_defaults_when_empty() {
        let manifest = ProjectManifest::from_toml("").unwrap();
        assert_eq!(manifest, ProjectManifest::default());
        assert_eq!(manifest.project.name, "unnamed");
    }

    #[test]
    fn test_option_values_include_board_mcu() {
        let manifest = ProjectManifest::from_toml(SAMPLE).unwrap();
        let values = manifest.option_values();
        assert_eq!(values["mcu"], toml::Value::String("JN5169".to_string()));
        assert_eq!(values["debug"], toml::Value::Boolean(false));
    }

    #[test]
    fn test_build_mcu_overrides_board() {
        let manifest = ProjectManifest::from_toml(
            "[board]\nmcu = \"JN5168\"\n[build]\nmcu = \"JN5164\"\n",
        )
        .unwrap();
        assert_eq!(
            manifest.option_values()["mcu"],
            toml::Value::String("JN5164".to_string())
        );
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        match ProjectManifest::load_from_dir(dir.path()).unwrap_err() {
            ProjectError::NotFound { path } => assert!(path.ends_with("jennic.toml")),
            other => panic!("Expected NotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jennic.toml"), "[board\nmcu = 1").unwrap();
        assert!(matches!(
            ProjectManifest::load_from_dir(dir.path()).unwrap_err(),
            ProjectError::Parse(_)
        ));
    }

    #[test]
    fn test_load_substitutes_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("JENNIC_TEST_SDK_ROOT", "/srv/sdk");
        std::fs::write(
            dir.path().join("jennic.toml"),
            "[sdk]\nframework_dir = \"${JENNIC_TEST_SDK_ROOT}/framework-jennic\"\n",
        )
        .unwrap();
        let manifest = ProjectManifest::load_from_dir(dir.path()).unwrap();
        std::env::remove_var("JENNIC_TEST_SDK_ROOT");
        assert_eq!(
            manifest.sdk.framework_dir,
            Some(PathBuf::from("/srv/sdk/framework-jennic"))
        );
    }

    #[test]
    fn test_unset_variable_expands_to_empty() {
        let out = substitute_env_vars("a${JENNIC_TEST_SURELY_UNSET_VAR}b").unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_project_paths_layout() {
        let paths = ProjectPaths::new(Path::new("/work/light"));
        assert_eq!(paths.build_dir, PathBuf::from("/work/light/build"));
        assert_eq!(paths.generated_dir(), PathBuf::from("/work/light/build/gen"));
        assert_eq!(
            paths.config_file("app.zpscfg"),
            PathBuf::from("/work/light/src/app.zpscfg")
        );
        assert_eq!(paths.include_dir(), PathBuf::from("/work/light/include"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Strings without `${` pass through untouched
        #[test]
        fn prop_plain_strings_unchanged(input in "[A-Za-z0-9_/.: -]{0,40}") {
            prop_assert_eq!(substitute_env_vars(&input).unwrap(), input);
        }
    }
}
