//! Default configuration values

/// Project manifest file name
pub const MANIFEST_FILE: &str = "jennic.toml";

/// Build output directory, relative to the project
pub const BUILD_DIR: &str = "build";

/// Generated sources directory, relative to the build directory
pub const GENERATED_SUBDIR: &str = "gen";

/// Project source directory the generator configuration files live in
pub const PROJECT_SRC_DIR: &str = "src";

/// Project include directory
pub const PROJECT_INCLUDE_DIR: &str = "include";

/// Resolved plan written by `configure`
pub const PLAN_JSON_FILE: &str = "jennic-build.json";

/// Make fragment written by `configure`
pub const PLAN_MAKE_FILE: &str = "jennic-build.mk";

/// SDK package directory names
pub const FRAMEWORK_PACKAGE: &str = "framework-jennic";
pub const TOOLCHAIN_PACKAGE: &str = "toolchain-nxp-beyondstudio";

/// Default stack size for ZigBee stacks (bytes)
pub const ZIGBEE_STACK_SIZE: i64 = 5000;

/// Default minimum heap size for ZigBee stacks (bytes)
pub const ZIGBEE_MINIMUM_HEAP_SIZE: i64 = 2000;

/// Default radio channel (0 lets the stack pick)
pub const DEFAULT_CHANNEL: i64 = 0;

/// Highest IEEE 802.15.4 2.4GHz channel
pub const MAX_CHANNEL: i64 = 26;

/// Development board the platform headers are taken from
pub const DEFAULT_PCB: &str = "DEVKIT4";
