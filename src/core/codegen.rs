//! Code generator planning and execution
//!
//! ZigBee stacks need glue code produced by three vendor executables. Each
//! generator reads one project configuration file and writes a fixed set of
//! files into the generated-source directory. A generator runs only when its
//! outputs are missing or older than its input, unless forced.
//!
//! The actual process invocation sits behind [`GeneratorTool`] so the
//! planning and freshness logic can run against a fake.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::chip::{resolve_library_name, Chip};
use crate::core::options::{BuildOptions, DeviceRole};
use crate::core::project::{ProjectManifest, ProjectPaths};
use crate::core::sdk::SdkLayout;
use crate::error::{OptionError, ToolError};

/// The three vendor generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeneratorKind {
    /// Packet data unit manager configuration
    PduManager,
    /// RTOS configuration
    OsConfig,
    /// ZigBee PRO stack configuration
    ZigbeeStack,
}

impl GeneratorKind {
    /// Generators in execution order
    pub const ALL: [GeneratorKind; 3] = [
        GeneratorKind::PduManager,
        GeneratorKind::OsConfig,
        GeneratorKind::ZigbeeStack,
    ];

    /// Tool name as shipped in the SDK
    pub fn tool_name(self) -> &'static str {
        match self {
            GeneratorKind::PduManager => "PDUMConfig",
            GeneratorKind::OsConfig => "OSConfig",
            GeneratorKind::ZigbeeStack => "ZPSConfig",
        }
    }

    /// Path of the executable below the SDK
    pub fn executable(self, sdk: &SdkLayout) -> PathBuf {
        let tool = self.tool_name();
        sdk.tool_dir()
            .join(tool)
            .join("bin")
            .join(format!("{tool}.exe"))
    }

    /// File names the generator writes
    pub fn output_files(self) -> &'static [&'static str] {
        match self {
            GeneratorKind::PduManager => &["pdum_gen.h", "pdum_gen.c", "pdum_apdu.S"],
            GeneratorKind::OsConfig => &[
                "os_gen.h",
                "os_gen.c",
                "os_irq.S",
                "os_irq_alignment.S",
                "os_irq_buserror.S",
                "os_irq_illegalinstruction.S",
                "os_irq_stackoverflowexception.S",
                "os_irq_unimplementedmodule.S",
            ],
            GeneratorKind::ZigbeeStack => &["zps_gen.h", "zps_gen.c"],
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

/// One planned generator invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorRequest {
    /// Which generator
    pub kind: GeneratorKind,
    /// Executable to run
    pub executable: PathBuf,
    /// Project configuration input
    pub config_file: PathBuf,
    /// Directory the outputs land in
    pub output_dir: PathBuf,
    /// Complete argument list
    pub args: Vec<String>,
    /// Files the generator must produce
    pub outputs: Vec<PathBuf>,
}

impl GeneratorRequest {
    /// Outputs that get compiled into the generated-source library
    pub fn sources(&self) -> impl Iterator<Item = &PathBuf> {
        self.outputs
            .iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "c" || ext == "S"))
    }
}

/// Invokes a generator and reports the files it produced
pub trait GeneratorTool {
    /// Run the generator described by `request`
    fn invoke(&self, request: &GeneratorRequest) -> Result<Vec<PathBuf>, ToolError>;
}

fn required<'a>(value: Option<&'a str>, name: &str, options: &BuildOptions) -> Result<&'a str, OptionError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| OptionError::Missing {
        name: name.to_string(),
        reason: format!("stack '{}' runs the code generators", options.stack),
    })
}

/// Network and application layer archives handed to the stack generator
pub fn stack_layer_archives(role: DeviceRole, chip: Chip, sdk: &SdkLayout) -> (PathBuf, PathBuf) {
    let suffix = role.library_suffix();
    let archive = |layer: &str| {
        sdk.library_archive(&resolve_library_name(chip, &format!("{layer}{suffix}")))
    };
    (archive("ZPSNWK"), archive("ZPSAPL"))
}

/// Plan the generator runs for a build
///
/// Non-ZigBee stacks need no generated code and get an empty plan.
pub fn plan_generators(
    options: &BuildOptions,
    manifest: &ProjectManifest,
    sdk: &SdkLayout,
    paths: &ProjectPaths,
) -> Result<Vec<GeneratorRequest>, OptionError> {
    if !options.stack.is_zigbee() {
        return Ok(Vec::new());
    }

    let target = required(manifest.project.target.as_deref(), "project.target", options)?;
    let zps_config = paths.config_file(required(manifest.config.zps.as_deref(), "config.zps", options)?);
    let os_config = paths.config_file(required(manifest.config.os.as_deref(), "config.os", options)?);
    let role = options.role.ok_or_else(|| OptionError::Missing {
        name: "device_type".to_string(),
        reason: "the stack generator links against role-specific libraries".to_string(),
    })?;

    let out_dir = paths.generated_dir();
    let out = out_dir.display().to_string();
    let chip = options.chip.as_str().to_string();

    let requests = GeneratorKind::ALL
        .iter()
        .map(|&kind| {
            let (config_file, args) = match kind {
                GeneratorKind::PduManager => (
                    zps_config.clone(),
                    vec![
                        "-z".to_string(),
                        target.to_string(),
                        "-f".to_string(),
                        zps_config.display().to_string(),
                        "-o".to_string(),
                        out.clone(),
                    ],
                ),
                GeneratorKind::OsConfig => (
                    os_config.clone(),
                    vec![
                        "-f".to_string(),
                        os_config.display().to_string(),
                        "-o".to_string(),
                        out.clone(),
                        "-v".to_string(),
                        chip.clone(),
                    ],
                ),
                GeneratorKind::ZigbeeStack => {
                    let (nwk, apl) = stack_layer_archives(role, options.chip, sdk);
                    (
                        zps_config.clone(),
                        vec![
                            "-n".to_string(),
                            target.to_string(),
                            "-t".to_string(),
                            chip.clone(),
                            "-l".to_string(),
                            nwk.display().to_string(),
                            "-a".to_string(),
                            apl.display().to_string(),
                            "-c".to_string(),
                            sdk.toolchain_dir.display().to_string(),
                            "-f".to_string(),
                            zps_config.display().to_string(),
                            "-o".to_string(),
                            out.clone(),
                        ],
                    )
                }
            };
            GeneratorRequest {
                kind,
                executable: kind.executable(sdk),
                config_file,
                output_dir: out_dir.clone(),
                args,
                outputs: kind.output_files().iter().map(|f| out_dir.join(f)).collect(),
            }
        })
        .collect();
    Ok(requests)
}

/// Generated sources of all requests, in plan order
pub fn generated_sources(requests: &[GeneratorRequest]) -> Vec<PathBuf> {
    requests.iter().flat_map(|r| r.sources().cloned()).collect()
}

/// Freshness of one generator's outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// No output exists yet
    NotRun,
    /// Some output missing or older than the input
    Stale,
    /// All outputs present and newer than the input
    Fresh,
}

impl Freshness {
    /// Decide freshness from modification times
    ///
    /// `None` marks a file that does not exist. A missing input never counts
    /// as fresh; existing outputs cannot have been produced from it.
    pub fn from_times(input: Option<SystemTime>, outputs: &[Option<SystemTime>]) -> Self {
        if outputs.iter().all(Option::is_none) {
            return Freshness::NotRun;
        }
        let Some(oldest) = outputs.iter().copied().collect::<Option<Vec<_>>>().and_then(|t| t.into_iter().min()) else {
            return Freshness::Stale;
        };
        match input {
            Some(input) if input <= oldest => Freshness::Fresh,
            _ => Freshness::Stale,
        }
    }

    /// Whether the generator must run
    pub fn needs_run(self) -> bool {
        self != Freshness::Fresh
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Freshness::NotRun => "not run",
            Freshness::Stale => "stale",
            Freshness::Fresh => "fresh",
        })
    }
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorOutcome {
    /// Which generator
    pub kind: GeneratorKind,
    /// Freshness before running
    pub freshness: Freshness,
    /// Whether the generator was invoked
    pub ran: bool,
    /// Files reported by the generator (empty when skipped)
    pub produced: Vec<PathBuf>,
}

/// Freshness of a request, using `mtime` to read modification times
pub fn request_freshness(request: &GeneratorRequest, mtime: impl Fn(&Path) -> Option<SystemTime>) -> Freshness {
    let outputs: Vec<_> = request.outputs.iter().map(|p| mtime(p)).collect();
    Freshness::from_times(mtime(&request.config_file), &outputs)
}

/// Run every non-fresh request in order, stopping at the first failure
pub fn run_generators(
    requests: &[GeneratorRequest],
    tool: &dyn GeneratorTool,
    force: bool,
    mtime: impl Fn(&Path) -> Option<SystemTime>,
) -> Result<Vec<GeneratorOutcome>, ToolError> {
    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        let freshness = request_freshness(request, &mtime);
        if !force && !freshness.needs_run() {
            tracing::debug!("{} outputs are fresh, skipping", request.kind);
            outcomes.push(GeneratorOutcome {
                kind: request.kind,
                freshness,
                ran: false,
                produced: Vec::new(),
            });
            continue;
        }

        tracing::info!("Running {} ({freshness})", request.kind);
        let produced = tool.invoke(request)?;
        outcomes.push(GeneratorOutcome {
            kind: request.kind,
            freshness,
            ran: true,
            produced,
        });
    }
    Ok(outcomes)
}
