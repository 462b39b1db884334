//! Compiler, assembler and linker configuration
//!
//! [`compose`] turns validated [`BuildOptions`] into a [`CompileConfig`].
//! The mapping is a table of [`Rule`]s; each rule that applies contributes a
//! [`Fragment`] and fragments are merged strictly in table order:
//!
//! 1. `baseline` - warnings, C++ switches, start symbols, board defines
//! 2. `chip-identity` - chip/family/stack/MAC defines
//! 3. `debug` - DBG output
//! 4. `mac-layer` - MAC library set and headers
//! 5. `jennet-ip` - persistence library and security hooks
//! 6. `zigbee` - ZigBee PRO libraries, role variants, generated sources
//! 7. `zll-ha-profile` - cluster library headers and defines
//! 8. `hardware-debug` - JTAG configuration symbol
//! 9. `memory-layout` - stack and heap sizes
//! 10. `utility-components` - shared component headers
//!
//! Merging only ever appends. Include dirs, library dirs, libraries and
//! defines are de-duplicated keeping the first occurrence; flags are kept
//! verbatim.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::config::defaults::DEFAULT_PCB;
use crate::core::chip::resolve_library_name;
use crate::core::options::{BuildOptions, Feature, MacKind, StackKind};
use crate::core::project::ProjectPaths;
use crate::core::sdk::SdkLayout;

/// Preprocessor symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Define {
    /// Symbol name
    pub name: String,
    /// Optional value
    pub value: Option<String>,
}

impl Define {
    /// Symbol without a value
    pub fn symbol(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Symbol with a value
    pub fn valued(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// Compiler flag form (`-DNAME` / `-DNAME=value`)
    pub fn to_flag(&self) -> String {
        format!("-D{self}")
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// What a single rule contributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub cc_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
    pub assembler_mode: Vec<String>,
    pub link_flags: Vec<String>,
    pub defines: Vec<Define>,
    /// Include dirs placed ahead of everything else
    pub leading_include_dirs: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    /// Short library names, resolved against the chip at the end
    pub libraries: Vec<String>,
}

/// Inputs besides the options
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    /// SDK locations
    pub sdk: &'a SdkLayout,
    /// Project directories
    pub paths: &'a ProjectPaths,
}

/// One row of the option-to-configuration table
#[derive(Clone, Copy)]
pub struct Rule {
    /// Rule name, recorded in [`CompileConfig::applied_rules`]
    pub name: &'static str,
    /// Whether the rule applies to the options
    pub applies: fn(&BuildOptions) -> bool,
    /// The rule's contribution
    pub fragment: fn(&BuildOptions, &ComposeContext<'_>) -> Fragment,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The rule table, in merge order
pub const RULES: &[Rule] = &[
    Rule {
        name: "baseline",
        applies: always,
        fragment: baseline,
    },
    Rule {
        name: "chip-identity",
        applies: always,
        fragment: chip_identity,
    },
    Rule {
        name: "debug",
        applies: |o| o.debug,
        fragment: debug_output,
    },
    Rule {
        name: "mac-layer",
        applies: always,
        fragment: mac_layer,
    },
    Rule {
        name: "jennet-ip",
        applies: |o| o.stack == StackKind::Jip,
        fragment: jennet_ip,
    },
    Rule {
        name: "zigbee",
        applies: |o| o.stack.is_zigbee(),
        fragment: zigbee,
    },
    Rule {
        name: "zll-ha-profile",
        applies: |o| o.stack == StackKind::Zllha,
        fragment: zll_ha_profile,
    },
    Rule {
        name: "hardware-debug",
        applies: |o| o.hardware_debug,
        fragment: hardware_debug,
    },
    Rule {
        name: "memory-layout",
        applies: |o| o.stack_size.is_some() || o.heap_size.is_some(),
        fragment: memory_layout,
    },
    Rule {
        name: "utility-components",
        applies: always,
        fragment: utility_components,
    },
];

fn always(_: &BuildOptions) -> bool {
    true
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn baseline(options: &BuildOptions, ctx: &ComposeContext<'_>) -> Fragment {
    let sdk = ctx.sdk;
    let platform = sdk.platform_dir();
    Fragment {
        cc_flags: strings(&["-Wall", "-Wunreachable-code"]),
        cxx_flags: strings(&["-fno-rtti", "-fno-exceptions", "-std=c++11"]),
        assembler_mode: strings(&["-x", "assembler-with-cpp"]),
        link_flags: strings(&[
            "-Wl,--gc-sections",
            "-Wl,-u_AppColdStart",
            "-Wl,-u_AppWarmStart",
            "-nostartfiles",
        ]),
        defines: vec![
            Define::symbol("EMBEDDED"),
            // drivers always run under the RTOS here
            Define::symbol("RTOS"),
            Define::valued("MK_CHANNEL", options.channel),
            Define::symbol("USER_VSR_HANDLER"),
            Define::symbol("WATCHDOG_ENABLED"),
            Define::valued("JENNIC_HW_BBC_RXINCCA", 1),
            Define::valued("JENNIC_HW_BBC_DMA", 1),
            Define::valued("JENNIC_HW_BBC_ISA", 0),
            Define::valued("JENNIC_SW_EXTERNAL_FLASH", 0),
            Define::valued("JN516X_DMA_UART_BACKWARDS_COMPATIBLE_API", 1),
            Define::valued("UART_BACKWARDS_COMPATIBLE_API", 1),
            Define::valued("JENNIC_PCB", DEFAULT_PCB),
            Define::symbol(format!("JENNIC_PCB_{DEFAULT_PCB}")),
        ],
        include_dirs: vec![
            platform.join("Common").join("Include"),
            platform.join("DK4").join("Include"),
            sdk.component_include("Common"),
            sdk.component_include("HardwareApi"),
            sdk.component_include("Aes"),
            sdk.component_include("DBG"),
        ],
        lib_dirs: vec![
            sdk.library_dir(),
            sdk.chip_dir(options.chip).join("Build"),
            platform.join("DK4").join("Library"),
        ],
        libraries: strings(&["Aes", "HardwareApi", "MicroSpecific", "Boot", "Recal", "BoardLib"]),
        ..Fragment::default()
    }
}

fn chip_identity(options: &BuildOptions, _: &ComposeContext<'_>) -> Fragment {
    let chip = options.chip;
    let family = chip.family();
    Fragment {
        defines: vec![
            Define::valued("JENNIC_CHIP", chip),
            Define::symbol(format!("JENNIC_CHIP_{chip}")),
            Define::valued("JENNIC_CHIP_FAMILY", family),
            Define::symbol(format!("JENNIC_CHIP_FAMILY_{family}")),
            Define::symbol(format!("JENNIC_STACK_{}", options.stack)),
            Define::symbol(format!("JENNIC_MAC_{}", options.mac)),
            Define::valued(family.as_str(), family.id()),
            Define::valued(chip.as_str(), chip.id()),
            Define::valued("JENNIC_CHIP_NAME", format!("_{chip}")),
            Define::valued("JENNIC_CHIP_FAMILY_NAME", format!("_{family}")),
        ],
        ..Fragment::default()
    }
}

fn debug_output(_: &BuildOptions, _: &ComposeContext<'_>) -> Fragment {
    Fragment {
        defines: vec![Define::symbol("DBG_ENABLE")],
        libraries: strings(&["DBG"]),
        ..Fragment::default()
    }
}

fn mac_layer(options: &BuildOptions, ctx: &ComposeContext<'_>) -> Fragment {
    let sdk = ctx.sdk;
    let mut fragment = Fragment::default();

    match options.mac {
        MacKind::Mac => {
            let suffix = if options.stack.is_zigbee() {
                fragment.defines.push(Define::symbol("REDUCED_ZIGBEE_MAC_BUILD"));
                "_ZIGBEE"
            } else {
                ""
            };
            fragment.libraries = vec![
                format!("AppApi{suffix}"),
                format!("MAC{suffix}"),
                "TimerServer".to_string(),
                "TOF".to_string(),
                "Xcv".to_string(),
            ];
        }
        MacKind::MiniMac | MacKind::MiniMacShim => {
            fragment.libraries = strings(&["MiniMac", "MiniMacShim", "MMAC"]);
        }
    }

    if matches!(options.mac, MacKind::Mac | MacKind::MiniMacShim) {
        fragment.include_dirs.push(sdk.component_include("AppApi"));
        fragment.include_dirs.push(sdk.component_include("MAC"));
    }
    if options.mac.is_reduced() {
        fragment.include_dirs.push(sdk.component_include("MiniMac"));
        fragment.include_dirs.push(sdk.component_include("MMAC"));
    }
    fragment
}

fn jennet_ip(options: &BuildOptions, _: &ComposeContext<'_>) -> Fragment {
    Fragment {
        link_flags: strings(&[
            "-Wl,-ueSecurityTxPrepare",
            "-Wl,-ueSecurityTxEncrypt",
            "-Wl,-ubSecurityRxProcess",
        ]),
        libraries: options.pdm.pdm_name().into_iter().collect(),
        ..Fragment::default()
    }
}

/// ZigBee PRO application libraries for the options, in link order
pub fn zigbee_libraries(options: &BuildOptions) -> Vec<String> {
    let mut libs = strings(&["OS", "PWRM", "ZPSTSV", "AES_SW", "PDUM", "ZPSAPL", "Random"]);
    libs.extend(options.pdm.pdm_name());

    if let Some(role) = options.role {
        let suffix = role.library_suffix();
        libs.push(format!("ZPSNWK{suffix}"));
        libs.push(format!("ZPSZLL{suffix}"));
        if options.has_feature(Feature::GreenPower) {
            libs.push(format!("ZPSGP{suffix}"));
        }
    }

    libs.push(match options.mac {
        MacKind::Mac => "ZPSMAC".to_string(),
        MacKind::MiniMac | MacKind::MiniMacShim => "ZPSMAC_Mini".to_string(),
    });
    libs
}

fn zigbee(options: &BuildOptions, ctx: &ComposeContext<'_>) -> Fragment {
    let sdk = ctx.sdk;
    let libraries = zigbee_libraries(options);

    let mut include_dirs: Vec<PathBuf> = [
        "MAC",
        "MicroSpecific",
        "MiniMAC",
        "MMAC",
        "TimerServer",
        "PDM",
        "ZPSMAC",
        "ZPSNWK",
    ]
    .iter()
    .map(|c| sdk.component_include(c))
    .collect();
    include_dirs.extend(
        libraries
            .iter()
            .map(|lib| sdk.component_include(lib.trim_end_matches("_ZED"))),
    );

    let mut defines: Vec<Define> = options.pdm.pdm_name().map(Define::symbol).into_iter().collect();
    defines.push(Define::symbol("PDM_USER_SUPPLIED_ID"));

    Fragment {
        defines,
        leading_include_dirs: vec![
            ctx.paths.generated_dir(),
            ctx.paths.include_dir().join("Common").join("Source"),
        ],
        include_dirs,
        libraries,
        ..Fragment::default()
    }
}

/// Extra headers a cluster family needs
fn feature_include_dirs(feature: Feature, sdk: &SdkLayout) -> Vec<PathBuf> {
    let zcl = sdk.zcl_dir();
    let ha_profile = zcl.join("Profiles").join("HA");
    match feature {
        Feature::Zll => vec![
            zcl.join("Clusters").join("LightLink").join("Include"),
            zcl.join("Profiles").join("ZLL").join("Include"),
        ],
        Feature::HaLighting => vec![ha_profile.join("Lighting").join("Include")],
        Feature::EnergyAtHome => vec![ha_profile.join("EnergyAtHome").join("Include")],
        Feature::Hvac => vec![ha_profile.join("HVAC").join("Include")],
        Feature::Ias => vec![ha_profile.join("IAS").join("Include")],
        // covered by the common cluster headers
        Feature::Ha | Feature::GreenPower | Feature::MeasurementAndSensing => Vec::new(),
    }
}

fn zll_ha_profile(options: &BuildOptions, ctx: &ComposeContext<'_>) -> Fragment {
    let sdk = ctx.sdk;
    let zcl = sdk.zcl_dir();
    let clusters = zcl.join("Clusters");
    let profiles = zcl.join("Profiles");

    let mut include_dirs = vec![
        zcl.join("Source"),
        zcl.join("Include"),
        clusters.join("General").join("Include"),
        clusters.join("General").join("Source"),
    ];
    include_dirs.extend(
        [
            "Lighting",
            "MeasurementAndSensing",
            "EnergyAtHome",
            "SE",
            "GreenPower",
            "HVAC",
            "OTA",
            "SmartEnergy",
            "IAS",
        ]
        .iter()
        .map(|family| clusters.join(family).join("Include")),
    );
    include_dirs.extend(
        ["Common", "Generic", "GP"]
            .iter()
            .map(|part| profiles.join("HA").join(part).join("Include")),
    );
    for feature in &options.features {
        include_dirs.extend(feature_include_dirs(*feature, sdk));
    }

    Fragment {
        defines: vec![
            Define::symbol("ZPS_APL_OPT_SINGLE_INSTANCE"),
            Define::symbol("OTA_NO_CERTIFICATE"),
            Define::symbol("PLME_SAP"),
        ],
        include_dirs,
        lib_dirs: vec![
            zcl.join("Build"),
            sdk.stack_dir().join("ZBPro").join("Build"),
            sdk.stack_dir().join("ZLLHA").join("Build"),
        ],
        ..Fragment::default()
    }
}

fn hardware_debug(_: &BuildOptions, _: &ComposeContext<'_>) -> Fragment {
    // JN516x initialises JTAG in the bootloader, no extra library needed
    Fragment {
        link_flags: strings(&["-Wl,--defsym,g_bSWConf_Debug=1"]),
        ..Fragment::default()
    }
}

fn memory_layout(options: &BuildOptions, _: &ComposeContext<'_>) -> Fragment {
    let mut link_flags = Vec::new();
    if let Some(size) = options.stack_size {
        link_flags.push(format!("-Wl,--defsym=__stack_size={size}"));
    }
    if let Some(size) = options.heap_size {
        link_flags.push(format!("-Wl,--defsym,__minimum_heap_size={size}"));
    }
    Fragment {
        link_flags,
        ..Fragment::default()
    }
}

fn utility_components(_: &BuildOptions, ctx: &ComposeContext<'_>) -> Fragment {
    let sdk = ctx.sdk;
    Fragment {
        include_dirs: vec![
            sdk.component_include("Utilities"),
            sdk.component_include("ZCL"),
            sdk.zcl_dir().join("Clusters").join("LightLink").join("Include"),
            sdk.component_include("Xcv"),
            sdk.component_include("Recal"),
            sdk.component_include("OVLY"),
            sdk.component_include("MicroSpecific"),
        ],
        ..Fragment::default()
    }
}

/// Fully composed configuration for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileConfig {
    /// C compiler flags (also used for C++)
    pub cc_flags: Vec<String>,
    /// C++-only flags
    pub cxx_flags: Vec<String>,
    /// Assembler flags, a verbatim copy of `cc_flags`
    pub as_flags: Vec<String>,
    /// Switch putting the compiler driver in preprocessed-assembly mode
    pub assembler_mode: Vec<String>,
    /// Linker flags
    pub link_flags: Vec<String>,
    /// Preprocessor definitions
    pub defines: Vec<Define>,
    /// Header search path
    pub include_dirs: Vec<PathBuf>,
    /// Library search path
    pub lib_dirs: Vec<PathBuf>,
    /// Vendor libraries by short name
    pub libraries: Vec<String>,
    /// Vendor libraries by on-disk name
    pub resolved_libraries: Vec<String>,
    /// Rules that contributed, in order
    pub applied_rules: Vec<&'static str>,
}

impl CompileConfig {
    /// `-D` flags for every define
    pub fn define_flags(&self) -> Vec<String> {
        self.defines.iter().map(Define::to_flag).collect()
    }

    /// `-I` flags for every include dir
    pub fn include_flags(&self) -> Vec<String> {
        self.include_dirs
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect()
    }

    /// Full flag list for assembling `.S` files
    pub fn assembler_command_flags(&self) -> Vec<String> {
        self.assembler_mode
            .iter()
            .chain(&self.as_flags)
            .cloned()
            .collect()
    }
}

/// Accumulates fragments for a single build invocation
#[derive(Debug, Default)]
pub struct CompileConfigBuilder {
    fragment: Fragment,
    applied: Vec<&'static str>,
}

fn push_unique<T: PartialEq>(target: &mut Vec<T>, items: Vec<T>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

impl CompileConfigBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a rule's fragment
    pub fn apply(&mut self, rule: &'static str, fragment: Fragment) -> &mut Self {
        let acc = &mut self.fragment;
        acc.cc_flags.extend(fragment.cc_flags);
        acc.cxx_flags.extend(fragment.cxx_flags);
        acc.assembler_mode.extend(fragment.assembler_mode);
        acc.link_flags.extend(fragment.link_flags);
        push_unique(&mut acc.defines, fragment.defines);
        push_unique(&mut acc.leading_include_dirs, fragment.leading_include_dirs);
        push_unique(&mut acc.include_dirs, fragment.include_dirs);
        push_unique(&mut acc.lib_dirs, fragment.lib_dirs);
        push_unique(&mut acc.libraries, fragment.libraries);
        self.applied.push(rule);
        self
    }

    /// Produce the final configuration, resolving library names for `options.chip`
    pub fn finish(self, options: &BuildOptions) -> CompileConfig {
        let Fragment {
            cc_flags,
            cxx_flags,
            assembler_mode,
            link_flags,
            defines,
            leading_include_dirs,
            include_dirs,
            lib_dirs,
            libraries,
        } = self.fragment;

        let mut all_includes = leading_include_dirs;
        push_unique(&mut all_includes, include_dirs);

        let resolved_libraries = libraries
            .iter()
            .map(|lib| resolve_library_name(options.chip, lib))
            .collect();

        CompileConfig {
            as_flags: cc_flags.clone(),
            cc_flags,
            cxx_flags,
            assembler_mode,
            link_flags,
            defines,
            include_dirs: all_includes,
            lib_dirs,
            libraries,
            resolved_libraries,
            applied_rules: self.applied,
        }
    }
}

/// Compose the configuration for validated options
pub fn compose(options: &BuildOptions, ctx: &ComposeContext<'_>) -> CompileConfig {
    let mut builder = CompileConfigBuilder::new();
    for rule in RULES {
        if (rule.applies)(options) {
            builder.apply(rule.name, (rule.fragment)(options, ctx));
        }
    }
    let config = builder.finish(options);
    tracing::debug!(
        "Composed {} defines, {} include dirs, {} libraries via rules {:?}",
        config.defines.len(),
        config.include_dirs.len(),
        config.libraries.len(),
        config.applied_rules
    );
    config
}
