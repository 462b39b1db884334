//! Build option resolution and validation
//!
//! Reads the chip identifier and project build options, applies defaults and
//! validates every value against its allow-list.
//! Value priority: CLI > Project (jennic.toml) > Default.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::config::defaults::{
    DEFAULT_CHANNEL, MAX_CHANNEL, ZIGBEE_MINIMUM_HEAP_SIZE, ZIGBEE_STACK_SIZE,
};
use crate::core::chip::{Chip, CHIP_OPTION};
use crate::error::OptionError;

/// An option whose value is one of a fixed set of names
pub trait OptionChoice: Sized + Copy + 'static {
    /// Option key
    const NAME: &'static str;
    /// Every allowed value
    const ALL: &'static [Self];

    /// Value as written in configuration
    fn as_str(self) -> &'static str;

    /// Allowed values, for error messages
    fn choices() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }

    /// Parse a configured value
    fn parse_choice(value: &str) -> Result<Self, OptionError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| OptionError::InvalidChoice {
                name: Self::NAME.to_string(),
                value: value.to_string(),
                choices: Self::choices(),
            })
    }
}

macro_rules! choice_display {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Protocol stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackKind {
    /// Bare IEEE 802.15.4 MAC
    #[serde(rename = "MAC")]
    Mac,
    /// ZigBee PRO
    #[serde(rename = "ZBPro")]
    ZbPro,
    /// JenNet-IP
    #[serde(rename = "JIP")]
    Jip,
    /// ZigBee Light Link + Home Automation
    #[serde(rename = "ZLLHA")]
    Zllha,
}

impl StackKind {
    /// Whether the stack is built on the ZigBee PRO libraries and generators
    pub fn is_zigbee(self) -> bool {
        matches!(self, StackKind::ZbPro | StackKind::Zllha)
    }
}

impl OptionChoice for StackKind {
    const NAME: &'static str = "stack";
    const ALL: &'static [Self] = &[
        StackKind::Mac,
        StackKind::ZbPro,
        StackKind::Jip,
        StackKind::Zllha,
    ];

    fn as_str(self) -> &'static str {
        match self {
            StackKind::Mac => "MAC",
            StackKind::ZbPro => "ZBPro",
            StackKind::Jip => "JIP",
            StackKind::Zllha => "ZLLHA",
        }
    }
}
choice_display!(StackKind);

impl OptionChoice for Chip {
    const NAME: &'static str = CHIP_OPTION;
    const ALL: &'static [Self] = &Chip::ALL;

    fn as_str(self) -> &'static str {
        Chip::as_str(self)
    }
}

/// MAC layer implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MacKind {
    /// Full MAC
    #[serde(rename = "MAC")]
    Mac,
    /// Size-reduced MAC
    #[serde(rename = "MiniMac")]
    MiniMac,
    /// Size-reduced MAC with the compatibility shim to the full MAC API
    #[serde(rename = "MiniMacShim")]
    MiniMacShim,
}

impl MacKind {
    /// Whether this is one of the size-reduced variants
    pub fn is_reduced(self) -> bool {
        matches!(self, MacKind::MiniMac | MacKind::MiniMacShim)
    }
}

impl OptionChoice for MacKind {
    const NAME: &'static str = "mac";
    const ALL: &'static [Self] = &[MacKind::Mac, MacKind::MiniMac, MacKind::MiniMacShim];

    fn as_str(self) -> &'static str {
        match self {
            MacKind::Mac => "MAC",
            MacKind::MiniMac => "MiniMac",
            MacKind::MiniMacShim => "MiniMacShim",
        }
    }
}
choice_display!(MacKind);

/// ZigBee device role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceRole {
    /// Coordinator or router
    #[serde(rename = "ZCR")]
    Coordinator,
    /// End device
    #[serde(rename = "ZED")]
    EndDevice,
}

impl DeviceRole {
    /// Suffix of the role-specific stack libraries
    pub fn library_suffix(self) -> &'static str {
        match self {
            DeviceRole::Coordinator => "",
            DeviceRole::EndDevice => "_ZED",
        }
    }
}

impl OptionChoice for DeviceRole {
    const NAME: &'static str = "device_type";
    const ALL: &'static [Self] = &[DeviceRole::Coordinator, DeviceRole::EndDevice];

    fn as_str(self) -> &'static str {
        match self {
            DeviceRole::Coordinator => "ZCR",
            DeviceRole::EndDevice => "ZED",
        }
    }
}
choice_display!(DeviceRole);

/// Persistent data manager backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PdmBackend {
    #[serde(rename = "EEPROM")]
    Eeprom,
    #[serde(rename = "EXTERNAL_FLASH")]
    ExternalFlash,
    #[serde(rename = "NONE")]
    None,
}

impl PdmBackend {
    /// `PDM_<backend>` name used for the define and library, if any
    pub fn pdm_name(self) -> Option<String> {
        match self {
            PdmBackend::Eeprom | PdmBackend::ExternalFlash => Some(format!("PDM_{}", self.as_str())),
            PdmBackend::None => None,
        }
    }
}

impl OptionChoice for PdmBackend {
    const NAME: &'static str = "pdm";
    const ALL: &'static [Self] = &[PdmBackend::Eeprom, PdmBackend::ExternalFlash, PdmBackend::None];

    fn as_str(self) -> &'static str {
        match self {
            PdmBackend::Eeprom => "EEPROM",
            PdmBackend::ExternalFlash => "EXTERNAL_FLASH",
            PdmBackend::None => "NONE",
        }
    }
}
choice_display!(PdmBackend);

/// Cluster-family tags of the ZLL+HA profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Feature {
    /// ZigBee Light Link
    #[serde(rename = "ZLL")]
    Zll,
    /// Home Automation profile
    #[serde(rename = "HA")]
    Ha,
    /// HA lighting clusters
    #[serde(rename = "HA_LIGHTING")]
    HaLighting,
    /// Energy at home
    #[serde(rename = "EAH")]
    EnergyAtHome,
    /// Green power
    #[serde(rename = "GP")]
    GreenPower,
    /// Heating, ventilation and air conditioning
    #[serde(rename = "HVAC")]
    Hvac,
    /// Intruder alarm system
    #[serde(rename = "IAS")]
    Ias,
    /// Measurement and sensing
    #[serde(rename = "MS")]
    MeasurementAndSensing,
}

impl OptionChoice for Feature {
    const NAME: &'static str = "features";
    const ALL: &'static [Self] = &[
        Feature::Zll,
        Feature::Ha,
        Feature::HaLighting,
        Feature::EnergyAtHome,
        Feature::GreenPower,
        Feature::Hvac,
        Feature::Ias,
        Feature::MeasurementAndSensing,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Feature::Zll => "ZLL",
            Feature::Ha => "HA",
            Feature::HaLighting => "HA_LIGHTING",
            Feature::EnergyAtHome => "EAH",
            Feature::GreenPower => "GP",
            Feature::Hvac => "HVAC",
            Feature::Ias => "IAS",
            Feature::MeasurementAndSensing => "MS",
        }
    }
}
choice_display!(Feature);

/// Value type of an option
#[derive(Debug, Clone, Copy)]
pub enum OptionKind {
    /// One of a fixed set of strings
    Choice(fn() -> Vec<String>),
    /// Comma-separated string or array, each element from a fixed set
    List(fn() -> Vec<String>),
    /// Boolean flag
    Bool,
    /// Integer in an inclusive range
    Integer { min: i64, max: i64 },
}

/// Built-in default of an option
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
    Int(i64),
}

impl DefaultValue {
    fn to_value(self) -> toml::Value {
        match self {
            DefaultValue::Str(s) => toml::Value::String(s.to_string()),
            DefaultValue::Bool(b) => toml::Value::Boolean(b),
            DefaultValue::Int(i) => toml::Value::Integer(i),
        }
    }
}

/// Definition of one recognised option
#[derive(Debug, Clone, Copy)]
pub struct OptionDefinition {
    /// Option key
    pub name: &'static str,
    /// Value type and allow-list
    pub kind: OptionKind,
    /// Built-in default
    pub default: Option<DefaultValue>,
    /// Human-readable description
    pub description: &'static str,
}

/// Every option the reader understands, in reporting order
pub const OPTION_DEFINITIONS: &[OptionDefinition] = &[
    OptionDefinition {
        name: CHIP_OPTION,
        kind: OptionKind::Choice(Chip::choices),
        default: None,
        description: "Chip part number",
    },
    OptionDefinition {
        name: StackKind::NAME,
        kind: OptionKind::Choice(StackKind::choices),
        default: Some(DefaultValue::Str("MAC")),
        description: "Protocol stack",
    },
    OptionDefinition {
        name: MacKind::NAME,
        kind: OptionKind::Choice(MacKind::choices),
        default: Some(DefaultValue::Str("MAC")),
        description: "MAC layer implementation",
    },
    OptionDefinition {
        name: DeviceRole::NAME,
        kind: OptionKind::Choice(DeviceRole::choices),
        default: None,
        description: "ZigBee device role",
    },
    OptionDefinition {
        name: PdmBackend::NAME,
        kind: OptionKind::Choice(PdmBackend::choices),
        default: Some(DefaultValue::Str("EEPROM")),
        description: "Persistent data manager backend",
    },
    OptionDefinition {
        name: Feature::NAME,
        kind: OptionKind::List(Feature::choices),
        default: None,
        description: "Enabled cluster families",
    },
    OptionDefinition {
        name: "debug",
        kind: OptionKind::Bool,
        default: Some(DefaultValue::Bool(true)),
        description: "Enable DBG output",
    },
    OptionDefinition {
        name: "hardware_debug",
        kind: OptionKind::Bool,
        default: Some(DefaultValue::Bool(false)),
        description: "Enable JTAG hardware debugging",
    },
    OptionDefinition {
        name: "channel",
        kind: OptionKind::Integer {
            min: 0,
            max: MAX_CHANNEL,
        },
        default: Some(DefaultValue::Int(DEFAULT_CHANNEL)),
        description: "Radio channel (0 for automatic)",
    },
    OptionDefinition {
        name: "stack_size",
        kind: OptionKind::Integer {
            min: 1,
            max: i32::MAX as i64,
        },
        default: None,
        description: "Stack size in bytes",
    },
    OptionDefinition {
        name: "heap_size",
        kind: OptionKind::Integer {
            min: 1,
            max: i32::MAX as i64,
        },
        default: None,
        description: "Minimum heap size in bytes",
    },
];

/// Look up an option definition by key
pub fn find_definition(name: &str) -> Option<&'static OptionDefinition> {
    OPTION_DEFINITIONS.iter().find(|d| d.name == name)
}

/// Option value source for resolution priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    /// Value from CLI argument (highest priority)
    Cli,
    /// Value from the project manifest
    Project,
    /// Default value from option definition, or derived from other options
    Default,
    /// No value anywhere
    Unset,
}

impl fmt::Display for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionSource::Cli => "cli",
            OptionSource::Project => "project",
            OptionSource::Default => "default",
            OptionSource::Unset => "unset",
        };
        f.write_str(s)
    }
}

/// Resolved option value with its source
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    /// The resolved value
    pub value: Option<toml::Value>,
    /// Where the value came from
    pub source: OptionSource,
}

/// Resolve an option value with priority: CLI > Project > Default
pub fn resolve_option_value(
    definition: &OptionDefinition,
    cli_value: Option<&toml::Value>,
    project_value: Option<&toml::Value>,
) -> ResolvedOption {
    if let Some(value) = cli_value {
        ResolvedOption {
            value: Some(value.clone()),
            source: OptionSource::Cli,
        }
    } else if let Some(value) = project_value {
        ResolvedOption {
            value: Some(value.clone()),
            source: OptionSource::Project,
        }
    } else if let Some(default) = definition.default {
        ResolvedOption {
            value: Some(default.to_value()),
            source: OptionSource::Default,
        }
    } else {
        ResolvedOption {
            value: None,
            source: OptionSource::Unset,
        }
    }
}

/// All recognised options resolved, keyed by name
pub type ResolvedOptions = BTreeMap<&'static str, ResolvedOption>;

/// Resolve all options, rejecting keys that are not recognised
pub fn resolve_all_options(
    cli_values: &HashMap<String, toml::Value>,
    project_values: &HashMap<String, toml::Value>,
) -> Result<ResolvedOptions, OptionError> {
    let mut unknown: Vec<&String> = cli_values
        .keys()
        .chain(project_values.keys())
        .filter(|name| find_definition(name).is_none())
        .collect();
    unknown.sort();
    if let Some(name) = unknown.first() {
        return Err(OptionError::Unknown {
            name: (*name).clone(),
        });
    }

    Ok(OPTION_DEFINITIONS
        .iter()
        .map(|def| {
            let resolved =
                resolve_option_value(def, cli_values.get(def.name), project_values.get(def.name));
            (def.name, resolved)
        })
        .collect())
}

/// Validate an option value against its definition
pub fn validate_option(definition: &OptionDefinition, value: &toml::Value) -> Result<(), OptionError> {
    let name = definition.name;
    match definition.kind {
        OptionKind::Choice(choices) => validate_choice(name, value, &choices()),
        OptionKind::List(choices) => parse_list(name, value, &choices()).map(|_| ()),
        OptionKind::Bool => validate_bool(name, value),
        OptionKind::Integer { min, max } => validate_integer(name, value, min, max).map(|_| ()),
    }
}

fn validate_bool(name: &str, value: &toml::Value) -> Result<(), OptionError> {
    if value.is_bool() {
        Ok(())
    } else {
        Err(OptionError::InvalidType {
            name: name.to_string(),
            expected: "boolean".to_string(),
            got: format!("{value:?}"),
        })
    }
}

fn validate_choice(name: &str, value: &toml::Value, choices: &[String]) -> Result<(), OptionError> {
    let s = value.as_str().ok_or_else(|| OptionError::InvalidType {
        name: name.to_string(),
        expected: "string".to_string(),
        got: format!("{value:?}"),
    })?;

    if choices.iter().any(|c| c == s) {
        Ok(())
    } else {
        Err(OptionError::InvalidChoice {
            name: name.to_string(),
            value: s.to_string(),
            choices: choices.to_vec(),
        })
    }
}

fn validate_integer(name: &str, value: &toml::Value, min: i64, max: i64) -> Result<i64, OptionError> {
    let n = value.as_integer().ok_or_else(|| OptionError::InvalidType {
        name: name.to_string(),
        expected: "integer".to_string(),
        got: format!("{value:?}"),
    })?;

    if n < min || n > max {
        return Err(OptionError::OutOfRange {
            name: name.to_string(),
            value: n,
            min,
            max,
        });
    }
    Ok(n)
}

/// Split a list option into trimmed entries, validating each one
fn parse_list(name: &str, value: &toml::Value, choices: &[String]) -> Result<Vec<String>, OptionError> {
    let entries: Vec<String> = match value {
        toml::Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| OptionError::InvalidType {
                        name: name.to_string(),
                        expected: "string list entry".to_string(),
                        got: format!("{item:?}"),
                    })
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(OptionError::InvalidType {
                name: name.to_string(),
                expected: "comma-separated string or array".to_string(),
                got: format!("{other:?}"),
            })
        }
    };

    for entry in &entries {
        if !choices.iter().any(|c| c == entry) {
            return Err(OptionError::InvalidChoice {
                name: name.to_string(),
                value: entry.clone(),
                choices: choices.to_vec(),
            });
        }
    }
    Ok(entries)
}

/// Parse a `KEY=VALUE` command-line override
///
/// `true`/`false` become booleans and decimal numbers become integers;
/// anything else stays a string.
pub fn parse_override(input: &str) -> Result<(String, toml::Value), OptionError> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| OptionError::MalformedOverride {
            input: input.to_string(),
        })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(OptionError::MalformedOverride {
            input: input.to_string(),
        });
    }

    let raw = raw.trim();
    let value = match raw {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| toml::Value::String(raw.to_string()), toml::Value::Integer),
    };
    Ok((key.to_string(), value))
}

/// Validated build options for one build invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
    /// Chip part number
    pub chip: Chip,
    /// Protocol stack
    pub stack: StackKind,
    /// MAC layer
    pub mac: MacKind,
    /// Device role, present for ZigBee stacks
    pub role: Option<DeviceRole>,
    /// Persistent data backend
    pub pdm: PdmBackend,
    /// Enabled cluster families
    pub features: BTreeSet<Feature>,
    /// DBG output enabled
    pub debug: bool,
    /// JTAG hardware debug enabled
    pub hardware_debug: bool,
    /// Radio channel
    pub channel: u8,
    /// Stack size override passed to the linker
    pub stack_size: Option<u32>,
    /// Minimum heap size passed to the linker
    pub heap_size: Option<u32>,
}

impl BuildOptions {
    /// Minimal options for `chip` with every other option at its default
    pub fn new(chip: Chip) -> Self {
        Self {
            chip,
            stack: StackKind::Mac,
            mac: MacKind::Mac,
            role: None,
            pdm: PdmBackend::Eeprom,
            features: BTreeSet::new(),
            debug: true,
            hardware_debug: false,
            channel: 0,
            stack_size: None,
            heap_size: None,
        }
    }

    /// Whether a feature tag is enabled
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Check the cross-field rules
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.stack.is_zigbee() && self.role.is_none() {
            return Err(OptionError::Missing {
                name: DeviceRole::NAME.to_string(),
                reason: format!("stack '{}' needs a device role ({:?})", self.stack, DeviceRole::choices()),
            });
        }

        if self.stack == StackKind::Zllha && self.features.is_empty() {
            return Err(OptionError::Missing {
                name: Feature::NAME.to_string(),
                reason: format!(
                    "stack '{}' needs at least one cluster family ({:?})",
                    self.stack,
                    Feature::choices()
                ),
            });
        }

        if self.has_feature(Feature::Zll) && self.has_feature(Feature::HaLighting) {
            return Err(OptionError::Incompatible {
                name: Feature::NAME.to_string(),
                first: Feature::Zll.as_str().to_string(),
                second: Feature::HaLighting.as_str().to_string(),
                reason: "their cluster headers collide".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.chip, self.stack, self.mac)?;
        if let Some(role) = self.role {
            write!(f, " {role}")?;
        }
        write!(f, " PDM_{}", self.pdm)
    }
}

fn choice_value<T: OptionChoice>(resolved: &ResolvedOptions) -> Result<Option<T>, OptionError> {
    match resolved.get(T::NAME).and_then(|r| r.value.as_ref()) {
        Some(value) => {
            let s = value.as_str().ok_or_else(|| OptionError::InvalidType {
                name: T::NAME.to_string(),
                expected: "string".to_string(),
                got: format!("{value:?}"),
            })?;
            T::parse_choice(s).map(Some)
        }
        None => Ok(None),
    }
}

fn required_choice<T: OptionChoice>(resolved: &ResolvedOptions) -> Result<T, OptionError> {
    choice_value::<T>(resolved)?.ok_or_else(|| OptionError::Missing {
        name: T::NAME.to_string(),
        reason: format!("no value or default ({:?})", T::choices()),
    })
}

fn bool_value(resolved: &ResolvedOptions, name: &str) -> Result<bool, OptionError> {
    match resolved.get(name).and_then(|r| r.value.as_ref()) {
        Some(value) => {
            validate_bool(name, value)?;
            Ok(value.as_bool().unwrap_or_default())
        }
        None => Ok(false),
    }
}

fn integer_value(resolved: &ResolvedOptions, name: &str) -> Result<Option<i64>, OptionError> {
    let Some(def) = find_definition(name) else {
        return Err(OptionError::Unknown {
            name: name.to_string(),
        });
    };
    let OptionKind::Integer { min, max } = def.kind else {
        return Err(OptionError::InvalidType {
            name: name.to_string(),
            expected: "integer option".to_string(),
            got: format!("{:?}", def.kind),
        });
    };
    match resolved.get(name).and_then(|r| r.value.as_ref()) {
        Some(value) => validate_integer(name, value, min, max).map(Some),
        None => Ok(None),
    }
}

/// Narrow an already range-checked integer
fn narrow<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T, OptionError> {
    T::try_from(value).map_err(|_| OptionError::OutOfRange {
        name: name.to_string(),
        value,
        min: 0,
        max: i64::from(i32::MAX),
    })
}

/// Build validated options from resolved values
///
/// The chip is checked first so an unsupported part aborts before anything
/// else is looked at. Stack-dependent defaults (memory sizes) are filled in
/// and recorded in `resolved` with [`OptionSource::Default`].
pub fn build_options(resolved: &mut ResolvedOptions) -> Result<BuildOptions, OptionError> {
    let chip = required_choice::<Chip>(resolved)?;
    let stack = required_choice::<StackKind>(resolved)?;
    let mut mac = required_choice::<MacKind>(resolved)?;
    let role = choice_value::<DeviceRole>(resolved)?;
    let pdm = required_choice::<PdmBackend>(resolved)?;

    let features = match resolved.get(Feature::NAME).and_then(|r| r.value.as_ref()) {
        Some(value) => parse_list(Feature::NAME, value, &Feature::choices())?
            .iter()
            .map(|s| Feature::parse_choice(s))
            .collect::<Result<BTreeSet<_>, _>>()?,
        None => BTreeSet::new(),
    };

    if stack.is_zigbee() && mac == MacKind::MiniMac {
        tracing::warn!("Stack {stack} needs the MAC shim API, using MiniMacShim instead of MiniMac");
        mac = MacKind::MiniMacShim;
    }
    let ignored = ignored_features(stack, &features);
    if !ignored.is_empty() {
        let tags: Vec<&str> = ignored.iter().map(|f| f.as_str()).collect();
        tracing::warn!("Features {tags:?} have no effect on stack {stack}, ignoring them");
    }

    let channel = integer_value(resolved, "channel")?.unwrap_or(DEFAULT_CHANNEL);

    let mut stack_size = integer_value(resolved, "stack_size")?;
    let mut heap_size = integer_value(resolved, "heap_size")?;
    if stack.is_zigbee() {
        if stack_size.is_none() {
            stack_size = Some(ZIGBEE_STACK_SIZE);
            mark_derived(resolved, "stack_size", ZIGBEE_STACK_SIZE);
        }
        if heap_size.is_none() {
            heap_size = Some(ZIGBEE_MINIMUM_HEAP_SIZE);
            mark_derived(resolved, "heap_size", ZIGBEE_MINIMUM_HEAP_SIZE);
        }
    }

    let options = BuildOptions {
        chip,
        stack,
        mac,
        role,
        pdm,
        features,
        debug: bool_value(resolved, "debug")?,
        hardware_debug: bool_value(resolved, "hardware_debug")?,
        channel: narrow("channel", channel)?,
        stack_size: stack_size.map(|v| narrow("stack_size", v)).transpose()?,
        heap_size: heap_size.map(|v| narrow("heap_size", v)).transpose()?,
    };
    options.validate()?;

    tracing::debug!("Resolved build options: {options}");
    Ok(options)
}

/// Features the stack does not consume
///
/// ZLLHA uses every family. GreenPower is part of ZigBee PRO itself, so the
/// ZBPro stack still links it; everything else only matters for ZLLHA.
pub fn ignored_features(stack: StackKind, features: &BTreeSet<Feature>) -> Vec<Feature> {
    features
        .iter()
        .copied()
        .filter(|f| match stack {
            StackKind::Zllha => false,
            StackKind::ZbPro => *f != Feature::GreenPower,
            StackKind::Mac | StackKind::Jip => true,
        })
        .collect()
}

fn mark_derived(resolved: &mut ResolvedOptions, name: &'static str, value: i64) {
    resolved.insert(
        name,
        ResolvedOption {
            value: Some(toml::Value::Integer(value)),
            source: OptionSource::Default,
        },
    );
}

/// Resolve and validate in one step
pub fn read_build_options(
    cli_values: &HashMap<String, toml::Value>,
    project_values: &HashMap<String, toml::Value>,
) -> Result<(BuildOptions, ResolvedOptions), OptionError> {
    let mut resolved = resolve_all_options(cli_values, project_values)?;

    // An unsupported chip must abort before anything else is examined
    let chip_first = std::iter::once(CHIP_OPTION)
        .chain(OPTION_DEFINITIONS.iter().map(|d| d.name).filter(|n| *n != CHIP_OPTION));
    for name in chip_first {
        if let (Some(def), Some(value)) = (
            find_definition(name),
            resolved.get(name).and_then(|r| r.value.as_ref()),
        ) {
            validate_option(def, value)?;
        }
    }

    let options = build_options(&mut resolved)?;
    Ok((options, resolved))
}
