//! Chip identification and library naming
//!
//! The JN516x family ships precompiled vendor libraries named after the chip
//! family (`Random_JN516x`). A handful of libraries have a dedicated JN5169
//! build which must be picked instead.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;

/// Option name the chip is read from
pub const CHIP_OPTION: &str = "mcu";

/// Libraries with a JN5169-specific build
const JN5169_VARIANT_LIBS: &[&str] = &["AppApi", "HardwareApi", "MAC", "MiniMac", "MMAC", "Xcv"];

/// Libraries that are always built per chip
const PER_CHIP_LIBS: &[&str] = &["JPT"];

/// Supported part numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Chip {
    #[serde(rename = "JN5161")]
    Jn5161,
    #[serde(rename = "JN5164")]
    Jn5164,
    #[serde(rename = "JN5168")]
    Jn5168,
    #[serde(rename = "JN5169")]
    Jn5169,
}

impl Chip {
    /// All supported chips
    pub const ALL: [Chip; 4] = [Chip::Jn5161, Chip::Jn5164, Chip::Jn5168, Chip::Jn5169];

    /// Part number as written in board files and library names
    pub fn as_str(self) -> &'static str {
        match self {
            Chip::Jn5161 => "JN5161",
            Chip::Jn5164 => "JN5164",
            Chip::Jn5168 => "JN5168",
            Chip::Jn5169 => "JN5169",
        }
    }

    /// Numeric chip id (the digits of the part number)
    pub fn id(self) -> u32 {
        match self {
            Chip::Jn5161 => 5161,
            Chip::Jn5164 => 5164,
            Chip::Jn5168 => 5168,
            Chip::Jn5169 => 5169,
        }
    }

    /// Chip family
    pub fn family(self) -> ChipFamily {
        ChipFamily::Jn516x
    }

    /// Allowed values, for error messages
    pub fn choices() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chip {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|chip| chip.as_str() == s)
            .ok_or_else(|| OptionError::InvalidChoice {
                name: CHIP_OPTION.to_string(),
                value: s.to_string(),
                choices: Self::choices(),
            })
    }
}

/// Chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChipFamily {
    #[serde(rename = "JN516x")]
    Jn516x,
}

impl ChipFamily {
    /// Family name
    pub fn as_str(self) -> &'static str {
        match self {
            ChipFamily::Jn516x => "JN516x",
        }
    }

    /// Numeric family id
    pub fn id(self) -> u32 {
        match self {
            ChipFamily::Jn516x => 5160,
        }
    }
}

impl fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a short vendor library name to its on-disk name for `chip`
///
/// ```
/// use jennic_build::core::chip::{resolve_library_name, Chip};
///
/// assert_eq!(resolve_library_name(Chip::Jn5169, "MAC"), "MAC_JN5169");
/// assert_eq!(resolve_library_name(Chip::Jn5168, "MAC"), "MAC_JN516x");
/// assert_eq!(resolve_library_name(Chip::Jn5169, "Random"), "Random_JN516x");
/// ```
pub fn resolve_library_name(chip: Chip, name: &str) -> String {
    let per_chip = PER_CHIP_LIBS.contains(&name)
        || (chip == Chip::Jn5169 && JN5169_VARIANT_LIBS.contains(&name));

    if per_chip {
        format!("{name}_{chip}")
    } else {
        format!("{name}_{}", chip.family())
    }
}
