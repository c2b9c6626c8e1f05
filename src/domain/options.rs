//! Policy enums shared by the configuration and the pipeline
//!
//! Each enum is deserialized from its snake_case name in the TOML file and
//! parsed from the same name on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the files of one group are merged into a single subpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Every file is its own subpart
    #[default]
    None,
    /// Files are concatenated, keeping only the first header
    Concat,
    /// Rows present in every file of the group
    Intersect,
    /// Rows of the first file absent from all the others
    Except,
}

impl CombineMode {
    /// All accepted option values
    pub const VALUES: [&'static str; 4] = ["none", "concat", "intersect", "except"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CombineMode::None => "none",
            CombineMode::Concat => "concat",
            CombineMode::Intersect => "intersect",
            CombineMode::Except => "except",
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CombineMode::None),
            "concat" => Ok(CombineMode::Concat),
            "intersect" => Ok(CombineMode::Intersect),
            "except" => Ok(CombineMode::Except),
            _ => Err(format!(
                "Unknown combine mode '{s}'. Try one of: {}",
                Self::VALUES.join(", ")
            )),
        }
    }
}

/// Which files are eligible to be combined together
///
/// Listed from the least to the most fine-grained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombineDirectories {
    /// One group with all files
    #[default]
    AllFiles,
    /// One group per declared input directory
    PerInputDir,
    /// One group per immediate subdirectory of an input directory
    PerInputSubdir,
    /// One group per directory containing files
    PerEachDir,
}

impl CombineDirectories {
    pub const VALUES: [&'static str; 4] = [
        "all_files",
        "per_input_dir",
        "per_input_subdir",
        "per_each_dir",
    ];
}

impl FromStr for CombineDirectories {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all_files" | "all" => Ok(CombineDirectories::AllFiles),
            "per_input_dir" => Ok(CombineDirectories::PerInputDir),
            "per_input_subdir" => Ok(CombineDirectories::PerInputSubdir),
            "per_each_dir" => Ok(CombineDirectories::PerEachDir),
            _ => Err(format!(
                "Unknown directory grouping '{s}'. Try one of: {}",
                Self::VALUES.join(", ")
            )),
        }
    }
}

/// Ordering policy for input paths and file groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// As given on input
    #[default]
    ParamsOrder,
    /// Lexicographic path order
    Alpha,
    /// File modification time, oldest first
    Time,
}

impl SortPolicy {
    pub const VALUES: [&'static str; 3] = ["params_order", "alpha", "time"];
}

impl FromStr for SortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "params_order" | "paramsorder" => Ok(SortPolicy::ParamsOrder),
            "alpha" => Ok(SortPolicy::Alpha),
            "time" => Ok(SortPolicy::Time),
            _ => Err(format!(
                "Unknown sort policy '{s}'. Try one of: {}",
                Self::VALUES.join(", ")
            )),
        }
    }
}

/// Layout of exported JSON files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JsonLayout {
    /// One JSON object per line
    #[default]
    EntryPerLine,
    /// All objects wrapped in one JSON array
    Array,
}

impl FromStr for JsonLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "entry_per_line" | "entries" | "" => Ok(JsonLayout::EntryPerLine),
            "array" => Ok(JsonLayout::Array),
            _ => Err(format!(
                "Unknown JSON layout '{s}'. Try one of: entry_per_line, array"
            )),
        }
    }
}
