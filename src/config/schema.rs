//! Configuration schema types
//!
//! This module defines the configuration structure for Cruncher. Every section
//! is optional in the TOML file; command line flags are applied on top.

use crate::domain::{
    CombineDirectories, CombineMode, ExportArgument, ImportArgument, JsonLayout, SortPolicy,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Cruncher configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CruncherConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input expansion, grouping and combination
    #[serde(default)]
    pub input: InputConfig,

    /// Output numbering and formats
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Declared inputs
    #[serde(default)]
    pub imports: Vec<ImportArgument>,

    /// Declared outputs
    #[serde(default)]
    pub exports: Vec<ExportArgument>,
}

impl CruncherConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.logging.validate()?;

        for import in &self.imports {
            if import.path.as_os_str().is_empty() {
                return Err("imports: path must not be empty".to_string());
            }
        }
        for export in &self.exports {
            if export.path.as_os_str().is_empty() {
                return Err("exports: path must not be empty".to_string());
            }
            if export.formats.is_empty() {
                return Err(format!(
                    "exports: no format requested for {}",
                    export.path.display()
                ));
            }
        }
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory holding the database session (`<db_path>/cruncher`)
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Keep combined, converted and intermediate files after the run
    #[serde(default)]
    pub keep_work_files: bool,

    /// Replace existing tables and output files
    #[serde(default)]
    pub overwrite: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err("application.db_path must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            db_path: default_db_path(),
            keep_work_files: false,
            overwrite: false,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// How the files of one group are merged
    #[serde(default)]
    pub combine: CombineMode,

    /// Which files form one group
    #[serde(default)]
    pub combine_dirs: CombineDirectories,

    /// Order of imports and of the files within a group
    #[serde(default)]
    pub sort_input_paths: SortPolicy,

    /// Order of the groups
    #[serde(default)]
    pub sort_file_groups: SortPolicy,

    /// Regex picking files from input directories; `.csv` files by default
    #[serde(default)]
    pub include: Option<String>,

    /// Regex excluding files from input directories
    #[serde(default)]
    pub exclude: Option<String>,

    /// Number of leading lines dropped from every input file
    #[serde(default)]
    pub ignore_first_lines: usize,

    /// Regex of lines dropped from every input file
    #[serde(default)]
    pub ignore_lines_matching: Option<String>,

    /// Skip unreadable files instead of failing
    #[serde(default)]
    pub skip_non_readable: bool,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        let regexes = [
            ("input.include", &self.include),
            ("input.exclude", &self.exclude),
            ("input.ignore_lines_matching", &self.ignore_lines_matching),
        ];
        for (name, pattern) in regexes {
            if let Some(pattern) = pattern {
                Regex::new(pattern).map_err(|e| format!("Invalid {name} regex: {e}"))?;
            }
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Add a unique, increasing `crunchCounter` column to every output
    #[serde(default)]
    pub row_numbers: bool,

    /// First row number, implies `row_numbers`; derived from the current time when absent
    #[serde(default)]
    pub initial_row_number: Option<i64>,

    /// Layout of JSON outputs
    #[serde(default)]
    pub json_layout: JsonLayout,

    /// SQL scripts run against the session before anything else
    #[serde(default)]
    pub init_sql: Vec<PathBuf>,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.init_sql.iter().any(|p| p.as_os_str().is_empty()) {
            return Err("output.init_sql entries must not be empty".to_string());
        }
        Ok(())
    }

    /// Whether outputs get the `crunchCounter` column
    pub fn numbered(&self) -> bool {
        self.row_numbers || self.initial_row_number.is_some()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cruncher_db")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
