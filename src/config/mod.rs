//! Configuration management for Cruncher.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Cruncher reads an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CRUNCHER_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of values and regexes
//!
//! Command line flags are applied on top of the loaded file.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, database path, work files, overwrite
//! - [`InputConfig`] - Expansion, grouping, sorting and combination of inputs
//! - [`OutputConfig`] - Row numbering, JSON layout, init SQL scripts
//! - [`LoggingConfig`] - File logging
//! - `[[imports]]` / `[[exports]]` - Declared inputs and outputs
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! db_path = "target/cruncher"
//!
//! [input]
//! combine = "concat"
//! combine_dirs = "per_input_subdir"
//! exclude = ".*/LOAD.*\\.csv"
//!
//! [output]
//! row_numbers = true
//!
//! [[imports]]
//! path = "${DATA_DIR}/oauth_consumer"
//!
//! [[exports]]
//! path = "out/"
//! sql = "SELECT $table.* FROM $table"
//! query_per_input_subpart = true
//! formats = ["json"]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, CruncherConfig, InputConfig, LoggingConfig, OutputConfig};
