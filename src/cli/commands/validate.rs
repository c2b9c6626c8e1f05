//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Cruncher configuration file.

use super::EXIT_CONFIGURATION;
use crate::config::load_config_or_default;
use crate::core::pipeline::sql::check_exports;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string());
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration file: {shown}");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        if let Err(e) = check_exports(&config.exports) {
            println!("❌ Export declaration is not usable");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIGURATION);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Database Path: {}", config.application.db_path.display());
        println!("  Combine: {}", config.input.combine);
        println!("  Combine Directories: {:?}", config.input.combine_dirs);
        println!("  Row Numbers: {}", config.output.numbered());
        println!("  Imports: {}", config.imports.len());
        for import in &config.imports {
            println!("    - {}", import.path.display());
        }
        for export in &config.exports {
            println!("  Export: {}", export.path.display());
            println!("  Query Per Input Subpart: {}", export.query_per_input_subpart);
            println!("  Formats: {:?}", export.formats);
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_valid_config_exits_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[imports]]\npath = \"a.csv\"\n\n[[exports]]\npath = \"out.csv\"").unwrap();

        assert_eq!(ValidateArgs {}.execute(Some(file.path())).unwrap(), 0);
    }

    #[test]
    fn test_two_exports_exit_with_configuration_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[exports]]\npath = \"a.csv\"\n\n[[exports]]\npath = \"b.csv\"").unwrap();

        assert_eq!(ValidateArgs {}.execute(Some(file.path())).unwrap(), EXIT_CONFIGURATION);
    }

    #[test]
    fn test_missing_file_exits_with_configuration_code() {
        let code = ValidateArgs {}
            .execute(Some(Path::new("/nonexistent/cruncher.toml")))
            .unwrap();
        assert_eq!(code, EXIT_CONFIGURATION);
    }
}
