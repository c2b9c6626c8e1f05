//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Cruncher using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cruncher - combine CSV and JSON files and query them with SQL
#[derive(Parser, Debug)]
#[command(name = "cruncher")]
#[command(version, about, long_about = None)]
#[command(author = "Cruncher Contributors")]
pub struct Cli {
    /// Path to configuration file; defaults apply when absent
    #[arg(short, long, env = "CRUNCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CRUNCHER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Combine the inputs, run the SQL and write the outputs
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["cruncher", "run"]);
        assert_eq!(cli.config, None);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cruncher", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cruncher", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cruncher", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
