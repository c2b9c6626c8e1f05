// Cruncher - CSV and JSON combination and SQL querying tool
// Copyright (c) 2025 Cruncher Contributors
// Licensed under the MIT License

use clap::Parser;
use cruncher::cli::commands::EXIT_CONFIGURATION;
use cruncher::cli::{Cli, Commands};
use cruncher::config::{load_config_or_default, CruncherConfig};
use cruncher::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => Some(config),
        Err(e) => {
            // validate-config reports this itself
            if !matches!(cli.command, Commands::ValidateConfig(_)) {
                eprintln!("Failed to load configuration: {e}");
                process::exit(EXIT_CONFIGURATION);
            }
            None
        }
    };

    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Cruncher");

    let exit_code = match execute_command(&cli, config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors, so flush the log file first
    drop(guard);
    process::exit(exit_code);
}

fn execute_command(cli: &Cli, config: Option<CruncherConfig>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => match config {
            Some(config) => args.execute(config),
            None => Ok(EXIT_CONFIGURATION),
        },
        Commands::ValidateConfig(args) => args.execute(cli.config.as_deref()),
    }
}
