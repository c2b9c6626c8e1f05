//! Run command implementation
//!
//! This module implements the `run` command. Flags override the values loaded
//! from the configuration file.

use super::{exit_code_for, EXIT_CONFIGURATION};
use crate::config::CruncherConfig;
use crate::core::pipeline::{Cruncher, RunSummary};
use crate::domain::{
    CombineDirectories, CombineMode, ExportArgument, ExportFormat, ImportArgument, JsonLayout, SortPolicy,
};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Input file or directory; repeat for several. Replaces the configured imports
    #[arg(short = 'i', long = "in", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Table name for the input at the same position
    #[arg(long = "as", value_name = "NAME")]
    pub aliases: Vec<String>,

    /// JSON Pointer to the records inside JSON inputs
    #[arg(long, value_name = "POINTER")]
    pub items_at: Option<String>,

    /// Output file, or directory with --query-per-input-subpart. Replaces the configured export
    #[arg(short, long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// SQL to run; `$table` stands for the input table
    #[arg(short, long)]
    pub sql: Option<String>,

    /// Run the SQL once per input table
    #[arg(long)]
    pub query_per_input_subpart: bool,

    /// Also write JSON, optionally choosing the layout (entry_per_line, array)
    #[arg(long, value_name = "LAYOUT")]
    pub json: Option<Option<JsonLayout>>,

    /// How grouped files are combined (none, concat, intersect, except)
    #[arg(long, value_name = "MODE")]
    pub combine: Option<CombineMode>,

    /// Which files are grouped together
    #[arg(long, value_name = "POLICY")]
    pub combine_dirs: Option<CombineDirectories>,

    /// Order of input files (params_order, alpha, time)
    #[arg(long, value_name = "POLICY")]
    pub sort: Option<SortPolicy>,

    /// Order of file groups (params_order, alpha, time)
    #[arg(long, value_name = "POLICY")]
    pub sort_groups: Option<SortPolicy>,

    /// Only take files whose path matches
    #[arg(long, value_name = "REGEX")]
    pub include: Option<String>,

    /// Skip files whose path matches
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Number of leading lines to drop from every file
    #[arg(long, value_name = "N")]
    pub ignore_first_lines: Option<usize>,

    /// Drop lines matching this regex
    #[arg(long, value_name = "REGEX")]
    pub ignore_lines_matching: Option<String>,

    /// Prepend a unique row number, optionally starting at START
    #[arg(long, value_name = "START")]
    pub row_numbers: Option<Option<i64>>,

    /// Warn about unreadable files instead of failing
    #[arg(long)]
    pub skip_non_readable: bool,

    /// Keep the session directory and intermediate files
    #[arg(long)]
    pub keep_work_files: bool,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Directory holding the session directory
    #[arg(long, value_name = "DIR")]
    pub db: Option<PathBuf>,

    /// SQL script to run before the inputs are loaded; repeat for several
    #[arg(long, value_name = "FILE")]
    pub init_sql: Vec<PathBuf>,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, mut config: CruncherConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIGURATION);
        }

        let cruncher = match Cruncher::new(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open the database session");
                eprintln!("Failed to initialize: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match cruncher.run() {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("❌ Run failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    /// Apply the flags on top of `config`
    pub fn apply_overrides(&self, config: &mut CruncherConfig) {
        if !self.inputs.is_empty() {
            config.imports = self
                .inputs
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let mut import = ImportArgument::new(path);
                    import.alias = self.aliases.get(i).cloned();
                    import.items_at = self.items_at.clone();
                    import
                })
                .collect();
            tracing::debug!(imports = config.imports.len(), "Imports from the command line");
        }

        if let Some(output) = &self.output {
            config.exports = vec![ExportArgument::new(output)];
        }
        for export in config.exports.iter_mut() {
            if let Some(sql) = &self.sql {
                export.sql = Some(sql.clone());
            }
            if self.query_per_input_subpart {
                export.query_per_input_subpart = true;
            }
            if self.json.is_some() {
                export.formats.insert(ExportFormat::Json);
            }
        }
        if let Some(Some(layout)) = self.json {
            config.output.json_layout = layout;
        }

        let input = &mut config.input;
        if let Some(combine) = self.combine {
            input.combine = combine;
        }
        if let Some(combine_dirs) = self.combine_dirs {
            input.combine_dirs = combine_dirs;
        }
        if let Some(sort) = self.sort {
            input.sort_input_paths = sort;
        }
        if let Some(sort) = self.sort_groups {
            input.sort_file_groups = sort;
        }
        if self.include.is_some() {
            input.include = self.include.clone();
        }
        if self.exclude.is_some() {
            input.exclude = self.exclude.clone();
        }
        if let Some(n) = self.ignore_first_lines {
            input.ignore_first_lines = n;
        }
        if self.ignore_lines_matching.is_some() {
            input.ignore_lines_matching = self.ignore_lines_matching.clone();
        }
        input.skip_non_readable |= self.skip_non_readable;

        if let Some(start) = self.row_numbers {
            config.output.row_numbers = true;
            if start.is_some() {
                config.output.initial_row_number = start;
            }
        }
        if !self.init_sql.is_empty() {
            config.output.init_sql = self.init_sql.clone();
        }

        if let Some(db) = &self.db {
            config.application.db_path = db.clone();
        }
        config.application.keep_work_files |= self.keep_work_files;
        config.application.overwrite |= self.overwrite;
    }
}

fn print_summary(summary: &RunSummary) {
    println!("✅ Crunch completed in {:.2}s", summary.duration.as_secs_f64());
    if summary.shortcut {
        println!("  Input relocated to the output without querying");
    }
    for output in &summary.outputs {
        let file = output
            .csv_file
            .as_ref()
            .or(output.json_file.as_ref())
            .map(|f| f.display().to_string())
            .unwrap_or_default();
        match output.id_range {
            Some((first, last)) => println!("  {file}: {} rows, ids {first}..={last}", output.rows),
            None => println!("  {file}: {} rows", output.rows),
        }
    }
    if !summary.teardown_failures.is_empty() {
        println!("⚠️  {} teardown step(s) failed, see the log", summary.teardown_failures.len());
    }
}
