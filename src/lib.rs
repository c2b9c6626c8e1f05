// Cruncher - CSV and JSON combination and SQL querying tool
// Copyright (c) 2025 Cruncher Contributors
// Licensed under the MIT License

//! # Cruncher - SQL over CSV and JSON files
//!
//! Cruncher loads CSV (and flattened JSON) files into tables of an embedded
//! SQL database, runs a query over them and writes the result back to CSV
//! and JSON files.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Grouping** input files per directory and ordering them
//! - **Combining** files of a group by concatenation, intersection or difference
//! - **Binding** each combined file to a table
//! - **Querying** once overall or once per input table, with optional row numbers
//! - **Tearing down** every table and work file, on success and on failure
//!
//! ## Architecture
//!
//! Cruncher follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (grouping, combination, numbering, pipeline)
//! - [`adapters`] - The SQL engine and JSON converters
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cruncher::config::CruncherConfig;
//! use cruncher::core::pipeline::Cruncher;
//! use cruncher::domain::{ExportArgument, ImportArgument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = CruncherConfig::default();
//!     config.imports.push(ImportArgument::new("data/orders.csv"));
//!     config.exports.push(
//!         ExportArgument::new("out/big_orders.csv")
//!             .with_sql("SELECT * FROM orders WHERE CAST(total AS REAL) > 100"),
//!     );
//!
//!     let summary = Cruncher::new(config)?.run()?;
//!     println!("Wrote {} rows", summary.total_rows());
//!     Ok(())
//! }
//! ```
//!
//! ## Generic Queries
//!
//! `$table` in the SQL stands for the input table. With
//! `query_per_input_subpart`, the query runs once per input table and each
//! result lands in its own file under the export directory:
//!
//! ```rust,no_run
//! use cruncher::domain::ExportArgument;
//!
//! let export = ExportArgument::new("out/")
//!     .with_sql("SELECT $table.* FROM $table ORDER BY 1")
//!     .per_input_subpart();
//! ```
//!
//! ## Error Handling
//!
//! Cruncher uses the [`domain::CruncherError`] type for all errors:
//!
//! ```rust,no_run
//! use cruncher::domain::CruncherError;
//!
//! fn example() -> Result<(), CruncherError> {
//!     let config = cruncher::config::load_config("cruncher.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Cruncher uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(file = "out/result.csv", table = "output_result", "CSV output");
//! warn!(table = "orders", "Could not detach table");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
