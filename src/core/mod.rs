//! Core business logic for Cruncher.
//!
//! # Modules
//!
//! - [`inputs`] - Expanding, filtering, grouping and sorting input paths
//! - [`combine`] - Merging grouped files into one file per table
//! - [`registry`] - Table names and work file paths claimed during a run
//! - [`numbering`] - The shared `crunchCounter` sequence
//! - [`pipeline`] - Orchestration, table binding, output dispatch and teardown
//!
//! # Run Workflow
//!
//! 1. **Convert**: Flatten JSON imports to CSV
//! 2. **Group**: Expand directories and group files per the combine policy
//! 3. **Combine**: Concatenate, intersect or subtract the files of each group
//! 4. **Bind**: Create one table per combined file
//! 5. **Query**: Run the export SQL into output tables written to CSV (and JSON)
//! 6. **Teardown**: Detach every table and drop the session
//!
//! # Example
//!
//! ```rust,no_run
//! use cruncher::config::CruncherConfig;
//! use cruncher::core::pipeline::Cruncher;
//! use cruncher::domain::{CombineMode, ExportArgument, ImportArgument};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = CruncherConfig::default();
//! config.imports.push(ImportArgument::new("data/2019/"));
//! config.exports.push(ExportArgument::new("out/2019.csv"));
//! config.input.combine = CombineMode::Concat;
//! config.output.row_numbers = true;
//!
//! let summary = Cruncher::new(config)?.run()?;
//! println!("Rows: {}", summary.total_rows());
//! # Ok(())
//! # }
//! ```

pub mod combine;
pub mod inputs;
pub mod numbering;
pub mod pipeline;
pub mod registry;
