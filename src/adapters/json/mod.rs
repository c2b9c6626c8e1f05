//! JSON conversion collaborators
//!
//! - [`Flattener`] turns a hierarchical input into a tabular file before binding
//! - [`ResultExporter`] renders a populated output table as JSON

pub mod export;
pub mod flatten;

use crate::adapters::engine::ResultRows;
use crate::domain::Result;
use std::path::{Path, PathBuf};

pub use export::JsonExporter;
pub use flatten::JsonFlattener;

/// Hierarchical-to-tabular converter
pub trait Flattener {
    /// Convert `source` into a CSV file at `destination`
    ///
    /// `items_at` locates the array of records inside the source document.
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the source can't be read, parsed or located.
    fn convert(&self, source: &Path, items_at: &str, destination: &Path) -> Result<PathBuf>;
}

/// Tabular-to-hierarchical converter
pub trait ResultExporter {
    /// Write `rows` to `destination`, as an array when `array_wrapped`
    fn convert(&self, rows: &ResultRows, destination: &Path, array_wrapped: bool) -> Result<()>;
}
