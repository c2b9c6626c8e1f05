//! SQL engine abstraction
//!
//! This module defines the trait the pipeline uses to talk to the embedded
//! SQL engine. Every call is synchronous and fails with an [`EngineError`].

use crate::domain::{ColumnSpec, EngineError};
use std::path::PathBuf;

/// Direction of the link between a table and its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Rows are read from the file when the table is created
    Load,
    /// Rows are written to the file when the table is flushed
    Store,
}

/// File a table is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBinding {
    pub file: PathBuf,
    pub mode: BindMode,
}

impl TableBinding {
    /// Binding for an input table
    pub fn load(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            mode: BindMode::Load,
        }
    }

    /// Binding for an output table
    pub fn store(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            mode: BindMode::Store,
        }
    }
}

/// Rows returned by a query, with their column names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Embedded SQL engine used by the pipeline
///
/// One instance backs one run's database session.
pub trait SqlEngine {
    /// Create a table with the given columns, bound to a file
    ///
    /// With `overwrite`, an existing table of that name (and, for stored
    /// tables, an existing file) is replaced instead of being an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created or the file cannot be loaded.
    fn create_table(
        &mut self,
        name: &str,
        columns: &[ColumnSpec],
        binding: &TableBinding,
        overwrite: bool,
    ) -> Result<(), EngineError>;

    /// Discover the result columns of a query by running it for one row
    fn probe_columns(&mut self, sql: &str) -> Result<Vec<ColumnSpec>, EngineError>;

    /// Execute a statement, returning the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<usize, EngineError>;

    /// Execute a script of several statements
    fn execute_script(&mut self, script: &str) -> Result<(), EngineError>;

    /// Run a query and collect all its rows
    fn query(&mut self, sql: &str) -> Result<ResultRows, EngineError>;

    /// Write a stored table's rows to its bound file, returning the row count
    fn flush_table(&mut self, name: &str) -> Result<usize, EngineError>;

    /// Remove a table from the catalog; its bound file is left in place
    fn detach_table(&mut self, name: &str) -> Result<(), EngineError>;

    /// Release the database session
    fn close(&mut self) -> Result<(), EngineError>;
}
