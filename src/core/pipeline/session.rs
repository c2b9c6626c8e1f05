//! Database session and guaranteed teardown
//!
//! The [`Session`] owns the engine for the duration of a run and remembers
//! every table it created. Teardown detaches them all, inputs first, and then
//! releases the engine. It runs once: explicitly at the end of the run, or
//! from `Drop` if the run unwinds before getting there.

use crate::adapters::engine::{SqlEngine, TableBinding};
use crate::domain::{ColumnSpec, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of the database path holding one run's session
pub const SESSION_DIR_NAME: &str = "cruncher";

/// Create a fresh session directory under `db_path`, removing a stale one
pub fn prepare_session_dir(db_path: &Path) -> Result<PathBuf> {
    let dir = db_path.join(SESSION_DIR_NAME);
    if dir.exists() {
        tracing::debug!(dir = %dir.display(), "Removing stale session directory");
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub struct Session {
    engine: Box<dyn SqlEngine>,
    dir: PathBuf,
    keep_work_files: bool,
    input_tables: Vec<String>,
    output_tables: Vec<String>,
    closed: bool,
}

impl Session {
    pub fn new(engine: Box<dyn SqlEngine>, dir: PathBuf, keep_work_files: bool) -> Self {
        Self {
            engine,
            dir,
            keep_work_files,
            input_tables: Vec::new(),
            output_tables: Vec::new(),
            closed: false,
        }
    }

    /// Session directory; work files live under it
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn engine(&mut self) -> &mut dyn SqlEngine {
        self.engine.as_mut()
    }

    pub fn input_tables(&self) -> &[String] {
        &self.input_tables
    }

    pub fn output_tables(&self) -> &[String] {
        &self.output_tables
    }

    /// Create a table loaded from `file` and record it for teardown
    pub fn create_input_table(
        &mut self,
        name: &str,
        columns: &[ColumnSpec],
        file: &Path,
        overwrite: bool,
    ) -> Result<()> {
        self.engine
            .create_table(name, columns, &TableBinding::load(file), overwrite)?;
        self.input_tables.push(name.to_string());
        Ok(())
    }

    /// Create a table stored to `file` and record it for teardown
    pub fn create_output_table(
        &mut self,
        name: &str,
        columns: &[ColumnSpec],
        file: &Path,
        overwrite: bool,
    ) -> Result<()> {
        self.engine
            .create_table(name, columns, &TableBinding::store(file), overwrite)?;
        self.output_tables.push(name.to_string());
        Ok(())
    }

    /// Detach every recorded table, close the engine and drop the work files
    ///
    /// Each failing step is logged and reported; the rest still runs.
    /// Calling it again does nothing.
    pub fn teardown(&mut self) -> Vec<String> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        tracing::debug!(
            inputs = self.input_tables.len(),
            outputs = self.output_tables.len(),
            "Tearing down session"
        );

        let mut failures = Vec::new();
        let tables = std::mem::take(&mut self.input_tables)
            .into_iter()
            .map(|t| (t, "input"))
            .chain(std::mem::take(&mut self.output_tables).into_iter().map(|t| (t, "output")));

        for (table, kind) in tables {
            if let Err(e) = self.engine.detach_table(&table) {
                tracing::warn!(table = %table, kind, error = %e, "Could not detach table");
                failures.push(e.to_string());
            }
        }

        if let Err(e) = self.engine.close() {
            tracing::warn!(error = %e, "Could not close the database session");
            failures.push(e.to_string());
        }

        if !self.keep_work_files && self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Could not remove session directory");
                failures.push(format!("Removing {}: {e}", self.dir.display()));
            }
        }
        failures
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            self.teardown();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dir", &self.dir)
            .field("input_tables", &self.input_tables)
            .field("output_tables", &self.output_tables)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::engine::SqliteEngine;
    use tempfile::TempDir;

    fn session(dir: &TempDir, keep_work_files: bool) -> Session {
        let session_dir = prepare_session_dir(dir.path()).unwrap();
        let engine = SqliteEngine::open(&session_dir).unwrap();
        Session::new(Box::new(engine), session_dir, keep_work_files)
    }

    #[test]
    fn test_prepare_session_dir_recreates_directory() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("cruncher/stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "x").unwrap();

        let session_dir = prepare_session_dir(dir.path()).unwrap();
        assert!(session_dir.is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn test_teardown_detaches_tables_and_removes_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.csv");
        fs::write(&input, "a\n1\n").unwrap();

        let mut session = session(&dir, false);
        session
            .create_input_table("t_in", &[ColumnSpec::text("a")], &input, false)
            .unwrap();
        session
            .create_output_table("t_out", &[ColumnSpec::text("a")], &dir.path().join("out.csv"), false)
            .unwrap();
        assert_eq!(session.input_tables(), ["t_in"]);

        let failures = session.teardown();
        assert!(failures.is_empty());
        assert!(!dir.path().join("cruncher").exists());
        assert!(session.teardown().is_empty());
    }

    #[test]
    fn test_keep_work_files_leaves_session_dir() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, true);
        session.teardown();
        assert!(dir.path().join("cruncher").exists());
    }

    #[test]
    fn test_drop_runs_teardown() {
        let dir = TempDir::new().unwrap();
        {
            let _session = session(&dir, false);
        }
        assert!(!dir.path().join("cruncher").exists());
    }
}
