//! Shared helpers for the pipeline integration tests

#![allow(dead_code)]

use cruncher::adapters::engine::{ResultRows, SqlEngine, SqliteEngine, TableBinding};
use cruncher::config::CruncherConfig;
use cruncher::core::pipeline::Cruncher;
use cruncher::domain::{ColumnSpec, EngineError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What the engine was asked to do during a run
#[derive(Debug, Default)]
pub struct EngineLog {
    pub created: Vec<String>,
    pub detached: Vec<String>,
    pub statements: Vec<String>,
    pub closed: bool,

    /// Fail every `execute` call
    pub fail_execute: bool,

    /// Fail detaching this table
    pub fail_detach: Option<String>,
}

/// [`SqliteEngine`] wrapper recording calls into a shared [`EngineLog`]
pub struct RecordingEngine {
    inner: SqliteEngine,
    log: Rc<RefCell<EngineLog>>,
}

impl RecordingEngine {
    pub fn new(inner: SqliteEngine, log: Rc<RefCell<EngineLog>>) -> Self {
        Self { inner, log }
    }
}

impl SqlEngine for RecordingEngine {
    fn create_table(
        &mut self,
        name: &str,
        columns: &[ColumnSpec],
        binding: &TableBinding,
        overwrite: bool,
    ) -> Result<(), EngineError> {
        self.inner.create_table(name, columns, binding, overwrite)?;
        self.log.borrow_mut().created.push(name.to_string());
        Ok(())
    }

    fn probe_columns(&mut self, sql: &str) -> Result<Vec<ColumnSpec>, EngineError> {
        self.inner.probe_columns(sql)
    }

    fn execute(&mut self, sql: &str) -> Result<usize, EngineError> {
        self.log.borrow_mut().statements.push(sql.to_string());
        if self.log.borrow().fail_execute {
            return Err(EngineError::QueryFailed {
                sql: sql.to_string(),
                message: "forced failure".to_string(),
            });
        }
        self.inner.execute(sql)
    }

    fn execute_script(&mut self, script: &str) -> Result<(), EngineError> {
        self.inner.execute_script(script)
    }

    fn query(&mut self, sql: &str) -> Result<ResultRows, EngineError> {
        self.inner.query(sql)
    }

    fn flush_table(&mut self, name: &str) -> Result<usize, EngineError> {
        self.inner.flush_table(name)
    }

    fn detach_table(&mut self, name: &str) -> Result<(), EngineError> {
        if self.log.borrow().fail_detach.as_deref() == Some(name) {
            return Err(EngineError::DetachFailed {
                table: name.to_string(),
                message: "forced failure".to_string(),
            });
        }
        self.inner.detach_table(name)?;
        self.log.borrow_mut().detached.push(name.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.log.borrow_mut().closed = true;
        self.inner.close()
    }
}

/// A cruncher over a recording SQLite engine
pub fn recording_cruncher(config: CruncherConfig, log: &Rc<RefCell<EngineLog>>) -> Cruncher {
    let log = Rc::clone(log);
    Cruncher::with_engine(config, move |dir| {
        let engine: Box<dyn SqlEngine> = Box::new(RecordingEngine::new(SqliteEngine::open(dir)?, log));
        Ok(engine)
    })
    .expect("cruncher should open")
}

pub fn new_log() -> Rc<RefCell<EngineLog>> {
    Rc::new(RefCell::new(EngineLog::default()))
}

/// Configuration with its database under `root`
pub fn config_in(root: &Path) -> CruncherConfig {
    let mut config = CruncherConfig::default();
    config.application.db_path = root.join("db");
    config
}

/// Write `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("create parent");
    fs::write(&path, contents).expect("write file");
    path
}

/// Data lines of a CSV output, header excluded
pub fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read output")
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// Leading `crunchCounter` values of a numbered CSV output
pub fn ids(path: &Path) -> Vec<i64> {
    data_lines(path)
        .iter()
        .map(|line| {
            line.split(',')
                .next()
                .and_then(|id| id.parse().ok())
                .expect("numbered line")
        })
        .collect()
}
