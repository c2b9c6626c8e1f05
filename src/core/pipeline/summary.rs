//! Run summary and reporting

use std::path::PathBuf;
use std::time::Duration;

/// One output written by the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    /// Output table the rows went through
    pub table: String,

    /// CSV file, unless it was removed after a JSON-only export
    pub csv_file: Option<PathBuf>,

    pub json_file: Option<PathBuf>,

    pub rows: usize,

    /// First and last `crunchCounter` values, when numbered and non-empty
    pub id_range: Option<(i64, i64)>,
}

/// Summary of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of input subparts bound to tables
    pub subparts: usize,

    pub input_tables: Vec<String>,

    pub outputs: Vec<WrittenOutput>,

    /// The single input was relocated to the output without touching the engine
    pub shortcut: bool,

    /// Teardown steps that failed; never fatal
    pub teardown_failures: Vec<String>,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Total rows over all outputs
    pub fn total_rows(&self) -> usize {
        self.outputs.iter().map(|o| o.rows).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            subparts = self.subparts,
            input_tables = self.input_tables.len(),
            outputs = self.outputs.len(),
            rows = self.total_rows(),
            shortcut = self.shortcut,
            duration_ms = self.duration.as_millis() as u64,
            "Crunch completed"
        );

        for failure in &self.teardown_failures {
            tracing::warn!(failure = %failure, "Teardown step failed");
        }
    }
}
