//! Tabular-to-hierarchical export
//!
//! Writes query results as JSON objects keyed by column name, either one
//! object per line or all objects wrapped in an array.

use super::ResultExporter;
use crate::adapters::engine::ResultRows;
use crate::domain::{CruncherError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }
}

impl ResultExporter for JsonExporter {
    fn convert(&self, rows: &ResultRows, destination: &Path, array_wrapped: bool) -> Result<()> {
        let conversion_failed = |e: std::io::Error| {
            CruncherError::Conversion(format!("Can't write {}: {e}", destination.display()))
        };

        let file = File::create(destination).map_err(conversion_failed)?;
        let mut out = BufWriter::new(file);

        if array_wrapped {
            out.write_all(b"[").map_err(conversion_failed)?;
        }
        for (i, row) in rows.rows.iter().enumerate() {
            if array_wrapped {
                out.write_all(if i == 0 { b"\n  " } else { b",\n  " })
                    .map_err(conversion_failed)?;
            }
            serde_json::to_writer(&mut out, &to_object(&rows.columns, row))?;
            if !array_wrapped {
                out.write_all(b"\n").map_err(conversion_failed)?;
            }
        }
        if array_wrapped {
            out.write_all(b"\n]\n").map_err(conversion_failed)?;
        }
        out.flush().map_err(conversion_failed)?;
        Ok(())
    }
}

fn to_object(columns: &[String], row: &[Value]) -> Map<String, Value> {
    columns
        .iter()
        .cloned()
        .zip(row.iter().cloned())
        .collect()
}
