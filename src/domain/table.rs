//! Table and column naming
//!
//! Table names derive deterministically from file names, so two inputs can
//! collide; detecting that is the job of the name registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A column as created in, or discovered from, the SQL engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }

    /// A free-text column, the type of every column read from a CSV header
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, "TEXT")
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_identifier(&self.name), self.sql_type)
    }
}

/// Table names SQLite keeps for itself
const RESERVED_PREFIX: &str = "sqlite_";

/// Normalizes a file base name into a legal SQL identifier
///
/// Lowercase ASCII letters, digits and underscores are kept, anything else
/// becomes `_`. A name that would start with a digit, would be empty, or
/// would fall in SQLite's reserved `sqlite_` namespace gets a `t_` prefix.
///
/// # Examples
///
/// ```
/// use cruncher::domain::table::normalize_table_name;
///
/// assert_eq!(normalize_table_name("Sales Q1-2024"), "sales_q1_2024");
/// assert_eq!(normalize_table_name("2024_sales"), "t_2024_sales");
/// assert_eq!(normalize_table_name("sqlite_stats"), "t_sqlite_stats");
/// ```
pub fn normalize_table_name(base_name: &str) -> String {
    let normalized: String = base_name
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    match normalized.chars().next() {
        None => "t_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("t_{normalized}"),
        Some(_) if normalized.starts_with(RESERVED_PREFIX) => format!("t_{normalized}"),
        Some(_) => normalized,
    }
}

/// Table name for a file: its base name without the extension, normalized
pub fn table_name_for_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    normalize_table_name(&stem)
}

/// Quotes an identifier for use in SQL text
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
