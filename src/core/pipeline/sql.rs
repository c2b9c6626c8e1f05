//! SQL templates and the checks made on them before any table exists

use crate::domain::table::quote_identifier;
use crate::domain::{CruncherError, ExportArgument, Result};

/// Stands for the input table in a generic query
pub const TABLE_PLACEHOLDER: &str = "$table";

/// Query used when an export has none
pub const DEFAULT_SQL: &str = "SELECT $table.* FROM $table";

/// The export's SQL, or the default query
pub fn effective_sql(export: &ExportArgument) -> &str {
    export.sql.as_deref().unwrap_or(DEFAULT_SQL)
}

pub fn has_placeholder(sql: &str) -> bool {
    sql.contains(TABLE_PLACEHOLDER)
}

/// Replace every placeholder with the quoted table name
pub fn bind_placeholder(sql: &str, table: &str) -> String {
    sql.replace(TABLE_PLACEHOLDER, &quote_identifier(table))
}

/// Exactly one export, and per-subpart queries must be generic
///
/// # Errors
///
/// Returns a configuration error otherwise.
pub fn check_exports(exports: &[ExportArgument]) -> Result<&ExportArgument> {
    let export = match exports {
        [] => {
            return Err(CruncherError::Configuration(
                "No export given, nothing to write".to_string(),
            ))
        }
        [export] => export,
        _ => {
            return Err(CruncherError::Configuration(format!(
                "Currently, only 1 export is supported, got {}",
                exports.len()
            )))
        }
    };

    if export.query_per_input_subpart && !has_placeholder(effective_sql(export)) {
        return Err(CruncherError::Configuration(format!(
            "When using query_per_input_subpart, the SQL must use {TABLE_PLACEHOLDER} in place of the table name, e.g. '{DEFAULT_SQL}'"
        )));
    }
    Ok(export)
}

/// A generic query over one global output needs exactly one input table
///
/// # Errors
///
/// Returns a configuration error when the placeholder can't be bound.
pub fn check_global_placeholder(export: &ExportArgument, tables: usize) -> Result<()> {
    if !export.query_per_input_subpart && tables > 1 && has_placeholder(effective_sql(export)) {
        return Err(CruncherError::Configuration(format!(
            "The SQL uses {TABLE_PLACEHOLDER} but there are {tables} input tables; \
             name the tables explicitly, combine the inputs, or enable query_per_input_subpart"
        )));
    }
    Ok(())
}
