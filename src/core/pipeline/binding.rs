//! Binding input subparts to tables
//!
//! All table names are claimed before the first table is created, so a name
//! collision fails the run with an empty catalog.

use super::session::Session;
use crate::core::registry::NameRegistry;
use crate::domain::context::ResultExt;
use crate::domain::{ColumnSpec, CruncherError, InputSubpart, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolve a relative path against the working directory
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Column names from the first line of a CSV file
///
/// Names are trimmed, blank ones become `col_<n>` and repeated ones get
/// `_2`, `_3`, ... appended.
///
/// # Errors
///
/// Returns a configuration error if the file has no header line.
pub fn parse_header_columns(file: &Path) -> Result<Vec<ColumnSpec>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file)
        .with_context(|| format!("Reading header of {}", file.display()))?;

    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(CruncherError::Configuration(format!(
            "Input file has no header line: {}",
            file.display()
        )));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let columns = record
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let trimmed = raw.trim();
            let base = if trimmed.is_empty() {
                format!("col_{}", i + 1)
            } else {
                trimmed.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let name = if *count == 1 { base } else { format!("{base}_{count}") };
            ColumnSpec::text(name)
        })
        .collect();
    Ok(columns)
}

/// Claim a distinct table name for every subpart
///
/// # Errors
///
/// Returns a configuration error naming both files on the first collision.
pub fn claim_table_names(subparts: &mut [InputSubpart], registry: &mut NameRegistry) -> Result<()> {
    for subpart in subparts.iter_mut() {
        let name = subpart.derived_table_name();
        registry.claim(&name, &subpart.combined_file.display().to_string())?;
        subpart.assign_table_name(name)?;
    }
    Ok(())
}

/// Create one input table per subpart, loaded from its combined file
pub fn bind_subparts(session: &mut Session, subparts: &[InputSubpart], overwrite: bool) -> Result<()> {
    for subpart in subparts {
        let Some(table) = subpart.table_name() else {
            return Err(CruncherError::Configuration(format!(
                "No table name assigned to {}",
                subpart.combined_file.display()
            )));
        };
        let file = absolute(&subpart.combined_file)?;
        tracing::info!(file = %file.display(), table = %table, "CSV input");

        let columns = parse_header_columns(&file)?;
        session
            .create_input_table(table, &columns, &file, overwrite)
            .with_context(|| format!("Binding {} to table {table}", file.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(columns: &[ColumnSpec]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_parse_header_columns() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.csv");
        fs::write(&file, " id , name,,name,\"x, y\"\n1,a,b,c,d\n").unwrap();

        let columns = parse_header_columns(&file).unwrap();
        assert_eq!(names(&columns), vec!["id", "name", "col_3", "name_2", "x, y"]);
        assert_eq!(columns[0].sql_type, "TEXT");
    }

    #[test]
    fn test_parse_header_of_empty_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("empty.csv");
        fs::write(&file, "").unwrap();

        assert!(parse_header_columns(&file).unwrap_err().is_configuration());
    }

    #[test]
    fn test_claim_table_names_detects_collision() {
        let mut subparts = vec![
            InputSubpart::trivial("one/Orders.csv"),
            InputSubpart::trivial("two/orders.csv"),
        ];
        let mut registry = NameRegistry::new();

        let err = claim_table_names(&mut subparts, &mut registry).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("one/Orders.csv"));
        assert!(err.to_string().contains("two/orders.csv"));
    }

    #[test]
    fn test_claim_table_names_assigns_names() {
        let mut subparts = vec![
            InputSubpart::trivial("in/2019 sales.csv"),
            InputSubpart::trivial("in/x.csv").with_alias(Some("People".to_string())),
        ];
        claim_table_names(&mut subparts, &mut NameRegistry::new()).unwrap();

        assert_eq!(subparts[0].table_name(), Some("t_2019_sales"));
        assert_eq!(subparts[1].table_name(), Some("people"));
    }

    #[test]
    fn test_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("a.csv")).unwrap(), cwd.join("a.csv"));
        assert_eq!(absolute(Path::new("/x/a.csv")).unwrap(), PathBuf::from("/x/a.csv"));
    }
}
