//! Hierarchical-to-tabular flattening
//!
//! Converts a JSON document holding an array of records into a CSV file with
//! one header row and one row per record.

use super::Flattener;
use crate::domain::{CruncherError, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Separator between nested object keys in column names
pub const KEY_SEPARATOR: &str = ".";

/// JSON → CSV flattener
///
/// - nested objects become dotted column names: `{"a": {"b": 1}}` → `a.b`
/// - arrays are kept as JSON text in a single cell
/// - the header is the union of all record keys, in first-seen order
#[derive(Debug, Default, Clone)]
pub struct JsonFlattener;

impl JsonFlattener {
    pub fn new() -> Self {
        Self
    }
}

impl Flattener for JsonFlattener {
    fn convert(&self, source: &Path, items_at: &str, destination: &Path) -> Result<PathBuf> {
        let file = File::open(source).map_err(|e| {
            CruncherError::Conversion(format!("Can't open {}: {e}", source.display()))
        })?;
        let document: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            CruncherError::Conversion(format!("Can't parse {}: {e}", source.display()))
        })?;

        let records = locate_records(&document, items_at).map_err(|e| {
            CruncherError::Conversion(format!("{} in {}", e, source.display()))
        })?;
        if records.is_empty() {
            return Err(CruncherError::Conversion(format!(
                "No records at '{items_at}' in {}",
                source.display()
            )));
        }

        let rows: Vec<Map<String, Value>> = records.into_iter().map(flatten_record).collect();
        let header = collect_header(&rows);

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(destination)
            .map_err(|e| {
                CruncherError::Conversion(format!("Can't write {}: {e}", destination.display()))
            })?;
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(header.iter().map(|key| cell(row.get(key))))?;
        }
        writer.flush()?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            records = rows.len(),
            columns = header.len(),
            "Flattened JSON records"
        );
        Ok(destination.to_path_buf())
    }
}

/// Find the records the locator points at
///
/// The locator is a JSON Pointer; an empty one or `/` means the root.
fn locate_records<'a>(document: &'a Value, items_at: &str) -> std::result::Result<Vec<&'a Value>, String> {
    let pointer = items_at.trim();
    let node = if pointer.is_empty() || pointer == "/" {
        Some(document)
    } else if pointer.starts_with('/') {
        document.pointer(pointer.trim_end_matches('/'))
    } else {
        document.pointer(&format!("/{}", pointer.trim_end_matches('/')))
    };

    match node {
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(object @ Value::Object(_)) => Ok(vec![object]),
        Some(_) => Err(format!("Node at '{items_at}' is neither an array nor an object")),
        None => Err(format!("Nothing found at '{items_at}'")),
    }
}

fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    match record {
        Value::Object(_) => flatten_into("", record, &mut fields),
        other => {
            fields.insert("value".to_string(), other.clone());
        }
    }
    fields
}

fn flatten_into(prefix: &str, value: &Value, fields: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}{KEY_SEPARATOR}{key}")
                };
                flatten_into(&path, nested, fields);
            }
        }
        other => {
            fields.insert(prefix.to_string(), other.clone());
        }
    }
}

fn collect_header(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut header = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                header.push(key.clone());
            }
        }
    }
    header
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flatten_record_nested_keys() {
        let fields = flatten_record(&json!({
            "id": 1,
            "name": {"first": "Ada", "last": "Lovelace"},
            "tags": ["math", "poetry"]
        }));

        assert_eq!(fields["id"], 1);
        assert_eq!(fields["name.first"], "Ada");
        assert_eq!(fields["name.last"], "Lovelace");
        assert_eq!(fields["tags"], json!(["math", "poetry"]));
    }

    #[test]
    fn test_locate_records() {
        let doc = json!({"data": {"items": [{"a": 1}, {"a": 2}]}});
        assert_eq!(locate_records(&doc, "/data/items").unwrap().len(), 2);
        assert_eq!(locate_records(&doc, "data/items/").unwrap().len(), 2);
        assert_eq!(locate_records(&doc, "/").unwrap().len(), 1);
        assert!(locate_records(&doc, "/missing").is_err());
        assert!(locate_records(&json!({"n": 5}), "/n").is_err());
    }

    #[test]
    fn test_collect_header_keeps_first_seen_order() {
        let rows = vec![
            flatten_record(&json!({"b": 1, "a": 2})),
            flatten_record(&json!({"a": 3, "c": 4})),
        ];
        assert_eq!(collect_header(&rows), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_convert_writes_csv() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("people.json");
        fs::write(
            &source,
            r#"{"people": [{"name": "Ada", "age": 36}, {"name": "Alan", "city": "London"}]}"#,
        )
        .unwrap();
        let destination = dir.path().join("people.csv");

        let written = JsonFlattener::new()
            .convert(&source, "/people", &destination)
            .unwrap();

        assert_eq!(written, destination);
        let csv = fs::read_to_string(&destination).unwrap();
        assert_eq!(csv, "name,age,city\nAda,36,\nAlan,,London\n");
    }

    #[test]
    fn test_convert_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.json");
        fs::write(&source, "{ not json").unwrap();

        let err = JsonFlattener::new()
            .convert(&source, "/", &dir.path().join("broken.csv"))
            .unwrap_err();
        assert!(matches!(err, CruncherError::Conversion(_)));
    }

    #[test]
    fn test_convert_rejects_empty_array() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("empty.json");
        fs::write(&source, "[]").unwrap();

        let err = JsonFlattener::new()
            .convert(&source, "/", &dir.path().join("empty.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("No records"));
    }
}
