//! Declared imports and exports
//!
//! An [`ImportArgument`] names one input path, an [`ExportArgument`] one
//! output destination. Both are immutable once the pipeline starts; converting
//! a JSON import produces a new value instead of editing the old one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Format of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// Tabular, delimited file with a header row
    Csv,
    /// Hierarchical document holding an array of records
    Json,
}

impl ImportFormat {
    /// Infers the format from the file extension
    pub fn infer(path: &Path) -> Self {
        if has_extension(path, "json") {
            ImportFormat::Json
        } else {
            ImportFormat::Csv
        }
    }
}

/// Format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// One user-declared input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportArgument {
    /// File or directory
    pub path: PathBuf,

    /// Optional name for the table fed by this import
    #[serde(default)]
    pub alias: Option<String>,

    /// Declared format; inferred from the extension when absent
    #[serde(default)]
    pub format: Option<ImportFormat>,

    /// JSON Pointer to the array of records in a hierarchical input
    #[serde(default)]
    pub items_at: Option<String>,

    /// Starting row identifier requested by this import
    #[serde(default)]
    pub initial_row_number: Option<i64>,
}

impl ImportArgument {
    /// Creates an import for the given path with everything else defaulted
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            format: None,
            items_at: None,
            initial_row_number: None,
        }
    }

    /// Sets the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the records locator
    pub fn with_items_at(mut self, items_at: impl Into<String>) -> Self {
        self.items_at = Some(items_at.into());
        self
    }

    /// Effective format of this import
    pub fn format(&self) -> ImportFormat {
        self.format.unwrap_or_else(|| ImportFormat::infer(&self.path))
    }

    /// Whether the import has to be flattened before it can be bound
    pub fn is_hierarchical(&self) -> bool {
        self.format() == ImportFormat::Json
    }

    /// Records locator, defaulting to the document root
    pub fn items_at(&self) -> &str {
        self.items_at.as_deref().unwrap_or("/")
    }

    /// Returns a tabular import pointing at the converted file
    ///
    /// Everything except the path and the format carries over.
    pub fn with_converted_path(&self, converted: impl Into<PathBuf>) -> Self {
        Self {
            path: converted.into(),
            format: Some(ImportFormat::Csv),
            ..self.clone()
        }
    }
}

/// One user-declared output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArgument {
    /// Output file, or output directory for per-subpart dispatch
    pub path: PathBuf,

    /// SQL to run; the default query is used when absent
    #[serde(default)]
    pub sql: Option<String>,

    /// Requested output formats
    #[serde(default = "default_formats")]
    pub formats: BTreeSet<ExportFormat>,

    /// Run the query once per input subpart instead of once overall
    #[serde(default)]
    pub query_per_input_subpart: bool,
}

impl ExportArgument {
    /// Creates an export; a `.json` destination requests JSON only
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = if has_extension(&path, "json") {
            ExportFormat::Json
        } else {
            ExportFormat::Csv
        };
        Self {
            path,
            sql: None,
            formats: BTreeSet::from([format]),
            query_per_input_subpart: false,
        }
    }

    /// Sets the SQL query
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Enables per-subpart dispatch
    pub fn per_input_subpart(mut self) -> Self {
        self.query_per_input_subpart = true;
        self
    }

    /// Adds an output format
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.formats.insert(format);
        self
    }

    pub fn wants_csv(&self) -> bool {
        self.formats.contains(&ExportFormat::Csv)
    }

    pub fn wants_json(&self) -> bool {
        self.formats.contains(&ExportFormat::Json)
    }

    /// True when the export only asks to move data into a CSV, with no query
    pub fn is_plain_csv(&self) -> bool {
        self.sql.is_none() && self.formats.len() == 1 && self.wants_csv()
    }
}

fn default_formats() -> BTreeSet<ExportFormat> {
    BTreeSet::from([ExportFormat::Csv])
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_format_inferred_from_extension() {
        assert!(ImportArgument::new("data/items.JSON").is_hierarchical());
        assert!(!ImportArgument::new("data/items.csv").is_hierarchical());
        assert!(!ImportArgument::new("data/").is_hierarchical());
    }

    #[test]
    fn test_with_converted_path_keeps_other_fields() {
        let import = ImportArgument::new("in/people.json")
            .with_alias("people")
            .with_items_at("/data");
        let converted = import.with_converted_path("work/people.csv");

        assert_eq!(converted.path, PathBuf::from("work/people.csv"));
        assert_eq!(converted.format(), ImportFormat::Csv);
        assert_eq!(converted.alias.as_deref(), Some("people"));
        assert_eq!(converted.items_at(), "/data");
        // The original value is untouched
        assert!(import.is_hierarchical());
    }

    #[test]
    fn test_export_defaults() {
        let export = ExportArgument::new("out/result.csv");
        assert!(export.is_plain_csv());
        assert!(!export.query_per_input_subpart);

        let export = ExportArgument::new("out/result.json");
        assert!(export.wants_json());
        assert!(!export.wants_csv());
        assert!(!export.is_plain_csv());

        let export = ExportArgument::new("out/result.csv").with_sql("SELECT 1");
        assert!(!export.is_plain_csv());
    }

    #[test]
    fn test_export_deserialize_defaults() {
        let export: ExportArgument = toml::from_str("path = \"out.csv\"").unwrap();
        assert_eq!(export.formats, BTreeSet::from([ExportFormat::Csv]));
        assert!(export.sql.is_none());
    }
}
