//! Input subparts and output parts
//!
//! An [`InputSubpart`] is one logical input bound to exactly one table. It may
//! be combined from several raw files. An [`OutputPart`] is one physical
//! output file together with the input table it is keyed to.

use super::errors::CruncherError;
use super::options::CombineMode;
use super::result::Result;
use super::table::{table_name_for_file, normalize_table_name, ColumnSpec};
use std::path::{Path, PathBuf};

/// One logical input unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSubpart {
    /// The declared import this subpart came from, when there is exactly one
    pub original_input_path: Option<PathBuf>,

    /// The file actually bound to the table
    pub combined_file: PathBuf,

    /// Raw files feeding this subpart, in order
    pub combined_from: Vec<PathBuf>,

    /// Strategy that produced the combined file
    pub combined_by: Option<CombineMode>,

    /// Table name requested by the user
    pub alias: Option<String>,

    table_name: Option<String>,
}

impl InputSubpart {
    /// A subpart made of a single, untouched file
    pub fn trivial(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            original_input_path: Some(path.clone()),
            combined_file: path.clone(),
            combined_from: vec![path],
            combined_by: None,
            alias: None,
            table_name: None,
        }
    }

    /// A subpart produced by combining several files
    pub fn combined(combined_file: PathBuf, combined_from: Vec<PathBuf>, mode: CombineMode) -> Self {
        Self {
            original_input_path: None,
            combined_file,
            combined_from,
            combined_by: Some(mode),
            alias: None,
            table_name: None,
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    /// Table name this subpart asks for, before collision checks
    pub fn derived_table_name(&self) -> String {
        match &self.alias {
            Some(alias) => normalize_table_name(alias),
            None => table_name_for_file(&self.combined_file),
        }
    }

    /// Table name assigned by the orchestrator, if bound
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Assigns the table name; a subpart is bound to exactly one table
    pub fn assign_table_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(existing) = &self.table_name {
            return Err(CruncherError::Configuration(format!(
                "Subpart {} is already bound to table {existing}, can't rebind it to {name}",
                self.combined_file.display()
            )));
        }
        self.table_name = Some(name);
        Ok(())
    }
}

/// One physical output of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPart {
    /// CSV file the output table is bound to
    pub output_file: PathBuf,

    /// Input table the generic SQL is bound to, if any
    pub input_table: Option<String>,

    /// Name of the table holding the results
    pub output_table: String,

    /// SQL actually executed, after placeholder substitution
    pub sql: Option<String>,

    /// Result columns discovered by the probe query
    pub columns: Vec<ColumnSpec>,
}

impl OutputPart {
    pub fn new(output_file: PathBuf, input_table: Option<String>, output_table: String) -> Self {
        Self {
            output_file,
            input_table,
            output_table,
            sql: None,
            columns: Vec::new(),
        }
    }

    /// Base name for the output table, derived from the output file
    pub fn output_table_base(output_file: &Path) -> String {
        format!("output_{}", table_name_for_file(output_file))
    }

    /// Where the JSON rendition of this output goes: `.csv` swapped for `.json`
    pub fn json_file(&self) -> PathBuf {
        let as_string = self.output_file.to_string_lossy();
        let cut = as_string.len().saturating_sub(4);
        let stem = match as_string.get(cut..) {
            Some(tail) if tail.eq_ignore_ascii_case(".csv") => &as_string[..cut],
            _ => &as_string[..],
        };
        PathBuf::from(format!("{stem}.json"))
    }
}
