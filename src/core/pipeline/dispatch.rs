//! Running the export query over one or many output parts
//!
//! Global dispatch produces one output for the whole run. Per-subpart dispatch
//! produces one output per input table, next to each other in the export
//! directory.

use super::binding::absolute;
use super::session::Session;
use super::sql::{bind_placeholder, effective_sql};
use super::summary::WrittenOutput;
use crate::adapters::json::ResultExporter;
use crate::core::numbering::{plain_insert, IdentifierAllocator};
use crate::core::registry::NameRegistry;
use crate::domain::context::ResultExt;
use crate::domain::table::quote_identifier;
use crate::domain::{CruncherError, ExportArgument, InputSubpart, JsonLayout, OutputPart, Result};
use std::fs;
use std::path::PathBuf;

/// How the outputs of one export are produced
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    pub overwrite: bool,
    pub keep_work_files: bool,
    pub json_layout: JsonLayout,
}

/// Output parts for `export` over the bound `subparts`
///
/// Output table names are claimed from the registry, suffixed when taken.
pub fn plan_outputs(
    export: &ExportArgument,
    subparts: &[InputSubpart],
    registry: &mut NameRegistry,
) -> Result<Vec<OutputPart>> {
    let mut parts = Vec::new();

    if !export.query_per_input_subpart {
        let output_file = csv_output_file(absolute(&export.path)?);
        let input_table = match subparts {
            [only] => only.table_name().map(str::to_string),
            _ => None,
        };
        let output_table = registry.claim_unique(
            &OutputPart::output_table_base(&output_file),
            &output_file.display().to_string(),
        );
        parts.push(OutputPart::new(output_file, input_table, output_table));
        return Ok(parts);
    }

    let export_dir = absolute(&export.path)?;
    for subpart in subparts {
        let Some(file_name) = subpart.combined_file.file_name() else {
            return Err(CruncherError::Configuration(format!(
                "Can't derive an output file name from {}",
                subpart.combined_file.display()
            )));
        };
        let output_file = registry.non_used_path(&export_dir.join(file_name), false);
        let output_table = registry.claim_unique(
            &OutputPart::output_table_base(&output_file),
            &output_file.display().to_string(),
        );
        parts.push(OutputPart::new(
            output_file,
            subpart.table_name().map(str::to_string),
            output_table,
        ));
    }
    Ok(parts)
}

/// The CSV file behind a global output; a `.json` destination gets a `.csv` sibling
fn csv_output_file(path: PathBuf) -> PathBuf {
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        path.with_extension("csv")
    } else {
        path
    }
}

/// Run the export query for one part and write its files
///
/// With an allocator, the output table gets the id column first and the
/// allocator moves past the inserted rows.
pub fn execute_part(
    session: &mut Session,
    exporter: &dyn ResultExporter,
    export: &ExportArgument,
    part: &mut OutputPart,
    allocator: Option<&mut IdentifierAllocator>,
    options: DispatchOptions,
) -> Result<WrittenOutput> {
    let template = effective_sql(export);
    let sql = match &part.input_table {
        Some(table) => bind_placeholder(template, table),
        None => template.to_string(),
    };
    tracing::debug!(output = %part.output_file.display(), sql = %sql, "Output part");

    if let Some(parent) = part.output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {}", parent.display()))?;
    }

    part.columns = session.engine().probe_columns(&sql)?;
    let mut table_columns = Vec::with_capacity(part.columns.len() + 1);
    if allocator.is_some() {
        table_columns.push(IdentifierAllocator::column());
    }
    table_columns.extend(part.columns.iter().cloned());

    tracing::info!(file = %part.output_file.display(), table = %part.output_table, "CSV output");
    session.create_output_table(&part.output_table, &table_columns, &part.output_file, options.overwrite)?;

    let (insert, first_id) = match &allocator {
        Some(allocator) => (
            allocator.numbered_insert(&part.output_table, &sql),
            Some(allocator.next_value()),
        ),
        None => (plain_insert(&part.output_table, &sql), None),
    };
    part.sql = Some(sql);
    tracing::debug!(sql = %insert, "Executing user SQL");
    let inserted = session.engine().execute(&insert)?;
    tracing::debug!(rows = inserted, "Affected rows");
    if let Some(allocator) = allocator {
        allocator.advance(inserted);
    }

    let rows = session.engine().flush_table(&part.output_table)?;
    let mut written = WrittenOutput {
        table: part.output_table.clone(),
        csv_file: Some(part.output_file.clone()),
        json_file: None,
        rows,
        id_range: first_id
            .filter(|_| inserted > 0)
            .map(|first| (first, first + inserted as i64 - 1)),
    };

    if export.wants_json() {
        let json_file = part.json_file();
        if json_file.exists() && !options.overwrite {
            return Err(CruncherError::Io(format!(
                "Output file already exists: {}",
                json_file.display()
            )));
        }
        tracing::info!(file = %json_file.display(), "JSON output");
        let result = session
            .engine()
            .query(&format!("SELECT * FROM {}", quote_identifier(&part.output_table)))?;
        exporter.convert(&result, &json_file, options.json_layout == JsonLayout::Array)?;
        written.json_file = Some(json_file);

        if !export.wants_csv() && !options.keep_work_files {
            fs::remove_file(&part.output_file)
                .with_context(|| format!("Removing {}", part.output_file.display()))?;
            written.csv_file = None;
        }
    }
    Ok(written)
}
