//! Input combination
//!
//! Turns groups of files into [`InputSubpart`]s, one per table:
//!
//! - `None`: every file is its own subpart
//! - `Concat`: the group's files are concatenated under the first header
//! - `Intersect` / `Except`: whole-row set operations over the group's files
//!
//! Combined files are written to `<work_dir>/<mode>/<group name>.csv` and
//! always carry exactly one header row.

pub mod concat;
pub mod lines;
pub mod set_ops;

pub use lines::{FilteredFile, LineFilter};
pub use set_ops::SetOperation;

use crate::core::inputs::FileGroup;
use crate::core::registry::NameRegistry;
use crate::domain::context::ResultExt;
use crate::domain::{CombineMode, CruncherError, InputSubpart, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Directory under the work dir holding filtered copies of uncombined files
const FILTERED_DIR: &str = "filtered";

/// Combine grouped files into subparts, in group order
///
/// Groups without any header produce no subpart.
pub fn combine_input_files(
    groups: &[FileGroup],
    mode: CombineMode,
    filter: &LineFilter,
    work_dir: &Path,
    registry: &mut NameRegistry,
) -> Result<Vec<InputSubpart>> {
    let mut subparts = Vec::new();

    for group in groups {
        if mode == CombineMode::None {
            for file in &group.files {
                let subpart = trivial_subpart(file, subparts.len(), filter, work_dir)?;
                subparts.push(subpart);
            }
            continue;
        }

        let combined = match mode {
            CombineMode::Intersect => set_ops::combine_rows(&group.files, SetOperation::Intersect, filter)?,
            CombineMode::Except => set_ops::combine_rows(&group.files, SetOperation::Except, filter)?,
            _ => concat::concat(&group.files, filter)?,
        };
        let Some(combined) = combined else {
            tracing::warn!(
                group = %group.combined_name(),
                files = group.files.len(),
                "No header found in any file of the group, skipping it"
            );
            continue;
        };

        let target = work_dir
            .join(mode.as_str())
            .join(format!("{}.csv", group.combined_name()));
        let target = registry.non_used_path(&target, true);
        write_lines(&target, &combined)?;

        tracing::info!(
            file = %target.display(),
            from = group.files.len(),
            rows = combined.rows.len(),
            mode = %mode,
            "Combined input files"
        );
        subparts.push(InputSubpart::combined(target, group.files.clone(), mode));
    }
    Ok(subparts)
}

/// Every subpart must point at an existing regular file
///
/// # Errors
///
/// Returns a configuration error naming the first offending file.
pub fn validate_input_files(subparts: &[InputSubpart]) -> Result<()> {
    for subpart in subparts {
        let file = &subpart.combined_file;
        if !file.is_file() {
            return Err(CruncherError::Configuration(format!(
                "Input file is not a regular file or does not exist: {}",
                file.display()
            )));
        }
    }
    Ok(())
}

// A filtered copy lives in its own numbered directory and keeps the file
// name, so its table name is the one the original file would get
fn trivial_subpart(file: &Path, index: usize, filter: &LineFilter, work_dir: &Path) -> Result<InputSubpart> {
    let mut subpart = InputSubpart::trivial(file);
    if filter.is_active() {
        let filtered = filter.read(file)?;
        let name = file.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("input.csv"));
        let target = work_dir.join(FILTERED_DIR).join(index.to_string()).join(name);
        write_lines(&target, &filtered)?;
        subpart.combined_file = target;
    }
    Ok(subpart)
}

fn write_lines(target: &Path, contents: &FilteredFile) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(target)?);
        for record in contents.header.iter().chain(&contents.rows) {
            out.write_all(record)?;
            out.write_all(b"\n")?;
        }
        out.flush()
    };
    write().with_context(|| format!("Writing combined file {}", target.display()))
}
