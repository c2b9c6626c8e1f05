//! Whole-row set operations over files
//!
//! Rows are compared as raw record bytes. The result keeps the distinct rows of the
//! first file, in that file's order.

use super::lines::{FilteredFile, LineFilter, RawRecord};
use crate::domain::Result;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    /// Rows of the first file present in every other file
    Intersect,
    /// Rows of the first file absent from all other files
    Except,
}

/// Apply `op` to `files`; `None` when the first file has no header
pub fn combine_rows(files: &[PathBuf], op: SetOperation, filter: &LineFilter) -> Result<Option<FilteredFile>> {
    let Some((first, others)) = files.split_first() else {
        return Ok(None);
    };
    let first = filter.read(first)?;
    if first.header.is_none() {
        return Ok(None);
    }

    let other_rows = others
        .iter()
        .map(|file| Ok(filter.read(file)?.rows.into_iter().collect::<HashSet<RawRecord>>()))
        .collect::<Result<Vec<_>>>()?;

    let mut emitted = HashSet::new();
    let rows = first
        .rows
        .into_iter()
        .filter(|row| match op {
            SetOperation::Intersect => other_rows.iter().all(|set| set.contains(row)),
            SetOperation::Except => !other_rows.iter().any(|set| set.contains(row)),
        })
        .filter(|row| emitted.insert(row.clone()))
        .collect();

    Ok(Some(FilteredFile {
        header: first.header,
        rows,
    }))
}
