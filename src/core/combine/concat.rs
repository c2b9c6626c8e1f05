use super::lines::{FilteredFile, LineFilter};
use crate::domain::Result;
use std::path::PathBuf;

/// Concatenate files: the first header, then every file's rows in order
///
/// Returns `None` when no file has a header.
pub fn concat(files: &[PathBuf], filter: &LineFilter) -> Result<Option<FilteredFile>> {
    let mut combined: Option<FilteredFile> = None;

    for file in files {
        let FilteredFile { header, rows } = filter.read(file)?;
        let Some(header) = header else {
            tracing::debug!(file = %file.display(), "Skipping empty file");
            continue;
        };
        if let Some(combined) = combined.as_mut() {
            combined.rows.extend(rows);
        } else {
            combined = Some(FilteredFile {
                header: Some(header),
                rows,
            });
        }
    }
    Ok(combined)
}
