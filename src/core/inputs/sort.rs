//! Ordering of imports, files and file groups

use super::FileGroup;
use crate::domain::{ImportArgument, Result, SortPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Order declared imports by `policy`
pub fn sort_imports(imports: Vec<ImportArgument>, policy: SortPolicy) -> Result<Vec<ImportArgument>> {
    match policy {
        SortPolicy::ParamsOrder => Ok(imports),
        SortPolicy::Alpha => {
            let mut imports = imports;
            imports.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(imports)
        }
        SortPolicy::Time => {
            let mut keyed = imports
                .into_iter()
                .map(|import| Ok((modified(&import.path)?, import)))
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| a.path.cmp(&b.path)));
            Ok(keyed.into_iter().map(|(_, import)| import).collect())
        }
    }
}

/// Order the files of one group by `policy`
pub fn sort_paths(paths: &mut Vec<PathBuf>, policy: SortPolicy) -> Result<()> {
    match policy {
        SortPolicy::ParamsOrder => {}
        SortPolicy::Alpha => paths.sort(),
        SortPolicy::Time => {
            let mut keyed = paths
                .drain(..)
                .map(|p| Ok((modified(&p)?, p)))
                .collect::<Result<Vec<_>>>()?;
            keyed.sort();
            paths.extend(keyed.into_iter().map(|(_, p)| p));
        }
    }
    Ok(())
}

/// Order groups by `policy`
///
/// Alpha compares group keys (the key-less group first); time compares the
/// newest file of each group.
pub fn sort_groups(groups: &mut Vec<FileGroup>, policy: SortPolicy) -> Result<()> {
    match policy {
        SortPolicy::ParamsOrder => {}
        SortPolicy::Alpha => groups.sort_by(|a, b| a.key.cmp(&b.key)),
        SortPolicy::Time => {
            let mut keyed = groups
                .drain(..)
                .map(|group| {
                    let mut newest = SystemTime::UNIX_EPOCH;
                    for file in &group.files {
                        newest = newest.max(modified(file)?);
                    }
                    Ok((newest, group))
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| a.key.cmp(&b.key)));
            groups.extend(keyed.into_iter().map(|(_, group)| group));
        }
    }
    Ok(())
}
