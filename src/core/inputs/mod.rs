//! Grouping and ordering of input files
//!
//! Turns the declared input paths into ordered groups of files. Each group
//! later becomes one combined input.
//!
//! # Grouping
//!
//! | Policy             | Group key                                             |
//! |--------------------|-------------------------------------------------------|
//! | `AllFiles`         | none, a single group                                  |
//! | `PerInputDir`      | the declared directory (parent dir for a file import) |
//! | `PerInputSubdir`   | first-level subdirectory of the declared directory    |
//! | `PerEachDir`       | the directory holding the file                        |

pub mod filter;
pub mod sort;

pub use filter::{PathFilter, DEFAULT_INCLUDE};
pub use sort::{sort_groups, sort_imports, sort_paths};

use crate::domain::{CombineDirectories, Result, SortPolicy};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Files that end up in one combined input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    /// Directory the group stands for; `None` for the all-files group
    pub key: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl FileGroup {
    pub fn new(key: Option<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self { key, files }
    }

    /// Name for the combined file: the key's directory name, else the first file's stem
    pub fn combined_name(&self) -> String {
        self.key
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.files.first().and_then(|f| f.file_stem()))
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "combined".to_string())
    }
}

/// How input paths are expanded, grouped and ordered
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    pub filter: PathFilter,
    pub combine_dirs: CombineDirectories,
    pub sort_input_paths: SortPolicy,
    pub sort_file_groups: SortPolicy,
}

/// Expand, filter, group and sort the declared input paths
///
/// A file reached from several declared paths is kept once, in its first group.
///
/// # Errors
///
/// Returns an error if a path can't be expanded or its modification time read.
pub fn expand_filter_sort_groups(inputs: &[PathBuf], options: &GroupingOptions) -> Result<Vec<FileGroup>> {
    let mut groups: Vec<FileGroup> = Vec::new();
    let mut index: HashMap<Option<PathBuf>, usize> = HashMap::new();
    let mut seen = std::collections::HashSet::new();

    for input in inputs {
        let files = options.filter.expand(input)?;
        tracing::debug!(input = %input.display(), files = files.len(), "Expanded input path");

        for file in files {
            if !seen.insert(file.clone()) {
                continue;
            }
            let key = group_key(options.combine_dirs, input, &file);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(FileGroup::new(key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].files.push(file);
        }
    }

    for group in &mut groups {
        sort_paths(&mut group.files, options.sort_input_paths)?;
    }
    sort_groups(&mut groups, options.sort_file_groups)?;
    Ok(groups)
}

fn group_key(policy: CombineDirectories, input: &Path, file: &Path) -> Option<PathBuf> {
    let parent = || file.parent().map(Path::to_path_buf);
    match policy {
        CombineDirectories::AllFiles => None,
        CombineDirectories::PerEachDir => parent(),
        CombineDirectories::PerInputDir => {
            if input.is_dir() {
                Some(input.to_path_buf())
            } else {
                parent()
            }
        }
        CombineDirectories::PerInputSubdir => {
            if !input.is_dir() {
                return parent();
            }
            let relative = file.strip_prefix(input).ok()?;
            let mut components = relative.components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(subdir)), Some(_)) => Some(input.join(subdir)),
                _ => Some(input.to_path_buf()),
            }
        }
    }
}
