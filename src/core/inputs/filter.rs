//! Input path expansion
//!
//! A declared file is taken as is. A declared directory is walked recursively
//! and its entries are filtered by the include and exclude regexes.

use crate::domain::{CruncherError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Files picked from input directories by default
pub const DEFAULT_INCLUDE: &str = r"(?i)\.csv$";

#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Regex,
    exclude: Option<Regex>,
    skip_non_readable: bool,
}

impl PathFilter {
    /// # Errors
    ///
    /// Returns a configuration error if either regex is invalid.
    pub fn new(include: Option<&str>, exclude: Option<&str>, skip_non_readable: bool) -> Result<Self> {
        let include = Regex::new(include.unwrap_or(DEFAULT_INCLUDE))?;
        let exclude = exclude.map(Regex::new).transpose()?;
        Ok(Self {
            include,
            exclude,
            skip_non_readable,
        })
    }

    /// Whether a directory entry is picked, matching against the full path
    pub fn accepts(&self, path: &Path) -> bool {
        let as_string = path.to_string_lossy();
        if !self.include.is_match(&as_string) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(&as_string),
            None => true,
        }
    }

    /// Expand one declared path into the files it stands for
    ///
    /// Directory entries come out in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, a directory can't be
    /// listed, or a file can't be read and unreadable files are not skipped.
    pub fn expand(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if path.is_dir() {
            self.walk(path, &mut files, &mut HashSet::new())?;
        } else if path.exists() {
            if self.is_readable(path)? {
                files.push(path.to_path_buf());
            }
        } else {
            return Err(CruncherError::Io(format!(
                "Input path does not exist: {}",
                path.display()
            )));
        }
        Ok(files)
    }

    // Each directory is visited once, so symlink loops end
    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>, visited: &mut HashSet<PathBuf>) -> Result<()> {
        if !visited.insert(fs::canonicalize(dir)?) {
            tracing::debug!(dir = %dir.display(), "Directory already visited, skipping");
            return Ok(());
        }
        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for entry in entries {
            if entry.is_dir() {
                self.walk(&entry, files, visited)?;
            } else if self.accepts(&entry) && self.is_readable(&entry)? {
                files.push(entry);
            }
        }
        Ok(())
    }

    fn is_readable(&self, path: &Path) -> Result<bool> {
        match File::open(path) {
            Ok(_) => Ok(true),
            Err(e) if self.skip_non_readable => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping non-readable input file");
                Ok(false)
            }
            Err(e) => Err(CruncherError::Io(format!(
                "Can't read input file {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_filter() -> PathFilter {
        PathFilter::new(None, None, false).unwrap()
    }

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "a\n1\n").unwrap();
        path
    }

    #[test]
    fn test_default_include_picks_csv_only() {
        let filter = default_filter();
        assert!(filter.accepts(Path::new("data/a.csv")));
        assert!(filter.accepts(Path::new("data/A.CSV")));
        assert!(!filter.accepts(Path::new("data/a.json")));
        assert!(!filter.accepts(Path::new("data/a.csv.bak")));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = PathFilter::new(None, Some(".*/LOAD.*"), false).unwrap();
        assert!(filter.accepts(Path::new("in/data.csv")));
        assert!(!filter.accepts(Path::new("in/LOAD_1.csv")));
    }

    #[test]
    fn test_invalid_regex_is_configuration_error() {
        let err = PathFilter::new(Some("(oops"), None, false).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_expand_walks_recursively_in_order() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "b.csv");
        let a = touch(dir.path(), "sub/a.csv");
        touch(dir.path(), "notes.txt");
        let c = touch(dir.path(), "a.csv");

        let files = default_filter().expand(dir.path()).unwrap();
        assert_eq!(files, vec![c, b, a]);
    }

    #[test]
    fn test_expand_takes_declared_file_as_is() {
        let dir = TempDir::new().unwrap();
        let txt = touch(dir.path(), "data.txt");

        let files = default_filter().expand(&txt).unwrap();
        assert_eq!(files, vec![txt]);
    }

    #[test]
    fn test_expand_missing_path() {
        let err = default_filter()
            .expand(Path::new("/no/such/input/dir"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_survives_a_symlink_loop() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "in/a.csv");
        std::os::unix::fs::symlink(dir.path().join("in"), dir.path().join("in/back")).unwrap();

        let files = default_filter().expand(&dir.path().join("in")).unwrap();
        assert_eq!(files, vec![a]);
    }
}
