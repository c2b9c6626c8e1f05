//! Names used during one run
//!
//! Table names must be pairwise distinct across the whole run and output files
//! of a per-subpart dispatch must not overwrite each other. The registry is
//! created per run and passed to whoever needs to claim a name.

use crate::domain::{CruncherError, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct NameRegistry {
    /// Claimed table name → what it was derived from
    names: HashMap<String, String>,
    paths: HashSet<PathBuf>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `owner`
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming both owners if `name` was already claimed.
    pub fn claim(&mut self, name: &str, owner: &str) -> Result<()> {
        if let Some(previous) = self.names.get(name) {
            return Err(CruncherError::Configuration(format!(
                "File names normalized to table names collide: '{name}' is derived from both {previous} and {owner}"
            )));
        }
        self.names.insert(name.to_string(), owner.to_string());
        Ok(())
    }

    /// Claim `base`, or the first free of `base_1`, `base_2`, ...
    pub fn claim_unique(&mut self, base: &str, owner: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 0;
        while self.names.contains_key(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.names.insert(candidate.clone(), owner.to_string());
        candidate
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Claim a file path not used before in this run
    ///
    /// On collision, `_1`, `_2`, ... is inserted before the extension:
    /// `out/data.csv` → `out/data_1.csv`. Paths already present on disk are
    /// skipped too when `avoid_existing` is set.
    pub fn non_used_path(&mut self, path: &Path, avoid_existing: bool) -> PathBuf {
        let taken = |p: &Path, paths: &HashSet<PathBuf>| {
            paths.contains(p) || (avoid_existing && p.exists())
        };

        let mut candidate = path.to_path_buf();
        let mut n = 0;
        while taken(&candidate, &self.paths) {
            n += 1;
            candidate = suffixed(path, n);
        }
        self.paths.insert(candidate.clone());
        candidate
    }
}

fn suffixed(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    path.with_file_name(file_name)
}
