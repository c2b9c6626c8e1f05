//! Run orchestration
//!
//! The [`Cruncher`] drives one run from the declared imports to the written
//! outputs:
//!
//! 1. **Init**: open the session and run the init SQL scripts
//! 2. **Convert**: sort the imports and flatten hierarchical ones to CSV
//! 3. **Shortcut**: a single file going straight to a CSV is just relocated
//! 4. **Combine**: expand, group and combine the input files into subparts
//! 5. **Bind**: claim every table name, then create one input table per subpart
//! 6. **Dispatch**: run the export query once, or once per subpart
//! 7. **Teardown**: detach all tables and release the session, whatever happened
//!
//! # Example
//!
//! ```rust,no_run
//! use cruncher::config::load_config;
//! use cruncher::core::pipeline::Cruncher;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cruncher.toml")?;
//! let summary = Cruncher::new(config)?.run()?;
//!
//! println!("Rows written: {}", summary.total_rows());
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod dispatch;
pub mod session;
pub mod sql;
pub mod summary;

pub use dispatch::DispatchOptions;
pub use session::{prepare_session_dir, Session, SESSION_DIR_NAME};
pub use sql::{DEFAULT_SQL, TABLE_PLACEHOLDER};
pub use summary::{RunSummary, WrittenOutput};

use crate::adapters::engine::{SqlEngine, SqliteEngine};
use crate::adapters::json::{Flattener, JsonExporter, JsonFlattener, ResultExporter};
use crate::config::{CruncherConfig, OutputConfig};
use crate::core::combine::{combine_input_files, validate_input_files, LineFilter};
use crate::core::inputs::{expand_filter_sort_groups, sort_imports, GroupingOptions, PathFilter};
use crate::core::numbering::IdentifierAllocator;
use crate::core::registry::NameRegistry;
use crate::domain::context::ResultExt;
use crate::domain::{CruncherError, ExportArgument, ImportArgument, InputSubpart, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Directory under the session dir holding flattened hierarchical inputs
const CONVERTED_DIR: &str = "converted";

/// Coordinates one run
pub struct Cruncher {
    config: CruncherConfig,
    session: Session,
    flattener: Box<dyn Flattener>,
    exporter: Box<dyn ResultExporter>,
    registry: NameRegistry,
}

impl Cruncher {
    /// Create a cruncher backed by an SQLite session under `db_path`
    pub fn new(config: CruncherConfig) -> Result<Self> {
        Self::with_engine(config, |dir| {
            let engine: Box<dyn SqlEngine> = Box::new(SqliteEngine::open(dir)?);
            Ok(engine)
        })
    }

    /// Create a cruncher whose engine is opened by `open` in the fresh session directory
    pub fn with_engine<F>(config: CruncherConfig, open: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> Result<Box<dyn SqlEngine>>,
    {
        config.validate().map_err(CruncherError::Configuration)?;

        let dir = prepare_session_dir(&config.application.db_path)
            .with_context(|| format!("Preparing session under {}", config.application.db_path.display()))?;
        let engine = open(&dir)?;
        tracing::debug!(dir = %dir.display(), "Database session opened");

        let session = Session::new(engine, dir, config.application.keep_work_files);
        Ok(Self {
            config,
            session,
            flattener: Box::new(JsonFlattener::new()),
            exporter: Box::new(JsonExporter::new()),
            registry: NameRegistry::new(),
        })
    }

    pub fn session_dir(&self) -> &Path {
        self.session.dir()
    }

    /// Execute the run and tear the session down
    ///
    /// Teardown failures are reported in the summary on success. On failure
    /// they are only logged; the pipeline's error is returned.
    pub fn run(mut self) -> Result<RunSummary> {
        let start_time = Instant::now();
        tracing::info!("Starting crunch");

        let outcome = self.crunch();
        let teardown_failures = self.session.teardown();

        let mut summary = outcome?;
        summary.teardown_failures = teardown_failures;
        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn crunch(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();

        let export = check_exports_and_imports(&self.config)?.clone();
        self.run_init_scripts()?;

        let imports = sort_imports(self.config.imports.clone(), self.config.input.sort_input_paths)?;
        let imports = self.convert_hierarchical(imports)?;

        let allocator = allocator_for(&self.config.output, &imports);
        let line_filter = LineFilter::new(
            self.config.input.ignore_first_lines,
            self.config.input.ignore_lines_matching.as_deref(),
        )?;

        let work_dir = self.session.dir().to_path_buf();
        if let Some(source) = shortcut_source(&imports, &export, &work_dir, allocator.is_some(), &line_filter) {
            self.relocate(source, &export)?;
            summary.shortcut = true;
            return Ok(summary);
        }

        let grouping = GroupingOptions {
            filter: PathFilter::new(
                self.config.input.include.as_deref(),
                self.config.input.exclude.as_deref(),
                self.config.input.skip_non_readable,
            )?,
            combine_dirs: self.config.input.combine_dirs,
            sort_input_paths: self.config.input.sort_input_paths,
            sort_file_groups: self.config.input.sort_file_groups,
        };
        let paths: Vec<PathBuf> = imports.iter().map(|i| i.path.clone()).collect();
        let groups = expand_filter_sort_groups(&paths, &grouping)?;

        let subparts = combine_input_files(
            &groups,
            self.config.input.combine,
            &line_filter,
            &work_dir,
            &mut self.registry,
        )?;
        let mut subparts = apply_aliases(subparts, &imports);

        if subparts.is_empty() {
            tracing::warn!(imports = imports.len(), "No input files found, nothing to do");
            return Ok(summary);
        }
        tracing::debug!(subparts = subparts.len(), "Input subparts");

        validate_input_files(&subparts)?;
        sql::check_global_placeholder(&export, subparts.len())?;

        binding::claim_table_names(&mut subparts, &mut self.registry)?;
        binding::bind_subparts(&mut self.session, &subparts, self.config.application.overwrite)?;
        summary.subparts = subparts.len();
        summary.input_tables = self.session.input_tables().to_vec();

        let mut allocator = allocator;
        let options = DispatchOptions {
            overwrite: self.config.application.overwrite,
            keep_work_files: self.config.application.keep_work_files,
            json_layout: self.config.output.json_layout,
        };
        let mut parts = dispatch::plan_outputs(&export, &subparts, &mut self.registry)?;
        for part in parts.iter_mut() {
            let written = dispatch::execute_part(
                &mut self.session,
                self.exporter.as_ref(),
                &export,
                part,
                allocator.as_mut(),
                options,
            )?;
            summary.outputs.push(written);
        }
        Ok(summary)
    }

    fn run_init_scripts(&mut self) -> Result<()> {
        for script in &self.config.output.init_sql {
            tracing::info!(script = %script.display(), "Running init SQL");
            let sql = fs::read_to_string(script)
                .with_context(|| format!("Reading init SQL {}", script.display()))?;
            self.session
                .engine()
                .execute_script(&sql)
                .with_context(|| format!("Running init SQL {}", script.display()))?;
        }
        Ok(())
    }

    /// Flatten every hierarchical import into the session's converted dir
    fn convert_hierarchical(&mut self, imports: Vec<ImportArgument>) -> Result<Vec<ImportArgument>> {
        let converted_dir = self.session.dir().join(CONVERTED_DIR);
        let mut converted = Vec::with_capacity(imports.len());

        for import in imports {
            if !import.is_hierarchical() {
                converted.push(import);
                continue;
            }
            let stem = import
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "converted".to_string());
            fs::create_dir_all(&converted_dir)?;
            let destination = self
                .registry
                .non_used_path(&converted_dir.join(format!("{stem}.csv")), true);

            tracing::info!(
                source = %import.path.display(),
                items_at = import.items_at(),
                target = %destination.display(),
                "Converting JSON input"
            );
            let written = self
                .flattener
                .convert(&import.path, import.items_at(), &destination)
                .with_context(|| format!("Converting {}", import.path.display()))?;
            converted.push(import.with_converted_path(written));
        }
        Ok(converted)
    }

    /// Put the single input at the export destination without any table
    fn relocate(&self, source: Relocation<'_>, export: &ExportArgument) -> Result<()> {
        let target = binding::absolute(&export.path)?;
        if target.exists() && !self.config.application.overwrite {
            return Err(CruncherError::Io(format!(
                "Output file already exists: {}",
                target.display()
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory {}", parent.display()))?;
        }

        match source {
            Relocation::Move(file) => {
                tracing::info!(from = %file.display(), to = %target.display(), "Moving converted input to output");
                if fs::rename(file, &target).is_err() {
                    fs::copy(file, &target)
                        .with_context(|| format!("Copying {} to {}", file.display(), target.display()))?;
                    fs::remove_file(file)?;
                }
            }
            Relocation::Copy(file) => {
                tracing::info!(from = %file.display(), to = %target.display(), "Copying input to output");
                fs::copy(file, &target)
                    .with_context(|| format!("Copying {} to {}", file.display(), target.display()))?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Cruncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cruncher")
            .field("session", &self.session)
            .field("imports", &self.config.imports.len())
            .field("exports", &self.config.exports.len())
            .finish()
    }
}

/// How the shortcut puts the single input in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relocation<'a> {
    /// An intermediate produced by the run
    Move(&'a Path),
    /// A user's file, which must survive the run
    Copy(&'a Path),
}

fn check_exports_and_imports(config: &CruncherConfig) -> Result<&ExportArgument> {
    let export = sql::check_exports(&config.exports)?;
    if config.imports.is_empty() {
        return Err(CruncherError::Configuration(
            "No import given, nothing to read".to_string(),
        ));
    }
    Ok(export)
}

/// The input to relocate when the run needs no database work at all
fn shortcut_source<'a>(
    imports: &'a [ImportArgument],
    export: &ExportArgument,
    work_dir: &Path,
    numbered: bool,
    line_filter: &LineFilter,
) -> Option<Relocation<'a>> {
    let [import] = imports else {
        return None;
    };
    if !import.path.is_file()
        || !export.is_plain_csv()
        || export.query_per_input_subpart
        || numbered
        || line_filter.is_active()
    {
        return None;
    }

    Some(if import.path.starts_with(work_dir) {
        Relocation::Move(&import.path)
    } else {
        Relocation::Copy(&import.path)
    })
}

/// Id allocator for the run, when numbering is enabled
///
/// The seed is the global initial row number, else the first import's own,
/// else derived from the current time.
fn allocator_for(output: &OutputConfig, imports: &[ImportArgument]) -> Option<IdentifierAllocator> {
    let import_seed = imports.iter().find_map(|i| i.initial_row_number);
    if !output.numbered() && import_seed.is_none() {
        return None;
    }
    let allocator = IdentifierAllocator::starting_at(output.initial_row_number.or(import_seed));
    tracing::debug!(start = allocator.start(), "Row numbering enabled");
    Some(allocator)
}

/// Carry an import's alias to the single-file subpart it produced
fn apply_aliases(subparts: Vec<InputSubpart>, imports: &[ImportArgument]) -> Vec<InputSubpart> {
    subparts
        .into_iter()
        .map(|subpart| {
            let alias = subpart.original_input_path.as_ref().and_then(|original| {
                imports
                    .iter()
                    .find(|i| i.alias.is_some() && &i.path == original)
                    .and_then(|i| i.alias.clone())
            });
            match alias {
                Some(alias) => subpart.with_alias(Some(alias)),
                None => subpart,
            }
        })
        .collect()
}
