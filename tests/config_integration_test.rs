//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use cruncher::config::{load_config, load_config_or_default};
use cruncher::domain::{CombineDirectories, CombineMode, ExportFormat, JsonLayout, SortPolicy};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("CRUNCHER_APPLICATION_LOG_LEVEL");
    std::env::remove_var("CRUNCHER_APPLICATION_DB_PATH");
    std::env::remove_var("CRUNCHER_INPUT_COMBINE");
    std::env::remove_var("CRUNCHER_OUTPUT_ROW_NUMBERS");
    std::env::remove_var("TEST_CRUNCHER_DATA_DIR");
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file(
        r#"
[application]
log_level = "debug"
db_path = "/tmp/cruncher-db"
keep_work_files = true
overwrite = true

[input]
combine = "concat"
combine_dirs = "per_input_subdir"
sort_input_paths = "time"
sort_file_groups = "alpha"
include = "(?i)\\.csv$"
exclude = ".*/LOAD.*\\.csv"
ignore_first_lines = 1
ignore_lines_matching = "^#"
skip_non_readable = true

[output]
initial_row_number = 1000
json_layout = "array"
init_sql = ["init/schema.sql"]

[logging]
local_enabled = false
local_path = "/tmp/cruncher-logs"
local_rotation = "hourly"

[[imports]]
path = "data/oauth_consumer"

[[imports]]
path = "data/items.json"
alias = "items"
items_at = "/data/items"

[[exports]]
path = "out/"
sql = "SELECT $table.* FROM $table"
query_per_input_subpart = true
formats = ["csv", "json"]
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.application.db_path, PathBuf::from("/tmp/cruncher-db"));
    assert!(config.application.keep_work_files);
    assert!(config.application.overwrite);

    assert_eq!(config.input.combine, CombineMode::Concat);
    assert_eq!(config.input.combine_dirs, CombineDirectories::PerInputSubdir);
    assert_eq!(config.input.sort_input_paths, SortPolicy::Time);
    assert_eq!(config.input.sort_file_groups, SortPolicy::Alpha);
    assert_eq!(config.input.ignore_first_lines, 1);
    assert!(config.input.skip_non_readable);

    assert!(config.output.numbered());
    assert_eq!(config.output.initial_row_number, Some(1000));
    assert_eq!(config.output.json_layout, JsonLayout::Array);
    assert_eq!(config.output.init_sql, vec![PathBuf::from("init/schema.sql")]);

    assert_eq!(config.logging.local_rotation, "hourly");

    assert_eq!(config.imports.len(), 2);
    assert_eq!(config.imports[1].alias.as_deref(), Some("items"));
    assert!(config.imports[1].is_hierarchical());
    assert_eq!(config.imports[1].items_at(), "/data/items");

    let export = &config.exports[0];
    assert!(export.query_per_input_subpart);
    assert!(export.formats.contains(&ExportFormat::Csv));
    assert!(export.formats.contains(&ExportFormat::Json));
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[[imports]]\npath = \"a.csv\"\n\n[[exports]]\npath = \"out.csv\"\n");
    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.application.db_path, PathBuf::from("cruncher_db"));
    assert!(!config.application.keep_work_files);
    assert_eq!(config.input.combine, CombineMode::None);
    assert_eq!(config.input.combine_dirs, CombineDirectories::AllFiles);
    assert_eq!(config.input.sort_input_paths, SortPolicy::ParamsOrder);
    assert!(!config.output.numbered());
    assert_eq!(config.output.json_layout, JsonLayout::EntryPerLine);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.exports[0].formats.len(), 1);
    assert!(config.exports[0].wants_csv());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_CRUNCHER_DATA_DIR", "/srv/data");

    let file = config_file("[[imports]]\npath = \"${TEST_CRUNCHER_DATA_DIR}/orders\"\n");
    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.imports[0].path, PathBuf::from("/srv/data/orders"));
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_a_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[[imports]]\npath = \"${TEST_CRUNCHER_DATA_DIR}/orders\"\n");
    let err = load_config(file.path()).unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("TEST_CRUNCHER_DATA_DIR"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("CRUNCHER_INPUT_COMBINE", "except");
    std::env::set_var("CRUNCHER_OUTPUT_ROW_NUMBERS", "true");
    std::env::set_var("CRUNCHER_APPLICATION_DB_PATH", "/var/tmp/cruncher");

    let file = config_file("[input]\ncombine = \"concat\"\n");
    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.input.combine, CombineMode::Except);
    assert!(config.output.row_numbers);
    assert_eq!(config.application.db_path, PathBuf::from("/var/tmp/cruncher"));

    let defaults = load_config_or_default(None).expect("Failed to load defaults");
    assert_eq!(defaults.input.combine, CombineMode::Except);

    cleanup_env_vars();
}

#[test]
fn test_invalid_env_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("CRUNCHER_INPUT_COMBINE", "merge");

    let err = load_config_or_default(None).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("CRUNCHER_INPUT_COMBINE"));

    cleanup_env_vars();
}

#[test]
fn test_invalid_values_are_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        "[input]\ncombine = \"merge\"\n",
        "[input]\nexclude = \"([\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[application]\nlog_level = \"loud\"\n",
    ];
    for contents in cases {
        let file = config_file(contents);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.is_configuration(), "{contents} should be rejected");
    }
}
