//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CruncherConfig;
use crate::domain::errors::CruncherError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CruncherConfig
/// 4. Applies environment variable overrides (CRUNCHER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file can't be read or parsed, a
/// referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cruncher::config::loader::load_config;
///
/// let config = load_config("cruncher.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CruncherConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CruncherError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CruncherError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CruncherConfig = toml::from_str(&contents)
        .map_err(|e| CruncherError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CruncherError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads the file at `path`, or the defaults with environment overrides when there is none
///
/// # Errors
///
/// Same as [`load_config`]; without a file, only overrides and validation can fail.
pub fn load_config_or_default(path: Option<&Path>) -> Result<CruncherConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let mut config = CruncherConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        CruncherError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CruncherError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CruncherError::Configuration(format!("Invalid value for {name}: {e}")))
}

/// Applies environment variable overrides using CRUNCHER_* prefix
///
/// Environment variables follow the pattern: CRUNCHER_<SECTION>_<KEY>,
/// for example CRUNCHER_INPUT_COMBINE or CRUNCHER_APPLICATION_DB_PATH.
pub(crate) fn apply_env_overrides(config: &mut CruncherConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("CRUNCHER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("CRUNCHER_APPLICATION_DB_PATH") {
        config.application.db_path = val.into();
    }
    if let Some(val) = var("CRUNCHER_APPLICATION_KEEP_WORK_FILES") {
        config.application.keep_work_files = parse_env("CRUNCHER_APPLICATION_KEEP_WORK_FILES", &val)?;
    }
    if let Some(val) = var("CRUNCHER_APPLICATION_OVERWRITE") {
        config.application.overwrite = parse_env("CRUNCHER_APPLICATION_OVERWRITE", &val)?;
    }

    // Input overrides
    if let Some(val) = var("CRUNCHER_INPUT_COMBINE") {
        config.input.combine = parse_env("CRUNCHER_INPUT_COMBINE", &val)?;
    }
    if let Some(val) = var("CRUNCHER_INPUT_COMBINE_DIRS") {
        config.input.combine_dirs = parse_env("CRUNCHER_INPUT_COMBINE_DIRS", &val)?;
    }
    if let Some(val) = var("CRUNCHER_INPUT_SORT_INPUT_PATHS") {
        config.input.sort_input_paths = parse_env("CRUNCHER_INPUT_SORT_INPUT_PATHS", &val)?;
    }
    if let Some(val) = var("CRUNCHER_INPUT_SORT_FILE_GROUPS") {
        config.input.sort_file_groups = parse_env("CRUNCHER_INPUT_SORT_FILE_GROUPS", &val)?;
    }
    if let Some(val) = var("CRUNCHER_INPUT_INCLUDE") {
        config.input.include = Some(val);
    }
    if let Some(val) = var("CRUNCHER_INPUT_EXCLUDE") {
        config.input.exclude = Some(val);
    }
    if let Some(val) = var("CRUNCHER_INPUT_SKIP_NON_READABLE") {
        config.input.skip_non_readable = parse_env("CRUNCHER_INPUT_SKIP_NON_READABLE", &val)?;
    }

    // Output overrides
    if let Some(val) = var("CRUNCHER_OUTPUT_ROW_NUMBERS") {
        config.output.row_numbers = parse_env("CRUNCHER_OUTPUT_ROW_NUMBERS", &val)?;
    }
    if let Some(val) = var("CRUNCHER_OUTPUT_INITIAL_ROW_NUMBER") {
        config.output.initial_row_number = Some(parse_env("CRUNCHER_OUTPUT_INITIAL_ROW_NUMBER", &val)?);
    }
    if let Some(val) = var("CRUNCHER_OUTPUT_JSON_LAYOUT") {
        config.output.json_layout = parse_env("CRUNCHER_OUTPUT_JSON_LAYOUT", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("CRUNCHER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("CRUNCHER_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("CRUNCHER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CRUNCHER_TEST_LOADER_DIR", "/data/in");
        let result = substitute_env_vars("path = \"${CRUNCHER_TEST_LOADER_DIR}/a.csv\"").unwrap();
        assert_eq!(result, "path = \"/data/in/a.csv\"\n");
        std::env::remove_var("CRUNCHER_TEST_LOADER_DIR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let err = substitute_env_vars("path = \"${CRUNCHER_TEST_SURELY_MISSING}\"").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("CRUNCHER_TEST_SURELY_MISSING"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# uses ${CRUNCHER_TEST_IN_COMMENT}\nkey = 1";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${CRUNCHER_TEST_IN_COMMENT}"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[input]
combine = "intersect"

[[imports]]
path = "a.csv"

[[exports]]
path = "out.csv"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.input.combine, crate::domain::CombineMode::Intersect);
        assert_eq!(config.imports.len(), 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/cruncher.toml").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default(None).unwrap();
        assert!(config.imports.is_empty());
        assert_eq!(config.application.db_path, std::path::PathBuf::from("cruncher_db"));
    }

    #[test]
    fn test_load_config_validation_failure() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[application]\nlog_level = \"loud\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
