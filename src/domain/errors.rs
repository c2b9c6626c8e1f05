//! Domain error types
//!
//! This module defines the error hierarchy for Cruncher.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Cruncher error type
///
/// This is the primary error type used throughout the application.
/// Every variant is terminal for the run; there is no retry policy.
#[derive(Debug, Error)]
pub enum CruncherError {
    /// Configuration errors: duplicate table names, unsupported multiple exports,
    /// per-subpart dispatch without a placeholder, unparsable paths or regexes
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// SQL engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Hierarchical flattening or export conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Another error with a description of what was being done
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<CruncherError>,
    },
}

impl CruncherError {
    /// Whether this error was caused by the run's configuration
    pub fn is_configuration(&self) -> bool {
        match self {
            CruncherError::Configuration(_) => true,
            CruncherError::Context { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

/// SQL engine errors
///
/// Errors raised by the embedded SQL engine collaborator.
/// These errors don't expose the driver's own error types.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to open the database session
    #[error("Failed to open the database session: {0}")]
    ConnectionFailed(String),

    /// Failed to create a table
    #[error("Failed to create table {table}: {message}")]
    TableCreationFailed { table: String, message: String },

    /// Failed to load the bound file into a table
    #[error("Failed to load {path} into table {table}: {message}")]
    LoadFailed {
        table: String,
        path: String,
        message: String,
    },

    /// Query failed
    #[error("Query failed: {message} (SQL: {sql})")]
    QueryFailed { sql: String, message: String },

    /// Failed to write a table to its bound file
    #[error("Failed to write table {table} to its file: {message}")]
    FlushFailed { table: String, message: String },

    /// Failed to detach a table
    #[error("Failed to detach table {table}: {message}")]
    DetachFailed { table: String, message: String },

    /// Operation on a table the session does not know about
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The session was already closed
    #[error("The database session is closed")]
    SessionClosed,
}

// Conversion from std::io::Error
impl From<std::io::Error> for CruncherError {
    fn from(err: std::io::Error) -> Self {
        CruncherError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CruncherError {
    fn from(err: serde_json::Error) -> Self {
        CruncherError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CruncherError {
    fn from(err: toml::de::Error) -> Self {
        CruncherError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for CruncherError {
    fn from(err: csv::Error) -> Self {
        CruncherError::Io(format!("CSV error: {err}"))
    }
}

// An unparsable regex is always a configuration problem
impl From<regex::Error> for CruncherError {
    fn from(err: regex::Error) -> Self {
        CruncherError::Configuration(format!("Not a valid regex: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cruncher_error_display() {
        let err = CruncherError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_engine_error_conversion() {
        let engine_err = EngineError::DetachFailed {
            table: "foo".to_string(),
            message: "locked".to_string(),
        };
        let err: CruncherError = engine_err.into();
        assert!(matches!(err, CruncherError::Engine(_)));
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CruncherError = io_err.into();
        assert!(matches!(err, CruncherError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CruncherError = json_err.into();
        assert!(matches!(err, CruncherError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CruncherError = toml_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_regex_error_is_configuration() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: CruncherError = regex_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Not a valid regex"));
    }

    #[test]
    fn test_cruncher_error_implements_std_error() {
        let err = CruncherError::Conversion("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
