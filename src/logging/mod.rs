//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - JSON-formatted local log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use cruncher::logging::init_logging;
//! use cruncher::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(file = "in/a.csv", table = "a", "CSV input");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
