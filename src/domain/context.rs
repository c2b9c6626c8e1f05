//! Error context extension trait
//!
//! Similar to `anyhow::Context`, but keeps `Result<T, CruncherError>` so the
//! kind of the underlying error (configuration, engine, ...) stays visible.
//!
//! # Examples
//!
//! ```rust
//! use cruncher::domain::Result;
//! use cruncher::domain::context::ResultExt;
//!
//! fn read_header(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::CruncherError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display;

    /// Add context computed lazily, only when there is an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CruncherError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display,
    {
        self.map_err(|e| CruncherError::Context {
            context: context.to_string(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CruncherError::Context {
            context: f().to_string(),
            source: Box::new(e.into()),
        })
    }
}
