//! Domain models and types for Cruncher.
//!
//! This module contains the core domain models and error types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Declared inputs and outputs** ([`ImportArgument`], [`ExportArgument`])
//! - **Units of work** ([`InputSubpart`], [`OutputPart`])
//! - **Policies** ([`CombineMode`], [`CombineDirectories`], [`SortPolicy`], [`JsonLayout`])
//! - **Error types** ([`CruncherError`], [`EngineError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CruncherError>`]:
//!
//! ```rust
//! use cruncher::domain::{CruncherError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = cruncher::config::load_config("cruncher.toml")?;
//!     Ok(())
//! }
//! ```

pub mod arguments;
pub mod context;
pub mod errors;
pub mod options;
pub mod result;
pub mod subpart;
pub mod table;

// Re-export commonly used types for convenience
pub use arguments::{ExportArgument, ExportFormat, ImportArgument, ImportFormat};
pub use errors::{CruncherError, EngineError};
pub use options::{CombineDirectories, CombineMode, JsonLayout, SortPolicy};
pub use result::Result;
pub use subpart::{InputSubpart, OutputPart};
pub use table::ColumnSpec;
