//! External collaborators of the pipeline.
//!
//! - [`engine`] - Embedded SQL engine (trait + SQLite implementation)
//! - [`json`] - JSON flattening of inputs and JSON export of results
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can be
//! exercised with mock implementations.
//!
//! ```rust,no_run
//! use cruncher::adapters::engine::{SqlEngine, SqliteEngine, TableBinding};
//! use cruncher::domain::ColumnSpec;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = SqliteEngine::open_in_memory()?;
//! engine.create_table(
//!     "people",
//!     &[ColumnSpec::text("name")],
//!     &TableBinding::load("people.csv"),
//!     false,
//! )?;
//! let columns = engine.probe_columns("SELECT * FROM people")?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod json;
