//! Embedded SQL engine
//!
//! The pipeline only talks to the [`SqlEngine`] trait. [`SqliteEngine`] is the
//! implementation used by the command line.

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteEngine;
pub use traits::{BindMode, ResultRows, SqlEngine, TableBinding};
