//! Unique row identifiers
//!
//! When numbering is enabled, every output table gets a leading `crunchCounter`
//! column. All output tables of a run draw from one increasing sequence, so the
//! ids of a later output are all greater than those of an earlier one.

use crate::domain::table::quote_identifier;
use crate::domain::ColumnSpec;

/// Name of the identifier column
pub const COUNTER_COLUMN: &str = "crunchCounter";

/// Type of the identifier column
pub const COUNTER_COLUMN_TYPE: &str = "BIGINT PRIMARY KEY";

/// Subtracted from the current time to keep generated ids small
pub const TIMESTAMP_SUBTRACT: i64 = 1_530_000_000_000;

/// Starting value for a run: `explicit`, or a timestamp-derived value
pub fn allocate_start_value(explicit: Option<i64>) -> i64 {
    explicit.unwrap_or_else(|| chrono::Utc::now().timestamp_millis() - TIMESTAMP_SUBTRACT)
}

/// Sequence of ids shared by all output tables of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierAllocator {
    start: i64,
    next: i64,
}

impl IdentifierAllocator {
    pub fn new(start: i64) -> Self {
        Self { start, next: start }
    }

    /// Allocator seeded with `explicit` or the current time
    pub fn starting_at(explicit: Option<i64>) -> Self {
        Self::new(allocate_start_value(explicit))
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Id the next inserted row will get
    pub fn next_value(&self) -> i64 {
        self.next
    }

    pub fn column() -> ColumnSpec {
        ColumnSpec::new(COUNTER_COLUMN, COUNTER_COLUMN_TYPE)
    }

    /// INSERT of `sql`'s rows into `table`, numbered from the next value in result order
    pub fn numbered_insert(&self, table: &str, sql: &str) -> String {
        format!(
            "INSERT INTO {} SELECT {} + ROW_NUMBER() OVER () - 1, numbered.* FROM ({}) AS numbered",
            quote_identifier(table),
            self.next,
            sql
        )
    }

    /// Move past `rows` ids after they were inserted
    pub fn advance(&mut self, rows: usize) {
        self.next += rows as i64;
    }
}

/// Plain INSERT of `sql`'s rows into `table`
pub fn plain_insert(table: &str, sql: &str) -> String {
    format!("INSERT INTO {} {}", quote_identifier(table), sql)
}
