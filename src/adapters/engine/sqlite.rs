//! SQLite implementation of the SQL engine
//!
//! Input tables are filled from their CSV file at creation time. Output tables
//! are written to their CSV file when flushed. The session lives in a single
//! database file inside the run's session directory.

use super::traits::{BindMode, ResultRows, SqlEngine, TableBinding};
use crate::domain::table::quote_identifier;
use crate::domain::{ColumnSpec, EngineError};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;
use std::path::Path;

/// Database file name inside the session directory
pub const DATABASE_FILE_NAME: &str = "cruncher.db";

/// SQLite-backed engine
pub struct SqliteEngine {
    conn: Option<Connection>,
    bindings: HashMap<String, TableBinding>,
}

impl SqliteEngine {
    /// Open a file-backed session in the given directory
    pub fn open(session_dir: &Path) -> Result<Self, EngineError> {
        let db_file = session_dir.join(DATABASE_FILE_NAME);
        let conn = Connection::open(&db_file).map_err(|e| {
            EngineError::ConnectionFailed(format!("{}: {e}", db_file.display()))
        })?;
        tracing::debug!(db_file = %db_file.display(), "Opened SQLite session");
        Ok(Self::with_connection(conn))
    }

    /// Open a session that lives in memory only
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            bindings: HashMap::new(),
        }
    }

    fn conn(&mut self) -> Result<&mut Connection, EngineError> {
        self.conn.as_mut().ok_or(EngineError::SessionClosed)
    }

    /// Names of all tables currently in the catalog
    pub fn table_names(&mut self) -> Result<Vec<String>, EngineError> {
        let sql = "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name";
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(|e| query_failed(sql, e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| query_failed(sql, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_failed(sql, e))?;
        Ok(names)
    }

    fn table_exists(&mut self, name: &str) -> Result<bool, EngineError> {
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
        let count: i64 = self
            .conn()?
            .query_row(sql, [name], |row| row.get(0))
            .map_err(|e| query_failed(sql, e))?;
        Ok(count > 0)
    }

    fn load_file(&mut self, name: &str, columns: usize, file: &Path) -> Result<usize, EngineError> {
        let load_failed = |message: String| EngineError::LoadFailed {
            table: name.to_string(),
            path: file.display().to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(file)
            .map_err(|e| load_failed(e.to_string()))?;

        let placeholders = vec!["?"; columns].join(", ");
        let insert = format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_identifier(name)
        );

        let conn = self.conn()?;
        let tx = conn.transaction().map_err(|e| load_failed(e.to_string()))?;
        let mut loaded = 0;
        {
            let mut stmt = tx.prepare(&insert).map_err(|e| query_failed(&insert, e))?;
            for record in reader.records() {
                let record = record.map_err(|e| load_failed(e.to_string()))?;
                let values = (0..columns).map(|i| record.get(i).filter(|v| !v.is_empty()));
                stmt.execute(params_from_iter(values))
                    .map_err(|e| load_failed(e.to_string()))?;
                loaded += 1;
            }
        }
        tx.commit().map_err(|e| load_failed(e.to_string()))?;
        Ok(loaded)
    }
}

impl SqlEngine for SqliteEngine {
    fn create_table(
        &mut self,
        name: &str,
        columns: &[ColumnSpec],
        binding: &TableBinding,
        overwrite: bool,
    ) -> Result<(), EngineError> {
        let creation_failed = |message: String| EngineError::TableCreationFailed {
            table: name.to_string(),
            message,
        };

        if columns.is_empty() {
            return Err(creation_failed("no columns".to_string()));
        }

        if self.table_exists(name)? {
            if !overwrite {
                return Err(creation_failed("table already exists".to_string()));
            }
            let drop = format!("DROP TABLE {}", quote_identifier(name));
            self.conn()?
                .execute(&drop, [])
                .map_err(|e| query_failed(&drop, e))?;
        }

        if binding.mode == BindMode::Store && binding.file.exists() {
            if !overwrite {
                return Err(creation_failed(format!(
                    "output file {} already exists",
                    binding.file.display()
                )));
            }
            std::fs::remove_file(&binding.file).map_err(|e| creation_failed(e.to_string()))?;
        }

        let columns_ddl = columns
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let ddl = format!("CREATE TABLE {} ({columns_ddl})", quote_identifier(name));
        tracing::debug!(table = name, ddl = %ddl, "Creating table");
        self.conn()?
            .execute(&ddl, [])
            .map_err(|e| creation_failed(e.to_string()))?;

        if binding.mode == BindMode::Load {
            match self.load_file(name, columns.len(), &binding.file) {
                Ok(loaded) => tracing::debug!(table = name, rows = loaded, "Loaded rows from file"),
                Err(e) => {
                    // A half-loaded table is never handed out
                    let drop = format!("DROP TABLE {}", quote_identifier(name));
                    if let Err(drop_err) = self.conn()?.execute(&drop, []) {
                        tracing::warn!(table = name, error = %drop_err, "Failed to drop partially loaded table");
                    }
                    return Err(e);
                }
            }
        }

        self.bindings.insert(name.to_string(), binding.clone());
        Ok(())
    }

    fn probe_columns(&mut self, sql: &str) -> Result<Vec<ColumnSpec>, EngineError> {
        let probe = format!("SELECT * FROM ({}) AS probe LIMIT 1", trim_statement(sql));
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&probe).map_err(|e| query_failed(sql, e))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([]).map_err(|e| query_failed(sql, e))?;
        let types: Vec<&str> = match rows.next().map_err(|e| query_failed(sql, e))? {
            Some(row) => (0..names.len())
                .map(|i| row.get_ref(i).map(|v| type_name(v.data_type())))
                .collect::<Result<_, _>>()
                .map_err(|e| query_failed(sql, e))?,
            None => vec!["TEXT"; names.len()],
        };

        Ok(names
            .into_iter()
            .zip(types)
            .map(|(name, sql_type)| ColumnSpec::new(name, sql_type))
            .collect())
    }

    fn execute(&mut self, sql: &str) -> Result<usize, EngineError> {
        self.conn()?
            .execute(trim_statement(sql), [])
            .map_err(|e| query_failed(sql, e))
    }

    fn execute_script(&mut self, script: &str) -> Result<(), EngineError> {
        self.conn()?
            .execute_batch(script)
            .map_err(|e| query_failed(script, e))
    }

    fn query(&mut self, sql: &str) -> Result<ResultRows, EngineError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(trim_statement(sql))
            .map_err(|e| query_failed(sql, e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(json_value))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| query_failed(sql, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_failed(sql, e))?;

        Ok(ResultRows { columns, rows })
    }

    fn flush_table(&mut self, name: &str) -> Result<usize, EngineError> {
        let binding = self
            .bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))?;
        let flush_failed = |message: String| EngineError::FlushFailed {
            table: name.to_string(),
            message,
        };
        if binding.mode != BindMode::Store {
            return Err(flush_failed("input tables are read-only".to_string()));
        }

        let result = self.query(&format!("SELECT * FROM {}", quote_identifier(name)))?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&binding.file)
            .map_err(|e| flush_failed(e.to_string()))?;
        writer
            .write_record(&result.columns)
            .map_err(|e| flush_failed(e.to_string()))?;
        for row in &result.rows {
            writer
                .write_record(row.iter().map(csv_field))
                .map_err(|e| flush_failed(e.to_string()))?;
        }
        writer.flush().map_err(|e| flush_failed(e.to_string()))?;

        Ok(result.len())
    }

    fn detach_table(&mut self, name: &str) -> Result<(), EngineError> {
        let drop = format!("DROP TABLE {}", quote_identifier(name));
        self.conn()?
            .execute(&drop, [])
            .map_err(|e| EngineError::DetachFailed {
                table: name.to_string(),
                message: e.to_string(),
            })?;
        self.bindings.remove(name);
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.bindings.clear();
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| EngineError::ConnectionFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

fn query_failed(sql: &str, err: rusqlite::Error) -> EngineError {
    EngineError::QueryFailed {
        sql: sql.to_string(),
        message: err.to_string(),
    }
}

/// Strips whitespace and trailing semicolons so the statement can be nested
fn trim_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

fn type_name(data_type: Type) -> &'static str {
    match data_type {
        Type::Integer => "BIGINT",
        Type::Real => "DOUBLE",
        Type::Blob => "BLOB",
        Type::Text | Type::Null => "TEXT",
    }
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn csv_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_create_input_table_loads_rows() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "people.csv", "name,age\nAda,36\nAlan,41\n");
        let mut engine = SqliteEngine::open_in_memory().unwrap();

        engine
            .create_table(
                "people",
                &[ColumnSpec::text("name"), ColumnSpec::text("age")],
                &TableBinding::load(&file),
                false,
            )
            .unwrap();

        let rows = engine.query("SELECT name FROM people ORDER BY name").unwrap();
        assert_eq!(rows.columns, vec!["name"]);
        assert_eq!(rows.rows.len(), 2);
        assert_eq!(rows.rows[0][0], serde_json::json!("Ada"));
    }

    #[test]
    fn test_short_records_are_padded_with_nulls() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "t.csv", "a,b\n1\n2,x\n");
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .create_table(
                "t",
                &[ColumnSpec::text("a"), ColumnSpec::text("b")],
                &TableBinding::load(&file),
                false,
            )
            .unwrap();

        let rows = engine.query("SELECT b FROM t ORDER BY a").unwrap();
        assert_eq!(rows.rows[0][0], serde_json::Value::Null);
        assert_eq!(rows.rows[1][0], serde_json::json!("x"));
    }

    #[test]
    fn test_create_table_twice_without_overwrite_fails() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "t.csv", "a\n1\n");
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        let columns = [ColumnSpec::text("a")];

        engine
            .create_table("t", &columns, &TableBinding::load(&file), false)
            .unwrap();
        let err = engine
            .create_table("t", &columns, &TableBinding::load(&file), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::TableCreationFailed { .. }));

        engine
            .create_table("t", &columns, &TableBinding::load(&file), true)
            .unwrap();
    }

    #[test]
    fn test_probe_columns_reports_types() {
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        let columns = engine
            .probe_columns("SELECT 1 AS id, 'x' AS label, 2.5 AS score;")
            .unwrap();

        assert_eq!(
            columns,
            vec![
                ColumnSpec::new("id", "BIGINT"),
                ColumnSpec::new("label", "TEXT"),
                ColumnSpec::new("score", "DOUBLE"),
            ]
        );
    }

    #[test]
    fn test_probe_columns_of_empty_result_default_to_text() {
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        engine.execute_script("CREATE TABLE e (a INTEGER, b TEXT);").unwrap();
        let columns = engine.probe_columns("SELECT * FROM e").unwrap();
        assert_eq!(columns, vec![ColumnSpec::text("a"), ColumnSpec::text("b")]);
    }

    #[test]
    fn test_flush_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let mut engine = SqliteEngine::open_in_memory().unwrap();

        engine
            .create_table(
                "output_out",
                &[ColumnSpec::new("id", "BIGINT"), ColumnSpec::text("name")],
                &TableBinding::store(&out),
                false,
            )
            .unwrap();
        let inserted = engine
            .execute("INSERT INTO output_out VALUES (1, 'a, b'), (2, NULL)")
            .unwrap();
        assert_eq!(inserted, 2);

        assert_eq!(engine.flush_table("output_out").unwrap(), 2);
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "id,name\n1,\"a, b\"\n2,\n");
    }

    #[test]
    fn test_flush_of_input_table_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "t.csv", "a\n1\n");
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .create_table("t", &[ColumnSpec::text("a")], &TableBinding::load(&file), false)
            .unwrap();

        assert!(matches!(
            engine.flush_table("t"),
            Err(EngineError::FlushFailed { .. })
        ));
        assert!(matches!(
            engine.flush_table("missing"),
            Err(EngineError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_detach_removes_table_but_keeps_file() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "t.csv", "a\n1\n");
        let mut engine = SqliteEngine::open(dir.path()).unwrap();
        engine
            .create_table("t", &[ColumnSpec::text("a")], &TableBinding::load(&file), false)
            .unwrap();
        assert_eq!(engine.table_names().unwrap(), vec!["t"]);

        engine.detach_table("t").unwrap();
        assert!(engine.table_names().unwrap().is_empty());
        assert!(file.exists());

        assert!(matches!(
            engine.detach_table("t"),
            Err(EngineError::DetachFailed { .. })
        ));
    }

    #[test]
    fn test_closed_session_rejects_calls() {
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        engine.close().unwrap();
        assert!(matches!(
            engine.execute("SELECT 1"),
            Err(EngineError::SessionClosed)
        ));
        // Closing twice is harmless
        engine.close().unwrap();
    }
}
