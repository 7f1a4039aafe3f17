//! SQLite store, one `.db3` file per imported source.

use super::engine::{Storage, StorageHandle};
use super::loader::{DEFAULT_BATCH_SIZE, RowBatch};
use super::sql::{CreateTableBuilder, InsertStatementBuilder};
use crate::connection::Credentials;
use crate::core::{ColumnType, CsvDbError, Result, Table, Value};
use crate::result::QueryResult;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATABASE_EXTENSION: &str = "db3";

#[derive(Debug, Clone)]
pub struct SqliteStorage {
    batch_size: usize,
}

impl SqliteStorage {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl Default for SqliteStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Open SQLite connection on one store file.
pub struct SqliteHandle {
    conn: Connection,
    path: PathBuf,
}

impl SqliteHandle {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for SqliteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHandle").field("path", &self.path).finish()
    }
}

impl StorageHandle for SqliteHandle {
    fn execute(&mut self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(value_from_sql(row.get_ref(index)?));
            }
            rows.push(values);
        }

        Ok(QueryResult::new(columns, rows))
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| CsvDbError::from(err))
    }
}

fn value_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Bulk-load tuning, issued before every flush.
fn apply_bulk_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "synchronous", "OFF")?;
    conn.pragma_update(None, "count_changes", "OFF")?;
    conn.pragma_update_and_check(None, "journal_mode", "MEMORY", |row| {
        row.get::<_, String>(0)
    })?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

impl Storage for SqliteStorage {
    type Handle = SqliteHandle;

    fn database_name(&self, source_path: &Path, _storage_dir: &Path) -> String {
        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        format!("{}.{}", file_name, DATABASE_EXTENSION)
    }

    fn exists(&self, database: &str, storage_dir: &Path) -> bool {
        self.database_path(database, storage_dir).is_file()
    }

    fn create(&self, database: &str, storage_dir: &Path) -> Result<()> {
        let path = self.database_path(database, storage_dir);
        File::create(&path).map_err(|err| {
            CsvDbError::storage_init(path.display().to_string(), CsvDbError::Io(err))
        })?;
        debug!(path = %path.display(), "store created");
        Ok(())
    }

    fn drop_database(&self, database: &str, storage_dir: &Path) -> Result<()> {
        let path = self.database_path(database, storage_dir);
        remove_if_present(&path)?;

        let mut journal = path.into_os_string();
        journal.push("-journal");
        remove_if_present(Path::new(&journal))?;
        Ok(())
    }

    fn open_connection(
        &self,
        database: &str,
        storage_dir: &Path,
        credentials: &Credentials,
    ) -> Result<SqliteHandle> {
        if !credentials.is_empty() {
            debug!("SQLite store ignores credentials");
        }

        let path = self.database_path(database, storage_dir);
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(SqliteHandle { conn, path })
    }

    fn storage_type(&self, data_type: ColumnType) -> &'static str {
        match data_type {
            ColumnType::Boolean => "INTEGER",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::String => "TEXT",
        }
    }

    fn create_table(&self, handle: &mut SqliteHandle, table: &Table) -> Result<()> {
        if table.column_count() == 0 {
            return Err(CsvDbError::schema(
                table.name(),
                CsvDbError::Execution("table has no columns".into()),
            ));
        }

        let sql = CreateTableBuilder::from_table(table, |t| self.storage_type(t)).build();
        debug!(%sql, "creating table");
        handle
            .conn
            .execute(&sql, [])
            .map_err(|err| CsvDbError::schema(table.name(), err.into()))?;
        Ok(())
    }

    fn insert_batch(&self, handle: &mut SqliteHandle, table: &Table, batch: &RowBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let sql = InsertStatementBuilder::new(table.name())
            .columns(table.column_names())
            .rows(batch.rows())
            .build();

        apply_bulk_pragmas(&handle.conn)?;

        let tx = handle.conn.transaction()?;
        let inserted = tx.execute(&sql, [])?;
        if inserted != batch.len() {
            return Err(CsvDbError::Execution(format!(
                "expected to insert {} rows into '{}', inserted {}",
                batch.len(),
                table.name(),
                inserted
            )));
        }
        tx.commit()?;
        Ok(())
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}
