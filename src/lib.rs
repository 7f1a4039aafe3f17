// ============================================================================
// csvdb Library
// ============================================================================

pub mod connection;
pub mod core;
pub mod inference;
pub mod result;
pub mod source;
pub mod storage;

// Re-export main types for convenience
pub use core::{Column, ColumnType, CsvDbError, Result, Row, Table, Value};
pub use result::QueryResult;

pub use inference::{AnalysisMethod, SampledSchema, sample_schema};
pub use source::{CsvOptions, CsvRowSource, MemoryRowSource, RowSource};
pub use storage::{ImportSummary, SqliteStorage, Storage, StorageHandle};

// Re-export connection API
pub use connection::{
    Command, ConnectionState, CsvConnection, Transaction,
    config::{Credentials, ImportParameters},
};

/// Create a connection from a connection string and open it
///
/// The first call imports the source; later calls reuse the store.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = csvdb::connect("DATABASE=data/people.csv")?;
/// let result = conn.create_command()?.query("SELECT * FROM people")?;
/// println!("Found {} people", result.row_count());
/// # Ok(())
/// # }
/// ```
pub fn connect(connection_string: &str) -> Result<CsvConnection> {
    let connection = CsvConnection::from_connection_string(connection_string)?;
    connection.open()?;
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_connect_opens_connection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("numbers.csv");
        std::fs::write(&path, "n\n1\n2\n3\n").unwrap();

        let conn = connect(&format!("DATABASE={}", path.display())).unwrap();
        assert!(conn.is_open());

        let sum = conn
            .create_command()
            .unwrap()
            .query_scalar("SELECT SUM(n) FROM numbers")
            .unwrap();
        assert_eq!(sum, Some(Value::Float(6.0)));
    }

    #[test]
    fn test_connect_requires_database() {
        assert!(matches!(
            connect("STORAGEDIR=/tmp"),
            Err(CsvDbError::InvalidConfig { .. })
        ));
    }
}
