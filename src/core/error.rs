use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvDbError {
    #[error("Cannot initialize storage for '{source_path}': {cause}")]
    StorageInit {
        source_path: String,
        #[source]
        cause: Box<CsvDbError>,
    },

    #[error("Cannot create storage table '{table}': {cause}")]
    Schema {
        table: String,
        #[source]
        cause: Box<CsvDbError>,
    },

    #[error("Internal storage was not initialized")]
    NotOpen,

    #[error("Invalid value '{value}' for configuration key {key}")]
    InvalidConfig { key: String, value: String },

    #[error("Storage directory '{}' does not exist", .0.display())]
    StorageDirectoryMissing(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Source read error: {0}")]
    Source(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, CsvDbError>;

impl CsvDbError {
    /// Wraps `cause` as a storage initialization failure for `source_path`.
    ///
    /// A cause that already is a `StorageInit` is unwrapped first, so the
    /// result carries exactly one level with the outermost path.
    pub fn storage_init(source_path: impl Into<String>, cause: CsvDbError) -> Self {
        let cause = match cause {
            CsvDbError::StorageInit { cause, .. } => cause,
            other => Box::new(other),
        };
        CsvDbError::StorageInit {
            source_path: source_path.into(),
            cause,
        }
    }

    pub fn schema(table: impl Into<String>, cause: CsvDbError) -> Self {
        CsvDbError::Schema {
            table: table.into(),
            cause: Box::new(cause),
        }
    }

    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        CsvDbError::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_not_open(&self) -> bool {
        matches!(self, CsvDbError::NotOpen)
    }
}

impl<T> From<std::sync::PoisonError<T>> for CsvDbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
