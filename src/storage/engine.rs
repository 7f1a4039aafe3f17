use super::loader::{BatchLoader, DEFAULT_BATCH_SIZE, ImportSummary, RowBatch};
use crate::connection::{Credentials, ImportParameters};
use crate::core::{ColumnType, Result, Table, Value};
use crate::result::QueryResult;
use crate::source::RowSource;
use std::path::{Path, PathBuf};

/// Open session on a store, the driver side of a connection.
pub trait StorageHandle: Send {
    /// Execute one statement and return the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<usize>;

    /// Execute several `;`-separated statements
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Run a query and collect every row
    fn query(&mut self, sql: &str) -> Result<QueryResult>;

    /// First column of the first row, if any
    fn query_scalar(&mut self, sql: &str) -> Result<Option<Value>> {
        Ok(self.query(sql)?.scalar().cloned())
    }

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Storage backend trait - one implementation per target store
///
/// Every operation is scoped to a database identifier inside a storage
/// directory. The Batch Loader only talks to this trait, so a new store needs
/// no change there.
pub trait Storage: Send + Sync {
    type Handle: StorageHandle;

    /// Deterministic store identifier for a source file.
    fn database_name(&self, source_path: &Path, storage_dir: &Path) -> String;

    fn database_path(&self, database: &str, storage_dir: &Path) -> PathBuf {
        storage_dir.join(database)
    }

    fn exists(&self, database: &str, storage_dir: &Path) -> bool;

    /// Create the physical store; fails with `StorageInit`.
    fn create(&self, database: &str, storage_dir: &Path) -> Result<()>;

    /// Best-effort removal; a missing store is not an error.
    fn drop_database(&self, database: &str, storage_dir: &Path) -> Result<()>;

    fn open_connection(
        &self,
        database: &str,
        storage_dir: &Path,
        credentials: &Credentials,
    ) -> Result<Self::Handle>;

    /// Storage-native type token for an inferred column type.
    fn storage_type(&self, data_type: ColumnType) -> &'static str;

    /// Create-if-absent; failures are reported as `Schema` errors.
    fn create_table(&self, handle: &mut Self::Handle, table: &Table) -> Result<()>;

    /// Insert one batch atomically.
    fn insert_batch(&self, handle: &mut Self::Handle, table: &Table, batch: &RowBatch)
    -> Result<()>;

    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }

    /// Full import: sample, create the table, load every row.
    fn import_rows(
        &self,
        handle: &mut Self::Handle,
        source: &mut dyn RowSource,
        params: &ImportParameters,
    ) -> Result<ImportSummary>
    where
        Self: Sized,
    {
        BatchLoader::new(self, params).run(handle, source)
    }
}
