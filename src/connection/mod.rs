pub mod config;
mod guard;

pub use config::{Credentials, ImportParameters};

use crate::core::{CsvDbError, Result, Value};
use crate::result::QueryResult;
use crate::source::CsvRowSource;
use crate::storage::{ImportSummary, SqliteStorage, Storage, StorageHandle};
use guard::StoreGuard;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

struct Inner<H> {
    state: ConnectionState,
    handle: Option<H>,
    last_import: Option<ImportSummary>,
}

/// Connection to a delimited file
///
/// The first `open()` imports the source into a store next to it (or in the
/// configured storage directory); later opens reuse that store until
/// `force_reload` asks for a fresh import. Lifecycle transitions are
/// serialized by one lock per connection.
///
/// # Examples
///
/// ```ignore
/// let conn = CsvConnection::new(ImportParameters::new("data/people.csv"))?;
/// conn.open()?;
/// let result = conn.create_command()?.query("SELECT name FROM people")?;
/// result.print();
/// ```
pub struct CsvConnection<S: Storage = SqliteStorage> {
    params: ImportParameters,
    storage: S,
    storage_dir: PathBuf,
    database: String,
    inner: Mutex<Inner<S::Handle>>,
}

impl CsvConnection<SqliteStorage> {
    pub fn new(params: ImportParameters) -> Result<Self> {
        Self::with_storage(params, SqliteStorage::new())
    }

    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        Self::new(ImportParameters::from_connection_string(connection_string)?)
    }
}

impl<S: Storage> CsvConnection<S> {
    /// Create a connection on a specific store; fails when an explicit
    /// storage directory does not exist.
    pub fn with_storage(params: ImportParameters, storage: S) -> Result<Self> {
        params.validate()?;

        let storage_dir = params.resolved_storage_dir();
        let database = storage.database_name(&params.source_path, &storage_dir);

        Ok(Self {
            params,
            storage,
            storage_dir,
            database,
            inner: Mutex::new(Inner {
                state: ConnectionState::Closed,
                handle: None,
                last_import: None,
            }),
        })
    }

    /// Import (or reuse) the store and open the long-lived handle
    ///
    /// Any failure while building the store drops it again and is reported
    /// as `StorageInit` for the source. Opening an open connection does
    /// nothing.
    pub fn open(&self) -> Result<()> {
        let mut inner = self.inner.lock()?;
        if inner.state == ConnectionState::Open {
            return Ok(());
        }

        if self.params.force_reload {
            if let Err(err) = self.storage.drop_database(&self.database, &self.storage_dir) {
                warn!(
                    store = %self.storage_path().display(),
                    error = %err,
                    "could not drop store before reload"
                );
            }
        }

        if self.storage.exists(&self.database, &self.storage_dir) {
            debug!(store = %self.storage_path().display(), "reusing existing store");
        } else {
            let summary = self.import().map_err(|err| self.init_error(err))?;
            inner.last_import = Some(summary);
        }

        let handle = self.storage.open_connection(
            &self.database,
            &self.storage_dir,
            &self.params.credentials,
        )?;

        inner.handle = Some(handle);
        inner.state = ConnectionState::Open;
        info!(
            source = %self.params.source_path.display(),
            store = %self.storage_path().display(),
            "connection opened"
        );
        Ok(())
    }

    fn import(&self) -> Result<ImportSummary> {
        let mut source = CsvRowSource::open(&self.params.source_path, self.params.csv_options())?;

        self.storage.create(&self.database, &self.storage_dir)?;
        let guard = StoreGuard::new(&self.storage, &self.database, &self.storage_dir);

        let mut handle = self.storage.open_connection(
            &self.database,
            &self.storage_dir,
            &self.params.credentials,
        )?;
        let imported = self.storage.import_rows(&mut handle, &mut source, &self.params);
        let closed = handle.close();

        let summary = imported?;
        closed?;
        guard.disarm();
        Ok(summary)
    }

    fn init_error(&self, cause: CsvDbError) -> CsvDbError {
        CsvDbError::storage_init(self.params.source_path.display().to_string(), cause)
    }

    /// Close the connection
    ///
    /// Always ends `Closed`; errors from the underlying handle are logged
    /// and swallowed.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = inner.handle.take() {
            match handle.close() {
                Ok(()) => info!(source = %self.params.source_path.display(), "connection closed"),
                Err(err) => warn!(error = %err, "error while closing store handle"),
            }
        }

        inner.state = ConnectionState::Closed;
    }

    pub fn create_command(&self) -> Result<Command<'_, S>> {
        self.ensure_open()?;
        Ok(Command { connection: self })
    }

    /// Begin a transaction; it rolls back on drop unless committed.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let tx = conn.begin_transaction()?;
    /// tx.execute("DELETE FROM people WHERE id = 1")?;
    /// tx.commit()?;
    /// ```
    pub fn begin_transaction(&self) -> Result<Transaction<'_, S>> {
        self.with_handle(|handle| handle.execute_batch("BEGIN"))?;
        Ok(Transaction {
            connection: self,
            finished: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        self.with_handle(|_| Ok(()))
    }

    fn with_handle<T>(&self, f: impl FnOnce(&mut S::Handle) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.lock()?;
        let inner = &mut *guard;

        if inner.state != ConnectionState::Open {
            return Err(CsvDbError::NotOpen);
        }
        let handle = inner.handle.as_mut().ok_or(CsvDbError::NotOpen)?;
        f(handle)
    }

    pub fn state(&self) -> ConnectionState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Source file path
    pub fn database(&self) -> &Path {
        &self.params.source_path
    }

    /// Source file name without extension, also the table name
    pub fn data_source(&self) -> String {
        self.params.table_name()
    }

    pub fn server_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.database_path(&self.database, &self.storage_dir)
    }

    pub fn params(&self) -> &ImportParameters {
        &self.params
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Summary of the import performed by the last `open()`, if it imported.
    pub fn last_import(&self) -> Option<ImportSummary> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_import
            .clone()
    }
}

impl<S: Storage> Drop for CsvConnection<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Statement runner on an open connection
///
/// Every call re-checks that the connection is still open.
pub struct Command<'c, S: Storage> {
    connection: &'c CsvConnection<S>,
}

impl<S: Storage> Command<'_, S> {
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.connection.with_handle(|handle| handle.execute(sql))
    }

    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection.with_handle(|handle| handle.execute_batch(sql))
    }

    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        self.connection.with_handle(|handle| handle.query(sql))
    }

    pub fn query_scalar(&self, sql: &str) -> Result<Option<Value>> {
        self.connection.with_handle(|handle| handle.query_scalar(sql))
    }
}

pub struct Transaction<'c, S: Storage> {
    connection: &'c CsvConnection<S>,
    finished: bool,
}

impl<S: Storage> Transaction<'_, S> {
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.connection.with_handle(|handle| handle.execute(sql))
    }

    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        self.connection.with_handle(|handle| handle.query(sql))
    }

    pub fn query_scalar(&self, sql: &str) -> Result<Option<Value>> {
        self.connection.with_handle(|handle| handle.query_scalar(sql))
    }

    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.connection.with_handle(|handle| handle.execute_batch("COMMIT"))
    }

    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.connection.with_handle(|handle| handle.execute_batch("ROLLBACK"))
    }
}

impl<S: Storage> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.connection.with_handle(|handle| handle.execute_batch("ROLLBACK")) {
            debug!(error = %err, "rollback on drop failed");
        }
    }
}
