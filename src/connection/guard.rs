use crate::storage::Storage;
use std::path::Path;
use tracing::{debug, warn};

/// Drops a freshly created store unless the import that fills it completes.
pub(crate) struct StoreGuard<'a, S: Storage> {
    storage: &'a S,
    database: &'a str,
    storage_dir: &'a Path,
    armed: bool,
}

impl<'a, S: Storage> StoreGuard<'a, S> {
    pub(crate) fn new(storage: &'a S, database: &'a str, storage_dir: &'a Path) -> Self {
        Self {
            storage,
            database,
            storage_dir,
            armed: true,
        }
    }

    /// Keeps the store.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S: Storage> Drop for StoreGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        match self.storage.drop_database(self.database, self.storage_dir) {
            Ok(()) => debug!(database = self.database, "dropped incomplete store"),
            Err(err) => warn!(database = self.database, error = %err, "failed to drop incomplete store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use tempfile::TempDir;

    #[test]
    fn test_armed_guard_drops_store() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new();
        storage.create("a.db3", temp_dir.path()).unwrap();

        drop(StoreGuard::new(&storage, "a.db3", temp_dir.path()));
        assert!(!storage.exists("a.db3", temp_dir.path()));
    }

    #[test]
    fn test_disarmed_guard_keeps_store() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new();
        storage.create("a.db3", temp_dir.path()).unwrap();

        StoreGuard::new(&storage, "a.db3", temp_dir.path()).disarm();
        assert!(storage.exists("a.db3", temp_dir.path()));
    }
}
