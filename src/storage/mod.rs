pub mod engine;
pub mod loader;
pub mod sql;
pub mod sqlite;

pub use engine::{Storage, StorageHandle};
pub use loader::{BatchLoader, DEFAULT_BATCH_SIZE, ImportSummary, RowBatch};
pub use sqlite::{SqliteHandle, SqliteStorage};
