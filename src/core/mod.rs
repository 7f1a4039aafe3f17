pub mod error;
pub mod text;
pub mod types;
pub mod value;

pub use error::{CsvDbError, Result};
pub use types::{Column, ColumnType, Row, Table};
pub use value::{DATETIME_FORMAT, Value};
