//! Source row readers.
//!
//! A [`RowSource`] is a forward-only sequence of rows of string fields that
//! can be rewound to its start. The importer only needs these three
//! capabilities, so any tabular reader can feed it.

mod delimited;
mod memory;

pub use delimited::{CsvOptions, CsvRowSource};
pub use memory::MemoryRowSource;

use crate::core::Result;

pub type SourceRow = Vec<String>;

pub trait RowSource {
    /// Number of fields in the first record; `0` for an empty source.
    fn field_count(&mut self) -> Result<usize>;

    /// Reads the next row, `None` once the source is exhausted.
    fn read_row(&mut self) -> Result<Option<SourceRow>>;

    /// Rewinds to the first row.
    fn reset(&mut self) -> Result<()>;
}

impl<T: RowSource + ?Sized> RowSource for &mut T {
    fn field_count(&mut self) -> Result<usize> {
        (**self).field_count()
    }

    fn read_row(&mut self) -> Result<Option<SourceRow>> {
        (**self).read_row()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

impl<T: RowSource + ?Sized> RowSource for Box<T> {
    fn field_count(&mut self) -> Result<usize> {
        (**self).field_count()
    }

    fn read_row(&mut self) -> Result<Option<SourceRow>> {
        (**self).read_row()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

/// Field `index` of `row`, `None` when the row is shorter.
pub fn field(row: &SourceRow, index: usize) -> Option<&str> {
    row.get(index).map(String::as_str)
}
