use super::{RowSource, SourceRow};
use crate::core::Result;

/// Rows held in memory. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Vec<SourceRow>,
    position: usize,
}

impl MemoryRowSource {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self { rows, position: 0 }
    }

    pub fn from_rows<R, F>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowSource for MemoryRowSource {
    fn field_count(&mut self) -> Result<usize> {
        Ok(self.rows.first().map_or(0, Vec::len))
    }

    fn read_row(&mut self) -> Result<Option<SourceRow>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    fn reset(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}
