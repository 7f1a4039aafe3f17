//! Batch Loader
//!
//! Drives an import: sample the source and build the schema, create the
//! table, then stream every row into fixed-size batches. Each batch is
//! flushed as one atomic insert. The sampled rows form the first batch.

use super::engine::Storage;
use crate::connection::ImportParameters;
use crate::core::{ColumnType, CsvDbError, Result, Row, Table, Value, text::parse_bool};
use crate::inference::{SampledSchema, parse_datetime, parse_float, sample_schema};
use crate::source::{RowSource, SourceRow, field};
use tracing::{debug, info, info_span};

/// Rows per flush unless the store says otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Pending converted rows, all as wide as the target table.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    rows: Vec<Row>,
    capacity: usize,
}

impl RowBatch {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Vec::with_capacity(capacity.min(DEFAULT_BATCH_SIZE)),
            capacity,
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Outcome of a completed import.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub table: Table,
    pub rows: usize,
    pub batches: usize,
}

pub struct BatchLoader<'a, S: Storage> {
    storage: &'a S,
    params: &'a ImportParameters,
    batch_size: usize,
}

impl<'a, S: Storage> BatchLoader<'a, S> {
    pub fn new(storage: &'a S, params: &'a ImportParameters) -> Self {
        Self {
            storage,
            params,
            batch_size: storage.batch_size().max(1),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn run<R: RowSource + ?Sized>(
        &self,
        handle: &mut S::Handle,
        source: &mut R,
    ) -> Result<ImportSummary> {
        let table_name = self.params.table_name();
        let source_path = self.params.source_path.display().to_string();
        let _span = info_span!("import", source = %source_path, table = %table_name).entered();

        let SampledSchema { table, rows: sampled } = sample_schema(
            &table_name,
            source,
            self.params.first_row_is_header,
            self.params.analysis_method,
            self.params.sample_row_count,
        )?;

        if table.column_count() == 0 {
            return Err(CsvDbError::schema(
                table.name(),
                CsvDbError::Execution("source has no columns".into()),
            ));
        }

        self.storage.create_table(handle, &table)?;
        debug!(table = table.name(), columns = table.column_count(), "table created");

        let mut summary = ImportSummary {
            table,
            rows: 0,
            batches: 0,
        };
        let mut batch = RowBatch::new(self.batch_size);

        for row in &sampled {
            batch.push(convert_row(&summary.table, row));
            if batch.is_full() {
                self.flush(handle, &mut batch, &mut summary)?;
            }
        }
        drop(sampled);

        while let Some(row) = source.read_row()? {
            batch.push(convert_row(&summary.table, &row));
            if batch.is_full() {
                self.flush(handle, &mut batch, &mut summary)?;
            }
        }

        if !batch.is_empty() {
            self.flush(handle, &mut batch, &mut summary)?;
        }

        info!(
            table = summary.table.name(),
            rows = summary.rows,
            batches = summary.batches,
            "import finished"
        );
        Ok(summary)
    }

    fn flush(
        &self,
        handle: &mut S::Handle,
        batch: &mut RowBatch,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        self.storage.insert_batch(handle, &summary.table, batch)?;
        summary.rows += batch.len();
        summary.batches += 1;
        debug!(batch = summary.batches, rows = batch.len(), "batch flushed");
        batch.clear();
        Ok(())
    }
}

/// Converts a raw source row to exactly one value per table column.
pub fn convert_row(table: &Table, row: &SourceRow) -> Row {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| convert_field(column.data_type(), field(row, index)))
        .collect()
}

/// Converts one raw field for a column of `data_type`.
///
/// Absent fields are NULL. Empty fields are NULL except in string columns.
/// A value that does not fit its column type is kept as text.
pub fn convert_field(data_type: ColumnType, raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };

    if data_type == ColumnType::String {
        return Value::Text(raw.to_string());
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    let converted = match data_type {
        ColumnType::Float => parse_float(trimmed).map(Value::Float),
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .ok()
            .map(Value::Integer)
            .or_else(|| parse_float(trimmed).map(Value::Float)),
        ColumnType::Boolean => parse_bool(trimmed).map(Value::Boolean),
        ColumnType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        ColumnType::String => None,
    };

    converted.unwrap_or_else(|| Value::Text(raw.to_string()))
}
