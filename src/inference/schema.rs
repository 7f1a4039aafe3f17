//! Table schema construction from a sampled source prefix.

use super::strategy::{AnalysisMethod, infer_column_type};
use crate::core::{Column, Result, Table};
use crate::source::{RowSource, SourceRow, field};
use tracing::debug;

/// Table built from the sample together with the sampled rows, which still
/// have to be loaded.
#[derive(Debug, Clone)]
pub struct SampledSchema {
    pub table: Table,
    pub rows: Vec<SourceRow>,
}

/// Positional column name, 1-based.
pub fn default_column_name(index: usize) -> String {
    format!("Column {}", index + 1)
}

/// Builds an untyped table with `column_count` columns.
///
/// With `first_row_is_header`, names come from `header`; missing or empty
/// header cells fall back to the positional name.
pub fn build_schema(
    table_name: &str,
    header: Option<&SourceRow>,
    column_count: usize,
    first_row_is_header: bool,
) -> Table {
    let mut table = Table::new(table_name);

    for index in 0..column_count {
        let name = match header.filter(|_| first_row_is_header) {
            Some(row) => field(row, index)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map_or_else(|| default_column_name(index), str::to_string),
            None => default_column_name(index),
        };
        table.add_column(Column::new(name));
    }

    table
}

/// Infers and assigns every column type from `rows`.
pub fn assign_types(table: &mut Table, rows: &[SourceRow], method: AnalysisMethod) -> Result<()> {
    for (index, column) in table.columns_mut().iter_mut().enumerate() {
        let data_type = infer_column_type(rows.iter().map(|row| field(row, index)), method);
        column.assign_type(data_type)?;
    }
    Ok(())
}

/// Reads the header (if any) and up to `sample_row_count` rows from `source`,
/// then builds the typed table. Fewer rows than requested is not an error.
pub fn sample_schema<S: RowSource + ?Sized>(
    table_name: &str,
    source: &mut S,
    first_row_is_header: bool,
    method: AnalysisMethod,
    sample_row_count: usize,
) -> Result<SampledSchema> {
    let column_count = source.field_count()?;

    let header = if first_row_is_header {
        source.read_row()?
    } else {
        None
    };

    let sample_row_count = sample_row_count.max(1);
    let mut rows = Vec::with_capacity(sample_row_count.min(1024));
    while rows.len() < sample_row_count {
        match source.read_row()? {
            Some(row) => rows.push(row),
            None => break,
        }
    }

    let mut table = build_schema(table_name, header.as_ref(), column_count, first_row_is_header);
    assign_types(&mut table, &rows, method)?;

    debug!(
        table = table.name(),
        columns = table.column_count(),
        sampled = rows.len(),
        %method,
        "inferred schema"
    );

    Ok(SampledSchema { table, rows })
}
