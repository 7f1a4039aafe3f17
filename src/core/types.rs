use super::{CsvDbError, Result, Value};
use serde::Serialize;
use std::fmt;

pub type Row = Vec<Value>;

/// Scalar type inferred for a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    String,
    Boolean,
    Integer,
    Float,
    DateTime,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "STRING",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::DateTime => "DATETIME",
        };
        f.write_str(name)
    }
}

/// A column of a [`Table`].
///
/// The type stays unset until schema inference assigns it; readers see
/// [`ColumnType::String`] until then.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    data_type: Option<ColumnType>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }

    pub fn with_type(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type),
        }
    }

    pub fn data_type(&self) -> ColumnType {
        self.data_type.unwrap_or(ColumnType::String)
    }

    pub fn is_typed(&self) -> bool {
        self.data_type.is_some()
    }

    pub(crate) fn assign_type(&mut self, data_type: ColumnType) -> Result<()> {
        if let Some(existing) = self.data_type {
            return Err(CsvDbError::Execution(format!(
                "Column '{}' already has type {}",
                self.name, existing
            )));
        }
        self.data_type = Some(data_type);
        Ok(())
    }
}

/// Target table description. Column order follows the source.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column);
        }
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column position by name, ignoring ASCII case like SQLite does.
    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Appends a column, suffixing its name (`_2`, `_3`, ...) when the name
    /// is already taken in any ASCII case.
    pub fn add_column(&mut self, mut column: Column) {
        if self.find_column_index(&column.name).is_some() {
            let base = column.name.clone();
            let mut suffix = 2;
            loop {
                let candidate = format!("{}_{}", base, suffix);
                if self.find_column_index(&candidate).is_none() {
                    column.name = candidate;
                    break;
                }
                suffix += 1;
            }
        }
        self.columns.push(column);
    }
}
