//! SQL text generation for table creation and bulk inserts.
//!
//! Statements are produced with the Builder pattern. Values are rendered as
//! literals; the store never sees bound parameters for bulk loads.

use crate::core::{ColumnType, DATETIME_FORMAT, Row, Table, Value};

/// Builder for `CREATE TABLE IF NOT EXISTS` statements.
///
/// Every column is declared `NULL`; the type token comes from the store's
/// type mapping.
pub struct CreateTableBuilder {
    table_name: String,
    columns: Vec<(String, &'static str)>,
}

impl CreateTableBuilder {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(mut self, name: impl Into<String>, type_token: &'static str) -> Self {
        self.columns.push((name.into(), type_token));
        self
    }

    pub fn from_table(table: &Table, type_map: impl Fn(ColumnType) -> &'static str) -> Self {
        let mut builder = Self::new(table.name());

        for column in table.columns() {
            builder = builder.add_column(column.name.clone(), type_map(column.data_type()));
        }

        builder
    }

    pub fn build(self) -> String {
        let column_defs: Vec<String> = self
            .columns
            .iter()
            .map(|(name, type_token)| format!("{} {} NULL", quote_ident(name), type_token))
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table_name),
            column_defs.join(", ")
        )
    }
}

/// Builder for a multi-row `INSERT ... VALUES` statement over borrowed rows.
pub struct InsertStatementBuilder<'a> {
    table_name: &'a str,
    columns: Vec<String>,
    rows: &'a [Row],
}

impl<'a> InsertStatementBuilder<'a> {
    pub fn new(table_name: &'a str) -> Self {
        Self {
            table_name,
            columns: Vec::new(),
            rows: &[],
        }
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn rows(mut self, rows: &'a [Row]) -> Self {
        self.rows = rows;
        self
    }

    /// Builds one statement for all rows; empty when there are no rows.
    pub fn build(self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let column_list = if self.columns.is_empty() {
            String::new()
        } else {
            let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
            format!(" ({})", cols.join(", "))
        };

        let mut sql = format!("INSERT INTO {}{} VALUES ", quote_ident(self.table_name), column_list);
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                sql.push_str(", ");
            }
            let values: Vec<String> = row.iter().map(format_value_for_sql).collect();
            sql.push('(');
            sql.push_str(&values.join(", "));
            sql.push(')');
        }
        sql
    }
}

/// Renders a value as a SQL literal.
///
/// Booleans become `1`/`0`; date/times use the storage date/time format.
pub fn format_value_for_sql(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Boolean(b) => String::from(if *b { "1" } else { "0" }),
        Value::Text(s) => format!("'{}'", escape_sql_string(s)),
        Value::DateTime(dt) => format!("'{}'", dt.format(DATETIME_FORMAT)),
    }
}

/// Escape single quotes in SQL strings
pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

pub fn quote_ident(ident: &str) -> String {
    let escaped = ident.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use chrono::NaiveDate;

    #[test]
    fn test_create_table_builder() {
        let sql = CreateTableBuilder::new("people")
            .add_column("id", "DOUBLE")
            .add_column("name", "TEXT")
            .build();

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"people\" (\"id\" DOUBLE NULL, \"name\" TEXT NULL)"
        );
    }

    #[test]
    fn test_create_table_from_table_uses_type_map() {
        let table = Table::with_columns(
            "t",
            vec![
                Column::with_type("flag", ColumnType::Boolean),
                Column::with_type("say \"hi\"", ColumnType::String),
            ],
        );

        let sql = CreateTableBuilder::from_table(&table, |t| match t {
            ColumnType::Boolean => "INTEGER",
            _ => "TEXT",
        })
        .build();

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"t\" (\"flag\" INTEGER NULL, \"say \"\"hi\"\"\" TEXT NULL)"
        );
    }

    #[test]
    fn test_insert_statement_builder() {
        let rows = vec![
            vec![Value::Float(1.5), Value::Text("Alice".to_string())],
            vec![Value::Null, Value::Text("O'Reilly".to_string())],
        ];
        let sql = InsertStatementBuilder::new("people")
            .columns(vec!["id".to_string(), "name".to_string()])
            .rows(&rows)
            .build();

        assert_eq!(
            sql,
            "INSERT INTO \"people\" (\"id\", \"name\") VALUES (1.5, 'Alice'), (NULL, 'O''Reilly')"
        );
    }

    #[test]
    fn test_insert_without_rows_is_empty() {
        let sql = InsertStatementBuilder::new("people").rows(&[]).build();
        assert!(sql.is_empty());
    }

    #[test]
    fn test_literal_rendering() {
        let dt = NaiveDate::from_ymd_opt(2020, 6, 15)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();

        assert_eq!(format_value_for_sql(&Value::Boolean(true)), "1");
        assert_eq!(format_value_for_sql(&Value::Boolean(false)), "0");
        assert_eq!(format_value_for_sql(&Value::DateTime(dt)), "'2020-06-15 14:05:09'");
        assert_eq!(format_value_for_sql(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(format_value_for_sql(&Value::Integer(-3)), "-3");
    }
}
