//! Integration tests for importing delimited files into the SQLite store

use csvdb::{
    AnalysisMethod, ColumnType, CsvConnection, ImportParameters, SqliteStorage, Value,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn numbered_rows(count: usize) -> String {
    let mut contents = String::from("id,label\n");
    for i in 0..count {
        contents.push_str(&format!("{},row {}\n", i, i));
    }
    contents
}

fn count_rows(conn: &CsvConnection, table: &str) -> i64 {
    conn.create_command()
        .unwrap()
        .query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .unwrap()
        .and_then(|v| v.as_i64())
        .unwrap()
}

#[test]
fn test_people_example() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "people.csv",
        "id,name,joined\n1,Alice,2020-01-01\n2,Bob,2020-06-15\n",
    );

    let conn = CsvConnection::new(
        ImportParameters::new(path)
            .sample_row_count(2)
            .analysis_method(AnalysisMethod::BestMatch),
    )
    .unwrap();
    conn.open().unwrap();

    let summary = conn.last_import().unwrap();
    let types: Vec<_> = summary
        .table
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.data_type()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("id", ColumnType::Float),
            ("name", ColumnType::String),
            ("joined", ColumnType::DateTime),
        ]
    );
    assert_eq!(summary.rows, 2);
    assert_eq!(count_rows(&conn, "people"), 2);
}

#[test]
fn test_round_trip_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "people.csv",
        "id,score,active,joined,name\n\
         1,2.5,true,2020-01-01,Alice\n\
         2,-3,false,2021-06-15 13:45:00,\"Bob, Jr.\"\n\
         3,,TRUE,2022-12-31,O'Hara\n",
    );

    let conn = CsvConnection::new(ImportParameters::new(path)).unwrap();
    conn.open().unwrap();

    let result = conn
        .create_command()
        .unwrap()
        .query("SELECT id, score, active, joined, name FROM people ORDER BY id")
        .unwrap();

    assert_eq!(result.row_count(), 3);
    assert_eq!(result.columns(), ["id", "score", "active", "joined", "name"]);

    let rows = result.rows();
    assert_eq!(rows[0][0], Value::Integer(1));
    assert_eq!(rows[0][1], Value::Float(2.5));
    assert_eq!(rows[1][1], Value::Float(-3.0));
    assert!(rows[2][1].is_null());

    let active: Vec<_> = rows.iter().map(|r| r[2].as_bool()).collect();
    assert_eq!(active, vec![Some(true), Some(false), Some(true)]);

    assert_eq!(rows[0][3].as_str(), Some("2020-01-01 00:00:00"));
    assert_eq!(rows[1][3].as_str(), Some("2021-06-15 13:45:00"));
    assert!(rows[2][3].as_datetime().is_some());

    let names: Vec<_> = rows.iter().map(|r| r[4].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Alice", "Bob, Jr.", "O'Hara"]);
}

#[test]
fn test_headerless_source_uses_positional_names() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "pairs.csv", "a,1\nb,2\n");

    let conn =
        CsvConnection::new(ImportParameters::new(path).first_row_is_header(false)).unwrap();
    conn.open().unwrap();

    let result = conn
        .create_command()
        .unwrap()
        .query("SELECT \"Column 1\", \"Column 2\" FROM pairs ORDER BY \"Column 1\"")
        .unwrap();
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows()[1][1], Value::Integer(2));
}

#[test]
fn test_header_names_differing_only_in_case() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "dup.csv", "Name,name\nAlice,alice\n");

    let conn = CsvConnection::new(ImportParameters::new(path)).unwrap();
    conn.open().unwrap();

    let result = conn
        .create_command()
        .unwrap()
        .query("SELECT Name, name_2 FROM dup")
        .unwrap();
    assert_eq!(result.rows()[0][0], Value::Text("Alice".into()));
    assert_eq!(result.rows()[0][1], Value::Text("alice".into()));
}

#[test]
fn test_short_rows_and_nonconforming_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "ragged.csv",
        "n,label\n1,one\n2\n3,three\nn/a,four\n",
    );

    let conn = CsvConnection::new(ImportParameters::new(path).sample_row_count(3)).unwrap();
    conn.open().unwrap();

    let command = conn.create_command().unwrap();
    let missing = command
        .query_scalar("SELECT COUNT(*) FROM ragged WHERE label IS NULL")
        .unwrap();
    assert_eq!(missing, Some(Value::Integer(1)));

    let text = command
        .query_scalar("SELECT n FROM ragged WHERE label = 'four'")
        .unwrap();
    assert_eq!(text, Some(Value::Text("n/a".to_string())));
}

#[test]
fn test_semicolon_delimited_with_custom_quote() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "items.csv",
        "name;note\n'a;b';plain\nc;'it''s'\n",
    );

    let conn = CsvConnection::from_connection_string(&format!(
        "DATABASE={};DELIMITER=|;FIELDWRAPPER='",
        path.display()
    ))
    .unwrap();
    assert_eq!(conn.params().delimiter, '|');
    drop(conn);

    let params = ImportParameters::new(path).delimiter(';').quote('\'');
    let conn = CsvConnection::new(params).unwrap();
    conn.open().unwrap();

    let result = conn
        .create_command()
        .unwrap()
        .query("SELECT name, note FROM items ORDER BY name")
        .unwrap();
    assert_eq!(result.rows()[0][0], Value::Text("a;b".into()));
    assert_eq!(result.rows()[1][1], Value::Text("it's".into()));
}

fn import_count(row_count: usize, batch_size: Option<usize>) -> (usize, usize, i64) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "numbers.csv", &numbered_rows(row_count));
    let params = ImportParameters::new(path);

    let conn = match batch_size {
        Some(size) => CsvConnection::with_storage(params, SqliteStorage::with_batch_size(size)),
        None => CsvConnection::with_storage(params, SqliteStorage::new()),
    }
    .unwrap();
    conn.open().unwrap();

    let summary = conn.last_import().unwrap();
    let distinct = conn
        .create_command()
        .unwrap()
        .query_scalar("SELECT COUNT(DISTINCT id) FROM numbers")
        .unwrap()
        .and_then(|v| v.as_i64())
        .unwrap();
    assert_eq!(distinct, count_rows(&conn, "numbers"));
    (summary.rows, summary.batches, distinct)
}

#[test]
fn test_batch_boundaries_at_default_size() {
    assert_eq!(import_count(9_999, None), (9_999, 1, 9_999));
    assert_eq!(import_count(10_000, None), (10_000, 1, 10_000));
    assert_eq!(import_count(10_001, None), (10_001, 2, 10_001));
}

#[test]
fn test_batch_boundaries_with_small_batches() {
    assert_eq!(import_count(4, Some(5)), (4, 1, 4));
    assert_eq!(import_count(5, Some(5)), (5, 1, 5));
    assert_eq!(import_count(6, Some(5)), (6, 2, 6));
    assert_eq!(import_count(250, Some(7)), (250, 36, 250));
}

#[test]
fn test_sample_larger_than_batch() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "numbers.csv", &numbered_rows(20));

    let conn = CsvConnection::with_storage(
        ImportParameters::new(path).sample_row_count(15),
        SqliteStorage::with_batch_size(4),
    )
    .unwrap();
    conn.open().unwrap();

    let summary = conn.last_import().unwrap();
    assert_eq!((summary.rows, summary.batches), (20, 5));
    assert_eq!(count_rows(&conn, "numbers"), 20);
}

#[test]
fn test_existing_store_is_reused() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "numbers.csv", &numbered_rows(3));

    {
        let conn = CsvConnection::new(ImportParameters::new(&path)).unwrap();
        conn.open().unwrap();
    }

    fs::write(&path, numbered_rows(2)).unwrap();

    let conn = CsvConnection::new(ImportParameters::new(&path)).unwrap();
    conn.open().unwrap();
    assert!(conn.last_import().is_none());
    assert_eq!(count_rows(&conn, "numbers"), 3);
}

#[test]
fn test_forced_reload_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "numbers.csv", &numbered_rows(3));

    {
        let conn = CsvConnection::new(ImportParameters::new(&path)).unwrap();
        conn.open().unwrap();
        assert_eq!(count_rows(&conn, "numbers"), 3);
    }

    fs::write(&path, numbered_rows(2)).unwrap();

    let conn = CsvConnection::new(ImportParameters::new(&path).force_reload(true)).unwrap();
    conn.open().unwrap();
    assert_eq!(conn.last_import().unwrap().rows, 2);
    assert_eq!(count_rows(&conn, "numbers"), 2);
}

#[test]
fn test_separate_storage_directory() {
    let source_dir = TempDir::new().unwrap();
    let storage_dir = TempDir::new().unwrap();
    let path = write_csv(source_dir.path(), "numbers.csv", &numbered_rows(5));

    let conn =
        CsvConnection::new(ImportParameters::new(&path).storage_dir(storage_dir.path())).unwrap();
    conn.open().unwrap();

    assert_eq!(conn.storage_path(), storage_dir.path().join("numbers.csv.db3"));
    assert!(conn.storage_path().exists());
    assert!(!source_dir.path().join("numbers.csv.db3").exists());
}

#[test]
fn test_query_result_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "people.csv", "name,age\nAlice,30\n");

    let conn = CsvConnection::new(ImportParameters::new(path)).unwrap();
    conn.open().unwrap();

    let json = conn
        .create_command()
        .unwrap()
        .query("SELECT name, age FROM people")
        .unwrap()
        .to_json();
    assert_eq!(json, serde_json::json!([{ "name": "Alice", "age": 30.0 }]));
}
