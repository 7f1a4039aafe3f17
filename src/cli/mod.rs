//! Command-line front end.

pub mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use csvdb::connection::config::DEFAULT_SAMPLE_ROW_COUNT;
use csvdb::{AnalysisMethod, CsvConnection, CsvRowSource, ImportParameters, sample_schema};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csvdb", version)]
#[command(about = "Query delimited text files with SQL through an embedded SQLite store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a source into its store (reused when it already exists)
    Import(SourceArgs),
    /// Run SQL against the imported table
    Query {
        #[command(flatten)]
        source: SourceArgs,
        sql: String,
        #[arg(long)]
        json: bool,
    },
    /// Infer and print the schema without importing
    Schema {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    /// Delimited source file
    pub source: PathBuf,

    /// Directory for the store (defaults to the source's directory)
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Drop an existing store and import again
    #[arg(long)]
    pub force_reload: bool,

    #[arg(long, default_value_t = AnalysisMethod::BestMatch)]
    pub analysis_method: AnalysisMethod,

    /// Rows sampled for type inference
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROW_COUNT)]
    pub sample_rows: usize,

    /// Treat the first row as data
    #[arg(long)]
    pub no_header: bool,

    #[arg(long, default_value = ",", value_parser = parse_separator)]
    pub delimiter: char,

    #[arg(long, default_value = "\"", value_parser = parse_separator)]
    pub quote: char,

    #[arg(long, default_value = "\\", value_parser = parse_separator)]
    pub escape: char,
}

impl SourceArgs {
    pub fn to_params(&self) -> ImportParameters {
        let mut params = ImportParameters::new(&self.source)
            .force_reload(self.force_reload)
            .analysis_method(self.analysis_method)
            .sample_row_count(self.sample_rows)
            .first_row_is_header(!self.no_header)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape);

        if let Some(dir) = &self.storage_dir {
            params = params.storage_dir(dir);
        }
        params
    }
}

/// Single ASCII character; `tab` and `\t` name the tab character.
fn parse_separator(value: &str) -> std::result::Result<char, String> {
    if value.eq_ignore_ascii_case("tab") || value == "\\t" {
        return Ok('\t');
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("expected a single ASCII character, got '{}'", value)),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Import(source) => import(&source),
        Command::Query { source, sql, json } => query(&source, &sql, json),
        Command::Schema { source, json } => schema(&source, json),
    }
}

fn open(source: &SourceArgs) -> Result<CsvConnection> {
    let connection = CsvConnection::new(source.to_params())
        .with_context(|| format!("Failed to configure '{}'", source.source.display()))?;
    connection
        .open()
        .with_context(|| format!("Failed to open '{}'", source.source.display()))?;
    Ok(connection)
}

fn import(source: &SourceArgs) -> Result<()> {
    let connection = open(source)?;

    match connection.last_import() {
        Some(summary) => println!(
            "Imported {} rows into '{}' ({} batches): {}",
            summary.rows,
            summary.table.name(),
            summary.batches,
            connection.storage_path().display()
        ),
        None => println!(
            "Store already exists: {} (use --force-reload to import again)",
            connection.storage_path().display()
        ),
    }

    connection.close();
    Ok(())
}

fn query(source: &SourceArgs, sql: &str, json: bool) -> Result<()> {
    let connection = open(source)?;

    let result = connection
        .create_command()?
        .query(sql)
        .with_context(|| format!("Query failed: {}", sql))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    } else {
        result.print();
    }

    connection.close();
    Ok(())
}

fn schema(source: &SourceArgs, json: bool) -> Result<()> {
    let params = source.to_params();
    let mut reader = CsvRowSource::open(&params.source_path, params.csv_options())
        .with_context(|| format!("Failed to read '{}'", params.source_path.display()))?;

    let sampled = sample_schema(
        &params.table_name(),
        &mut reader,
        params.first_row_is_header,
        params.analysis_method,
        params.sample_row_count,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sampled.table)?);
        return Ok(());
    }

    println!("Table {} (sampled {} rows)", sampled.table.name(), sampled.rows.len());
    for column in sampled.table.columns() {
        println!("  {:<24} {}", column.name, column.data_type());
    }
    Ok(())
}
