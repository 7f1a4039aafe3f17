use crate::core::{CsvDbError, Result, text::parse_bool};
use crate::inference::AnalysisMethod;
use crate::source::CsvOptions;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_QUOTE: char = '"';
pub const DEFAULT_ESCAPE: char = '\\';
pub const DEFAULT_SAMPLE_ROW_COUNT: usize = 100;

/// Store credentials, handed to the storage driver when a handle is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.password.is_none()
    }
}

/// Import and connection parameters
///
/// Built once and handed to the connection; every builder method consumes
/// `self`. Separator characters must be ASCII because the reader works on
/// bytes; anything else falls back to the default with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportParameters {
    /// Delimited source file
    pub source_path: PathBuf,

    /// Directory holding the store; the source's directory when unset
    pub storage_dir: Option<PathBuf>,

    pub credentials: Credentials,

    pub first_row_is_header: bool,

    pub delimiter: char,

    /// Field wrapper (quote) character
    pub quote: char,

    pub escape: char,

    /// Drop and re-import an existing store on open
    pub force_reload: bool,

    pub analysis_method: AnalysisMethod,

    /// Rows sampled for type inference, at least 1
    pub sample_row_count: usize,
}

impl ImportParameters {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            storage_dir: None,
            credentials: Credentials::default(),
            first_row_is_header: true,
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            escape: DEFAULT_ESCAPE,
            force_reload: false,
            analysis_method: AnalysisMethod::default(),
            sample_row_count: DEFAULT_SAMPLE_ROW_COUNT,
        }
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.credentials.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.credentials.password = Some(password.into());
        self
    }

    pub fn first_row_is_header(mut self, first_row_is_header: bool) -> Self {
        self.first_row_is_header = first_row_is_header;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = ascii_or_default("DELIMITER", delimiter, DEFAULT_DELIMITER);
        self
    }

    pub fn quote(mut self, quote: char) -> Self {
        self.quote = ascii_or_default("FIELDWRAPPER", quote, DEFAULT_QUOTE);
        self
    }

    pub fn escape(mut self, escape: char) -> Self {
        self.escape = ascii_or_default("ESCAPE", escape, DEFAULT_ESCAPE);
        self
    }

    pub fn force_reload(mut self, force_reload: bool) -> Self {
        self.force_reload = force_reload;
        self
    }

    pub fn analysis_method(mut self, method: AnalysisMethod) -> Self {
        self.analysis_method = method;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn sample_row_count(mut self, count: usize) -> Self {
        self.sample_row_count = count.max(1);
        self
    }

    /// Directory the store lives in.
    pub fn resolved_storage_dir(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => dir.clone(),
            None => match self.source_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Target table name: the source file name without extension.
    pub fn table_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "data".to_string())
    }

    pub fn csv_options(&self) -> CsvOptions {
        let defaults = CsvOptions::default();
        CsvOptions {
            delimiter: ascii_byte(self.delimiter).unwrap_or(defaults.delimiter),
            quote: ascii_byte(self.quote).unwrap_or(defaults.quote),
            escape: ascii_byte(self.escape).or(defaults.escape),
            comment: defaults.comment,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(CsvDbError::invalid_config("DATABASE", ""));
        }

        if let Some(dir) = &self.storage_dir
            && !dir.is_dir()
        {
            return Err(CsvDbError::StorageDirectoryMissing(dir.clone()));
        }

        Ok(())
    }

    /// Parse from connection string
    ///
    /// Format: `KEY=VALUE;KEY=VALUE;...` with case-insensitive keys. Unknown
    /// keys are ignored and unparseable values keep their defaults. Only a
    /// missing `DATABASE` is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvdb::ImportParameters;
    ///
    /// let params = ImportParameters::from_connection_string(
    ///     "DATABASE=data/people.csv;DELIMITER=|;ROWSTOANALYSE=50",
    /// )
    /// .unwrap();
    /// assert_eq!(params.delimiter, '|');
    /// assert_eq!(params.sample_row_count, 50);
    /// ```
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let entries: Vec<(String, &str)> = connection_string
            .split(';')
            .filter_map(|entry| entry.split_once('='))
            .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim()))
            .collect();

        let database = entries
            .iter()
            .find(|(key, value)| key == "DATABASE" && !value.is_empty())
            .map(|(_, value)| *value)
            .ok_or_else(|| CsvDbError::invalid_config("DATABASE", ""))?;

        let mut params = Self::new(database);

        for (key, value) in entries {
            match key.as_str() {
                "DATABASE" => {}
                "STORAGEDIR" => {
                    if !value.is_empty() {
                        params = params.storage_dir(value);
                    }
                }
                "USER" => params = params.user(value),
                "PASSWORD" => params = params.password(value),
                "FIRSTROWISHEADER" => {
                    params.first_row_is_header = bool_or_default(&key, value, true);
                }
                "DELIMITER" => {
                    params = params.delimiter(char_or_default(&key, value, DEFAULT_DELIMITER));
                }
                "FIELDWRAPPER" | "QUOTE" => {
                    params = params.quote(char_or_default(&key, value, DEFAULT_QUOTE));
                }
                "ESCAPE" => {
                    params = params.escape(char_or_default(&key, value, DEFAULT_ESCAPE));
                }
                "FORCESTORAGERELOAD" => {
                    params.force_reload = bool_or_default(&key, value, false);
                }
                "ANALYSISMETHOD" => {
                    params.analysis_method = value.parse().unwrap_or_else(|err| {
                        log_fallback(&err);
                        AnalysisMethod::default()
                    });
                }
                "ROWSTOANALYSE" => {
                    let count = value.parse::<i64>().unwrap_or_else(|_| {
                        log_fallback(&CsvDbError::invalid_config(key.as_str(), value));
                        DEFAULT_SAMPLE_ROW_COUNT as i64
                    });
                    params = params.sample_row_count(usize::try_from(count).unwrap_or(1));
                }
                _ => {}
            }
        }

        Ok(params)
    }

    /// Convert to connection string
    pub fn to_connection_string(&self) -> String {
        let mut parts = vec![format!("DATABASE={}", self.source_path.display())];

        if let Some(dir) = &self.storage_dir {
            parts.push(format!("STORAGEDIR={}", dir.display()));
        }
        if let Some(user) = &self.credentials.user {
            parts.push(format!("USER={}", user));
        }
        if self.credentials.password.is_some() {
            // Don't expose password
            parts.push("PASSWORD=***".to_string());
        }

        parts.push(format!("FIRSTROWISHEADER={}", self.first_row_is_header));
        parts.push(format!("DELIMITER={}", display_char(self.delimiter)));
        parts.push(format!("FIELDWRAPPER={}", display_char(self.quote)));
        parts.push(format!("ESCAPE={}", display_char(self.escape)));
        parts.push(format!("FORCESTORAGERELOAD={}", self.force_reload));
        parts.push(format!("ANALYSISMETHOD={}", self.analysis_method));
        parts.push(format!("ROWSTOANALYSE={}", self.sample_row_count));

        parts.join(";")
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

fn log_fallback(err: &CsvDbError) {
    warn!(error = %err, "falling back to default");
}

fn bool_or_default(key: &str, value: &str, default: bool) -> bool {
    parse_bool(value).unwrap_or_else(|| {
        log_fallback(&CsvDbError::invalid_config(key, value));
        default
    })
}

/// First character of `value`; `TAB` and `\t` name the tab character.
fn char_or_default(key: &str, value: &str, default: char) -> char {
    if value.eq_ignore_ascii_case("tab") || value == "\\t" {
        return '\t';
    }
    value.chars().next().unwrap_or_else(|| {
        log_fallback(&CsvDbError::invalid_config(key, value));
        default
    })
}

fn ascii_or_default(key: &str, c: char, default: char) -> char {
    if c.is_ascii() {
        c
    } else {
        log_fallback(&CsvDbError::invalid_config(key, c.to_string()));
        default
    }
}

fn ascii_byte(c: char) -> Option<u8> {
    if c.is_ascii() { Some(c as u8) } else { None }
}

fn display_char(c: char) -> String {
    if c == '\t' { "TAB".to_string() } else { c.to_string() }
}
