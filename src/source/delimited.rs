use super::{RowSource, SourceRow};
use crate::core::Result;
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tokenizer settings for delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// `None`, or the quote character itself, means quotes are escaped by
    /// doubling them.
    pub escape: Option<u8>,
    pub comment: Option<u8>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: Some(b'\\'),
            comment: Some(b'#'),
        }
    }
}

impl CsvOptions {
    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .comment(self.comment)
            .escape(self.escape.filter(|escape| *escape != self.quote));
        builder
    }
}

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

impl Origin {
    fn open(&self) -> Result<Box<dyn Read + Send>> {
        Ok(match self {
            Origin::File(path) => Box::new(File::open(path)?),
            Origin::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        })
    }
}

/// [`RowSource`] over delimited text, backed by the `csv` crate.
pub struct CsvRowSource {
    origin: Origin,
    options: CsvOptions,
    reader: Reader<Box<dyn Read + Send>>,
    record: StringRecord,
}

impl CsvRowSource {
    pub fn open(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        Self::from_origin(Origin::File(path.as_ref().to_path_buf()), options)
    }

    /// Reads rows from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, options: CsvOptions) -> Result<Self> {
        let bytes: Arc<[u8]> = Arc::from(bytes.into());
        Self::from_origin(Origin::Bytes(bytes), options)
    }

    fn from_origin(origin: Origin, options: CsvOptions) -> Result<Self> {
        let reader = options.builder().from_reader(origin.open()?);
        Ok(Self {
            origin,
            options,
            reader,
            record: StringRecord::new(),
        })
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

impl RowSource for CsvRowSource {
    fn field_count(&mut self) -> Result<usize> {
        // Peeks at the first record; it is still yielded by read_row.
        Ok(self.reader.headers()?.len())
    }

    fn read_row(&mut self) -> Result<Option<SourceRow>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }

    fn reset(&mut self) -> Result<()> {
        self.reader = self.options.builder().from_reader(self.origin.open()?);
        Ok(())
    }
}
