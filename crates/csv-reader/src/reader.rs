//! Sequential, header-aware CSV reader.
//!
//! A [`CsvReader`] starts unloaded. [`CsvReader::load`] opens a file, takes
//! its first line as the column schema, and leaves a cursor on the second
//! line. Each [`CsvReader::read`] then decodes one more row into a
//! [`Record`]. [`CsvReader::get_total`] and [`CsvReader::to_array`] open
//! their own handle on the same path and never move the primary cursor.

use crate::config::{ReaderConfig, DEFAULT_LINE_BREAK};
use crate::error::{ConfigError, ReaderError};
use crate::record::{compose_item, Record};
use crate::total::scan_line_breaks;
use csv::StringRecord;
use std::cell::Cell;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reader over one CSV file at a time.
#[derive(Debug)]
pub struct CsvReader {
    config: ReaderConfig,
    state: ReaderState,
}

#[derive(Debug)]
enum ReaderState {
    Unloaded,
    Loaded(LoadedFile),
}

/// Everything tied to one successful `load`. Replacing it drops the
/// primary file handle.
#[derive(Debug)]
struct LoadedFile {
    path: PathBuf,
    reader: csv::Reader<File>,
    columns: Vec<String>,
    /// 1-based count used in diagnostics.
    read_index: usize,
    /// Row decoded by `eof` and not yet returned by `read`.
    lookahead: Option<StringRecord>,
    total: Cell<Option<u64>>,
    validated: Cell<bool>,
}

impl LoadedFile {
    fn validate(&self) -> Result<(), ReaderError> {
        if self.validated.get() {
            return Ok(());
        }

        self.reader.get_ref().metadata()?;
        self.validated.set(true);
        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<StringRecord>, ReaderError> {
        if let Some(row) = self.lookahead.take() {
            return Ok(Some(row));
        }

        let mut row = StringRecord::new();
        if self.reader.read_record(&mut row)? {
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_BREAK)
    }
}

impl CsvReader {
    /// Create a reader with the default dialect and the given line-break
    /// token. The token only affects [`CsvReader::get_total`]; an empty token
    /// falls back to `"\n"`.
    pub fn new(line_break: impl Into<String>) -> Self {
        let mut line_break = line_break.into();
        if line_break.is_empty() {
            warn!("Empty line-break token, counting {DEFAULT_LINE_BREAK:?} instead");
            line_break = DEFAULT_LINE_BREAK.to_string();
        }

        Self {
            config: ReaderConfig::default().with_line_break(line_break),
            state: ReaderState::Unloaded,
        }
    }

    /// Create a reader from a full configuration.
    pub fn with_config(config: ReaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: ReaderState::Unloaded,
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Open `path`, read its first line as the column schema and reset the
    /// cursor, the diagnostic index and the memoized total.
    ///
    /// On failure the previously loaded file, if any, stays loaded.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self, ReaderError> {
        let path = path.as_ref();
        let mut reader = self.csv_builder().from_reader(open_source(path)?);

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if columns.is_empty() {
            warn!("CSV file has no header line: {}", path.display());
        }

        info!(
            "Loaded CSV file {} with {} column(s)",
            path.display(),
            columns.len()
        );
        debug!("CSV columns: {columns:?}");

        self.state = ReaderState::Loaded(LoadedFile {
            path: path.to_path_buf(),
            reader,
            columns,
            read_index: 1,
            lookahead: None,
            total: Cell::new(None),
            validated: Cell::new(false),
        });

        Ok(self)
    }

    /// The column schema captured from the first line.
    pub fn get_columns(&self) -> Result<&[String], ReaderError> {
        Ok(self.loaded()?.columns.as_slice())
    }

    /// Path of the loaded file.
    pub fn path(&self) -> Result<&Path, ReaderError> {
        Ok(self.loaded()?.path.as_path())
    }

    /// 1-based number used in diagnostics: one more than the records returned
    /// by `read` since the last `load`.
    pub fn read_index(&self) -> Result<usize, ReaderError> {
        Ok(self.loaded()?.read_index)
    }

    /// Whether a file is loaded and its handle can still be queried.
    pub fn is_readable(&self) -> bool {
        match &self.state {
            ReaderState::Unloaded => false,
            ReaderState::Loaded(loaded) => loaded.reader.get_ref().metadata().is_ok(),
        }
    }

    /// Decode the next row and pair it with the schema.
    ///
    /// Fails with [`ReaderError::MalformedRow`] when no row is left and with
    /// [`ReaderError::ArityMismatch`] when the row has the wrong number of
    /// fields. A failed row is still consumed.
    pub fn read(&mut self) -> Result<Record, ReaderError> {
        let loaded = self.loaded_mut()?;

        let row = match loaded.next_row()? {
            Some(row) if !row.is_empty() => row,
            _ => {
                return Err(ReaderError::MalformedRow {
                    read_index: loaded.read_index,
                })
            }
        };

        let record = match compose_item(&loaded.columns, &row) {
            Ok(record) => record,
            Err(e) => {
                debug!("Rejected CSV row after line {}: {e}", loaded.read_index);
                return Err(e);
            }
        };
        loaded.read_index += 1;

        Ok(record)
    }

    /// Whether the cursor has consumed the last row.
    ///
    /// Decodes at most one row ahead, which the next `read` returns.
    pub fn eof(&mut self) -> Result<bool, ReaderError> {
        let loaded = self.loaded_mut()?;
        if loaded.lookahead.is_some() {
            return Ok(false);
        }

        match loaded.next_row()? {
            Some(row) => {
                loaded.lookahead = Some(row);
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Approximate line count of the loaded file, header included.
    ///
    /// Counts occurrences of the configured line-break token with a raw byte
    /// scan, plus one for a last line that is not terminated by the token.
    /// Quoting is ignored: a quoted field with embedded line breaks adds one
    /// line per break, so this is not a count of logical records.
    ///
    /// A break that terminates the last line does not open a new one, so a
    /// file ending with a line break counts one less than `1 + breaks`:
    /// `"a\n1\n"` and `"a\n1"` both count 2.
    ///
    /// The first result is memoized until the next `load`, even if the file
    /// changes on disk. The scan uses its own file handle.
    pub fn get_total(&self) -> Result<u64, ReaderError> {
        let loaded = self.loaded()?;
        if let Some(total) = loaded.total.get() {
            return Ok(total);
        }

        let file = open_source(&loaded.path)?;
        let scan = scan_line_breaks(
            file,
            self.config.line_break.as_bytes(),
            self.config.buffer_size,
        )?;
        let total = scan.lines();

        debug!(
            "Counted {total} line(s) in {} ({} line break(s))",
            loaded.path.display(),
            scan.breaks
        );
        loaded.total.set(Some(total));

        Ok(total)
    }

    /// Decode every data row of the loaded file into records.
    ///
    /// Uses its own file handle and the schema captured at `load`; the
    /// primary cursor is not moved.
    pub fn to_array(&self) -> Result<Vec<Record>, ReaderError> {
        let loaded = self.loaded()?;
        let mut reader = self.csv_builder().from_reader(open_source(&loaded.path)?);

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            records.push(compose_item(&loaded.columns, &row)?);
        }

        debug!(
            "Read {} record(s) from {}",
            records.len(),
            loaded.path.display()
        );

        Ok(records)
    }

    /// Iterate over the remaining rows with `eof`/`read`.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            reader: self,
            done: false,
        }
    }

    fn loaded(&self) -> Result<&LoadedFile, ReaderError> {
        match &self.state {
            ReaderState::Unloaded => Err(ReaderError::Usage),
            ReaderState::Loaded(loaded) => {
                loaded.validate()?;
                Ok(loaded)
            }
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedFile, ReaderError> {
        match &mut self.state {
            ReaderState::Unloaded => Err(ReaderError::Usage),
            ReaderState::Loaded(loaded) => {
                loaded.validate()?;
                Ok(loaded)
            }
        }
    }

    fn csv_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(true)
            .flexible(true)
            .delimiter(self.config.delimiter_byte())
            .quote(self.config.quote_byte());
        builder
    }
}

/// Iterator returned by [`CsvReader::records`].
///
/// Rows that fail to compose are yielded as errors and iteration continues
/// with the next row. An error while checking for the end stops iteration.
pub struct Records<'a> {
    reader: &'a mut CsvReader,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Record, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.eof() {
            Ok(false) => Some(self.reader.read()),
            Ok(true) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` for reading, mapping every failure to
/// [`ReaderError::ResourceNotFound`].
fn open_source(path: &Path) -> Result<File, ReaderError> {
    if !path.is_file() {
        return Err(ReaderError::resource_not_found(path));
    }

    File::open(path).map_err(|e| {
        debug!("Failed to open {}: {e}", path.display());
        ReaderError::resource_not_found(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_unloaded_accessors_fail_with_usage_error() {
        let mut reader = CsvReader::default();

        assert!(matches!(reader.get_columns(), Err(ReaderError::Usage)));
        assert!(matches!(reader.read(), Err(ReaderError::Usage)));
        assert!(matches!(reader.eof(), Err(ReaderError::Usage)));
        assert!(matches!(reader.get_total(), Err(ReaderError::Usage)));
        assert!(matches!(reader.to_array(), Err(ReaderError::Usage)));
        assert!(matches!(reader.path(), Err(ReaderError::Usage)));
        assert!(!reader.is_readable());
    }

    #[test]
    fn test_validation_is_memoized_per_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "a.csv", "a\n1\n");

        let mut reader = CsvReader::default();
        reader.load(&path).unwrap();
        let ReaderState::Loaded(loaded) = &reader.state else {
            panic!("expected loaded state");
        };
        assert!(!loaded.validated.get());

        reader.get_columns().unwrap();
        let ReaderState::Loaded(loaded) = &reader.state else {
            panic!("expected loaded state");
        };
        assert!(loaded.validated.get());

        reader.load(&path).unwrap();
        let ReaderState::Loaded(loaded) = &reader.state else {
            panic!("expected loaded state");
        };
        assert!(!loaded.validated.get());
        assert_eq!(loaded.total.get(), None);
    }

    #[test]
    fn test_eof_lookahead_is_returned_by_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "a.csv", "a,b\n1,2\n");

        let mut reader = CsvReader::default();
        reader.load(&path).unwrap();

        assert!(!reader.eof().unwrap());
        assert!(!reader.eof().unwrap());
        let record = reader.read().unwrap();
        assert_eq!(record.get("a"), Some("1"));
        assert!(reader.eof().unwrap());
    }

    #[test]
    fn test_failed_load_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "a.csv", "a,b\n1,2\n");

        let mut reader = CsvReader::default();
        reader.load(&path).unwrap();
        let result = reader.load(temp_dir.path().join("missing.csv"));
        assert!(matches!(result, Err(ReaderError::ResourceNotFound { .. })));

        assert_eq!(reader.path().unwrap(), path.as_path());
        assert_eq!(reader.get_columns().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_directory_is_not_a_resource() {
        let temp_dir = TempDir::new().unwrap();
        let mut reader = CsvReader::default();

        let result = reader.load(temp_dir.path());
        assert!(matches!(result, Err(ReaderError::ResourceNotFound { .. })));
    }

    #[test]
    fn test_new_with_empty_line_break_counts_newlines() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "a.csv", "a\n1\n2\n");

        let mut reader = CsvReader::new("");
        assert_eq!(reader.config().line_break, "\n");
        assert!(reader.config().validate().is_ok());

        reader.load(&path).unwrap();
        assert_eq!(reader.get_total().unwrap(), 3);
    }

    #[test]
    fn test_new_keeps_line_break_and_default_dialect() {
        let reader = CsvReader::new("\r\n");
        assert_eq!(reader.config().line_break, "\r\n");
        assert_eq!(reader.config().delimiter, ',');
        assert_eq!(reader.config().quote, '"');
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let config = ReaderConfig::default().with_quote(',');
        assert!(CsvReader::with_config(config).is_err());
    }
}
