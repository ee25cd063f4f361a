//! Sequential, header-aware CSV reader
//!
//! This crate reads a delimited text file whose first line names the columns
//! and returns each following line as a [`Record`] keyed by those names.
//!
//! # Access Patterns
//!
//! - **Cursor**: [`CsvReader::read`] decodes one row per call, [`CsvReader::eof`]
//!   reports exhaustion; only one row is held in memory at a time
//! - **Materialized**: [`CsvReader::to_array`] decodes every row in a separate pass
//! - **Line count**: [`CsvReader::get_total`] scans raw bytes for line breaks
//!
//! The materialized pass and the line count each open their own handle on the
//! loaded path and leave the cursor untouched.
//!
//! # Example
//!
//! ```ignore
//! use csv_reader::CsvReader;
//!
//! let mut reader = CsvReader::default();
//! reader.load("people.csv")?;
//!
//! println!("columns: {:?}", reader.get_columns()?);
//! while !reader.eof()? {
//!     let record = reader.read()?;
//!     println!("{:?}", record.get("name"));
//! }
//! ```

mod config;
mod error;
mod reader;
mod record;
mod total;

pub use config::{ReaderConfig, DEFAULT_BUFFER_SIZE, DEFAULT_LINE_BREAK};
pub use error::{ConfigError, ReaderError};
pub use reader::{CsvReader, Records};
pub use record::{compose_item, Record};
