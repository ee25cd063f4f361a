//! Reader configuration.
//!
//! A [`ReaderConfig`] fixes the CSV dialect (delimiter and quote character)
//! for the lifetime of a reader, plus the line-break token and chunk size
//! used by the line-count scan.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default chunk size for the line-count scan (8KB).
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default line-break token.
pub const DEFAULT_LINE_BREAK: &str = "\n";

/// Construction parameters for a [`crate::CsvReader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Field delimiter (default: ',')
    pub delimiter: char,

    /// Quote character (default: '"')
    pub quote: char,

    /// Token counted by `get_total`. Row decoding ignores it and follows
    /// standard CSV line semantics.
    pub line_break: String,

    /// Chunk size in bytes for the `get_total` scan
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            line_break: DEFAULT_LINE_BREAK.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ReaderConfig {
    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character.
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Set the line-break token counted by `get_total`.
    pub fn with_line_break(mut self, line_break: impl Into<String>) -> Self {
        self.line_break = line_break.into();
        self
    }

    /// Set the chunk size of the `get_total` scan.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Check that the configuration describes a usable dialect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ascii_byte("delimiter", self.delimiter)?;
        ascii_byte("quote", self.quote)?;
        if self.delimiter == self.quote {
            return Err(ConfigError::DelimiterIsQuote(self.delimiter));
        }
        if self.line_break.is_empty() {
            return Err(ConfigError::EmptyLineBreak);
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }

    /// Load and validate configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Missing fields take their default values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ReaderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub(crate) fn quote_byte(&self) -> u8 {
        self.quote as u8
    }
}

fn ascii_byte(field: &'static str, value: char) -> Result<u8, ConfigError> {
    if value.is_ascii() {
        Ok(value as u8)
    } else {
        Err(ConfigError::NonAscii { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.quote, '"');
        assert_eq!(config.line_break, "\n");
        assert_eq!(config.buffer_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ReaderConfig::from_yaml("delimiter: \";\"\nline_break: \"\\r\\n\"\n").unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.quote, '"');
        assert_eq!(config.line_break, "\r\n");
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_from_yaml_rejects_invalid_dialect() {
        let result = ReaderConfig::from_yaml("delimiter: \"'\"\nquote: \"'\"\n");
        assert!(matches!(result, Err(ConfigError::DelimiterIsQuote('\''))));
    }

    #[test]
    fn test_validate_rejects_non_ascii() {
        let config = ReaderConfig::default().with_delimiter('§');
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonAscii {
                field: "delimiter",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_line_break_and_zero_buffer() {
        let config = ReaderConfig::default().with_line_break("");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLineBreak)));

        let config = ReaderConfig::default().with_buffer_size(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBufferSize)));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reader.yaml");
        std::fs::write(&path, "quote: \"'\"\nbuffer_size: 16\n").unwrap();

        let config = ReaderConfig::from_file(&path).unwrap();
        assert_eq!(config.quote, '\'');
        assert_eq!(config.buffer_size, 16);
    }

    #[test]
    fn test_from_file_not_found() {
        let result = ReaderConfig::from_file("/nonexistent/reader.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
