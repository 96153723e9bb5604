//! Pipeline and streaming configuration.
//!
//! [`PipelineOptions`] holds the raw values a caller supplies (possibly
//! deserialized from a config file). [`PipelineOptions::validate`] turns them
//! into a typed [`PipelineSettings`] before any data is touched, so every
//! configuration error surfaces at call time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Column names used when a file has no header row.
pub const DEFAULT_COLUMNS: [&str; 2] = ["docs", "tags"];

/// Column processed when present.
pub const DEFAULT_PREFERRED_COLUMN: &str = "docs";

/// How the first row of a delimited file is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstRow {
    /// Row 0 holds column names.
    #[default]
    Header,
    /// Row 0 is a data record.
    Data,
    /// Row 0 is discarded.
    Skip,
}

impl FirstRow {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstRow::Header => "header",
            FirstRow::Data => "data",
            FirstRow::Skip => "skip",
        }
    }

    /// Number of leading file records that are not data.
    pub fn leading_rows(&self) -> usize {
        match self {
            FirstRow::Data => 0,
            FirstRow::Header | FirstRow::Skip => 1,
        }
    }
}

impl FromStr for FirstRow {
    type Err = PrepError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "header" => Ok(FirstRow::Header),
            "data" => Ok(FirstRow::Data),
            "skip" => Ok(FirstRow::Skip),
            other => Err(PrepError::InvalidFirstRow {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FirstRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated options for the chunk generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Rows per chunk; 0 means a single chunk.
    pub chunksize: usize,
    /// Upper bound on data rows consumed.
    pub nrows: Option<usize>,
    pub first_row: FirstRow,
    /// Names used when the first row is not a header.
    pub columns: Vec<String>,
    pub delimiter: u8,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunksize: 0,
            nrows: None,
            first_row: FirstRow::Header,
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            delimiter: b',',
        }
    }
}

impl StreamOptions {
    /// Validates raw chunking values.
    ///
    /// Checks run in a fixed order: chunksize, first row policy, nrows.
    pub fn try_new(chunksize: i64, first_row: &str, nrows: i64) -> Result<Self> {
        if chunksize < 0 {
            return Err(PrepError::NegativeChunksize { value: chunksize });
        }
        let first_row = first_row.parse::<FirstRow>()?;
        if nrows < 0 {
            return Err(PrepError::NegativeNrows { value: nrows });
        }
        Ok(Self {
            chunksize: chunksize as usize,
            nrows: (nrows > 0).then_some(nrows as usize),
            first_row,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_chunksize(mut self, chunksize: usize) -> Self {
        self.chunksize = chunksize;
        self
    }

    #[must_use]
    pub fn with_nrows(mut self, nrows: Option<usize>) -> Self {
        self.nrows = nrows;
        self
    }

    #[must_use]
    pub fn with_first_row(mut self, first_row: FirstRow) -> Self {
        self.first_row = first_row;
        self
    }
}

/// Raw pipeline configuration as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Rows per chunk; 0 processes everything at once.
    pub chunksize: i64,
    /// One of `header`, `data` or `skip`.
    pub first_row: String,
    /// Column names for files without a header row.
    pub columns: Vec<String>,
    /// Field separator for delimited files.
    pub sep: char,
    /// Maximum number of data rows to process; 0 means all.
    pub nrows: i64,
    /// Overwrite the processed column instead of adding a new one.
    pub modify_data: bool,
    /// Column processed when present; otherwise the first column is used.
    pub preferred_column: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunksize: 0,
            first_row: FirstRow::Header.as_str().to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            sep: ',',
            nrows: 0,
            modify_data: true,
            preferred_column: DEFAULT_PREFERRED_COLUMN.to_string(),
        }
    }
}

impl PipelineOptions {
    pub fn with_chunksize(mut self, chunksize: i64) -> Self {
        self.chunksize = chunksize;
        self
    }

    pub fn with_first_row(mut self, first_row: impl Into<String>) -> Self {
        self.first_row = first_row.into();
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sep(mut self, sep: char) -> Self {
        self.sep = sep;
        self
    }

    pub fn with_nrows(mut self, nrows: i64) -> Self {
        self.nrows = nrows;
        self
    }

    pub fn with_modify_data(mut self, modify_data: bool) -> Self {
        self.modify_data = modify_data;
        self
    }

    pub fn with_preferred_column(mut self, column: impl Into<String>) -> Self {
        self.preferred_column = column.into();
        self
    }

    /// Checks every value and builds the typed settings.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found: negative chunksize,
    /// unknown first row policy, negative nrows, or a separator that is not
    /// a single ASCII character.
    pub fn validate(&self) -> Result<PipelineSettings> {
        let stream = StreamOptions::try_new(self.chunksize, &self.first_row, self.nrows)?;
        if !self.sep.is_ascii() {
            return Err(PrepError::InvalidDelimiter { value: self.sep });
        }
        let stream = stream
            .with_columns(self.columns.clone())
            .with_delimiter(self.sep as u8);
        Ok(PipelineSettings {
            stream,
            modify_data: self.modify_data,
            preferred_column: self.preferred_column.clone(),
        })
    }
}

/// Validated pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub stream: StreamOptions,
    pub modify_data: bool,
    pub preferred_column: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stream: StreamOptions::default(),
            modify_data: true,
            preferred_column: DEFAULT_PREFERRED_COLUMN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        let settings = PipelineOptions::default().validate().expect("valid");
        assert_eq!(settings.stream.chunksize, 0);
        assert_eq!(settings.stream.nrows, None);
        assert_eq!(settings.stream.first_row, FirstRow::Header);
        assert_eq!(settings.stream.columns, vec!["docs", "tags"]);
        assert_eq!(settings.stream.delimiter, b',');
        assert_eq!(settings.preferred_column, "docs");
    }

    #[test]
    fn test_each_invalid_value_has_its_own_error() {
        let err = PipelineOptions::default()
            .with_chunksize(-1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PrepError::NegativeChunksize { value: -1 }));

        let err = PipelineOptions::default()
            .with_nrows(-3)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PrepError::NegativeNrows { value: -3 }));

        let err = PipelineOptions::default()
            .with_first_row("footer")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PrepError::InvalidFirstRow { ref value } if value == "footer"));

        let err = PipelineOptions::default()
            .with_sep('§')
            .validate()
            .unwrap_err();
        assert!(matches!(err, PrepError::InvalidDelimiter { .. }));
    }

    #[test]
    fn test_nrows_zero_means_unbounded() {
        let stream = StreamOptions::try_new(10, "data", 0).expect("valid");
        assert_eq!(stream.nrows, None);
        let stream = StreamOptions::try_new(10, "skip", 4).expect("valid");
        assert_eq!(stream.nrows, Some(4));
        assert_eq!(stream.first_row.leading_rows(), 1);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: PipelineOptions =
            serde_json::from_str(r#"{"chunksize": 500, "first_row": "data"}"#).expect("parse");
        assert_eq!(options.chunksize, 500);
        assert_eq!(options.first_row, "data");
        assert_eq!(options.sep, ',');
        assert!(options.modify_data);
    }
}
