//! Incremental delimited output.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use polars::prelude::DataFrame;

use docprep_common::{any_to_doc, column_names};
use docprep_model::{PrepError, Result};

/// Appends dataframe chunks to one output file.
///
/// The file is opened and closed inside every [`ChunkAppender::append`]
/// call. The header row is written with the first chunk only, and that
/// first write truncates the file, so the appender can target a path
/// reserved by [`new_output_path`](crate::new_output_path).
#[derive(Debug)]
pub struct ChunkAppender {
    path: PathBuf,
    delimiter: u8,
    appends: usize,
    rows: usize,
}

impl ChunkAppender {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
            appends: 0,
            rows: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of chunks written so far.
    pub fn appends(&self) -> usize {
        self.appends
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Writes `df` at the end of the output file.
    pub fn append(&mut self, df: &DataFrame) -> Result<()> {
        let file = self.open()?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_writer(file);
        let write_err = |err: csv::Error| PrepError::Csv {
            path: self.path.clone(),
            message: err.to_string(),
        };

        if self.appends == 0 {
            writer.write_record(column_names(df)).map_err(write_err)?;
        }
        let columns = df.get_columns();
        let mut record: Vec<String> = Vec::with_capacity(columns.len());
        for row in 0..df.height() {
            record.clear();
            for column in columns {
                let value = column.get(row)?;
                record.push(any_to_doc(&value).unwrap_or_default());
            }
            writer.write_record(&record).map_err(write_err)?;
        }
        writer.flush().map_err(|source| PrepError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        self.appends += 1;
        self.rows += df.height();
        tracing::debug!(
            path = %self.path.display(),
            chunk = self.appends,
            rows = df.height(),
            "appended chunk"
        );
        Ok(())
    }

    fn open(&self) -> Result<File> {
        let result = if self.appends == 0 {
            File::create(&self.path)
        } else {
            OpenOptions::new().append(true).open(&self.path)
        };
        result.map_err(|source| PrepError::FileWrite {
            path: self.path.clone(),
            source,
        })
    }
}

/// Writes a whole table (header plus rows) to `path`.
pub fn write_frame(path: &Path, df: &DataFrame, delimiter: u8) -> Result<()> {
    ChunkAppender::new(path, delimiter).append(df)
}
