//! Chunked streaming over document collections.
//!
//! This module turns any [`DocumentCollection`] into a finite, in-order
//! sequence of [`Chunk`]s. In-memory collections are sliced. Files are read
//! window by window: each chunk reopens the file, seeks to where the previous
//! chunk stopped and reads at most `chunksize` records, so only one chunk of
//! rows is held in memory and no file handle outlives its chunk.
//!
//! # Usage
//!
//! ```ignore
//! use docprep_ingest::streaming::ChunkStream;
//! use docprep_model::StreamOptions;
//!
//! let options = StreamOptions::try_new(1000, "header", 0)?;
//! for chunk in ChunkStream::open(&collection, &options)? {
//!     let chunk = chunk?;
//!     // process chunk.data
//! }
//! ```

use std::ops::Range;
use std::path::{Path, PathBuf};

use csv::{Position, StringRecord};
use polars::prelude::DataFrame;

use docprep_common::frame_from_rows;
use docprep_model::{
    Chunk, ChunkData, DocSeries, DocumentCollection, FileWindow, PrepError, Result,
    StreamOptions, chunk_windows,
};

use crate::columns::get_columns_to_use;
use crate::reader::{csv_error, ensure_file, get_file_length, next_record, open_reader, record_docs};

/// Progress is logged each time this share of rows (in percent) is consumed.
const PROGRESS_STEP: usize = 10;

/// Lazily reads a delimited file in row windows.
#[derive(Debug)]
pub struct FileChunks {
    path: PathBuf,
    options: StreamOptions,
    columns: Vec<String>,
    total_rows: usize,
    windows: std::vec::IntoIter<Range<usize>>,
    chunk_count: usize,
    resume_at: Option<Position>,
    number: usize,
    next_progress: usize,
}

impl FileChunks {
    /// Validates the file and prepares the row windows. Nothing beyond the
    /// record count and the first record is read here.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FileNotFound`] if the file is missing and
    /// [`PrepError::EmptyFile`] if it has no records.
    pub fn open(path: &Path, options: &StreamOptions) -> Result<Self> {
        ensure_file(path)?;
        let records = get_file_length(path, options.delimiter)?;
        if records == 0 {
            return Err(PrepError::EmptyFile {
                path: path.to_path_buf(),
            });
        }
        let columns =
            get_columns_to_use(path, options.first_row, &options.columns, options.delimiter)?;

        let available = records.saturating_sub(options.first_row.leading_rows());
        let total_rows = options.nrows.map_or(available, |limit| limit.min(available));
        let windows = chunk_windows(total_rows, options.chunksize);
        tracing::debug!(
            path = %path.display(),
            records,
            rows = total_rows,
            chunks = windows.len(),
            first_row = %options.first_row,
            "opened file stream"
        );

        Ok(Self {
            path: path.to_path_buf(),
            options: options.clone(),
            columns,
            total_rows,
            chunk_count: windows.len(),
            windows: windows.into_iter(),
            resume_at: None,
            number: 0,
            next_progress: PROGRESS_STEP,
        })
    }

    /// Resolved column names shared by every chunk.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows that will be yielded in total.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_window(&mut self, window: Range<usize>) -> Result<Chunk> {
        let mut reader = open_reader(&self.path, self.options.delimiter)?;
        let mut record = StringRecord::new();
        match self.resume_at.take() {
            Some(position) => reader
                .seek(position)
                .map_err(|err| csv_error(&self.path, &err))?,
            None => {
                for _ in 0..self.options.first_row.leading_rows() {
                    next_record(&mut reader, &mut record, &self.path)?;
                }
            }
        }
        let start = reader.position().clone();

        let mut rows = Vec::with_capacity(window.len());
        while rows.len() < window.len() && next_record(&mut reader, &mut record, &self.path)? {
            rows.push(record_docs(&record));
        }
        self.resume_at = Some(reader.position().clone());

        let frame = frame_from_rows(&self.columns, &rows)?;
        let chunk = Chunk {
            number: self.number,
            rows: window.start..window.start + rows.len(),
            data: ChunkData::Frame(frame),
            window: Some(FileWindow {
                byte_offset: start.byte(),
                line: start.line(),
            }),
        };
        self.number += 1;
        self.report_progress(chunk.rows.end);
        Ok(chunk)
    }

    fn report_progress(&mut self, consumed: usize) {
        if self.total_rows == 0 {
            return;
        }
        let percent = consumed * 100 / self.total_rows;
        if percent >= self.next_progress {
            tracing::info!(
                path = %self.path.display(),
                rows = consumed,
                total = self.total_rows,
                "{percent}% of rows processed"
            );
            self.next_progress = (percent / PROGRESS_STEP) * PROGRESS_STEP + PROGRESS_STEP;
        }
    }
}

impl Iterator for FileChunks {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.windows.next()?;
        let chunk = self.read_window(window);
        if chunk.is_err() {
            self.windows = Vec::new().into_iter();
        }
        Some(chunk)
    }
}

#[derive(Debug)]
enum MemorySource {
    Docs(DocSeries),
    Frame(DataFrame),
}

/// Positional slices of an in-memory collection.
#[derive(Debug)]
pub struct MemoryChunks {
    source: MemorySource,
    windows: std::vec::IntoIter<Range<usize>>,
    chunk_count: usize,
    number: usize,
}

impl MemoryChunks {
    pub fn from_docs(docs: DocSeries, chunksize: usize) -> Self {
        let windows = chunk_windows(docs.len(), chunksize);
        Self {
            chunk_count: windows.len(),
            windows: windows.into_iter(),
            source: MemorySource::Docs(docs),
            number: 0,
        }
    }

    pub fn from_frame(df: DataFrame, chunksize: usize) -> Self {
        let windows = chunk_windows(df.height(), chunksize);
        Self {
            chunk_count: windows.len(),
            windows: windows.into_iter(),
            source: MemorySource::Frame(df),
            number: 0,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

impl Iterator for MemoryChunks {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.windows.next()?;
        let data = match &self.source {
            MemorySource::Docs(docs) => ChunkData::Docs(docs.slice(window.clone())),
            MemorySource::Frame(df) => {
                ChunkData::Frame(df.slice(window.start as i64, window.len()))
            }
        };
        let chunk = Chunk {
            number: self.number,
            rows: window,
            data,
            window: None,
        };
        self.number += 1;
        Some(Ok(chunk))
    }
}

/// Chunk sequence over any supported collection.
#[derive(Debug)]
pub enum ChunkStream {
    Memory(MemoryChunks),
    File(FileChunks),
}

impl ChunkStream {
    /// Opens a chunk stream.
    ///
    /// `nrows`, `first_row`, `columns` and `delimiter` only apply to files;
    /// in-memory collections are sliced as they are.
    pub fn open(collection: &DocumentCollection, options: &StreamOptions) -> Result<Self> {
        match collection {
            DocumentCollection::FilePath(path) => {
                Ok(ChunkStream::File(FileChunks::open(path, options)?))
            }
            DocumentCollection::Table(df) => Ok(ChunkStream::Memory(MemoryChunks::from_frame(
                df.clone(),
                options.chunksize,
            ))),
            other => {
                let docs = other.to_sequence()?.unwrap_or_default();
                Ok(ChunkStream::Memory(MemoryChunks::from_docs(
                    docs,
                    options.chunksize,
                )))
            }
        }
    }

    pub fn chunk_count(&self) -> usize {
        match self {
            ChunkStream::Memory(chunks) => chunks.chunk_count(),
            ChunkStream::File(chunks) => chunks.chunk_count(),
        }
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ChunkStream::Memory(chunks) => chunks.next(),
            ChunkStream::File(chunks) => chunks.next(),
        }
    }
}

/// Reads a whole delimited file, first row as header, into one table.
pub fn read_table(path: &Path, delimiter: u8) -> Result<DataFrame> {
    let options = StreamOptions::default().with_delimiter(delimiter);
    let mut chunks = FileChunks::open(path, &options)?;
    match chunks.next() {
        Some(chunk) => match chunk?.data {
            ChunkData::Frame(df) => Ok(df),
            ChunkData::Docs(_) => Err(PrepError::DataFrame {
                message: format!("unexpected sequence chunk from {}", path.display()),
            }),
        },
        None => Err(PrepError::EmptyFile {
            path: path.to_path_buf(),
        }),
    }
}
