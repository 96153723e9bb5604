//! Data model for the docprep preprocessing engine.
//!
//! Every transformation works on [`DocSeries`], the canonical sequence of
//! optional documents. Callers hand the engine a [`DocumentCollection`] in
//! whatever shape they have; the adapter and the chunk generator convert
//! between the two.

pub mod chunk;
pub mod collection;
pub mod doc;
pub mod error;
pub mod options;

pub use chunk::{Chunk, ChunkData, FileWindow, chunk_windows};
pub use collection::{
    DELIMITED_SUFFIXES, DocumentCollection, Shape, docs_to_series, is_delimited_path,
    series_to_docs,
};
pub use doc::{Doc, DocSeries};
pub use error::{ErrorKind, PrepError, Result};
pub use options::{
    DEFAULT_COLUMNS, DEFAULT_PREFERRED_COLUMN, FirstRow, PipelineOptions, PipelineSettings,
    StreamOptions,
};
