//! Pipeline execution.
//!
//! The [`Engine`] runs an ordered list of [`Step`]s over a document
//! collection, chunk by chunk. Every step consumes the full output of the
//! previous one. File input is streamed: each processed chunk is appended to
//! a new output file right away, so the transformed file is never held in
//! memory as a whole. Other shapes are reassembled and returned in the shape
//! they came in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::DataFrame;

use docprep_common::{column_docs, column_names, set_column_docs};
use docprep_ingest::{
    ChunkAppender, FileChunks, MemoryChunks, PROCESSED_SUFFIX, new_column_name, new_output_path,
    resolve_column,
};
use docprep_model::{
    ChunkData, DocSeries, DocumentCollection, PipelineOptions, PipelineSettings, PrepError,
    Result,
};
use docprep_transform::{Registry, Transform, apply_checked, default_registry, display_name, restore};

use crate::advisory::{Advisory, AdvisoryTable};

/// Chunks at least this long get a release hint after every step.
pub const RELEASE_HINT_ROWS: usize = 1000;

/// One pipeline step: a registry name or a caller-supplied transformation.
#[derive(Clone)]
pub enum Step {
    Named(String),
    Custom(Arc<dyn Transform>),
}

impl Step {
    pub fn custom(transform: impl Transform + 'static) -> Self {
        Step::Custom(Arc::new(transform))
    }

    /// Registry key of a named step.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Step::Named(name) => Some(name),
            Step::Custom(_) => None,
        }
    }

    /// Name to show in logs.
    pub fn display(&self) -> &str {
        match self {
            Step::Named(name) => name,
            Step::Custom(transform) => display_name(transform.as_ref()),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Step::Custom(transform) => f
                .debug_tuple("Custom")
                .field(&display_name(transform.as_ref()))
                .finish(),
        }
    }
}

impl From<&str> for Step {
    fn from(name: &str) -> Self {
        Step::Named(name.to_string())
    }
}

impl From<String> for Step {
    fn from(name: String) -> Self {
        Step::Named(name)
    }
}

impl From<Arc<dyn Transform>> for Step {
    fn from(transform: Arc<dyn Transform>) -> Self {
        Step::Custom(transform)
    }
}

/// Builds a pipeline from registry names.
pub fn named_pipeline(names: &[&str]) -> Vec<Step> {
    names.iter().map(|&name| Step::from(name)).collect()
}

/// Runs pipelines against a registry, with order advisories.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    advisories: AdvisoryTable,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            advisories: AdvisoryTable::bundled().clone(),
        }
    }

    /// Replaces the order advisory table.
    #[must_use]
    pub fn with_advisories(mut self, advisories: AdvisoryTable) -> Self {
        self.advisories = advisories;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn advisories(&self) -> &AdvisoryTable {
        &self.advisories
    }

    /// Reports ordering advisories for `pipeline` without running it.
    pub fn check(&self, pipeline: &[Step]) -> Vec<Advisory> {
        self.advisories.check(pipeline, &self.registry)
    }

    /// Validates `options`, checks the step order, then runs `pipeline`.
    ///
    /// File input returns the path of a new output file; every other shape
    /// returns the same shape with the processed column or documents.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before any data is read. After
    /// that, any read, write or step error aborts the run; a partially
    /// written output file is left in place.
    pub fn run(
        &self,
        collection: &DocumentCollection,
        pipeline: &[Step],
        options: &PipelineOptions,
    ) -> Result<DocumentCollection> {
        let settings = options.validate()?;
        self.check(pipeline);
        self.execute(collection, pipeline, &settings)
    }

    /// Runs `pipeline` with already validated settings and no order check.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::run`], minus configuration errors.
    pub fn execute(
        &self,
        collection: &DocumentCollection,
        pipeline: &[Step],
        settings: &PipelineSettings,
    ) -> Result<DocumentCollection> {
        let steps = self.resolve(pipeline);
        match collection {
            DocumentCollection::FilePath(path) => {
                let output = self.run_file(path, &steps, settings)?;
                Ok(DocumentCollection::FilePath(output))
            }
            DocumentCollection::Table(df) => {
                Ok(DocumentCollection::Table(self.run_table(df, &steps, settings)?))
            }
            other => {
                let docs = other.to_sequence()?.unwrap_or_default();
                let docs = run_in_memory(docs, &steps, settings.stream.chunksize)?;
                restore(other, docs)
            }
        }
    }

    fn resolve(&self, pipeline: &[Step]) -> Vec<Arc<dyn Transform>> {
        pipeline
            .iter()
            .filter_map(|step| match step {
                Step::Named(name) => {
                    let resolved = self.registry.get(name);
                    if resolved.is_none() {
                        tracing::debug!(step = %name, "skipping unknown step");
                    }
                    resolved
                }
                Step::Custom(transform) => Some(Arc::clone(transform)),
            })
            .collect()
    }

    fn run_table(
        &self,
        df: &DataFrame,
        steps: &[Arc<dyn Transform>],
        settings: &PipelineSettings,
    ) -> Result<DataFrame> {
        let columns = column_names(df);
        let column = resolve_column(&columns, &settings.preferred_column)?;
        let target = output_column(&columns, &column, settings.modify_data)?;
        let docs = column_docs(df, &column)?;
        let docs = run_in_memory(docs, steps, settings.stream.chunksize)?;

        let mut output = df.clone();
        set_column_docs(&mut output, &target, &docs)?;
        Ok(output)
    }

    fn run_file(
        &self,
        path: &Path,
        steps: &[Arc<dyn Transform>],
        settings: &PipelineSettings,
    ) -> Result<PathBuf> {
        let chunks = FileChunks::open(path, &settings.stream)?;
        let columns = chunks.columns().to_vec();
        let column = resolve_column(&columns, &settings.preferred_column)?;
        let target = output_column(&columns, &column, settings.modify_data)?;
        let output = new_output_path(path)?;
        tracing::debug!(
            input = %path.display(),
            output = %output.display(),
            rows = chunks.total_rows(),
            chunks = chunks.chunk_count(),
            column = %column,
            "processing file"
        );

        let mut appender = ChunkAppender::new(&output, settings.stream.delimiter);
        for chunk in chunks {
            let chunk = chunk?;
            let ChunkData::Frame(mut df) = chunk.data else {
                return Err(PrepError::DataFrame {
                    message: format!("chunk {} of {} is not a table", chunk.number, path.display()),
                });
            };
            let docs = column_docs(&df, &column)?.with_start(chunk.rows.start);
            let docs = process_chunk(docs, steps)?;
            set_column_docs(&mut df, &target, &docs)?;
            appender.append(&df)?;
        }
        tracing::debug!(
            output = %output.display(),
            rows = appender.rows(),
            appends = appender.appends(),
            "pipeline output written"
        );
        Ok(output)
    }
}

/// Column receiving the output: the input column, or a fresh one.
fn output_column(columns: &[String], column: &str, modify_data: bool) -> Result<String> {
    if modify_data {
        Ok(column.to_string())
    } else {
        new_column_name(columns, column, PROCESSED_SUFFIX)
    }
}

fn run_in_memory(
    docs: DocSeries,
    steps: &[Arc<dyn Transform>],
    chunksize: usize,
) -> Result<DocSeries> {
    let mut parts = Vec::new();
    for chunk in MemoryChunks::from_docs(docs, chunksize) {
        let chunk = chunk?;
        let ChunkData::Docs(docs) = chunk.data else {
            return Err(PrepError::DataFrame {
                message: format!("chunk {} is not a sequence", chunk.number),
            });
        };
        parts.push(process_chunk(docs, steps)?);
    }
    Ok(DocSeries::concat(parts))
}

/// Applies every step in order to one chunk.
fn process_chunk(docs: DocSeries, steps: &[Arc<dyn Transform>]) -> Result<DocSeries> {
    let rows = docs.len();
    let mut docs = docs;
    for step in steps {
        let name = display_name(step.as_ref());
        tracing::debug!(step = name, rows, "applying step");
        docs = apply_checked(step.as_ref(), docs)?;
        if rows >= RELEASE_HINT_ROWS {
            tracing::trace!(step = name, rows, "previous intermediate result released");
        }
    }
    Ok(docs)
}

/// Runs `pipeline` on `collection` with the default engine.
///
/// # Errors
///
/// See [`Engine::run`].
pub fn preprocess_pipeline(
    collection: &DocumentCollection,
    pipeline: &[Step],
    options: &PipelineOptions,
) -> Result<DocumentCollection> {
    Engine::default().run(collection, pipeline, options)
}
