//! Document preprocessing pipelines.
//!
//! - [`pipeline`]: the chunked execution [`Engine`] and pipeline [`Step`]s
//! - [`preprocessor`]: [`PreProcessor`], a reusable pipeline with options
//! - [`advisory`]: order advisories for step sequences
//! - [`words`]: corpus word counts
//! - [`logging`]: optional `tracing` subscriber setup
//!
//! # Usage
//!
//! ```ignore
//! use docprep_core::{DocumentCollection, PipelineOptions, named_pipeline, preprocess_pipeline};
//!
//! let pipeline = named_pipeline(&["to_lower", "remove_punct", "trim_string"]);
//! let out = preprocess_pipeline(
//!     &DocumentCollection::from("offers.csv"),
//!     &pipeline,
//!     &PipelineOptions::default().with_chunksize(1000),
//! )?;
//! ```

pub mod advisory;
pub mod logging;
pub mod pipeline;
pub mod preprocessor;
pub mod words;

pub use advisory::{Advisory, AdvisoryKind, AdvisoryTable, NotBefore, StepRules};
pub use pipeline::{Engine, RELEASE_HINT_ROWS, Step, named_pipeline, preprocess_pipeline};
pub use preprocessor::PreProcessor;
pub use words::{list_one_appearance_word, listing_count_words};

pub use docprep_model::{DocSeries, DocumentCollection, ErrorKind, PipelineOptions, PrepError, Result};
pub use docprep_transform::{AdapterOptions, DEFAULT_PIPELINE, Registry, Transform, default_registry};
