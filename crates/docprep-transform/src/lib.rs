//! Transformations for the docprep engine.
//!
//! - [`transform`]: the [`Transform`] trait and closure adapters
//! - [`word_boundary`]: whole-word alternation patterns
//! - [`memo`] and [`memo_frame`]: deduplicating memoization
//! - [`adapter`]: applying a transformation to any collection shape
//! - [`text`]: the bundled cleaning steps
//! - [`registry`]: named steps and the default pipeline

pub mod adapter;
pub mod memo;
pub mod memo_frame;
pub mod registry;
pub mod text;
pub mod transform;
pub mod word_boundary;

pub use adapter::{AdapterOptions, apply_input_only, apply_to_collection, restore, table_column};
pub use memo::{DEFAULT_MIN_SIZE, MemoOptions, Memoized, memoize_apply};
pub use memo_frame::FrameMemo;
pub use registry::{DEFAULT_PIPELINE, MissingDependency, Registry, Timed, default_registry};
pub use transform::{
    CUSTOM_STEP_NAME, FnTransform, MapTransform, Transform, apply_checked, display_name,
};
pub use word_boundary::{DEFAULT_DELIMITERS, WordPattern, match_words_pattern};
