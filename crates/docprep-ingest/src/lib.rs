//! Delimited file access and chunk streaming.

pub mod columns;
pub mod naming;
pub mod reader;
pub mod streaming;
pub mod writer;

pub use columns::{
    MAX_NAME_ATTEMPTS, PROCESSED_SUFFIX, docs_length, get_columns_to_use, new_column_name,
    reconcile_columns, resolve_column,
};
pub use naming::{new_output_path, new_output_path_at};
pub use reader::{get_file_length, read_first_record};
pub use streaming::{ChunkStream, FileChunks, MemoryChunks, read_table};
pub use writer::{ChunkAppender, write_frame};
