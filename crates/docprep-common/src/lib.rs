//! Shared utilities for docprep crates.
//!
//! This crate provides Polars helpers used across the workspace to move
//! documents between dataframes and canonical sequences.

pub mod polars;

pub use polars::{
    any_to_doc, any_to_i64, column_docs, column_names, format_numeric, frame_from_rows, row_docs,
    set_column_docs,
};
