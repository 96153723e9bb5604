//! Type normalization around transformations.
//!
//! Transformations are written once against [`DocSeries`]. The functions in
//! this module lift them to every [`DocumentCollection`] shape and convert
//! the result back to the shape the caller passed in.

use std::path::Path;

use polars::prelude::DataFrame;

use docprep_common::{column_docs, column_names, set_column_docs};
use docprep_ingest::{new_output_path, read_table, resolve_column, write_frame};
use docprep_model::{
    DEFAULT_PREFERRED_COLUMN, DocSeries, DocumentCollection, PrepError, Result, docs_to_series,
};

use crate::transform::{Transform, apply_checked};

/// How tables and files are read by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Column processed when present; otherwise the first column is used.
    pub preferred_column: String,
    /// Field separator for file input and output.
    pub delimiter: u8,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            preferred_column: DEFAULT_PREFERRED_COLUMN.to_string(),
            delimiter: b',',
        }
    }
}

impl AdapterOptions {
    #[must_use]
    pub fn with_preferred_column(mut self, column: impl Into<String>) -> Self {
        self.preferred_column = column.into();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Applies `transform` to `collection` and returns the same shape.
///
/// File input is loaded whole, transformed, and written to a new
/// timestamped file next to the original; the returned collection is the
/// new path. The input itself is never modified.
///
/// # Errors
///
/// Returns [`PrepError::FileNotFound`] or [`PrepError::EmptyFile`] for file
/// input, [`PrepError::LengthMismatch`] when `transform` changes the length,
/// and any error of the transformation itself.
pub fn apply_to_collection(
    transform: &dyn Transform,
    collection: &DocumentCollection,
    options: &AdapterOptions,
) -> Result<DocumentCollection> {
    match collection {
        DocumentCollection::FilePath(path) => {
            tracing::warn!(
                path = %path.display(),
                "loading the whole file in memory, use the pipeline engine to stream it"
            );
            let output = transform_file(transform, path, options)?;
            Ok(DocumentCollection::FilePath(output))
        }
        DocumentCollection::Table(df) => {
            let (column, docs) = table_column(df, &options.preferred_column)?;
            let docs = apply_checked(transform, docs)?;
            let mut copy = df.clone();
            set_column_docs(&mut copy, &column, &docs)?;
            Ok(DocumentCollection::Table(copy))
        }
        other => {
            let docs = other.to_sequence()?.unwrap_or_default();
            let docs = apply_checked(transform, docs)?;
            restore(other, docs)
        }
    }
}

/// Applies `transform` and returns the canonical sequence, whatever the
/// input shape. Tables are not copied and files are not written.
///
/// # Errors
///
/// Same as [`apply_to_collection`], minus the output write errors.
pub fn apply_input_only(
    transform: &dyn Transform,
    collection: &DocumentCollection,
    options: &AdapterOptions,
) -> Result<DocSeries> {
    let docs = match collection {
        DocumentCollection::FilePath(path) => {
            let df = load_file(path, options.delimiter)?;
            table_column(&df, &options.preferred_column)?.1
        }
        DocumentCollection::Table(df) => table_column(df, &options.preferred_column)?.1,
        other => other.to_sequence()?.unwrap_or_default(),
    };
    apply_checked(transform, docs)
}

/// Converts `docs` back to the shape of `template`.
///
/// # Errors
///
/// Returns [`PrepError::LengthMismatch`] when a singleton template receives
/// anything but one document, and [`PrepError::UnsupportedType`] for
/// tables and files, which are rebuilt by their own code paths.
pub fn restore(template: &DocumentCollection, docs: DocSeries) -> Result<DocumentCollection> {
    match template {
        DocumentCollection::Singleton(_) => {
            if docs.len() != 1 {
                return Err(PrepError::LengthMismatch {
                    transform: "singleton".to_string(),
                    expected: 1,
                    actual: docs.len(),
                });
            }
            Ok(DocumentCollection::Singleton(
                docs.into_docs().into_iter().next().flatten(),
            ))
        }
        DocumentCollection::List(_) => Ok(DocumentCollection::List(docs.into_docs())),
        DocumentCollection::Array(series) => Ok(DocumentCollection::Array(docs_to_series(
            series.name().as_str(),
            docs.docs(),
        ))),
        DocumentCollection::IndexedSequence(_) => Ok(DocumentCollection::IndexedSequence(docs)),
        DocumentCollection::Table(_) => Err(PrepError::UnsupportedType {
            found: "table".to_string(),
        }),
        DocumentCollection::FilePath(_) => Err(PrepError::UnsupportedType {
            found: "file path".to_string(),
        }),
    }
}

/// Resolves the processed column of `df` and extracts it.
///
/// # Errors
///
/// Returns [`PrepError::ColumnNotFound`] when the table has no columns.
pub fn table_column(df: &DataFrame, preferred: &str) -> Result<(String, DocSeries)> {
    let column = resolve_column(&column_names(df), preferred)?;
    let docs = column_docs(df, &column)?;
    Ok((column, docs))
}

fn load_file(path: &Path, delimiter: u8) -> Result<DataFrame> {
    let df = read_table(path, delimiter)?;
    if df.height() == 0 {
        return Err(PrepError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    Ok(df)
}

fn transform_file(
    transform: &dyn Transform,
    path: &Path,
    options: &AdapterOptions,
) -> Result<std::path::PathBuf> {
    let mut df = load_file(path, options.delimiter)?;
    let (column, docs) = table_column(&df, &options.preferred_column)?;
    let docs = apply_checked(transform, docs)?;
    set_column_docs(&mut df, &column, &docs)?;

    let output = new_output_path(path)?;
    write_frame(&output, &df, options.delimiter)?;
    tracing::debug!(
        input = %path.display(),
        output = %output.display(),
        rows = df.height(),
        "wrote transformed file"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MapTransform;
    use docprep_model::Shape;

    fn upper() -> MapTransform {
        MapTransform::new("upper", str::to_uppercase)
    }

    #[test]
    fn singleton_round_trip() {
        let out = apply_to_collection(
            &upper(),
            &DocumentCollection::from("bonjour"),
            &AdapterOptions::default(),
        )
        .expect("apply");
        assert!(matches!(out, DocumentCollection::Singleton(Some(ref t)) if t == "BONJOUR"));
    }

    #[test]
    fn list_keeps_absent_slots() {
        let input = DocumentCollection::from(vec![Some("a".to_string()), None]);
        let out = apply_to_collection(&upper(), &input, &AdapterOptions::default())
            .expect("apply");
        assert_eq!(out.shape(), Shape::List);
        let DocumentCollection::List(docs) = out else {
            panic!("expected a list");
        };
        assert_eq!(docs, vec![Some("A".to_string()), None]);
    }

    #[test]
    fn restore_rejects_table_template() {
        let err = restore(
            &DocumentCollection::Table(DataFrame::empty()),
            DocSeries::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::UnsupportedType { .. }));
    }

    #[test]
    fn singleton_length_is_checked() {
        let err = restore(
            &DocumentCollection::Singleton(None),
            DocSeries::from(vec!["a", "b"]),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::LengthMismatch { expected: 1, actual: 2, .. }));
    }
}
