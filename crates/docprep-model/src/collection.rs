//! External document collection shapes.

use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, DataType, IntoColumn, Series, StringChunked};
use serde_json::Value;

use crate::doc::{Doc, DocSeries};
use crate::error::{PrepError, Result};

/// File suffixes treated as delimited text.
pub const DELIMITED_SUFFIXES: [&str; 2] = [".csv", ".tsv"];

/// Returns true if `text` names a delimited file by suffix.
pub fn is_delimited_path(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    DELIMITED_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Shape tag of a [`DocumentCollection`], without the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Singleton,
    List,
    Array,
    IndexedSequence,
    Table,
    FilePath,
}

/// A collection of documents in one of the supported representations.
#[derive(Debug, Clone)]
pub enum DocumentCollection {
    /// A single document.
    Singleton(Doc),
    /// An ordered list of optional documents.
    List(Vec<Doc>),
    /// A Polars series; non-string dtypes are cast to text on read.
    Array(Series),
    /// The canonical sequence itself.
    IndexedSequence(DocSeries),
    /// A table; one column is processed.
    Table(DataFrame),
    /// A delimited file that has not been loaded.
    FilePath(PathBuf),
}

impl DocumentCollection {
    /// Detects the representation of a JSON value.
    ///
    /// Strings ending in a delimited suffix become [`DocumentCollection::FilePath`],
    /// other strings [`DocumentCollection::Singleton`]; arrays of strings or
    /// nulls become [`DocumentCollection::List`]; objects of equal-length
    /// arrays become [`DocumentCollection::Table`].
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::UnsupportedType`] for any other value.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::from(text.as_str())),
            Value::Array(items) => Ok(Self::List(json_docs(items)?)),
            Value::Object(map) => {
                let mut columns = Vec::with_capacity(map.len());
                let mut height = None;
                for (name, column) in map {
                    let Value::Array(items) = column else {
                        return Err(unsupported(column));
                    };
                    if *height.get_or_insert(items.len()) != items.len() {
                        return Err(PrepError::UnsupportedType {
                            found: "object with unequal column lengths".to_string(),
                        });
                    }
                    let docs = json_docs(items)?;
                    columns.push(docs_to_series(name, &docs).into_column());
                }
                let df = DataFrame::new(columns)?;
                Ok(Self::Table(df))
            }
            other => Err(unsupported(other)),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            DocumentCollection::Singleton(_) => Shape::Singleton,
            DocumentCollection::List(_) => Shape::List,
            DocumentCollection::Array(_) => Shape::Array,
            DocumentCollection::IndexedSequence(_) => Shape::IndexedSequence,
            DocumentCollection::Table(_) => Shape::Table,
            DocumentCollection::FilePath(_) => Shape::FilePath,
        }
    }

    /// Row count for in-memory variants. Files report `None`; their length
    /// is counted lazily by the ingest layer.
    pub fn cardinality(&self) -> Option<usize> {
        match self {
            DocumentCollection::Singleton(_) => Some(1),
            DocumentCollection::List(docs) => Some(docs.len()),
            DocumentCollection::Array(series) => Some(series.len()),
            DocumentCollection::IndexedSequence(docs) => Some(docs.len()),
            DocumentCollection::Table(df) => Some(df.height()),
            DocumentCollection::FilePath(_) => None,
        }
    }

    /// Canonical sequence for the sequence-like variants.
    ///
    /// Returns `None` for tables and files, which need a column resolved
    /// (and, for files, a read) first.
    pub fn to_sequence(&self) -> Result<Option<DocSeries>> {
        let docs = match self {
            DocumentCollection::Singleton(doc) => DocSeries::new(vec![doc.clone()]),
            DocumentCollection::List(docs) => DocSeries::new(docs.clone()),
            DocumentCollection::Array(series) => {
                DocSeries::named(series.name().as_str(), series_to_docs(series)?)
            }
            DocumentCollection::IndexedSequence(docs) => docs.clone(),
            DocumentCollection::Table(_) | DocumentCollection::FilePath(_) => return Ok(None),
        };
        Ok(Some(docs))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            DocumentCollection::FilePath(path) => Some(path),
            _ => None,
        }
    }
}

fn json_docs(items: &[Value]) -> Result<Vec<Doc>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(Some(text.clone())),
            Value::Null => Ok(None),
            other => Err(unsupported(other)),
        })
        .collect()
}

fn unsupported(value: &Value) -> PrepError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    PrepError::UnsupportedType {
        found: found.to_string(),
    }
}

/// Builds a string series from document slots; absent slots become nulls.
pub fn docs_to_series(name: &str, docs: &[Doc]) -> Series {
    let ca: StringChunked = docs.iter().map(|doc| doc.as_deref()).collect();
    ca.with_name(name.into()).into()
}

/// Reads a series as document slots, casting non-string dtypes to text.
pub fn series_to_docs(series: &Series) -> Result<Vec<Doc>> {
    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

impl From<&str> for DocumentCollection {
    fn from(text: &str) -> Self {
        if is_delimited_path(text) {
            DocumentCollection::FilePath(PathBuf::from(text))
        } else {
            DocumentCollection::Singleton(Some(text.to_string()))
        }
    }
}

impl From<String> for DocumentCollection {
    fn from(text: String) -> Self {
        if is_delimited_path(&text) {
            DocumentCollection::FilePath(PathBuf::from(text))
        } else {
            DocumentCollection::Singleton(Some(text))
        }
    }
}

impl From<PathBuf> for DocumentCollection {
    fn from(path: PathBuf) -> Self {
        DocumentCollection::FilePath(path)
    }
}

impl From<Vec<Doc>> for DocumentCollection {
    fn from(docs: Vec<Doc>) -> Self {
        DocumentCollection::List(docs)
    }
}

impl From<Vec<&str>> for DocumentCollection {
    fn from(docs: Vec<&str>) -> Self {
        DocumentCollection::List(docs.into_iter().map(|d| Some(d.to_string())).collect())
    }
}

impl From<Series> for DocumentCollection {
    fn from(series: Series) -> Self {
        DocumentCollection::Array(series)
    }
}

impl From<DocSeries> for DocumentCollection {
    fn from(docs: DocSeries) -> Self {
        DocumentCollection::IndexedSequence(docs)
    }
}

impl From<DataFrame> for DocumentCollection {
    fn from(df: DataFrame) -> Self {
        DocumentCollection::Table(df)
    }
}
