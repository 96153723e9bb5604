//! Polars helpers for moving documents in and out of dataframes.

use polars::prelude::{AnyValue, DataFrame, IntoColumn};

use docprep_model::{Doc, DocSeries, PrepError, Result, docs_to_series, series_to_docs};

/// Converts an `AnyValue` to document text. `Null` is absent.
///
/// Floats are printed without trailing zeros so that numeric cells read
/// from a typed table look the way they did in the source file.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use docprep_common::any_to_doc;
///
/// assert_eq!(any_to_doc(&AnyValue::Null), None);
/// assert_eq!(any_to_doc(&AnyValue::Int32(42)), Some("42".to_string()));
/// assert_eq!(any_to_doc(&AnyValue::Float64(1.50)), Some("1.5".to_string()));
/// ```
pub fn any_to_doc(value: &AnyValue<'_>) -> Doc {
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(*v)),
        AnyValue::Float64(v) => format_numeric(*v),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    };
    Some(text)
}

/// Converts an `AnyValue` to `i64`, returning `None` for nulls and
/// non-integer values.
pub fn any_to_i64(value: &AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Int8(v) => Some(i64::from(*v)),
        AnyValue::Int16(v) => Some(i64::from(*v)),
        AnyValue::Int32(v) => Some(i64::from(*v)),
        AnyValue::Int64(v) => Some(*v),
        AnyValue::UInt8(v) => Some(i64::from(*v)),
        AnyValue::UInt16(v) => Some(i64::from(*v)),
        AnyValue::UInt32(v) => Some(i64::from(*v)),
        AnyValue::UInt64(v) => i64::try_from(*v).ok(),
        AnyValue::String(s) => s.trim().parse().ok(),
        AnyValue::StringOwned(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Extracts a column as a named canonical sequence.
///
/// # Errors
///
/// Returns [`PrepError::ColumnNotFound`] when the column does not exist.
pub fn column_docs(df: &DataFrame, name: &str) -> Result<DocSeries> {
    let column = df.column(name).map_err(|_| PrepError::ColumnNotFound {
        column: name.to_string(),
    })?;
    let docs = series_to_docs(column.as_materialized_series())?;
    Ok(DocSeries::named(name, docs))
}

/// Replaces (or appends) `name` with the given documents.
///
/// # Errors
///
/// Returns [`PrepError::LengthMismatch`] if the documents do not match the
/// table height.
pub fn set_column_docs(df: &mut DataFrame, name: &str, docs: &DocSeries) -> Result<()> {
    if docs.len() != df.height() && df.width() > 0 {
        return Err(PrepError::LengthMismatch {
            transform: format!("column '{name}'"),
            expected: df.height(),
            actual: docs.len(),
        });
    }
    df.with_column(docs_to_series(name, docs.docs()).into_column())?;
    Ok(())
}

/// Builds an all-string table from rows of optional cells.
///
/// Rows shorter than `columns` are padded with nulls; longer rows are cut.
pub fn frame_from_rows(columns: &[String], rows: &[Vec<Doc>]) -> Result<DataFrame> {
    let series = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Doc> = rows
                .iter()
                .map(|row| row.get(idx).cloned().flatten())
                .collect();
            docs_to_series(name, &values).into_column()
        })
        .collect();
    Ok(DataFrame::new(series)?)
}

/// Reads one row of a table as optional cells, in column order.
pub fn row_docs(df: &DataFrame, row: usize) -> Result<Vec<Doc>> {
    df.get_columns()
        .iter()
        .map(|column| Ok(any_to_doc(&column.get(row)?)))
        .collect()
}
