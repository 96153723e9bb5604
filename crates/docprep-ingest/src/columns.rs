//! Column reconciliation, resolution and naming.

use std::path::Path;

use docprep_model::{DocumentCollection, FirstRow, PrepError, Result};

use crate::reader::{ensure_file, get_file_length, read_first_record};

/// Suffix appended to the processed column in new-column mode.
pub const PROCESSED_SUFFIX: &str = "_processed";

/// Highest numeric suffix tried when a name is taken.
pub const MAX_NAME_ATTEMPTS: usize = 1000;

fn normalize_header(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Determines the column names of a delimited file.
///
/// With [`FirstRow::Header`] the names come from the first record. Otherwise
/// `columns` is reconciled with the field count of the first record: missing
/// names are synthesized as `"0"`, `"1"`, ... and surplus names are dropped.
///
/// # Errors
///
/// Returns [`PrepError::FileNotFound`] or [`PrepError::EmptyFile`].
pub fn get_columns_to_use(
    path: &Path,
    first_row: FirstRow,
    columns: &[String],
    delimiter: u8,
) -> Result<Vec<String>> {
    ensure_file(path)?;
    let Some(first) = read_first_record(path, delimiter)? else {
        return Err(PrepError::EmptyFile {
            path: path.to_path_buf(),
        });
    };
    if first_row == FirstRow::Header {
        return Ok(first.iter().map(|name| normalize_header(name)).collect());
    }
    Ok(reconcile_columns(columns, first.len()))
}

/// Fits `columns` to exactly `field_count` names.
pub fn reconcile_columns(columns: &[String], field_count: usize) -> Vec<String> {
    if field_count <= columns.len() {
        return columns[..field_count].to_vec();
    }
    let extra = field_count - columns.len();
    columns
        .iter()
        .cloned()
        .chain((0..extra).map(|idx| idx.to_string()))
        .collect()
}

/// Picks the column to process: `preferred` when present, else the first.
///
/// # Errors
///
/// Returns [`PrepError::ColumnNotFound`] when there are no columns at all.
pub fn resolve_column(available: &[String], preferred: &str) -> Result<String> {
    if available.iter().any(|name| name == preferred) {
        return Ok(preferred.to_string());
    }
    match available.first() {
        Some(first) => {
            tracing::debug!(
                preferred,
                fallback = %first,
                "preferred column missing, using first column"
            );
            Ok(first.clone())
        }
        None => Err(PrepError::ColumnNotFound {
            column: preferred.to_string(),
        }),
    }
}

/// Returns `{column}{suffix}`, or `{column}{suffix}_{i}` for the first free
/// `i` starting at 2.
///
/// # Errors
///
/// Returns [`PrepError::ColumnNameExhausted`] when every candidate is taken.
pub fn new_column_name(existing: &[String], column: &str, suffix: &str) -> Result<String> {
    let base = format!("{column}{suffix}");
    let taken = |name: &str| existing.iter().any(|c| c == name);
    if !taken(&base) {
        return Ok(base);
    }
    (2..MAX_NAME_ATTEMPTS)
        .map(|idx| format!("{base}_{idx}"))
        .find(|name| !taken(name))
        .ok_or_else(|| PrepError::ColumnNameExhausted {
            column: column.to_string(),
        })
}

/// Number of documents a collection will yield.
///
/// For files, leading header or skipped rows are not counted and `nrows`
/// (when set) caps the result. In-memory collections report their length.
pub fn docs_length(
    collection: &DocumentCollection,
    first_row: FirstRow,
    nrows: Option<usize>,
    delimiter: u8,
) -> Result<usize> {
    match collection {
        DocumentCollection::FilePath(path) => {
            let records = get_file_length(path, delimiter)?;
            let available = records.saturating_sub(first_row.leading_rows());
            Ok(nrows.map_or(available, |limit| limit.min(available)))
        }
        other => Ok(other.cardinality().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn reconcile_pads_and_truncates() {
        let columns = names(&["docs", "tags"]);
        assert_eq!(reconcile_columns(&columns, 4), names(&["docs", "tags", "0", "1"]));
        assert_eq!(reconcile_columns(&columns, 1), names(&["docs"]));
        assert_eq!(reconcile_columns(&columns, 2), columns);
    }

    #[test]
    fn resolve_prefers_named_column() {
        let available = names(&["id", "docs"]);
        assert_eq!(resolve_column(&available, "docs").expect("docs"), "docs");
        assert_eq!(resolve_column(&available, "text").expect("first"), "id");
        assert!(matches!(
            resolve_column(&[], "docs"),
            Err(PrepError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn new_column_name_skips_taken_names() {
        let existing = names(&["docs", "docs_processed", "docs_processed_2"]);
        assert_eq!(
            new_column_name(&existing, "docs", PROCESSED_SUFFIX).expect("name"),
            "docs_processed_3"
        );
        assert_eq!(
            new_column_name(&existing, "tags", PROCESSED_SUFFIX).expect("name"),
            "tags_processed"
        );
    }

    #[test]
    fn new_column_name_gives_up() {
        let mut existing = names(&["a_p"]);
        existing.extend((2..MAX_NAME_ATTEMPTS).map(|i| format!("a_p_{i}")));
        assert!(matches!(
            new_column_name(&existing, "a", "_p"),
            Err(PrepError::ColumnNameExhausted { .. })
        ));
    }
}
