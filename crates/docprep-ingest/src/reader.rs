//! Low-level delimited record access.

use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use docprep_model::{Doc, PrepError, Result};

pub(crate) fn csv_error(path: &Path, err: &csv::Error) -> PrepError {
    PrepError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Fails with [`PrepError::FileNotFound`] unless `path` is a regular file.
pub fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PrepError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Opens a headerless, flexible reader over `path`.
pub fn open_reader(path: &Path, delimiter: u8) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|source| PrepError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file))
}

fn is_blank(record: &StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].is_empty())
}

/// Reads the next non-blank record. Returns `false` at end of input.
pub fn next_record(
    reader: &mut Reader<File>,
    record: &mut StringRecord,
    path: &Path,
) -> Result<bool> {
    loop {
        let more = reader
            .read_record(record)
            .map_err(|err| csv_error(path, &err))?;
        if !more {
            return Ok(false);
        }
        if !is_blank(record) {
            return Ok(true);
        }
    }
}

/// Counts the non-blank records of a delimited file.
///
/// # Errors
///
/// Returns [`PrepError::FileNotFound`] if the file is missing, or a CSV error
/// if it cannot be parsed.
pub fn get_file_length(path: &Path, delimiter: u8) -> Result<usize> {
    ensure_file(path)?;
    let mut reader = open_reader(path, delimiter)?;
    let mut record = StringRecord::new();
    let mut count = 0usize;
    while next_record(&mut reader, &mut record, path)? {
        count += 1;
    }
    tracing::debug!(path = %path.display(), records = count, "counted records");
    Ok(count)
}

/// Reads the first non-blank record, if any.
pub fn read_first_record(path: &Path, delimiter: u8) -> Result<Option<Vec<String>>> {
    let mut reader = open_reader(path, delimiter)?;
    let mut record = StringRecord::new();
    if !next_record(&mut reader, &mut record, path)? {
        return Ok(None);
    }
    Ok(Some(record.iter().map(str::to_string).collect()))
}

/// Converts a record to document cells. Empty fields are absent.
pub fn record_docs(record: &StringRecord) -> Vec<Doc> {
    record
        .iter()
        .map(|field| (!field.is_empty()).then(|| field.to_string()))
        .collect()
}
