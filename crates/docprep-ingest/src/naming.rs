//! Output file naming.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use docprep_model::{PrepError, Result};

use crate::columns::MAX_NAME_ATTEMPTS;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Reserves a fresh sibling path for the processed copy of `path`.
///
/// The name is `{stem}_{YYYYmmdd_HHMMSS}.{ext}` in the same directory; if
/// that exists, `_2`, `_3`, ... are appended to the stem. The returned path
/// is created empty, so two runs in the same second never share a file.
///
/// # Errors
///
/// Returns [`PrepError::OutputNameExhausted`] when no candidate is free and
/// [`PrepError::FileWrite`] when the directory is not writable.
pub fn new_output_path(path: &Path) -> Result<PathBuf> {
    new_output_path_at(path, Local::now().naive_local())
}

/// Same as [`new_output_path`] with an explicit timestamp.
pub fn new_output_path_at(path: &Path, at: NaiveDateTime) -> Result<PathBuf> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    let stamp = at.format(TIMESTAMP_FORMAT);

    let first = dir.join(format!("{stem}_{stamp}.{extension}"));
    let suffixed = (2..MAX_NAME_ATTEMPTS)
        .map(|idx| dir.join(format!("{stem}_{stamp}_{idx}.{extension}")));
    for candidate in std::iter::once(first).chain(suffixed) {
        if reserve(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(PrepError::OutputNameExhausted {
        path: path.to_path_buf(),
    })
}

/// Creates `candidate` unless it already exists.
fn reserve(candidate: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(candidate) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(PrepError::FileWrite {
            path: candidate.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 7))
            .expect("valid timestamp")
    }

    #[test]
    fn appends_timestamp_in_same_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("jobs.csv");
        let output = new_output_path_at(&input, fixed_time()).expect("name");
        assert_eq!(output, dir.path().join("jobs_20240309_140507.csv"));
    }

    #[test]
    fn retries_with_numeric_suffix() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("jobs.csv");
        std::fs::write(dir.path().join("jobs_20240309_140507.csv"), "").expect("write");
        std::fs::write(dir.path().join("jobs_20240309_140507_2.csv"), "").expect("write");
        let output = new_output_path_at(&input, fixed_time()).expect("name");
        assert_eq!(output, dir.path().join("jobs_20240309_140507_3.csv"));
    }

    #[test]
    fn reserved_paths_are_never_shared() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("jobs.csv");
        let first = new_output_path_at(&input, fixed_time()).expect("first");
        let second = new_output_path_at(&input, fixed_time()).expect("second");
        assert_ne!(first, second);
        assert_eq!(second, dir.path().join("jobs_20240309_140507_2.csv"));
        assert!(first.is_file());
        assert!(second.is_file());
    }

    #[test]
    fn existing_output_is_left_alone() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("jobs.csv");
        let taken = dir.path().join("jobs_20240309_140507.csv");
        std::fs::write(&taken, "keep me").expect("write");
        let output = new_output_path_at(&input, fixed_time()).expect("name");
        assert_ne!(output, taken);
        assert_eq!(std::fs::read_to_string(&taken).expect("read"), "keep me");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("absent").join("jobs.csv");
        let err = new_output_path_at(&input, fixed_time()).unwrap_err();
        assert!(matches!(err, PrepError::FileWrite { .. }));
    }
}
