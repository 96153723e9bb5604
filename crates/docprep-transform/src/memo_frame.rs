//! Row-level memoization for table transformations.
//!
//! [`FrameMemo`] deduplicates the rows of a table over a set of key columns
//! before calling a table transformation, then expands the result back to
//! the original rows. A synthetic join column travels through the wrapped
//! call so its output rows can be matched back even if it reorders them.

use std::collections::HashMap;

use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, Series};

use docprep_common::{any_to_doc, any_to_i64, column_names};
use docprep_ingest::new_column_name;
use docprep_model::{PrepError, Result};

use crate::memo::DEFAULT_MIN_SIZE;

const JOIN_COLUMN: &str = "join_index";
const JOIN_SUFFIX: &str = "@memo";

/// Deduplicating wrapper for `DataFrame -> DataFrame` transformations.
#[derive(Debug, Clone)]
pub struct FrameMemo {
    key_columns: Option<Vec<String>>,
    min_size: usize,
}

impl Default for FrameMemo {
    fn default() -> Self {
        Self {
            key_columns: None,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

impl FrameMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns forming the composite key. Defaults to every column.
    #[must_use]
    pub fn with_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Applies `func` to the distinct key rows of `df` and expands the result.
    ///
    /// Rows with a null in any key column are not deduplicated and keep their
    /// original values. Columns returned by `func` replace the originals for
    /// the keyed rows; columns it does not return are carried over; new
    /// columns are appended after the original ones.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidMinSize`] or [`PrepError::MissingKeyColumn`]
    /// before any work is done, [`PrepError::DistinctLengthMismatch`] or
    /// [`PrepError::JoinKeyDropped`] when `func` breaks its contract.
    pub fn apply<F>(&self, name: &str, df: &DataFrame, func: F) -> Result<DataFrame>
    where
        F: FnOnce(DataFrame) -> Result<DataFrame>,
    {
        if self.min_size == 0 {
            return Err(PrepError::InvalidMinSize);
        }
        let columns = column_names(df);
        let keys = self.key_columns.clone().unwrap_or_else(|| columns.clone());
        if let Some(missing) = keys.iter().find(|key| !columns.contains(key)) {
            return Err(PrepError::MissingKeyColumn {
                column: missing.clone(),
            });
        }
        if df.height() < self.min_size {
            return func(df.clone());
        }

        let key_columns: Vec<&Column> = keys
            .iter()
            .map(|key| df.column(key))
            .collect::<std::result::Result<_, _>>()?;
        let (first_rows, join_ids) = group_rows(&key_columns, df.height())?;
        if first_rows.len() == df.height() {
            return func(df.clone());
        }
        let distinct = first_rows.len();

        let join_name = new_column_name(&columns, JOIN_COLUMN, JOIN_SUFFIX)?;
        let mut input = Vec::with_capacity(key_columns.len() + 1);
        for column in &key_columns {
            let values = first_rows
                .iter()
                .map(|&row| column.get(row).map(AnyValue::into_static))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            input.push(Series::from_any_values(column.name().clone(), &values, false)?.into_column());
        }
        let ids: Vec<i64> = (0..distinct as i64).collect();
        input.push(Series::new(join_name.as_str().into(), ids).into_column());

        let output = func(DataFrame::new(input)?)?;
        if output.height() != distinct {
            return Err(PrepError::DistinctLengthMismatch {
                transform: name.to_string(),
                input: distinct,
                output: output.height(),
            });
        }
        let join = output
            .column(&join_name)
            .map_err(|_| PrepError::JoinKeyDropped {
                transform: name.to_string(),
                column: join_name.clone(),
            })?;
        let mut output_row = vec![None; distinct];
        for row in 0..output.height() {
            let id = any_to_i64(&join.get(row)?).and_then(|id| usize::try_from(id).ok());
            if let Some(slot) = id.and_then(|id| output_row.get_mut(id)) {
                *slot = Some(row);
            }
        }

        let mut final_names = columns.clone();
        final_names.extend(
            column_names(&output)
                .into_iter()
                .filter(|c| *c != join_name && !columns.contains(c)),
        );
        let mut rebuilt = Vec::with_capacity(final_names.len());
        for column_name in &final_names {
            let original = df.column(column_name).ok();
            let produced = output.column(column_name).ok();
            let mut values = Vec::with_capacity(df.height());
            for (row, join_id) in join_ids.iter().enumerate() {
                let from_output = match (produced, join_id) {
                    (Some(produced), Some(id)) => output_row[*id].map(|r| (produced, r)),
                    _ => None,
                };
                let value = match (from_output, original) {
                    (Some((produced, r)), _) => produced.get(r)?.into_static(),
                    (None, Some(original)) => original.get(row)?.into_static(),
                    (None, None) => AnyValue::Null,
                };
                values.push(value);
            }
            rebuilt.push(
                Series::from_any_values(column_name.as_str().into(), &values, false)?
                    .into_column(),
            );
        }

        tracing::debug!(
            step = name,
            rows = df.height(),
            distinct,
            "memoized table transformation"
        );
        Ok(DataFrame::new(rebuilt)?)
    }
}

/// Groups rows by their composite key.
///
/// Returns the first row of every distinct key and, per row, the key index
/// (`None` when a key cell is null).
fn group_rows(key_columns: &[&Column], height: usize) -> Result<(Vec<usize>, Vec<Option<usize>>)> {
    let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
    let mut first_rows = Vec::new();
    let mut join_ids = Vec::with_capacity(height);
    'rows: for row in 0..height {
        let mut key = Vec::with_capacity(key_columns.len());
        for column in key_columns {
            match any_to_doc(&column.get(row)?) {
                Some(value) => key.push(value),
                None => {
                    join_ids.push(None);
                    continue 'rows;
                }
            }
        }
        let next = first_rows.len();
        let id = *seen.entry(key).or_insert_with(|| {
            first_rows.push(row);
            next
        });
        join_ids.push(Some(id));
    }
    Ok((first_rows, join_ids))
}
