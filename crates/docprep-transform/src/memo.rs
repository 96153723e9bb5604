//! Deduplicating memoization around transformations.
//!
//! Short-text corpora repeat themselves a lot. [`Memoized`] runs the wrapped
//! transformation once on the distinct present values, in first-seen order,
//! and scatters the results back to every position. Absent slots are never
//! passed to the wrapped transformation and stay absent, so it must only
//! wrap transformations that keep absent slots absent.

use std::collections::HashMap;

use docprep_model::{Doc, DocSeries, PrepError, Result};

use crate::transform::{Transform, display_name};

/// Inputs shorter than this are passed straight through.
pub const DEFAULT_MIN_SIZE: usize = 1000;

/// Activation thresholds for [`Memoized`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoOptions {
    /// Minimum input length before deduplication is attempted.
    pub min_size: usize,
    /// Delegate directly when the share of distinct values exceeds this.
    pub max_unique_ratio: f64,
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_unique_ratio: 1.0,
        }
    }
}

/// A transformation wrapped with per-call deduplication.
#[derive(Debug, Clone)]
pub struct Memoized<T> {
    inner: T,
    options: MemoOptions,
}

impl<T: Transform> Memoized<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            options: MemoOptions::default(),
        }
    }

    #[must_use]
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.options.min_size = min_size;
        self
    }

    #[must_use]
    pub fn with_max_unique_ratio(mut self, ratio: f64) -> Self {
        self.options.max_unique_ratio = ratio;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transform> Transform for Memoized<T> {
    fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        memoize_apply(&self.inner, docs, &self.options)
    }
}

/// Distinct present values and, per position, the index of its value.
struct Distinct {
    values: Vec<Doc>,
    slots: Vec<Option<usize>>,
}

fn distinct_values(docs: &DocSeries) -> Distinct {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut values = Vec::new();
    let slots = docs
        .iter()
        .map(|doc| {
            doc.map(|text| {
                let next = values.len();
                *positions.entry(text).or_insert_with(|| {
                    values.push(Some(text.to_string()));
                    next
                })
            })
        })
        .collect();
    Distinct { values, slots }
}

/// Runs `transform` once per distinct present value of `docs`.
///
/// # Errors
///
/// Returns [`PrepError::DistinctLengthMismatch`] when the transformation
/// returns a different number of values than it was given, and propagates
/// any error of the transformation itself.
pub fn memoize_apply(
    transform: &dyn Transform,
    docs: DocSeries,
    options: &MemoOptions,
) -> Result<DocSeries> {
    let total = docs.len();
    if total == 0 || total < options.min_size {
        return transform.apply(docs);
    }

    let Distinct { values, slots } = distinct_values(&docs);
    let distinct = values.len();
    let unique_ratio = distinct as f64 / total as f64;
    if distinct == total || unique_ratio > options.max_unique_ratio {
        return transform.apply(docs);
    }

    let name = docs.name().map(str::to_string);
    let start = docs.start();
    drop(docs);

    let outputs = transform.apply(DocSeries::new(values).with_name(name.clone()))?;
    if outputs.len() != distinct {
        return Err(PrepError::DistinctLengthMismatch {
            transform: display_name(transform).to_string(),
            input: distinct,
            output: outputs.len(),
        });
    }
    let outputs = outputs.into_docs();
    let rebuilt: Vec<Doc> = slots
        .into_iter()
        .map(|slot| slot.and_then(|idx| outputs[idx].clone()))
        .collect();

    tracing::trace!(
        step = display_name(transform),
        rows = total,
        distinct,
        saved = total - distinct,
        "memoized transformation"
    );
    Ok(DocSeries::new(rebuilt).with_name(name).with_start(start))
}
