//! The transformation contract.
//!
//! A [`Transform`] maps a [`DocSeries`] to a [`DocSeries`] of the same
//! length, keeping positions. Implementations are registered by name in the
//! [`Registry`](crate::registry::Registry) or passed to the engine directly.

use std::fmt;
use std::sync::Arc;

use docprep_model::{Doc, DocSeries, PrepError, Result};

/// Display name used for steps that do not report one.
pub const CUSTOM_STEP_NAME: &str = "<custom>";

/// A length-preserving transformation over canonical sequences.
pub trait Transform: Send + Sync {
    /// Stable name of the step, if it has one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Transforms `docs`. The result must have the same length.
    ///
    /// # Errors
    ///
    /// Implementations return an error when they cannot run at all, e.g. a
    /// missing optional dependency.
    fn apply(&self, docs: DocSeries) -> Result<DocSeries>;
}

/// Name to show in logs and errors for `transform`.
pub fn display_name(transform: &dyn Transform) -> &str {
    transform.name().unwrap_or(CUSTOM_STEP_NAME)
}

/// Applies `transform` and checks that the length did not change.
///
/// # Errors
///
/// Returns [`PrepError::LengthMismatch`] naming the transformation when the
/// output length differs from the input length.
pub fn apply_checked(transform: &dyn Transform, docs: DocSeries) -> Result<DocSeries> {
    let expected = docs.len();
    let output = transform.apply(docs)?;
    if output.len() != expected {
        return Err(PrepError::LengthMismatch {
            transform: display_name(transform).to_string(),
            expected,
            actual: output.len(),
        });
    }
    Ok(output)
}

impl<T: Transform + ?Sized> Transform for Arc<T> {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        (**self).apply(docs)
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        (**self).apply(docs)
    }
}

/// Wraps a closure over whole sequences.
pub struct FnTransform<F> {
    name: Option<String>,
    func: F,
}

impl<F> FnTransform<F>
where
    F: Fn(DocSeries) -> Result<DocSeries> + Send + Sync,
{
    /// An unnamed step; it shows up as a custom step in logs.
    pub fn new(func: F) -> Self {
        Self { name: None, func }
    }

    pub fn named(name: impl Into<String>, func: F) -> Self {
        Self {
            name: Some(name.into()),
            func,
        }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(DocSeries) -> Result<DocSeries> + Send + Sync,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        (self.func)(docs)
    }
}

impl<F> fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type DocFn = dyn Fn(&str) -> String + Send + Sync;
type TryDocFn = dyn Fn(&str) -> Result<String> + Send + Sync;
type SlotFn = dyn Fn(Option<&str>) -> Doc + Send + Sync;

/// Applies a function to each document independently.
///
/// With [`MapTransform::new`] absent slots stay absent and the function only
/// sees present text; [`MapTransform::try_new`] is its fallible form.
/// [`MapTransform::slots`] also sees absent slots.
#[derive(Clone)]
pub struct MapTransform {
    name: String,
    func: MapFn,
}

#[derive(Clone)]
enum MapFn {
    Present(Arc<DocFn>),
    TryPresent(Arc<TryDocFn>),
    Slot(Arc<SlotFn>),
}

impl MapTransform {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: MapFn::Present(Arc::new(func)),
        }
    }

    pub fn try_new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: MapFn::TryPresent(Arc::new(func)),
        }
    }

    pub fn slots<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&str>) -> Doc + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: MapFn::Slot(Arc::new(func)),
        }
    }

    /// Whether absent slots are guaranteed to stay absent.
    pub fn keeps_absent(&self) -> bool {
        !matches!(self.func, MapFn::Slot(_))
    }
}

impl Transform for MapTransform {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        match &self.func {
            MapFn::Present(func) => Ok(docs.map_present(func.as_ref())),
            MapFn::TryPresent(func) => docs.try_map_present(func.as_ref()),
            MapFn::Slot(func) => Ok(docs.map_slots(func.as_ref())),
        }
    }
}

impl fmt::Debug for MapTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapTransform")
            .field("name", &self.name)
            .field("keeps_absent", &self.keeps_absent())
            .finish()
    }
}
