//! Named transformations.
//!
//! A [`Registry`] maps step names to ready-to-run transformations. Built-in
//! steps are composed once, at construction, in a fixed order: the core
//! per-document function, then [`Memoized`], then [`Timed`]. The registry is
//! read-only once built; the engine receives it explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use docprep_model::{DocSeries, PrepError, Result};

use crate::memo::{DEFAULT_MIN_SIZE, Memoized};
use crate::text::basic;
use crate::text::{StopwordRemover, StopwordSet, remove_gender_synonyms, stem_text};
use crate::transform::{FnTransform, MapTransform, Transform, display_name};

/// The pipeline used when the caller does not supply one.
pub const DEFAULT_PIPELINE: &[&str] = &[
    "remove_non_string",
    "get_true_spaces",
    "to_lower_except_singleletters",
    "pe_matching",
    "remove_gender_synonyms",
    "remove_punct_except_parenthesis",
    "remove_numeric",
    "remove_stopwords",
    "stemmatize",
    "remove_accents",
    "trim_string",
    "remove_leading_and_ending_spaces",
];

static DEFAULT_REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| {
    Arc::new(Registry::builtin().expect("Invalid built-in transformation pattern"))
});

/// The shared registry of built-in steps.
pub fn default_registry() -> Arc<Registry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Logs the wall time of every call at trace level.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    inner: T,
}

impl<T: Transform> Timed<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Transform> Transform for Timed<T> {
    fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        let rows = docs.len();
        let started = Instant::now();
        let output = self.inner.apply(docs);
        tracing::trace!(
            step = display_name(&self.inner),
            rows,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "step finished"
        );
        output
    }
}

/// Placeholder for a step whose resources are not bundled.
///
/// Fails with [`PrepError::OptionalDependency`] when invoked, never before.
#[derive(Debug, Clone)]
pub struct MissingDependency {
    step: String,
    dependency: String,
    hint: String,
}

impl MissingDependency {
    pub fn new(
        step: impl Into<String>,
        dependency: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            dependency: dependency.into(),
            hint: hint.into(),
        }
    }
}

impl Transform for MissingDependency {
    fn name(&self) -> Option<&str> {
        Some(&self.step)
    }

    fn apply(&self, _docs: DocSeries) -> Result<DocSeries> {
        Err(PrepError::OptionalDependency {
            step: self.step.clone(),
            dependency: self.dependency.clone(),
            hint: self.hint.clone(),
        })
    }
}

/// Immutable map from step names to transformations.
#[derive(Clone, Default)]
pub struct Registry {
    steps: BTreeMap<String, Arc<dyn Transform>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in step.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidPattern`] if a bundled word list fails to
    /// compile.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        registry.register_slots("notnull", basic::fill_absent);
        registry.register_slots("remove_non_string", basic::fill_absent);

        registry.register_map("get_true_spaces", basic::get_true_spaces);
        registry.register_map("remove_accents", basic::remove_accents);
        registry.register_map("trim_string", basic::trim_string);
        registry.register_map(
            "remove_leading_and_ending_spaces",
            basic::remove_leading_and_ending_spaces,
        );
        registry.register_map("remove_punct", basic::remove_punct);
        registry.register_map(
            "remove_punct_except_parenthesis",
            basic::remove_punct_except_parenthesis,
        );
        registry.register_try_map("pe_matching", basic::pe_matching);
        registry.register_map("to_lower", |text| basic::to_lower(text, 0));
        registry.register_map(
            "to_lower_except_singleletters",
            basic::to_lower_except_singleletters,
        );
        registry.register_map("remove_numeric", basic::remove_numeric);
        registry.register_map("add_point", basic::add_point);
        registry.register_map("add_space_around_special", basic::add_space_around_special);
        registry.register_try_map("replace_urls", basic::replace_urls);
        registry.register_try_map("replace_urls_with_domains", basic::replace_urls_with_domains);

        let stopwords =
            StopwordRemover::new(StopwordSet::All, Vec::<String>::new(), Vec::<String>::new())?;
        registry.register_memoized(stopwords);
        registry.register_memoized(FnTransform::named(
            "remove_gender_synonyms",
            |docs: DocSeries| Ok(remove_gender_synonyms(docs)),
        ));
        registry.register_memoized(FnTransform::named("stemmatize", |docs: DocSeries| {
            tracing::warn!("stemmatize uses a light French stemmer");
            Ok(docs.map_present(stem_text))
        }));

        registry.register(
            "lemmatize",
            Timed::new(MissingDependency::new(
                "lemmatize",
                "a French lemmatizer",
                "register a lemmatizer with Registry::with_step(\"lemmatize\", ...)",
            )),
        );
        registry.register(
            "fix_text",
            Timed::new(MissingDependency::new(
                "fix_text",
                "a mojibake repair library",
                "register a text fixer with Registry::with_step(\"fix_text\", ...)",
            )),
        );
        Ok(registry)
    }

    /// Adds or replaces a step.
    pub fn register(&mut self, name: impl Into<String>, step: impl Transform + 'static) {
        self.steps.insert(name.into(), Arc::new(step));
    }

    /// Builder form of [`Registry::register`].
    #[must_use]
    pub fn with_step(mut self, name: impl Into<String>, step: impl Transform + 'static) -> Self {
        self.register(name, step);
        self
    }

    fn register_map<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register_memoized(MapTransform::new(name, func));
    }

    fn register_try_map<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.register_memoized(MapTransform::try_new(name, func));
    }

    fn register_slots<F>(&mut self, name: &str, func: F)
    where
        F: Fn(Option<&str>) -> docprep_model::Doc + Send + Sync + 'static,
    {
        self.register(name, Timed::new(MapTransform::slots(name, func)));
    }

    fn register_memoized<T: Transform + 'static>(&mut self, step: T) {
        let name = display_name(&step).to_string();
        let memoized = Memoized::new(step).with_min_size(DEFAULT_MIN_SIZE);
        self.register(name, Timed::new(memoized));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Transform>> {
        self.steps.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Step names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docprep_model::ErrorKind;

    #[test]
    fn builtin_covers_default_pipeline() {
        let registry = default_registry();
        assert_eq!(registry.len(), 21);
        for name in DEFAULT_PIPELINE {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn registered_names_match_steps() {
        let registry = default_registry();
        for name in registry.names() {
            let step = registry.get(name).expect("step");
            assert_eq!(step.name(), Some(name));
        }
    }

    #[test]
    fn fill_steps_replace_absent() {
        let step = default_registry().get("notnull").expect("notnull");
        let out = step.apply(DocSeries::from(vec![None, Some("a")])).expect("apply");
        assert_eq!(out.docs(), &[Some(String::new()), Some("a".to_string())]);
    }

    #[test]
    fn optional_dependency_fails_only_when_invoked() {
        let registry = default_registry();
        let step = registry.get("lemmatize").expect("lemmatize");
        let err = step.apply(DocSeries::from(vec!["chats"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OptionalDependency);
        assert!(err.to_string().contains("lemmatize"));
    }

    #[test]
    fn steps_can_be_replaced() {
        let registry = Registry::builtin()
            .expect("registry")
            .with_step("lemmatize", MapTransform::new("lemmatize", str::to_uppercase));
        let out = registry
            .get("lemmatize")
            .expect("lemmatize")
            .apply(DocSeries::from(vec!["chats"]))
            .expect("apply");
        assert_eq!(out.docs(), &[Some("CHATS".to_string())]);
    }

    #[test]
    fn default_pipeline_on_a_job_title() {
        let registry = default_registry();
        let mut docs = DocSeries::from(vec![Some("Serveur / Serveuse H/F en CDI"), None]);
        for name in DEFAULT_PIPELINE {
            docs = registry.get(name).expect("step").apply(docs).expect("apply");
        }
        assert_eq!(docs.docs(), &[Some("serveur / cdi".to_string()), Some(String::new())]);
    }

    #[test]
    fn pattern_steps_handle_long_documents() {
        let registry = default_registry();
        let long = format!("{}le chef", "xylophone ".repeat(10_000));
        for name in ["remove_stopwords", "pe_matching", "replace_urls"] {
            let out = registry
                .get(name)
                .expect("step")
                .apply(DocSeries::from(vec![long.as_str()]))
                .expect("apply");
            assert!(out.get(0).expect("doc").ends_with("chef"), "{name}");
        }
    }
}
