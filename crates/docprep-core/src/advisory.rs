//! Order advisories for pipelines.
//!
//! Some step orderings run fine but rarely do what the caller meant, such
//! as removing stopwords after stemming. The [`AdvisoryTable`] lists those
//! pairings per step; [`AdvisoryTable::check`] reports the ones a pipeline
//! hits. Checking never fails and never changes the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use docprep_model::{PrepError, Result};
use docprep_transform::{Registry, display_name};

use crate::pipeline::Step;

const BUNDLED_TABLE: &str = include_str!("../data/order_advisory.json");

static BUNDLED: LazyLock<AdvisoryTable> = LazyLock::new(|| {
    AdvisoryTable::from_json("bundled order_advisory.json", BUNDLED_TABLE)
        .expect("Invalid bundled order advisory table")
});

/// Prerequisite entry of a `not_before` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotBefore {
    /// The named step should appear earlier.
    Message(String),
    /// At least one of these steps should appear earlier.
    AnyOf(BTreeMap<String, String>),
}

/// Advisories attached to one step.
///
/// A `None` message silences a pairing without removing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepRules {
    /// Warn when one of these steps appears earlier.
    pub before: BTreeMap<String, Option<String>>,
    /// Warn when one of these steps appears later.
    pub after: BTreeMap<String, Option<String>>,
    /// Warn when one of these steps does not appear earlier.
    pub not_before: BTreeMap<String, NotBefore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKind {
    /// The step name is not in the registry; it will be skipped.
    UnknownStep,
    /// A caller-supplied transformation; not checked.
    CustomStep,
    Before,
    After,
    NotBefore,
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdvisoryKind::UnknownStep => "unknown step",
            AdvisoryKind::CustomStep => "custom step",
            AdvisoryKind::Before => "before",
            AdvisoryKind::After => "after",
            AdvisoryKind::NotBefore => "not before",
        };
        f.write_str(label)
    }
}

/// One reported advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub step: String,
    /// Position of the step in the pipeline.
    pub position: usize,
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    /// Whether this advisory is logged as a warning (custom steps are info).
    pub fn is_warning(&self) -> bool {
        self.kind != AdvisoryKind::CustomStep
    }
}

/// Per-step ordering advisories, keyed by step name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisoryTable {
    steps: BTreeMap<String, StepRules>,
}

impl AdvisoryTable {
    /// The table shipped with this crate.
    pub fn bundled() -> &'static AdvisoryTable {
        &BUNDLED
    }

    /// Parses a JSON table. `source` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidAdvisoryTable`] when the JSON does not
    /// describe a table.
    pub fn from_json(source: &str, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| PrepError::InvalidAdvisoryTable {
            source_name: source.to_string(),
            message: err.to_string(),
        })
    }

    /// Loads a JSON table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FileRead`] or [`PrepError::InvalidAdvisoryTable`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| PrepError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &text)
    }

    pub fn rules(&self, step: &str) -> Option<&StepRules> {
        self.steps.get(step)
    }

    pub fn insert(&mut self, step: impl Into<String>, rules: StepRules) {
        self.steps.insert(step.into(), rules);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reports the advisories `pipeline` triggers and logs each of them.
    ///
    /// Each pairing is reported at most once per call. Once it fires, both
    /// its entry and the mirrored entry of the other step are silenced for
    /// the rest of the check. A missing prerequisite is likewise reported
    /// only for the first occurrence of the step.
    pub fn check(&self, pipeline: &[Step], registry: &Registry) -> Vec<Advisory> {
        let mut table = self.steps.clone();
        let names: Vec<Option<&str>> = pipeline.iter().map(Step::step_name).collect();
        let first = |name: &str| names.iter().position(|n| *n == Some(name));
        let last = |name: &str| names.iter().rposition(|n| *n == Some(name));

        let mut advisories = Vec::new();
        for (position, step) in pipeline.iter().enumerate() {
            let name = match step {
                Step::Custom(transform) => {
                    let name = display_name(transform.as_ref()).to_string();
                    advisories.push(Advisory {
                        message: format!("the pipeline contains a custom step: {name}"),
                        step: name,
                        position,
                        kind: AdvisoryKind::CustomStep,
                    });
                    continue;
                }
                Step::Named(name) => name.as_str(),
            };
            if !registry.contains(name) {
                advisories.push(Advisory {
                    step: name.to_string(),
                    position,
                    kind: AdvisoryKind::UnknownStep,
                    message: format!("step '{name}' is unknown and will be skipped"),
                });
                continue;
            }
            let Some(rules) = table.get(name).cloned() else {
                continue;
            };
            let mut fire = |kind: AdvisoryKind, message: Option<String>| {
                if let Some(message) = message {
                    advisories.push(Advisory {
                        step: name.to_string(),
                        position,
                        kind,
                        message,
                    });
                }
            };

            for (other, message) in rules.before {
                if first(&other).is_some_and(|idx| idx < position) {
                    fire(AdvisoryKind::Before, message);
                    silence(&mut table, name, &other, AdvisoryKind::Before);
                }
            }
            for (other, message) in rules.after {
                if last(&other).is_some_and(|idx| idx > position) {
                    fire(AdvisoryKind::After, message);
                    silence(&mut table, name, &other, AdvisoryKind::After);
                }
            }
            let appears_earlier = |other: &str| first(other).is_some_and(|idx| idx < position);
            for (other, prerequisite) in rules.not_before {
                match prerequisite {
                    NotBefore::Message(message) => {
                        if !appears_earlier(&other) {
                            fire(AdvisoryKind::NotBefore, Some(message));
                            drop_prerequisite(&mut table, name, &other);
                        }
                    }
                    NotBefore::AnyOf(alternatives) => {
                        if !alternatives.keys().any(|alt| appears_earlier(alt)) {
                            for message in alternatives.into_values() {
                                fire(AdvisoryKind::NotBefore, Some(message));
                            }
                            drop_prerequisite(&mut table, name, &other);
                        }
                    }
                }
            }
        }

        for advisory in &advisories {
            if advisory.is_warning() {
                tracing::warn!(
                    step = %advisory.step,
                    position = advisory.position,
                    kind = %advisory.kind,
                    "{}",
                    advisory.message
                );
            } else {
                tracing::info!(step = %advisory.step, position = advisory.position, "custom step");
            }
        }
        advisories
    }
}

/// Clears `step`'s entry for `other` and the mirrored entry of `other`.
fn silence(table: &mut BTreeMap<String, StepRules>, step: &str, other: &str, kind: AdvisoryKind) {
    if let Some(rules) = table.get_mut(step) {
        let own = if kind == AdvisoryKind::Before {
            &mut rules.before
        } else {
            &mut rules.after
        };
        if let Some(entry) = own.get_mut(other) {
            *entry = None;
        }
    }
    if let Some(rules) = table.get_mut(other) {
        let mirror = if kind == AdvisoryKind::Before {
            &mut rules.after
        } else {
            &mut rules.before
        };
        if let Some(entry) = mirror.get_mut(step) {
            *entry = None;
        }
    }
}

fn drop_prerequisite(table: &mut BTreeMap<String, StepRules>, step: &str, other: &str) {
    if let Some(rules) = table.get_mut(step) {
        rules.not_before.remove(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docprep_transform::{DEFAULT_PIPELINE, FnTransform, default_registry};
    use std::sync::Arc;

    fn check(pipeline: Vec<Step>) -> Vec<Advisory> {
        AdvisoryTable::bundled().check(&pipeline, &default_registry())
    }

    fn custom() -> Step {
        Step::Custom(Arc::new(FnTransform::new(Ok)))
    }

    #[test]
    fn bundled_table_parses() {
        let table = AdvisoryTable::bundled();
        assert!(table.rules("notnull").is_some());
        assert!(table.rules("to_lower").is_none());
    }

    #[test]
    fn unknown_step_is_reported() {
        let advisories = check(vec!["test".into()]);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::UnknownStep);
    }

    #[test]
    fn pairings_fire_once() {
        assert_eq!(check(vec!["notnull".into(), "remove_non_string".into()]).len(), 1);
        let advisories = check(vec![
            "notnull".into(),
            "remove_non_string".into(),
            "notnull".into(),
        ]);
        assert_eq!(advisories.len(), 2);
        assert!(advisories.iter().all(|a| a.kind == AdvisoryKind::After));
        assert_eq!(
            advisories.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn custom_steps_are_informational() {
        let advisories = check(vec!["notnull".into(), custom()]);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::CustomStep);
        assert!(!advisories[0].is_warning());

        assert_eq!(check(vec!["notnull".into(), custom(), "toto".into()]).len(), 2);
    }

    #[test]
    fn any_of_group_needs_one_alternative() {
        let advisories = check(vec!["remove_stopwords".into()]);
        assert_eq!(advisories.len(), 2);
        assert!(advisories.iter().all(|a| a.kind == AdvisoryKind::NotBefore));

        assert!(check(vec!["to_lower".into(), "remove_stopwords".into()]).is_empty());
    }

    #[test]
    fn missing_prerequisite_is_reported_once() {
        let advisories = check(vec!["remove_stopwords".into(), "remove_stopwords".into()]);
        assert_eq!(advisories.len(), 2);
        assert!(advisories.iter().all(|a| a.position == 0));

        let advisories = check(vec![
            "remove_stopwords".into(),
            "to_lower".into(),
            "remove_stopwords".into(),
        ]);
        assert_eq!(advisories.len(), 2);
        assert!(advisories.iter().all(|a| a.kind == AdvisoryKind::NotBefore));
    }

    #[test]
    fn before_fires_when_step_appears_earlier() {
        let advisories = check(vec!["stemmatize".into(), "to_lower".into(), "remove_stopwords".into()]);
        let kinds: Vec<_> = advisories.iter().map(|a| (a.position, a.kind)).collect();
        assert_eq!(kinds, vec![(0, AdvisoryKind::After)]);
    }

    #[test]
    fn default_pipeline_is_clean() {
        let pipeline: Vec<Step> = DEFAULT_PIPELINE.iter().map(|&name| Step::from(name)).collect();
        assert!(check(pipeline).is_empty());
    }

    #[test]
    fn check_leaves_table_untouched() {
        let table = AdvisoryTable::bundled().clone();
        table.check(&["notnull".into(), "remove_non_string".into()], &default_registry());
        assert_eq!(&table, AdvisoryTable::bundled());
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let err = AdvisoryTable::from_json("inline", r#"{"a": {"sideways": {}}}"#).unwrap_err();
        assert!(matches!(err, PrepError::InvalidAdvisoryTable { .. }));
        let table = AdvisoryTable::from_json("inline", r#"{"a": {"before": {"b": null}}}"#)
            .expect("table");
        assert_eq!(table.rules("a").map(|r| r.before.len()), Some(1));
    }
}
