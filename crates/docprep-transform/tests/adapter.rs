use std::fs;

use docprep_model::{DocSeries, DocumentCollection, PrepError, docs_to_series, series_to_docs};
use docprep_transform::{
    AdapterOptions, DEFAULT_PIPELINE, MapTransform, apply_checked, apply_input_only,
    apply_to_collection, default_registry,
};
use proptest::prelude::*;

fn upper() -> MapTransform {
    MapTransform::new("upper", str::to_uppercase)
}

#[test]
fn file_input_writes_a_new_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("offers.csv");
    fs::write(&input, "tags,docs\nt1,hello\nt2,\n").expect("write file");

    let out = apply_to_collection(
        &upper(),
        &DocumentCollection::FilePath(input.clone()),
        &AdapterOptions::default(),
    )
    .expect("apply");

    let output = out.as_path().expect("path").to_path_buf();
    assert_ne!(output, input);
    assert_eq!(
        fs::read_to_string(&output).expect("read output"),
        "tags,docs\nt1,HELLO\nt2,\n"
    );
    assert_eq!(
        fs::read_to_string(&input).expect("read input"),
        "tags,docs\nt1,hello\nt2,\n"
    );
}

#[test]
fn header_only_file_is_empty_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("empty.csv");
    fs::write(&input, "docs,tags\n").expect("write file");

    let err = apply_to_collection(
        &upper(),
        &DocumentCollection::FilePath(input),
        &AdapterOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PrepError::EmptyFile { .. }));
}

#[test]
fn array_keeps_its_name() {
    let series = docs_to_series("titles", &[Some("a".to_string()), None]);
    let out = apply_to_collection(
        &upper(),
        &DocumentCollection::Array(series),
        &AdapterOptions::default(),
    )
    .expect("apply");

    let DocumentCollection::Array(series) = out else {
        panic!("expected an array");
    };
    assert_eq!(series.name().as_str(), "titles");
    assert_eq!(
        series_to_docs(&series).expect("docs"),
        vec![Some("A".to_string()), None]
    );
}

#[test]
fn input_only_returns_the_sequence() {
    let docs = apply_input_only(
        &upper(),
        &DocumentCollection::from(vec!["x", "y"]),
        &AdapterOptions::default(),
    )
    .expect("apply");
    assert_eq!(docs, DocSeries::from(vec!["X", "Y"]));
}

proptest! {
    #[test]
    fn default_pipeline_keeps_length(docs in prop::collection::vec(prop::option::of(".{0,40}"), 0..20)) {
        let registry = default_registry();
        let mut series = DocSeries::new(docs.clone());
        for name in DEFAULT_PIPELINE {
            let step = registry.get(name).expect("built-in step");
            series = apply_checked(step.as_ref(), series).expect("step");
        }
        prop_assert_eq!(series.len(), docs.len());
        prop_assert_eq!(series.absent_count(), 0);
    }
}
