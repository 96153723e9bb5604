use std::fs;
use std::path::PathBuf;

use docprep_common::{column_docs, column_names};
use docprep_ingest::{ChunkStream, FileChunks, docs_length, get_file_length, read_table};
use docprep_model::{
    ChunkData, Doc, DocSeries, DocumentCollection, FirstRow, PrepError, StreamOptions,
};
use proptest::prelude::*;

fn temp_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn nine_rows() -> String {
    let mut contents = String::from("docs,tags\n");
    for idx in 1..=9 {
        contents.push_str(&format!("doc {idx},tag{idx}\n"));
    }
    contents
}

fn docs_of(data: &ChunkData, column: &str) -> Vec<Doc> {
    match data {
        ChunkData::Frame(df) => column_docs(df, column).expect("column").into_docs(),
        ChunkData::Docs(docs) => docs.docs().to_vec(),
    }
}

#[test]
fn file_windows_respect_nrows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "jobs.csv", &nine_rows());
    let options = StreamOptions::try_new(2, "header", 5).expect("options");

    let stream = FileChunks::open(&path, &options).expect("open");
    assert_eq!(stream.columns(), &["docs".to_string(), "tags".to_string()]);
    assert_eq!(stream.total_rows(), 5);
    assert_eq!(stream.chunk_count(), 3);

    let chunks: Vec<_> = stream.collect::<Result<_, _>>().expect("chunks");
    let ranges: Vec<_> = chunks.iter().map(|c| c.rows.clone()).collect();
    assert_eq!(ranges, vec![0..2, 2..4, 4..5]);
    assert_eq!(
        docs_of(&chunks[2].data, "docs"),
        vec![Some("doc 5".to_string())]
    );
    assert!(chunks.iter().all(|c| c.window.is_some()));
    assert!(chunks[1].window.unwrap().byte_offset > chunks[0].window.unwrap().byte_offset);
}

#[test]
fn header_only_file_yields_one_empty_chunk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "empty.csv", "docs,tags\n");
    let options = StreamOptions::try_new(10, "header", 0).expect("options");

    let chunks: Vec<_> = FileChunks::open(&path, &options)
        .expect("open")
        .collect::<Result<_, _>>()
        .expect("chunks");
    assert_eq!(chunks.len(), 1);
    let df = chunks[0].frame().expect("frame");
    assert_eq!(df.height(), 0);
    assert_eq!(column_names(df), vec!["docs", "tags"]);
}

#[test]
fn data_policy_synthesizes_column_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "raw.csv", "first,a,b\nsecond,c,d\n");
    let options = StreamOptions::try_new(0, "data", 0)
        .expect("options")
        .with_columns(vec!["docs".to_string()]);

    let mut stream = FileChunks::open(&path, &options).expect("open");
    assert_eq!(stream.columns(), &["docs".to_string(), "0".to_string(), "1".to_string()]);
    let chunk = stream.next().expect("one chunk").expect("read");
    assert_eq!(
        docs_of(&chunk.data, "docs"),
        vec![Some("first".to_string()), Some("second".to_string())]
    );
    assert!(stream.next().is_none());
}

#[test]
fn skip_policy_drops_first_row_and_truncates_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "skip.csv", "garbage\nalpha\nbeta\n");
    let options = StreamOptions::try_new(1, "skip", 0).expect("options");

    let stream = FileChunks::open(&path, &options).expect("open");
    assert_eq!(stream.columns(), &["docs".to_string()]);
    let docs: Vec<Doc> = stream
        .flat_map(|chunk| docs_of(&chunk.expect("chunk").data, "docs"))
        .collect();
    assert_eq!(docs, vec![Some("alpha".to_string()), Some("beta".to_string())]);
}

#[test]
fn quoted_newlines_survive_window_boundaries() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "quoted.csv", "docs\n\"line one\nline two\"\nplain\n\"x,y\"\n");
    let options = StreamOptions::try_new(1, "header", 0).expect("options");

    let docs: Vec<Doc> = FileChunks::open(&path, &options)
        .expect("open")
        .flat_map(|chunk| docs_of(&chunk.expect("chunk").data, "docs"))
        .collect();
    assert_eq!(
        docs,
        vec![
            Some("line one\nline two".to_string()),
            Some("plain".to_string()),
            Some("x,y".to_string()),
        ]
    );
}

#[test]
fn missing_and_empty_files_fail_distinctly() {
    let dir = tempfile::tempdir().expect("temp dir");
    let options = StreamOptions::default();

    let err = FileChunks::open(&dir.path().join("absent.csv"), &options).unwrap_err();
    assert!(matches!(err, PrepError::FileNotFound { .. }));

    let path = temp_csv(&dir, "blank.csv", "");
    let err = FileChunks::open(&path, &options).unwrap_err();
    assert!(matches!(err, PrepError::EmptyFile { .. }));
}

#[test]
fn docs_length_counts_data_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "jobs.csv", &nine_rows());
    let collection = DocumentCollection::FilePath(path.clone());

    assert_eq!(get_file_length(&path, b',').expect("count"), 10);
    assert_eq!(
        docs_length(&collection, FirstRow::Header, None, b',').expect("len"),
        9
    );
    assert_eq!(
        docs_length(&collection, FirstRow::Data, None, b',').expect("len"),
        10
    );
    assert_eq!(
        docs_length(&collection, FirstRow::Skip, Some(4), b',').expect("len"),
        4
    );
    let list = DocumentCollection::from(vec!["a", "b"]);
    assert_eq!(docs_length(&list, FirstRow::Header, Some(1), b',').expect("len"), 2);
}

#[test]
fn read_table_loads_everything() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_csv(&dir, "jobs.csv", &nine_rows());
    let df = read_table(&path, b',').expect("table");
    assert_eq!(df.height(), 9);
    assert_eq!(column_names(&df), vec!["docs", "tags"]);
}

fn reassemble(collection: &DocumentCollection, chunksize: usize, column: &str) -> Vec<Doc> {
    let options = StreamOptions::default().with_chunksize(chunksize);
    ChunkStream::open(collection, &options)
        .expect("open")
        .flat_map(|chunk| docs_of(&chunk.expect("chunk").data, column))
        .collect()
}

proptest! {
    #[test]
    fn in_memory_chunks_reassemble(
        docs in proptest::collection::vec(proptest::option::of("[a-z ]{0,6}"), 1..60),
        pick in 0usize..4,
    ) {
        let len = docs.len();
        let chunksize = [0, 1, len, len + 100][pick];
        let collection = DocumentCollection::IndexedSequence(DocSeries::new(docs.clone()));
        prop_assert_eq!(reassemble(&collection, chunksize, "docs"), docs);
    }

    #[test]
    fn file_chunks_reassemble(
        docs in proptest::collection::vec("[a-z]{1,6}", 1..40),
        pick in 0usize..4,
    ) {
        let len = docs.len();
        let chunksize = [0, 1, len, len + 100][pick];
        let dir = tempfile::tempdir().expect("temp dir");
        let mut contents = String::from("docs\n");
        for doc in &docs {
            contents.push_str(doc);
            contents.push('\n');
        }
        let path = temp_csv(&dir, "prop.csv", &contents);
        let expected: Vec<Doc> = docs.into_iter().map(Some).collect();
        prop_assert_eq!(
            reassemble(&DocumentCollection::FilePath(path), chunksize, "docs"),
            expected
        );
    }
}
