//! Corpus word counts.
//!
//! Both helpers read the documents the way the adapter does (the preferred
//! column of a table or file, the whole sequence otherwise), split them on
//! whitespace and count every word. Absent documents contribute nothing.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use docprep_model::{DocSeries, DocumentCollection, Result};
use docprep_transform::{AdapterOptions, FnTransform, apply_input_only};

fn word_counts(collection: &DocumentCollection, options: &AdapterOptions) -> Result<BTreeMap<String, u32>> {
    let docs = apply_input_only(&FnTransform::named("read_documents", Ok), collection, options)?;
    let mut counts = BTreeMap::new();
    for doc in docs.iter().flatten() {
        for word in doc.split_whitespace() {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Lists every word of the corpus with its number of occurrences.
///
/// The frame has a `word` column sorted in byte order and a `count` column.
///
/// # Errors
///
/// Any error from reading `collection`.
pub fn listing_count_words(collection: &DocumentCollection, options: &AdapterOptions) -> Result<DataFrame> {
    let counts = word_counts(collection, options)?;
    tracing::debug!(words = counts.len(), "counted corpus words");
    let (words, totals): (Vec<String>, Vec<u32>) = counts.into_iter().unzip();
    Ok(DataFrame::new(vec![
        Series::new("word".into(), words).into_column(),
        Series::new("count".into(), totals).into_column(),
    ])?)
}

/// Words that appear exactly once in the whole corpus, in byte order.
///
/// # Errors
///
/// Any error from reading `collection`.
pub fn list_one_appearance_word(collection: &DocumentCollection, options: &AdapterOptions) -> Result<DocSeries> {
    let words = word_counts(collection, options)?
        .into_iter()
        .filter(|(_, count)| *count == 1)
        .map(|(word, _)| Some(word))
        .collect();
    Ok(DocSeries::named("word", words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docprep_common::{any_to_i64, column_docs, frame_from_rows};

    fn corpus() -> DocumentCollection {
        DocumentCollection::List(vec![
            Some("chef de cuisine".to_string()),
            None,
            Some("chef  de\trang".to_string()),
        ])
    }

    #[test]
    fn counts_words_of_a_list() {
        let df = listing_count_words(&corpus(), &AdapterOptions::default()).expect("counts");
        assert_eq!(
            column_docs(&df, "word").expect("word").into_docs(),
            vec![
                Some("chef".to_string()),
                Some("cuisine".to_string()),
                Some("de".to_string()),
                Some("rang".to_string()),
            ]
        );
        let count = df.column("count").expect("count");
        let totals: Vec<_> = (0..df.height())
            .map(|idx| any_to_i64(&count.get(idx).expect("value")))
            .collect();
        assert_eq!(totals, vec![Some(2), Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn single_occurrences_of_a_table() {
        let columns = vec!["tags".to_string(), "docs".to_string()];
        let rows = vec![
            vec![Some("a".to_string()), Some("serveur h f".to_string())],
            vec![Some("b".to_string()), Some("serveuse h f".to_string())],
            vec![Some("c".to_string()), None],
        ];
        let table = DocumentCollection::Table(frame_from_rows(&columns, &rows).expect("frame"));

        let words = list_one_appearance_word(&table, &AdapterOptions::default()).expect("words");
        assert_eq!(words.name(), Some("word"));
        assert_eq!(
            words.into_docs(),
            vec![Some("serveur".to_string()), Some("serveuse".to_string())]
        );

        let df = listing_count_words(&table, &AdapterOptions::default().with_preferred_column("tags"))
            .expect("counts");
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn empty_corpus_has_no_words() {
        let df = listing_count_words(&DocumentCollection::List(vec![None]), &AdapterOptions::default())
            .expect("counts");
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }
}
