//! Bundled text transformations.

pub mod basic;
pub mod stemmer;
pub mod stopwords;
pub mod synonyms;

pub use basic::{remove_words, words_remover};
pub use stemmer::{stem, stem_text};
pub use stopwords::{FRENCH_STOPWORDS, JOB_AD_STOPWORDS, StopwordRemover, StopwordSet};
pub use synonyms::{matching_words, remove_gender_synonyms};
