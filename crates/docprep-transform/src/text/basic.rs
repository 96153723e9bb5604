//! Per-document text cleaning functions.
//!
//! Every function here maps one document to one document. The registry
//! wraps them in [`MapTransform`](crate::transform::MapTransform) so absent
//! slots never reach them, except [`fill_absent`] which exists to replace
//! absent slots.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use docprep_model::{Doc, Result};

use crate::transform::MapTransform;
use crate::word_boundary::{self, WordPattern};

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("Invalid whitespace regex"));

static PUNCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]|_").expect("Invalid punctuation regex"));

static PUNCT_KEEP_PARENS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s\(\)/]|_").expect("Invalid punctuation regex")
});

static REPEATED_SPACES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\x0C\x0B ]{2,}").expect("Invalid spacing regex"));

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("Invalid numeric regex"));

static SPECIAL_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s)?([',.;:])(\s)?").expect("Invalid special chars regex"));

/// Web addresses with or without scheme; group 8 is the domain.
static URL_REGEX: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    word_boundary::compile(
        r"(?i)(?<![\w/])(((http|ftp|https)://)*(www\.|ftp\.)+|((http|ftp|https)://)+(www\.|ftp\.)*)([\w_-]+(?:(?:\.[\w_-]+)+))([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])?".to_string(),
    )
    .expect("Invalid URL regex")
});

/// "permis b" in any case, as a whole phrase.
static PERMIS_B_REGEX: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    WordPattern::new()
        .case_insensitive(true)
        .words_as_regex(true)
        .build(&[r"(permis)\s+(b)"])
        .expect("Invalid permis regex")
});

/// Replaces an absent slot with an empty document.
pub fn fill_absent(doc: Option<&str>) -> Doc {
    Some(doc.unwrap_or_default().to_string())
}

/// Replaces every whitespace character with a plain space.
pub fn get_true_spaces(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").into_owned()
}

/// Lowercases the tokens (split on spaces) of at least `threshold` chars.
///
/// A threshold of 0 or 1 lowercases the whole text.
pub fn to_lower(text: &str, threshold: usize) -> String {
    if threshold <= 1 {
        return text.to_lowercase();
    }
    text.split(' ')
        .map(|token| {
            if token.chars().count() >= threshold {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases everything but single-letter tokens.
pub fn to_lower_except_singleletters(text: &str) -> String {
    to_lower(text, 2)
}

/// Glues job-board phrases into single tokens ("Permis B" becomes "PermisB").
pub fn pe_matching(text: &str) -> Result<String> {
    word_boundary::replace_all(&PERMIS_B_REGEX, text, "${2}${3}")
}

/// Replaces punctuation and underscores with spaces.
pub fn remove_punct(text: &str) -> String {
    PUNCT_REGEX.replace_all(text, " ").into_owned()
}

/// Like [`remove_punct`], keeping parentheses and slashes.
pub fn remove_punct_except_parenthesis(text: &str) -> String {
    PUNCT_KEEP_PARENS_REGEX.replace_all(text, " ").into_owned()
}

/// Collapses runs of spaces and tabs into one space.
pub fn trim_string(text: &str) -> String {
    REPEATED_SPACES_REGEX.replace_all(text, " ").into_owned()
}

pub fn remove_leading_and_ending_spaces(text: &str) -> String {
    text.trim().to_string()
}

/// Replaces digit runs with a space.
pub fn remove_numeric(text: &str) -> String {
    NUMERIC_REGEX.replace_all(text, " ").into_owned()
}

/// Strips diacritics (`é` becomes `e`, `ç` becomes `c`).
pub fn remove_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Appends a final period when missing.
pub fn add_point(text: &str) -> String {
    if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

/// Surrounds `' , . ; :` with single spaces.
pub fn add_space_around_special(text: &str) -> String {
    SPECIAL_CHARS_REGEX.replace_all(text, " ${2} ").into_owned()
}

/// Replaces web addresses with a space.
pub fn replace_urls(text: &str) -> Result<String> {
    word_boundary::replace_all(&URL_REGEX, text, " ")
}

/// Replaces web addresses with their domain.
pub fn replace_urls_with_domains(text: &str) -> Result<String> {
    word_boundary::replace_all(&URL_REGEX, text, " ${8} ")
}

/// Compiles a remover for whole-word occurrences of `words`.
///
/// # Errors
///
/// Returns [`PrepError::InvalidPattern`](docprep_model::PrepError::InvalidPattern)
/// if the pattern fails to compile.
pub fn words_remover(
    words: &[impl AsRef<str>],
    case_insensitive: bool,
) -> Result<impl Fn(&str) -> Result<String> + Send + Sync + 'static> {
    let regex = WordPattern::new()
        .case_insensitive(case_insensitive)
        .build(words)?;
    Ok(move |text: &str| word_boundary::replace_all(&regex, text, ""))
}

/// A named step removing whole-word occurrences of `words`.
///
/// # Errors
///
/// Same as [`words_remover`].
pub fn remove_words(words: &[impl AsRef<str>], case_insensitive: bool) -> Result<MapTransform> {
    Ok(MapTransform::try_new(
        "remove_words",
        words_remover(words, case_insensitive)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_helpers() {
        assert_eq!(get_true_spaces("a\tb\nc\u{a0}d"), "a b c d");
        assert_eq!(trim_string("a   b\t\tc d"), "a b c d");
        assert_eq!(remove_leading_and_ending_spaces("  a b \n"), "a b");
    }

    #[test]
    fn lowercasing_respects_threshold() {
        assert_eq!(to_lower("Bonjour A Tous", 0), "bonjour a tous");
        assert_eq!(to_lower_except_singleletters("Permis B Obligatoire"), "permis B obligatoire");
        assert_eq!(to_lower("Él Ça", 3), "Él Ça");
    }

    #[test]
    fn permis_b_is_glued() {
        assert_eq!(pe_matching("permis b exigé").expect("replace"), "permisb exigé");
        assert_eq!(pe_matching("Avec PERMIS   B.").expect("replace"), "Avec PERMISB.");
        assert_eq!(pe_matching("permis bateau").expect("replace"), "permis bateau");
    }

    #[test]
    fn punctuation_and_digits() {
        assert_eq!(remove_punct("a,b_c!(d)"), "a b c  d ");
        assert_eq!(remove_punct_except_parenthesis("a,b/c (d)!"), "a b/c (d) ");
        assert_eq!(remove_numeric("bac+2 en 2019"), "bac+  en  ");
    }

    #[test]
    fn accents_are_removed() {
        assert_eq!(remove_accents("éèêëàçôù"), "eeeeacou");
        assert_eq!(remove_accents("Crème Brûlée"), "Creme Brulee");
    }

    #[test]
    fn point_and_special_characters() {
        assert_eq!(add_point("fin"), "fin.");
        assert_eq!(add_point("fin."), "fin.");
        assert_eq!(add_space_around_special("a,b; c"), "a , b ; c");
    }

    #[test]
    fn urls_are_replaced() {
        assert_eq!(replace_urls("voir www.pole-emploi.fr/offres ici").expect("replace"), "voir   ici");
        assert_eq!(
            replace_urls_with_domains("voir https://www.example.com/a?b=c ici").expect("replace"),
            "voir  example.com  ici"
        );
        assert_eq!(replace_urls("mail a.b@c.fr").expect("replace"), "mail a.b@c.fr");
    }

    #[test]
    fn words_are_removed_whole() {
        let remove = words_remover(&["le", "la"], false).expect("remover");
        assert_eq!(remove("le chat et la lune, lea").expect("replace"), " chat et  lune, lea");
        let remove = words_remover(&["le"], true).expect("remover");
        assert_eq!(remove("Le chat").expect("replace"), " chat");
    }

    #[test]
    fn remove_words_is_a_named_step() {
        use crate::transform::{Transform, display_name};
        use docprep_model::DocSeries;

        let step = remove_words(&["cdi"], true).expect("step");
        assert_eq!(display_name(&step), "remove_words");
        let out = step.apply(DocSeries::from(vec![Some("CDI temps plein"), None])).expect("apply");
        assert_eq!(out, DocSeries::from(vec![Some(" temps plein"), None]));
    }

    #[test]
    fn fill_absent_only_touches_absent() {
        assert_eq!(fill_absent(None), Some(String::new()));
        assert_eq!(fill_absent(Some("a")), Some("a".to_string()));
    }
}
