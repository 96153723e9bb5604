//! Light French stemmer.
//!
//! Strips the most common inflectional and derivational endings. It is a
//! fast approximation for grouping word forms, not a linguistic stemmer:
//! stems are lowercase and may not be real words.

/// Characters a stem must keep after stripping.
const MIN_STEM_CHARS: usize = 3;

/// Endings and their replacements, longest first.
const SUFFIXES: &[(&str, &str)] = &[
    ("issements", ""),
    ("issement", ""),
    ("atrices", ""),
    ("ateurs", ""),
    ("ations", ""),
    ("logies", "log"),
    ("atrice", ""),
    ("ateur", ""),
    ("ation", ""),
    ("logie", "log"),
    ("ements", ""),
    ("ement", ""),
    ("ances", ""),
    ("ences", ""),
    ("euses", ""),
    ("istes", ""),
    ("ismes", ""),
    ("ables", ""),
    ("ités", ""),
    ("ance", ""),
    ("ence", ""),
    ("euse", ""),
    ("iste", ""),
    ("isme", ""),
    ("able", ""),
    ("ité", ""),
    ("eaux", "eau"),
    ("ives", ""),
    ("aux", "al"),
    ("eux", ""),
    ("ive", ""),
    ("ifs", ""),
    ("ées", ""),
    ("ents", ""),
    ("ers", ""),
    ("ent", ""),
    ("if", ""),
    ("ée", ""),
    ("és", ""),
    ("er", ""),
    ("ez", ""),
    ("es", ""),
    ("é", ""),
    ("e", ""),
    ("s", ""),
    ("x", ""),
];

/// Stems a single word.
pub fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    for (suffix, replacement) in SUFFIXES {
        let Some(stem) = lower.strip_suffix(suffix) else {
            continue;
        };
        if stem.chars().count() >= MIN_STEM_CHARS {
            return format!("{stem}{replacement}");
        }
    }
    lower
}

/// Stems every space-separated token of `text`.
pub fn stem_text(text: &str) -> String {
    text.split(' ').map(stem).collect::<Vec<_>>().join(" ")
}
