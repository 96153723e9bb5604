//! Masculine/feminine job title pairs.
//!
//! French job ads often spell both forms: `serveur(se)`, `serveur/serveuse`,
//! `apprenti boucher/apprentie bouchère`. Pairs whose endings are known
//! inflections are collapsed to the first (masculine) form. Pairs are
//! collected over the whole sequence first, then replaced in every
//! document.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use docprep_model::DocSeries;

/// Masculine endings and the feminine endings they pair with.
const SYNONYM_ENDINGS: &[(&str, &[&str])] = &[
    ("eur", &["euse", "se", "rice", "e", "eure"]),
    ("ien", &["ne", "nne", "e"]),
    ("ier", &["ere", "re", "e"]),
    ("ial", &["e"]),
    ("l", &["le"]),
    ("nt", &["e"]),
    ("at", &["e"]),
    ("f", &["ve"]),
    ("o", &["a"]),
    ("er", &["ere", "ère", "euse"]),
    ("i", &["e"]),
    ("d", &["e"]),
    ("é", &["e"]),
    ("e", &["e"]),
    ("on", &["onne"]),
    ("is", &["ise"]),
    ("s", &["s"]),
];

static SPACES_AROUND_SLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*/\s*").expect("Invalid slash regex"));

static SPACES_AROUND_OPEN_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\s*").expect("Invalid parenthesis regex"));

/// `serveur(se)`
static PARENTHESIS_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w\-]+)\(([\w\-]+)\)").expect("Invalid parenthesis regex"));

/// `serveur/serveuse` and `serveur/serveur(se)`
static SLASH_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w\-]+)/([\w\-]+)(\([\w\-]+\))?").expect("Invalid slash regex")
});

/// `apprenti boucher/apprentie bouchere`
static SLASH_FORM_TWO_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w\-]+\s[\w\-]+)/([\w\-]+\s[\w\-]+)").expect("Invalid slash regex")
});

/// `aide apprenti boucher/aide apprentie bouchere`
static SLASH_FORM_THREE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w\-]+\s[\w\-]+\s[\w\-]+)/([\w\-]+\s[\w\-]+\s[\w\-]+)")
        .expect("Invalid slash regex")
});

static DIGITS_OR_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s]+$").expect("Invalid digits regex"));

fn first_chars(word: &str, n: usize) -> &str {
    word.char_indices().nth(n).map_or(word, |(idx, _)| &word[..idx])
}

/// Returns true if `second` reads as the feminine form of `first`.
///
/// `first` must end with a known masculine ending and `second` must end
/// with one of its feminine endings, and additionally either equal that
/// ending, share its first four characters with `first`, or be at most two
/// characters longer than the ending.
pub fn matching_words(first: &str, second: &str) -> bool {
    if first.is_empty() || second.is_empty() {
        return false;
    }
    SYNONYM_ENDINGS
        .iter()
        .filter(|(masculine, _)| first.ends_with(masculine))
        .flat_map(|(_, feminines)| feminines.iter())
        .any(|feminine| {
            second == *feminine
                || (second.ends_with(feminine)
                    && (first_chars(first, 4) == first_chars(second, 4)
                        || second.chars().count() <= feminine.chars().count() + 2))
        })
}

/// Normalizes the spacing around `/` and `(` and adds one after `)`.
fn normalize_separators(text: &str) -> String {
    let text = SPACES_AROUND_SLASH.replace_all(text, "/");
    let text = SPACES_AROUND_OPEN_PAREN.replace_all(&text, "(");
    text.replace(')', ") ")
}

type Pair = (String, String);

fn pairs<'t>(regex: &Regex, text: &'t str) -> impl Iterator<Item = (&'t str, &'t str, &'t str)> {
    regex.captures_iter(text).map(|caps| {
        let group = |idx| caps.get(idx).map_or("", |m| m.as_str());
        (group(1), group(2), group(3))
    })
}

fn collect_synonyms(docs: &[String], known: &mut HashSet<Pair>) {
    let forms: [&Regex; 4] = [
        &PARENTHESIS_FORM,
        &SLASH_FORM,
        &SLASH_FORM_TWO_WORDS,
        &SLASH_FORM_THREE_WORDS,
    ];
    for text in docs {
        for form in forms {
            for (first, second, _) in pairs(form, text) {
                let same = first == second && !DIGITS_OR_SPACES.is_match(first);
                if same || matching_words(first, second) {
                    known.insert((first.to_string(), second.to_string()));
                }
            }
        }
    }
}

fn collapse(text: &str, known: &HashSet<Pair>) -> String {
    let is_known = |first: &str, second: &str| known.contains(&(first.to_string(), second.to_string()));
    let mut out = text.to_string();

    for (first, second, _) in pairs(&PARENTHESIS_FORM, text) {
        if is_known(first, second) {
            out = out.replace(&format!("{first}({second})"), first);
        }
    }
    for (first, second, suffix) in pairs(&SLASH_FORM, text) {
        if first == second || is_known(first, second) {
            if !suffix.is_empty() {
                out = out.replace(&format!("{first}/{second}{suffix}"), first);
            }
            out = out.replace(&format!("{first}/{second}"), first);
        }
    }
    for form in [&*SLASH_FORM_TWO_WORDS, &*SLASH_FORM_THREE_WORDS] {
        for (first, second, _) in pairs(form, text) {
            if is_known(first, second) {
                out = out.replace(&format!("{first}/{second}"), first);
            }
        }
    }
    out
}

/// Collapses masculine/feminine pairs across `docs`.
pub fn remove_gender_synonyms(docs: DocSeries) -> DocSeries {
    let normalized = docs.map_present(normalize_separators);
    let present: Vec<String> = normalized.iter().flatten().map(str::to_string).collect();
    let mut known = HashSet::new();
    collect_synonyms(&present, &mut known);
    tracing::trace!(pairs = known.len(), "collected gendered pairs");
    normalized.map_present(|text| collapse(text, &known))
}
