//! Whole-word matching patterns.
//!
//! [`WordPattern`] joins any number of words or phrases into one alternation
//! guarded by look-behind and look-ahead, so a word only matches when it is
//! surrounded by whitespace, a delimiter character, or the text boundary.
//! One pattern is compiled for the whole list.
//!
//! # Usage
//!
//! ```ignore
//! use docprep_transform::word_boundary::WordPattern;
//!
//! let regex = WordPattern::new().case_insensitive(true).build(&["permis b"])?;
//! assert!(regex.is_match("PERMIS B exigé")?);
//! ```

use fancy_regex::{Regex, RegexBuilder};

use docprep_model::{PrepError, Result};

/// Backtracking budget of one search. Word patterns cost a few steps per
/// character, so only documents of many megabytes can reach it.
pub const BACKTRACK_LIMIT: usize = 1_000_000_000;

/// Characters accepted on either side of a word by default.
pub const DEFAULT_DELIMITERS: &str = ".?!,;:()\"'/<>=[]{}~*";

/// Builder for whole-word alternation patterns.
#[derive(Debug, Clone)]
pub struct WordPattern {
    case_insensitive: bool,
    before: String,
    after: String,
    words_as_regex: bool,
}

impl Default for WordPattern {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            before: DEFAULT_DELIMITERS.to_string(),
            after: DEFAULT_DELIMITERS.to_string(),
            words_as_regex: false,
        }
    }
}

impl WordPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes the pattern with `(?i)`.
    #[must_use]
    pub fn case_insensitive(mut self, enable: bool) -> Self {
        self.case_insensitive = enable;
        self
    }

    /// Characters allowed right before a match (whitespace always is).
    #[must_use]
    pub fn delimiters_before(mut self, chars: impl Into<String>) -> Self {
        self.before = chars.into();
        self
    }

    /// Characters allowed right after a match (whitespace always is).
    #[must_use]
    pub fn delimiters_after(mut self, chars: impl Into<String>) -> Self {
        self.after = chars.into();
        self
    }

    /// Treats the words as regex fragments and inserts them verbatim.
    #[must_use]
    pub fn words_as_regex(mut self, enable: bool) -> Self {
        self.words_as_regex = enable;
        self
    }

    /// Renders the pattern source.
    pub fn pattern<S: AsRef<str>>(&self, words: &[S]) -> String {
        let alternation = words
            .iter()
            .map(|word| {
                if self.words_as_regex {
                    word.as_ref().to_string()
                } else {
                    fancy_regex::escape(word.as_ref()).into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        let flag = if self.case_insensitive { "(?i)" } else { "" };
        format!(
            r"{flag}(?:^|(?<=[{before}\s]))({alternation})(?=[{after}\s]|$)",
            before = escape_class(&self.before),
            after = escape_class(&self.after),
        )
    }

    /// Compiles the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidPattern`] if the result does not compile,
    /// which can only happen with [`WordPattern::words_as_regex`].
    pub fn build<S: AsRef<str>>(&self, words: &[S]) -> Result<Regex> {
        compile(self.pattern(words))
    }
}

/// Compiles `pattern` with the crate's backtracking budget.
///
/// # Errors
///
/// Returns [`PrepError::InvalidPattern`] if `pattern` does not compile.
pub fn compile(pattern: String) -> Result<Regex> {
    RegexBuilder::new(&pattern)
        .backtrack_limit(BACKTRACK_LIMIT)
        .build()
        .map_err(|err| PrepError::InvalidPattern {
            message: err.to_string(),
            pattern,
        })
}

/// Replaces every match of `regex` in `text`.
///
/// # Errors
///
/// Returns [`PrepError::PatternFailed`] when matching stops early, e.g. once
/// the backtracking budget is spent.
pub fn replace_all(regex: &Regex, text: &str, replacement: &str) -> Result<String> {
    regex
        .try_replacen(text, 0, replacement)
        .map(|replaced| replaced.into_owned())
        .map_err(|err| PrepError::PatternFailed {
            pattern: regex.as_str().to_string(),
            message: err.to_string(),
        })
}

/// Escapes characters that are special inside a bracket expression.
fn escape_class(chars: &str) -> String {
    let mut escaped = String::with_capacity(chars.len() * 2);
    for c in chars.chars() {
        if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Pattern matching any of `words` as whole words, with default delimiters.
pub fn match_words_pattern<S: AsRef<str>>(words: &[S], case_insensitive: bool) -> String {
    WordPattern::new()
        .case_insensitive(case_insensitive)
        .pattern(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_shape() {
        insta::assert_snapshot!(
            match_words_pattern(&["test"], false),
            @r#"(?:^|(?<=[.?!,;:()"'/<>=\[\]{}\~*\s]))(test)(?=[.?!,;:()"'/<>=\[\]{}\~*\s]|$)"#
        );
    }

    #[test]
    fn custom_delimiters_and_flag() {
        let pattern = WordPattern::new()
            .case_insensitive(true)
            .delimiters_before("-")
            .delimiters_after("")
            .pattern(&["a+b", "c"]);
        insta::assert_snapshot!(pattern, @r"(?i)(?:^|(?<=[\-\s]))(a\+b|c)(?=[\s]|$)");
    }

    #[test]
    fn matches_whole_words_only() {
        let regex = WordPattern::new().build(&["test"]).expect("pattern");
        assert!(regex.is_match("this is a test.").expect("match"));
        assert!(regex.is_match("test").expect("match"));
        assert!(regex.is_match("(test)").expect("match"));
        assert!(!regex.is_match("this is testing").expect("match"));
        assert!(!regex.is_match("contest").expect("match"));
        assert!(!regex.is_match("Test").expect("match"));
    }

    #[test]
    fn case_insensitive_matches_capitalized() {
        let regex = WordPattern::new()
            .case_insensitive(true)
            .build(&["test"])
            .expect("pattern");
        assert!(regex.is_match("Test it").expect("match"));
        assert!(!regex.is_match("Testing").expect("match"));
    }

    #[test]
    fn phrases_and_fragments() {
        let regex = WordPattern::new()
            .build(&["permis b", "c++"])
            .expect("pattern");
        assert_eq!(
            regex.replace_all("permis b, c++ et permis bc", "X"),
            "X, X et permis bc"
        );

        let regex = WordPattern::new()
            .words_as_regex(true)
            .build(&[r"\d+ ans"])
            .expect("pattern");
        assert!(regex.is_match("3 ans minimum").expect("match"));

        let err = WordPattern::new().words_as_regex(true).build(&["(open"]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidPattern { .. }));
    }

    #[test]
    fn long_documents_fit_the_budget() {
        let regex = WordPattern::new().build(&["le", "la", "de"]).expect("pattern");
        let text = "xylophone ".repeat(10_000) + "le fin";
        let out = replace_all(&regex, &text, "").expect("replace");
        assert_eq!(out.len(), text.len() - 2);
        assert!(out.ends_with("  fin"));
    }

    #[test]
    fn spent_budget_is_an_error() {
        let pattern = match_words_pattern(&["le"], false);
        let regex = RegexBuilder::new(&pattern)
            .backtrack_limit(1)
            .build()
            .expect("pattern");
        let err = replace_all(&regex, &"xylophone ".repeat(100), "").unwrap_err();
        assert!(matches!(err, PrepError::PatternFailed { .. }));
    }
}
