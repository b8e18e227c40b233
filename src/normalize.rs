//! Text normalization and tokenization

use std::sync::LazyLock;

use ahash::AHashSet;
use regex::Regex;

/// Unicode punctuation (category P) other than the characters that hold
/// emails, identifiers and hyphenated numbers together.
static BREAKING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{P}--[@._\-]]").expect("punctuation class compiles"));

/// Normalized input plus the length of the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    source_len: usize,
}

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters of the raw input.
    pub fn source_len(&self) -> usize {
        self.source_len
    }
}

/// Canonicalize raw input for matching.
///
/// Lower-cases, collapses whitespace, and replaces punctuation with spaces
/// except `@ . _ -`, so emails and hyphenated tokens survive intact.
/// Symbols such as `+` and `$` are not punctuation and are kept.
pub fn normalize(text: &str) -> NormalizedText {
    let lowered = collapse_whitespace(&text.to_lowercase());
    let stripped = BREAKING_PUNCTUATION.replace_all(&lowered, " ");

    NormalizedText {
        text: collapse_whitespace(&stripped),
        source_len: text.chars().count(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the punctuation that commonly clings to a word in free text.
pub fn trim_token(word: &str) -> &str {
    word.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"' | '\''))
}

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "among", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might",
];

/// Command and field words that are never a person's name.
const COMMON_WORDS: &[&str] = &[
    "within", "without", "contact", "person", "email", "phone", "name", "create", "add", "new",
    "find", "search", "update", "delete", "remove", "modify", "change", "edit", "save", "store",
    "please", "i", "me", "my",
];

/// Fixed word lists used by tokenization and entity plausibility checks.
///
/// Built once per compiled configuration and only ever read afterwards.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stop_words: AHashSet<&'static str>,
    common_words: AHashSet<&'static str>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            common_words: COMMON_WORDS.iter().copied().collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word.to_lowercase().as_str())
    }

    /// Stop word or a command/field word.
    pub fn is_common_word(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.stop_words.contains(lower.as_str()) || self.common_words.contains(lower.as_str())
    }

    /// Split normalized text into tokens, dropping stop words.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace()
            .filter(|word| !self.stop_words.contains(*word))
            .collect()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Create   Contact   Named   Bob  ").as_str(), "create contact named bob");
        assert_eq!(normalize("find\tcontact\njohn").as_str(), "find contact john");
    }

    #[test]
    fn test_keeps_email_and_hyphen_characters() {
        let normalized = normalize("ADD CONTACT WITH EMAIL test@example.com, phone 555-123-4567!");
        assert_eq!(
            normalized.as_str(),
            "add contact with email test@example.com phone 555-123-4567"
        );
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("hello,world!(again)").as_str(), "hello world again");
        assert_eq!(normalize("snake_case stays").as_str(), "snake_case stays");
    }

    #[test]
    fn test_symbols_survive_unicode_punctuation_does_not() {
        assert_eq!(normalize("I love C++ and $5 deals").as_str(), "i love c++ and $5 deals");
        assert_eq!(normalize("¿find contact alice?").as_str(), "find contact alice");
        assert_eq!(normalize("«Bonjour» ¡hola!").as_str(), "bonjour hola");
        assert_eq!(normalize("wait\u{2014}what").as_str(), "wait what");
    }

    #[test]
    fn test_source_len_counts_raw_chars() {
        let normalized = normalize("  Hi!  ");
        assert_eq!(normalized.as_str(), "hi");
        assert_eq!(normalized.source_len(), 7);
    }

    #[test]
    fn test_tokenize_drops_stop_words() {
        let lexicon = Lexicon::new();
        assert_eq!(
            lexicon.tokenize("create a new contact for the team"),
            vec!["create", "new", "contact", "team"]
        );
    }

    #[test]
    fn test_common_words_case_insensitive() {
        let lexicon = Lexicon::new();
        assert!(lexicon.is_common_word("Contact"));
        assert!(lexicon.is_common_word("The"));
        assert!(!lexicon.is_common_word("Alice"));
        assert!(lexicon.is_stop_word("WITH"));
    }

    #[test]
    fn test_trim_token() {
        assert_eq!(trim_token("Bob,"), "Bob");
        assert_eq!(trim_token("(555)"), "(555)");
        assert_eq!(trim_token("\"Paris\"."), "Paris");
    }
}
