//! Token overlap between input text and an intent's vocabulary

use ahash::AHashSet;

/// Fraction of `vocabulary` present among `tokens` (0.0-1.0).
///
/// Divides by the vocabulary size, not the token count, so the same input
/// scores lower against a broader intent.
pub fn word_overlap(tokens: &[&str], vocabulary: &AHashSet<String>) -> f64 {
    if vocabulary.is_empty() {
        return 0.0;
    }

    let token_set: AHashSet<&str> = tokens.iter().copied().collect();
    let shared = vocabulary
        .iter()
        .filter(|word| token_set.contains(word.as_str()))
        .count();

    shared as f64 / vocabulary.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> AHashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_full_overlap() {
        let score = word_overlap(&["find", "contact"], &vocab(&["find", "contact"]));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_overlap_divides_by_vocabulary() {
        let score = word_overlap(
            &["find", "contact", "alice"],
            &vocab(&["find", "search", "look", "get", "contact", "up"]),
        );
        assert!((score - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_tokens_count_once() {
        let score = word_overlap(&["new", "new", "new"], &vocab(&["new", "contact"]));
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_vocabulary() {
        assert_eq!(word_overlap(&["anything"], &AHashSet::new()), 0.0);
    }
}
