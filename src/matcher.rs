//! Intent classifier - weighted multi-signal scoring over normalized text

use tracing::{debug, trace};

use crate::compiler::{CompiledIntent, CompiledMatchers};
use crate::normalize::NormalizedText;
use crate::similarity::word_overlap;
use crate::types::{Classification, IntentScore};

/// Scoring weights. Tuning constants; changing any of them changes outcomes.
pub const REGEX_WEIGHT: f64 = 0.8;
pub const PHRASE_WEIGHT: f64 = 0.6;
pub const KEYWORD_WEIGHT: f64 = 0.4;
pub const SYNONYM_WEIGHT: f64 = 0.3;
pub const OVERLAP_WEIGHT: f64 = 0.2;
pub const LENGTH_BONUS: f64 = 0.1;
pub const LENGTH_BONUS_MIN_CHARS: usize = 20;
pub const PRIORITY_STEP: f64 = 0.1;

/// Threshold for intents with no configured confidence entry
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Score a single intent against `text`.
pub fn score_intent(
    text: &NormalizedText,
    intent: &CompiledIntent,
    matchers: &CompiledMatchers,
) -> IntentScore {
    let input = text.as_str();

    let regex = if intent.regexes.iter().any(|re| re.is_match(input)) {
        REGEX_WEIGHT
    } else {
        0.0
    };

    let phrase = if intent.phrases.iter().any(|p| input.contains(p.as_str())) {
        PHRASE_WEIGHT
    } else {
        0.0
    };

    let mut keyword = 0.0;
    for kw in &intent.keywords {
        if input.contains(kw.as_str()) {
            keyword += KEYWORD_WEIGHT;
        } else if matchers
            .synonyms_of(kw)
            .iter()
            .any(|synonym| input.contains(synonym.as_str()))
        {
            keyword += SYNONYM_WEIGHT;
        }
    }
    // Normalized by configured keyword count, not matched count.
    if !intent.keywords.is_empty() {
        keyword /= intent.keywords.len() as f64;
    }

    let tokens = matchers.lexicon().tokenize(input);
    let overlap = word_overlap(&tokens, &intent.vocabulary) * OVERLAP_WEIGHT;

    let length = if text.source_len() > LENGTH_BONUS_MIN_CHARS {
        LENGTH_BONUS
    } else {
        0.0
    };

    IntentScore {
        intent: intent.key.clone(),
        regex,
        phrase,
        keyword,
        overlap,
        length,
        priority: f64::from(intent.priority) * PRIORITY_STEP,
    }
}

/// Breakdown for every intent, in declaration order.
pub fn score_all(text: &NormalizedText, matchers: &CompiledMatchers) -> Vec<IntentScore> {
    matchers
        .intents()
        .iter()
        .map(|intent| score_intent(text, intent, matchers))
        .collect()
}

/// Pick the best-scoring intent, or `UNKNOWN`.
///
/// Only a strictly higher score replaces the current best, so the earliest
/// declared intent wins an exact tie. A winner below its threshold is
/// reported as `UNKNOWN` with confidence 0.
pub fn classify(text: &NormalizedText, matchers: &CompiledMatchers) -> Classification {
    let mut best: Option<&CompiledIntent> = None;
    let mut best_score = 0.0;

    for intent in matchers.intents() {
        let score = score_intent(text, intent, matchers);
        let total = score.total();
        trace!(
            intent = %intent.key,
            regex = score.regex,
            phrase = score.phrase,
            keyword = score.keyword,
            overlap = score.overlap,
            length = score.length,
            priority = score.priority,
            total,
            "scored intent"
        );

        if total > best_score {
            best_score = total;
            best = Some(intent);
        }
    }

    let Some(winner) = best else {
        debug!("no intent scored above zero");
        return Classification::unknown();
    };

    if best_score < winner.threshold {
        debug!(
            intent = %winner.key,
            score = best_score,
            threshold = winner.threshold,
            "best intent below threshold"
        );
        return Classification::unknown();
    }

    debug!(intent = %winner.key, score = best_score, "classified intent");
    Classification {
        intent: winner.key.clone(),
        confidence: best_score.min(MAX_CONFIDENCE),
    }
}
