//! Entity extraction from user input
//!
//! Runs against the original text: capitalisation and quotes carry signal
//! that normalization would destroy.

use std::collections::BTreeMap;

use tracing::trace;

use crate::compiler::{CompiledEntity, CompiledMatchers, EntityKind};
use crate::normalize::{trim_token, Lexicon};

const DATE_WORDS: &[&str] = &["today", "tomorrow", "yesterday"];

/// Words that end a title.
const TITLE_BOUNDARIES: &[&str] = &[
    "today", "tomorrow", "yesterday", "at", "with", "email", "phone", "on", "in", "to",
];

/// Words that make the next capitalised token a place, not a person.
const PLACE_PREPOSITIONS: &[&str] = &["in", "at", "on", "to", "from"];

/// Pulls configured entities out of text.
pub struct EntityExtractor<'m> {
    matchers: &'m CompiledMatchers,
}

impl<'m> EntityExtractor<'m> {
    pub fn new(matchers: &'m CompiledMatchers) -> Self {
        Self { matchers }
    }

    /// Extract every configured entity that can be found.
    ///
    /// Entities without a hit are left out of the map.
    pub fn extract(&self, text: &str) -> BTreeMap<String, String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let lexicon = self.matchers.lexicon();

        let mut found = BTreeMap::new();
        let mut unresolved_names = Vec::new();
        for entity in self.matchers.entities() {
            match extract_entity(text, &words, entity, lexicon, &found) {
                Some((value, strategy)) => {
                    trace!(entity = %entity.key, strategy, value = %value, "extracted entity");
                    found.insert(entity.key.clone(), value);
                }
                None if entity.kind == EntityKind::Name => unresolved_names.push(entity),
                None => {}
            }
        }

        // Positional guesses run last so they never steal words another
        // entity already claimed.
        for entity in unresolved_names {
            if let Some(value) = positional_name(&words, lexicon, &found) {
                trace!(entity = %entity.key, strategy = "positional", value = %value, "extracted entity");
                found.insert(entity.key.clone(), value);
            }
        }
        found
    }
}

/// Whether `token` is one of the words of a value already extracted.
fn is_claimed(token: &str, found: &BTreeMap<String, String>) -> bool {
    found
        .values()
        .flat_map(|value| value.split_whitespace())
        .any(|word| trim_token(word) == token)
}

fn extract_entity(
    text: &str,
    words: &[&str],
    entity: &CompiledEntity,
    lexicon: &Lexicon,
    found: &BTreeMap<String, String>,
) -> Option<(String, &'static str)> {
    if matches!(entity.kind, EntityKind::Name | EntityKind::Title) {
        let unclaimed = |span: &&str| !found.values().any(|value| value.as_str() == *span);
        if let Some(span) = quoted_span(text).filter(unclaimed) {
            return Some((span.to_string(), "quoted"));
        }
    }

    if let Some(value) = by_regex(text, entity) {
        return Some((value, "regex"));
    }

    let anchored = match entity.kind {
        EntityKind::Date => date_word(words),
        EntityKind::Title => title_after_anchor(words, &entity.anchors, lexicon),
        _ => word_after_anchor(words, entity, lexicon),
    };
    anchored.map(|value| (value, "anchor"))
}

/// First pattern with a non-empty first capture group (or whole match when
/// the pattern has no groups).
fn by_regex(text: &str, entity: &CompiledEntity) -> Option<String> {
    entity.regexes.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let group = if re.captures_len() > 1 { caps.get(1) } else { caps.get(0) };
        group
            .map(|m| m.as_str())
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
    })
}

/// Content of the first double-quoted span, exactly as written.
fn quoted_span(text: &str) -> Option<&str> {
    let start = text.find('"')? + 1;
    let len = text[start..].find('"')?;
    let span = &text[start..start + len];
    (!span.trim().is_empty()).then_some(span)
}

fn is_anchor(word: &str, anchors: &[String]) -> bool {
    let word = trim_token(word).to_lowercase();
    anchors.iter().any(|anchor| *anchor == word)
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn has_digit(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
}

/// Single token after an anchor, accepted by the entity type's rule.
fn word_after_anchor(words: &[&str], entity: &CompiledEntity, lexicon: &Lexicon) -> Option<String> {
    for (i, word) in words.iter().enumerate() {
        if !is_anchor(word, &entity.anchors) {
            continue;
        }
        let Some(next) = words.get(i + 1).map(|w| trim_token(w)) else {
            continue;
        };
        if next.is_empty() {
            continue;
        }

        let accepted = match entity.kind {
            EntityKind::Name => starts_uppercase(next) && !lexicon.is_common_word(next),
            EntityKind::Location => starts_uppercase(next) && !lexicon.is_stop_word(next),
            EntityKind::Email => next.contains('@') && next.contains('.'),
            EntityKind::Phone => {
                has_digit(next)
                    && (next.contains('-') || next.contains('(') || next.contains(')') || next.len() >= 10)
            }
            EntityKind::Time => {
                if let Some(time) = time_value(next, words.get(i + 2).copied()) {
                    return Some(time);
                }
                false
            }
            EntityKind::Date | EntityKind::Title | EntityKind::Other => true,
        };
        if accepted {
            return Some(next.to_string());
        }
    }
    None
}

/// "3:30", "9am", or "3" followed by a separate "pm".
fn time_value(candidate: &str, following: Option<&str>) -> Option<String> {
    if !has_digit(candidate) {
        return None;
    }
    let lower = candidate.to_lowercase();
    if lower.contains(':') || lower.contains("am") || lower.contains("pm") {
        return Some(candidate.to_string());
    }
    let suffix = following.map(trim_token)?;
    matches!(suffix.to_lowercase().as_str(), "am" | "pm" | "a.m" | "p.m")
        .then(|| format!("{candidate} {suffix}"))
}

fn date_word(words: &[&str]) -> Option<String> {
    words
        .iter()
        .map(|w| trim_token(w).to_lowercase())
        .find(|w| DATE_WORDS.contains(&w.as_str()))
}

/// Words after the anchor up to a stop word or boundary token.
fn title_after_anchor(words: &[&str], anchors: &[String], lexicon: &Lexicon) -> Option<String> {
    for (i, word) in words.iter().enumerate() {
        if !is_anchor(word, anchors) {
            continue;
        }

        let mut title: Vec<&str> = Vec::new();
        for raw in &words[i + 1..] {
            let token = trim_token(raw);
            let lower = token.to_lowercase();
            if token.is_empty()
                || lexicon.is_stop_word(&lower)
                || TITLE_BOUNDARIES.contains(&lower.as_str())
            {
                break;
            }
            title.push(token);
            if raw.ends_with([',', '.', ';', '!', '?']) {
                break;
            }
        }

        if !title.is_empty() {
            return Some(title.join(" "));
        }
    }
    None
}

/// First capitalised, non-common word after the opening token that does
/// not follow a place preposition and is not part of an extracted value.
fn positional_name(words: &[&str], lexicon: &Lexicon, found: &BTreeMap<String, String>) -> Option<String> {
    words.iter().enumerate().skip(1).find_map(|(i, raw)| {
        let token = trim_token(raw);
        let previous = trim_token(words[i - 1]).to_lowercase();
        let plausible = token.chars().count() > 1
            && starts_uppercase(token)
            && token.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
            && !lexicon.is_common_word(token)
            && !PLACE_PREPOSITIONS.contains(&previous.as_str())
            && !is_claimed(token, found);
        plausible.then(|| token.to_string())
    })
}
