//! Pattern compiler - turns an `IntentConfig` into query-time matcher state

use ahash::{AHashMap, AHashSet};
use regex::Regex;
use tracing::debug;

use crate::config::IntentConfig;
use crate::error::{Error, PatternOwner, Result};
use crate::normalize::Lexicon;

/// Anchor-extraction policy selected by an entity's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Name,
    Title,
    Email,
    Phone,
    Date,
    Time,
    Location,
    Other,
}

impl EntityKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "name" | "person" => EntityKind::Name,
            "title" | "subject" => EntityKind::Title,
            "email" => EntityKind::Email,
            "phone" => EntityKind::Phone,
            "date" => EntityKind::Date,
            "time" => EntityKind::Time,
            "location" | "place" => EntityKind::Location,
            _ => EntityKind::Other,
        }
    }

    /// Anchors the policy always uses, on top of configured keywords.
    fn default_anchors(self) -> &'static [&'static str] {
        match self {
            EntityKind::Time => &["at"],
            EntityKind::Location => &["in", "at"],
            _ => &[],
        }
    }

    /// Titles claim quoted spans before names do; both run before the rest.
    fn extraction_rank(self) -> u8 {
        match self {
            EntityKind::Title => 0,
            EntityKind::Name => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledIntent {
    pub key: String,
    pub regexes: Vec<Regex>,
    /// Lower-cased.
    pub phrases: Vec<String>,
    /// Lower-cased.
    pub keywords: Vec<String>,
    /// Keywords plus every word of every phrase.
    pub vocabulary: AHashSet<String>,
    pub priority: i32,
    pub threshold: f64,
}

#[derive(Debug, Clone)]
pub struct CompiledEntity {
    pub key: String,
    pub kind: EntityKind,
    pub regexes: Vec<Regex>,
    /// Lower-cased anchor words.
    pub anchors: Vec<String>,
}

/// Immutable, pre-compiled form of a configuration.
///
/// Rebuilt wholesale whenever the configuration changes; never patched.
#[derive(Debug, Clone)]
pub struct CompiledMatchers {
    intents: Vec<CompiledIntent>,
    entities: Vec<CompiledEntity>,
    synonyms: AHashMap<String, Vec<String>>,
    canonical: AHashMap<String, String>,
    lexicon: Lexicon,
}

impl CompiledMatchers {
    /// Intents in declaration order.
    pub fn intents(&self) -> &[CompiledIntent] {
        &self.intents
    }

    pub fn intent(&self, key: &str) -> Option<&CompiledIntent> {
        self.intents.iter().find(|intent| intent.key == key)
    }

    /// Entities in extraction order.
    pub fn entities(&self) -> &[CompiledEntity] {
        &self.entities
    }

    /// Surface forms that resolve to `canonical`.
    pub fn synonyms_of(&self, canonical: &str) -> &[String] {
        self.synonyms.get(canonical).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Canonical word a surface form was declared under.
    pub fn canonical_form(&self, surface: &str) -> Option<&str> {
        self.canonical.get(surface).map(String::as_str)
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

/// Compile every pattern in `config`.
///
/// The first bad regex aborts the whole compilation; no partially compiled
/// state is ever returned.
pub fn compile(config: &IntentConfig) -> Result<CompiledMatchers> {
    let mut intents = Vec::with_capacity(config.intents.len());
    for (key, intent) in config.intents.iter() {
        let regexes = compile_patterns(&intent.regex, || PatternOwner::Intent(key.to_string()))?;
        let keywords: Vec<String> = intent.keywords.iter().map(|k| k.to_lowercase()).collect();
        let phrases: Vec<String> = intent.phrases.iter().map(|p| p.to_lowercase()).collect();

        let mut vocabulary: AHashSet<String> = keywords.iter().cloned().collect();
        for phrase in &phrases {
            vocabulary.extend(phrase.split_whitespace().map(str::to_string));
        }

        intents.push(CompiledIntent {
            key: key.to_string(),
            regexes,
            phrases,
            keywords,
            vocabulary,
            priority: intent.priority,
            threshold: config.threshold_for(key),
        });
    }

    let mut entities = Vec::with_capacity(config.entities.len());
    for (key, entity) in config.entities.iter() {
        let kind = EntityKind::from_tag(&entity.kind);
        let regexes = compile_patterns(&entity.regex, || PatternOwner::Entity(key.to_string()))?;

        let mut anchors: Vec<String> = Vec::new();
        let configured = entity.keywords.iter().map(|k| k.to_lowercase());
        let defaults = kind.default_anchors().iter().map(|a| a.to_string());
        for anchor in configured.chain(defaults) {
            if !anchors.contains(&anchor) {
                anchors.push(anchor);
            }
        }

        entities.push(CompiledEntity {
            key: key.to_string(),
            kind,
            regexes,
            anchors,
        });
    }
    entities.sort_by_key(|entity| entity.kind.extraction_rank());

    let (synonyms, canonical) = build_synonym_index(config);

    debug!(
        domain = %config.domain,
        intents = intents.len(),
        entities = entities.len(),
        surface_forms = canonical.len(),
        "compiled intent configuration"
    );

    Ok(CompiledMatchers {
        intents,
        entities,
        synonyms,
        canonical,
        lexicon: Lexicon::new(),
    })
}

fn compile_patterns(
    patterns: &[String],
    owner: impl Fn() -> PatternOwner,
) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| Error::PatternCompile {
                owner: owner(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Surface form -> canonical, last declaration wins; then the forward lists
/// are rebuilt from that resolution so every surface belongs to one word.
fn build_synonym_index(
    config: &IntentConfig,
) -> (AHashMap<String, Vec<String>>, AHashMap<String, String>) {
    let mut canonical = AHashMap::new();
    for (word, alternatives) in config.synonyms.iter() {
        let word = word.to_lowercase();
        for alternative in alternatives {
            canonical.insert(alternative.to_lowercase(), word.clone());
        }
    }

    let mut synonyms: AHashMap<String, Vec<String>> = AHashMap::new();
    for (word, alternatives) in config.synonyms.iter() {
        let word = word.to_lowercase();
        for alternative in alternatives {
            let alternative = alternative.to_lowercase();
            if canonical.get(&alternative) != Some(&word) {
                continue;
            }
            let list = synonyms.entry(word.clone()).or_default();
            if !list.contains(&alternative) {
                list.push(alternative);
            }
        }
    }

    (synonyms, canonical)
}
