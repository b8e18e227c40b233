//! Declarative intent/entity configuration
//!
//! A configuration is a JSON document describing the intents a domain can
//! recognise, the entities it can pull out of text, keyword synonyms and
//! per-intent confidence thresholds. It is loaded once, validated, and then
//! handed to the compiler; nothing mutates it afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use ahash::AHashSet;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result, ValidationError};
use crate::matcher::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::types::UNKNOWN_INTENT;

/// A JSON object kept as an ordered list of entries.
///
/// Declaration order matters to the classifier (first-seen wins on ties) and
/// to the synonym index (last declaration wins), and duplicate keys have to
/// survive parsing so validation can report them.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedList<T>(Vec<(String, T)>);

impl<T> KeyedList<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: T) {
        self.0.push((key.into(), value));
    }

    /// First entry declared under `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for KeyedList<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<T: Serialize> Serialize for KeyedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct KeyedListVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for KeyedListVisitor<T> {
            type Value = KeyedList<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    entries.push(entry);
                }
                Ok(KeyedList(entries))
            }
        }

        deserializer.deserialize_map(KeyedListVisitor(PhantomData))
    }
}

/// How to recognise one intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentDefinition {
    pub description: String,
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
    pub regex: Vec<String>,
    /// Higher wins near-ties; each point adds a fixed boost to the score.
    pub priority: i32,
    pub variables: Vec<String>,
    pub required: Vec<String>,
    /// Informational only, never scored.
    pub examples: Vec<String>,
    pub follow_up: Vec<String>,
}

impl IntentDefinition {
    pub fn has_match_signals(&self) -> bool {
        !(self.keywords.is_empty() && self.phrases.is_empty() && self.regex.is_empty())
    }

    /// Name of the first signal list holding a blank entry. A blank entry
    /// matches every input.
    pub fn blank_signal(&self) -> Option<&'static str> {
        [
            ("keywords", &self.keywords),
            ("phrases", &self.phrases),
            ("regex", &self.regex),
        ]
        .into_iter()
        .find(|(_, entries)| entries.iter().any(|entry| entry.trim().is_empty()))
        .map(|(signal, _)| signal)
    }
}

/// How to pull one entity out of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDefinition {
    /// Free-form type tag ("name", "email", ...) selecting the anchor policy.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// The first capturing group of each pattern is the extracted value.
    pub regex: Vec<String>,
    /// Anchor words for proximity extraction.
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub domain: String,
    pub version: String,
    pub intents: KeyedList<IntentDefinition>,
    pub entities: KeyedList<EntityDefinition>,
    /// Canonical word to alternative surface forms.
    pub synonyms: KeyedList<Vec<String>>,
    /// Minimum composite score per intent id.
    pub confidence: BTreeMap<String, f64>,
}

impl IntentConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.domain.trim().is_empty() {
            return Err(ValidationError::MissingDomain);
        }
        if self.intents.is_empty() {
            return Err(ValidationError::NoIntents);
        }

        let mut seen = AHashSet::with_capacity(self.intents.len());
        for (key, intent) in self.intents.iter() {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyKey);
            }
            if key == UNKNOWN_INTENT {
                return Err(ValidationError::ReservedIntent(key.to_string()));
            }
            if !seen.insert(key) {
                return Err(ValidationError::DuplicateIntent(key.to_string()));
            }
            if !intent.has_match_signals() {
                return Err(ValidationError::NoMatchSignals(key.to_string()));
            }
            if let Some(signal) = intent.blank_signal() {
                return Err(ValidationError::BlankMatchSignal {
                    intent: key.to_string(),
                    signal,
                });
            }
            if !intent.variables.is_empty() {
                if let Some(field) = intent
                    .required
                    .iter()
                    .find(|field| !intent.variables.contains(field))
                {
                    return Err(ValidationError::UndeclaredRequired {
                        intent: key.to_string(),
                        field: field.clone(),
                    });
                }
            }
        }

        let mut seen = AHashSet::with_capacity(self.entities.len());
        for key in self.entities.keys() {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyKey);
            }
            if !seen.insert(key) {
                return Err(ValidationError::DuplicateEntity(key.to_string()));
            }
        }

        for (intent, value) in &self.confidence {
            if !(0.0..=1.0).contains(value) {
                return Err(ValidationError::ThresholdOutOfRange {
                    intent: intent.clone(),
                    value: *value,
                });
            }
        }

        Ok(())
    }

    /// Configured threshold for `intent`, or the default when unset.
    pub fn threshold_for(&self, intent: &str) -> f64 {
        self.confidence
            .get(intent)
            .copied()
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// Built-in personal assistant domain: contacts with a name, email and phone.
    pub fn default_config() -> Self {
        let intents = KeyedList::from_iter([
            (
                "CREATE_CONTACT",
                IntentDefinition {
                    description: "Create a new contact".into(),
                    keywords: strings(&["create", "add", "new", "save"]),
                    phrases: strings(&["create contact", "add contact", "new contact", "save contact"]),
                    regex: strings(&[r"(?i)\b(?:create|add|new|save)\s+(?:a\s+)?(?:new\s+)?(?:contact|person)\b"]),
                    priority: 2,
                    variables: strings(&["name", "email", "phone"]),
                    required: strings(&["name"]),
                    examples: strings(&[
                        "create a new contact named bob",
                        "add contact named alice with email alice@example.com",
                    ]),
                    follow_up: strings(&["What's the name of the new contact?"]),
                },
            ),
            (
                "FIND_CONTACT",
                IntentDefinition {
                    description: "Find or search for a contact".into(),
                    keywords: strings(&["find", "search", "look", "get"]),
                    phrases: strings(&["find contact", "search contact", "look up contact"]),
                    regex: strings(&[r"(?i)\b(?:find|search(?:\s+for)?|look\s+(?:up|for))\s+(?:contact\s+)?\w+"]),
                    priority: 1,
                    variables: strings(&["name"]),
                    required: strings(&["name"]),
                    examples: strings(&["find contact bob", "search for alice"]),
                    follow_up: Vec::new(),
                },
            ),
        ]);

        let entities = KeyedList::from_iter([
            (
                "name",
                EntityDefinition {
                    kind: "name".into(),
                    description: "Person's name".into(),
                    regex: strings(&[
                        r"\b(?i:named|name\s+is|call(?:ed)?)\s+([A-Za-z][a-z]+(?:\s+[A-Z][a-z]+)*)",
                        r"(?i)\b(?:find|search\s+for|look\s+up|get)\s+contact\s+([a-z]+)",
                    ]),
                    keywords: strings(&["named", "name", "called"]),
                    examples: strings(&["Bob", "Alice Smith"]),
                },
            ),
            (
                "email",
                EntityDefinition {
                    kind: "email".into(),
                    description: "Email address".into(),
                    regex: strings(&[r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})"]),
                    keywords: strings(&["email", "e-mail", "mail"]),
                    examples: strings(&["alice@example.com"]),
                },
            ),
            (
                "phone",
                EntityDefinition {
                    kind: "phone".into(),
                    description: "Phone number".into(),
                    regex: strings(&[r"((?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})"]),
                    keywords: strings(&["phone", "telephone", "mobile", "cell"]),
                    examples: strings(&["555-123-4567", "(555) 123-4567"]),
                },
            ),
        ]);

        let synonyms = KeyedList::from_iter([
            ("create", strings(&["add", "new", "save", "store", "insert"])),
            ("find", strings(&["search", "look", "locate", "get"])),
            ("update", strings(&["change", "modify", "edit", "alter"])),
            ("delete", strings(&["remove", "drop", "erase", "clear"])),
        ]);

        let confidence = BTreeMap::from([
            ("CREATE_CONTACT".to_string(), 0.7),
            ("FIND_CONTACT".to_string(), 0.6),
            ("UPDATE_CONTACT".to_string(), 0.6),
            ("DELETE_CONTACT".to_string(), 0.6),
        ]);

        Self {
            domain: "personal_assistant".into(),
            version: "1.0.0".into(),
            intents,
            entities,
            synonyms,
            confidence,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
