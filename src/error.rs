//! Error types for configuration loading and compilation
//!
//! Classification and extraction never fail once an engine is built; every
//! variant here is a construction-time failure.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read intent config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse intent config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid intent config: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid regex for {owner} `{pattern}`: {source}")]
    PatternCompile {
        owner: PatternOwner,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Schema-level violations, each naming the key at fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("domain is required")]
    MissingDomain,

    #[error("at least one intent must be defined")]
    NoIntents,

    #[error("intent and entity keys must not be empty")]
    EmptyKey,

    #[error("intent {0} is defined more than once")]
    DuplicateIntent(String),

    #[error("entity {0} is defined more than once")]
    DuplicateEntity(String),

    #[error("intent {0}: must have at least keywords, phrases, or regex")]
    NoMatchSignals(String),

    #[error("intent {intent}: {signal} entries must not be blank")]
    BlankMatchSignal { intent: String, signal: &'static str },

    #[error("intent key {0} is reserved")]
    ReservedIntent(String),

    #[error("intent {intent}: confidence threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange { intent: String, value: f64 },

    #[error("intent {intent}: required field {field} is not one of its variables")]
    UndeclaredRequired { intent: String, field: String },
}

/// Which definition a failing pattern belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOwner {
    Intent(String),
    Entity(String),
}

impl fmt::Display for PatternOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternOwner::Intent(key) => write!(f, "intent {key}"),
            PatternOwner::Entity(key) => write!(f, "entity {key}"),
        }
    }
}
