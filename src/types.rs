//! Core data types for extraction results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Task reported when no intent clears its confidence threshold.
pub const UNKNOWN_INTENT: &str = "UNKNOWN";

/// Outcome of one `extract_intent` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Winning intent id, or `UNKNOWN`.
    pub task: String,
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up: Vec<String>,
    #[serde(default)]
    pub is_complete: bool,
}

impl ExtractionResult {
    pub fn is_unknown(&self) -> bool {
        self.task == UNKNOWN_INTENT
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

/// Selected intent and its clamped confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: String,
    pub confidence: f64,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: UNKNOWN_INTENT.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.intent == UNKNOWN_INTENT
    }
}

/// Per-signal contributions to one intent's composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: String,
    pub regex: f64,
    pub phrase: f64,
    pub keyword: f64,
    pub overlap: f64,
    pub length: f64,
    pub priority: f64,
}

impl IntentScore {
    /// Unclamped composite score.
    pub fn total(&self) -> f64 {
        self.regex + self.phrase + self.keyword + self.overlap + self.length + self.priority
    }
}
