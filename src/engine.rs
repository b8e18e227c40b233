//! The rule-based extraction engine and the provider capability it fills

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use crate::compiler::{compile, CompiledMatchers};
use crate::completion::check_completion;
use crate::config::IntentConfig;
use crate::entities::EntityExtractor;
use crate::error::Result;
use crate::matcher::{classify, score_all};
use crate::normalize::normalize;
use crate::types::{Classification, ExtractionResult, IntentScore};

/// Anything that can turn free text into an `ExtractionResult`.
///
/// The local engine is one implementation; remote model backends fill the
/// same contract elsewhere.
pub trait IntentProvider: Send + Sync {
    fn name(&self) -> String;

    fn is_available(&self) -> bool {
        true
    }

    fn extract_intent(&self, text: &str) -> anyhow::Result<ExtractionResult>;
}

/// Configured, compiled and ready to serve.
///
/// Immutable after construction, so a single instance can be shared across
/// threads without locking.
#[derive(Debug)]
pub struct IntentEngine {
    config: IntentConfig,
    matchers: CompiledMatchers,
    source: Option<PathBuf>,
}

impl IntentEngine {
    /// Validate and compile `config`.
    pub fn new(config: IntentConfig) -> Result<Self> {
        Self::build(config, None)
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(IntentConfig::default_config())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = IntentConfig::load(path)?;
        Self::build(config, Some(path.to_path_buf()))
    }

    /// Load from `path` when given, falling back to the built-in
    /// configuration if that fails.
    pub fn from_path_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::with_default_config();
        };
        match Self::from_path(path) {
            Ok(engine) => Ok(engine),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "falling back to built-in intent config");
                Self::with_default_config()
            }
        }
    }

    fn build(config: IntentConfig, source: Option<PathBuf>) -> Result<Self> {
        config.validate()?;
        let matchers = compile(&config)?;
        info!(
            domain = %config.domain,
            version = %config.version,
            intents = config.intents.len(),
            entities = config.entities.len(),
            "intent engine ready"
        );
        Ok(Self {
            config,
            matchers,
            source,
        })
    }

    pub fn config(&self) -> &IntentConfig {
        &self.config
    }

    pub fn matchers(&self) -> &CompiledMatchers {
        &self.matchers
    }

    /// Path the configuration was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn classify(&self, text: &str) -> Classification {
        classify(&normalize(text), &self.matchers)
    }

    /// Per-signal score breakdown for every intent.
    pub fn explain(&self, text: &str) -> Vec<IntentScore> {
        score_all(&normalize(text), &self.matchers)
    }

    /// Classify, extract entities, and check required fields.
    pub fn extract_intent(&self, text: &str) -> ExtractionResult {
        let classification = self.classify(text);
        let vars = EntityExtractor::new(&self.matchers).extract(text);
        let classified = !classification.is_unknown();

        let mut result = ExtractionResult {
            task: classification.intent,
            vars,
            confidence: classification.confidence,
            missing: Vec::new(),
            follow_up: Vec::new(),
            is_complete: false,
        };

        if let Some(intent) = self.config.intents.get(&result.task).filter(|_| classified) {
            let completion = check_completion(&result.task, &result.vars, intent);
            result.missing = completion.missing;
            result.follow_up = completion.follow_up;
            result.is_complete = completion.is_complete;
        }

        result
    }
}

impl IntentProvider for IntentEngine {
    fn name(&self) -> String {
        match self.source {
            Some(_) => format!("Enhanced Local ({})", self.config.domain),
            None => "Enhanced Local (default)".to_string(),
        }
    }

    fn extract_intent(&self, text: &str) -> anyhow::Result<ExtractionResult> {
        Ok(IntentEngine::extract_intent(self, text))
    }
}

/// Hot-reloadable handle around an engine.
///
/// Reloads build a complete replacement and swap it in atomically; callers
/// holding a `snapshot` keep the engine they started with.
#[derive(Debug)]
pub struct SharedEngine {
    current: ArcSwap<IntentEngine>,
}

impl SharedEngine {
    pub fn new(engine: IntentEngine) -> Self {
        Self {
            current: ArcSwap::from_pointee(engine),
        }
    }

    pub fn snapshot(&self) -> Arc<IntentEngine> {
        self.current.load_full()
    }

    /// Replace the engine with one built from `config`.
    ///
    /// On error the current engine stays in place.
    pub fn reload(&self, config: IntentConfig) -> Result<()> {
        let engine = IntentEngine::new(config)?;
        self.swap_in(engine);
        Ok(())
    }

    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let engine = IntentEngine::from_path(path)?;
        self.swap_in(engine);
        Ok(())
    }

    fn swap_in(&self, engine: IntentEngine) {
        info!(domain = %engine.config().domain, version = %engine.config().version, "reloaded intent engine");
        self.current.store(Arc::new(engine));
    }
}

impl IntentProvider for SharedEngine {
    fn name(&self) -> String {
        self.current.load().name()
    }

    fn extract_intent(&self, text: &str) -> anyhow::Result<ExtractionResult> {
        Ok(self.current.load().extract_intent(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};

    #[test]
    fn test_default_engine_create_contact() {
        let engine = IntentEngine::with_default_config().unwrap();
        let result = engine.extract_intent("create a new contact named bob");
        assert_eq!(result.task, "CREATE_CONTACT");
        assert_eq!(result.vars.get("name").map(String::as_str), Some("bob"));
        assert!(result.is_complete);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_unknown_skips_completion() {
        let engine = IntentEngine::with_default_config().unwrap();
        let result = engine.extract_intent("xyz zzz qqq");
        assert!(result.is_unknown());
        assert_eq!(result.confidence, 0.0);
        assert!(result.vars.is_empty());
        assert!(result.missing.is_empty());
        assert!(result.follow_up.is_empty());
        assert!(!result.is_complete);
    }

    #[test]
    fn test_missing_name_prompts() {
        let engine = IntentEngine::with_default_config().unwrap();
        let result = engine.extract_intent("find contact");
        assert_eq!(result.task, "FIND_CONTACT");
        assert_eq!(result.missing, vec!["name"]);
        assert_eq!(result.follow_up.len(), 1);
        assert!(!result.follow_up[0].is_empty());
        assert!(!result.is_complete);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut config = IntentConfig::default_config();
        config.domain.clear();
        assert!(matches!(
            IntentEngine::new(config),
            Err(Error::Validation(ValidationError::MissingDomain))
        ));
    }

    #[test]
    fn test_provider_name() {
        let engine = IntentEngine::with_default_config().unwrap();
        assert_eq!(IntentProvider::name(&engine), "Enhanced Local (default)");
        assert!(engine.is_available());
    }

    #[test]
    fn test_fallback_to_default() {
        let engine = IntentEngine::from_path_or_default(Some(Path::new("/no/such/config.json"))).unwrap();
        assert_eq!(engine.config().domain, "personal_assistant");
        assert!(engine.source().is_none());
    }

    #[test]
    fn test_shared_engine_reload_keeps_snapshots() {
        let shared = SharedEngine::new(IntentEngine::with_default_config().unwrap());
        let before = shared.snapshot();

        let config = IntentConfig::from_json_str(
            r#"{"domain": "music", "intents": {"PLAY": {"keywords": ["play"]}}}"#,
        )
        .unwrap();
        shared.reload(config).unwrap();

        assert_eq!(before.config().domain, "personal_assistant");
        assert_eq!(shared.snapshot().config().domain, "music");
        let result = shared.extract_intent("play").unwrap();
        assert_eq!(result.task, "PLAY");
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let shared = SharedEngine::new(IntentEngine::with_default_config().unwrap());
        let mut broken = IntentConfig::default_config();
        broken.entities.push("bad", crate::config::EntityDefinition {
            kind: "bad".into(),
            regex: vec!["(".into()],
            ..Default::default()
        });

        assert!(shared.reload(broken).is_err());
        assert_eq!(shared.snapshot().config().domain, "personal_assistant");
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IntentEngine>();
        assert_send_sync::<SharedEngine>();
    }
}
