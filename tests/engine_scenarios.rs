use std::sync::Arc;
use std::thread;

use intent_core::{
    Error, IntentConfig, IntentEngine, IntentProvider, SharedEngine, ValidationError, UNKNOWN_INTENT,
};

const CALENDAR_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/calendar_assistant.json");

fn default_engine() -> IntentEngine {
    IntentEngine::with_default_config().unwrap()
}

#[test]
fn test_create_contact_named_bob() {
    let result = default_engine().extract_intent("create a new contact named bob");
    assert_eq!(result.task, "CREATE_CONTACT");
    assert_eq!(result.vars.get("name").map(String::as_str), Some("bob"));
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
}

#[test]
fn test_find_contact_alice() {
    let result = default_engine().extract_intent("find contact alice");
    assert_eq!(result.task, "FIND_CONTACT");
    assert_eq!(result.vars.get("name").map(String::as_str), Some("alice"));
    assert!(result.is_complete);
}

#[test]
fn test_gibberish_is_unknown() {
    let result = default_engine().extract_intent("xyz zzz qqq");
    assert_eq!(result.task, UNKNOWN_INTENT);
    assert_eq!(result.confidence, 0.0);
    assert!(result.vars.is_empty());
}

#[test]
fn test_phone_and_email_in_one_call() {
    let result = default_engine()
        .extract_intent("add contact Alice with phone 555-123-4567 and email alice@example.com");
    assert_eq!(result.task, "CREATE_CONTACT");
    assert_eq!(result.vars.get("phone").map(String::as_str), Some("555-123-4567"));
    assert_eq!(result.vars.get("email").map(String::as_str), Some("alice@example.com"));
    assert_eq!(result.vars.get("name").map(String::as_str), Some("Alice"));
}

#[test]
fn test_intent_without_signals_rejected() {
    let json = r#"{
        "domain": "broken",
        "intents": {
            "FINE": {"keywords": ["ok"]},
            "EMPTY": {"description": "no keywords, phrases or regex", "priority": 5}
        }
    }"#;
    match IntentConfig::from_json_str(json) {
        Err(Error::Validation(ValidationError::NoMatchSignals(key))) => assert_eq!(key, "EMPTY"),
        other => panic!("expected NoMatchSignals, got {other:?}"),
    }
}

#[test]
fn test_quoted_name_is_exact() {
    let result = default_engine().extract_intent(r#"create contact named Bob called "Robert  de Niro""#);
    assert_eq!(result.vars.get("name").map(String::as_str), Some("Robert  de Niro"));
}

#[test]
fn test_missing_required_name() {
    let result = default_engine().extract_intent("add a new contact please");
    assert_eq!(result.task, "CREATE_CONTACT");
    assert_eq!(result.missing, vec!["name"]);
    assert_eq!(result.follow_up, vec!["What's the name of the new contact?"]);
    assert!(!result.is_complete);
}

#[test]
fn test_extraction_is_idempotent() {
    let engine = default_engine();
    for text in [
        "create a new contact named bob",
        "find contact alice",
        "xyz zzz qqq",
        "save contact with email bob@example.com",
    ] {
        assert_eq!(engine.extract_intent(text), engine.extract_intent(text));
    }
}

#[test]
fn test_bad_regex_names_entity_and_pattern() {
    let json = r#"{
        "domain": "broken",
        "intents": {"OK": {"keywords": ["ok"]}},
        "entities": {"ticket": {"type": "code", "regex": ["([A-Z"]}}
    }"#;
    let config = IntentConfig::from_json_str(json).unwrap();
    let err = IntentEngine::new(config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("entity ticket"), "{message}");
    assert!(message.contains("([A-Z"), "{message}");
}

#[test]
fn test_calendar_event_fully_specified() {
    let engine = IntentEngine::from_path(CALENDAR_CONFIG).unwrap();
    let result = engine
        .extract_intent("Schedule a meeting titled Budget Review tomorrow at 3pm in Berlin with Erin");

    assert_eq!(result.task, "CREATE_EVENT");
    assert_eq!(result.vars.get("title").map(String::as_str), Some("Budget Review"));
    assert_eq!(result.vars.get("date").map(String::as_str), Some("tomorrow"));
    assert_eq!(result.vars.get("time").map(String::as_str), Some("3pm"));
    assert_eq!(result.vars.get("location").map(String::as_str), Some("Berlin"));
    assert_eq!(result.vars.get("attendee").map(String::as_str), Some("Erin"));
    assert!(result.is_complete);
    assert_eq!(engine.name(), "Enhanced Local (calendar_assistant)");
}

#[test]
fn test_calendar_quoted_title_and_clock_time() {
    let engine = IntentEngine::from_path(CALENDAR_CONFIG).unwrap();
    let result = engine.extract_intent(r#"book a meeting called "Design Sync" today at 10:30"#);

    assert_eq!(result.task, "CREATE_EVENT");
    assert_eq!(result.vars.get("title").map(String::as_str), Some("Design Sync"));
    assert_eq!(result.vars.get("date").map(String::as_str), Some("today"));
    assert_eq!(result.vars.get("time").map(String::as_str), Some("10:30"));
    assert_eq!(result.vars.get("attendee"), None);
    assert!(result.is_complete);
}

#[test]
fn test_calendar_title_words_are_not_attendees() {
    let engine = IntentEngine::from_path(CALENDAR_CONFIG).unwrap();

    let result = engine.extract_intent("Schedule a meeting titled Budget Review tomorrow at 3pm");
    assert_eq!(result.vars.get("title").map(String::as_str), Some("Budget Review"));
    assert_eq!(result.vars.get("attendee"), None);

    let result = engine.extract_intent("remind me at 5pm about Rent");
    assert_eq!(result.task, "SET_REMINDER");
    assert_eq!(result.vars.get("title").map(String::as_str), Some("Rent"));
    assert_eq!(result.vars.get("attendee"), None);
    assert!(result.is_complete);
}

#[test]
fn test_calendar_reminder_asks_for_title() {
    let engine = IntentEngine::from_path(CALENDAR_CONFIG).unwrap();
    let result = engine.extract_intent("remind me at 5pm");

    assert_eq!(result.task, "SET_REMINDER");
    assert_eq!(result.vars.get("time").map(String::as_str), Some("5pm"));
    assert_eq!(result.missing, vec!["title"]);
    assert_eq!(result.follow_up, vec!["What should I call this reminder?"]);
}

#[test]
fn test_calendar_event_missing_fields_use_templates() {
    let engine = IntentEngine::from_path(CALENDAR_CONFIG).unwrap();
    let result = engine.extract_intent("schedule a meeting titled Retro");

    assert_eq!(result.task, "CREATE_EVENT");
    assert_eq!(result.missing, vec!["date", "time"]);
    assert_eq!(
        result.follow_up,
        vec!["What date works for the event?", "What time should it start?"]
    );
}

#[test]
fn test_concurrent_readers_share_one_engine() {
    let engine = Arc::new(default_engine());
    let expected = engine.extract_intent("find contact alice");

    thread::scope(|scope| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            let expected = expected.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(engine.extract_intent("find contact alice"), expected);
                }
            });
        }
    });
}

#[test]
fn test_reload_through_provider_trait() {
    let shared = SharedEngine::new(default_engine());
    let provider: &dyn IntentProvider = &shared;
    assert_eq!(provider.extract_intent("find contact alice").unwrap().task, "FIND_CONTACT");

    shared.reload_from_path(CALENDAR_CONFIG).unwrap();
    assert_eq!(provider.name(), "Enhanced Local (calendar_assistant)");
    assert_eq!(
        provider.extract_intent("find contact alice").unwrap().task,
        UNKNOWN_INTENT
    );
}
