//! Completion tracking - required fields and follow-up questions

use std::collections::BTreeMap;

use crate::config::IntentDefinition;

/// What is still needed before an intent can be acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub missing: Vec<String>,
    pub follow_up: Vec<String>,
    pub is_complete: bool,
}

/// Compare extracted variables against the intent's required fields.
///
/// A field counts as missing when absent or blank. Each missing field gets
/// one follow-up question: the first custom template mentioning the field,
/// otherwise a generated one.
pub fn check_completion(
    intent_id: &str,
    vars: &BTreeMap<String, String>,
    intent: &IntentDefinition,
) -> Completion {
    let missing: Vec<String> = intent
        .required
        .iter()
        .filter(|field| vars.get(*field).map_or(true, |value| value.trim().is_empty()))
        .cloned()
        .collect();

    let follow_up = missing
        .iter()
        .map(|field| follow_up_question(intent_id, field, &intent.follow_up))
        .collect();

    Completion {
        is_complete: missing.is_empty(),
        missing,
        follow_up,
    }
}

pub fn follow_up_question(intent_id: &str, field: &str, templates: &[String]) -> String {
    let field_lower = field.to_lowercase();
    if let Some(custom) = templates
        .iter()
        .find(|template| template.to_lowercase().contains(&field_lower))
    {
        return custom.clone();
    }

    let noun = intent_noun(intent_id);
    match field_lower.as_str() {
        "title" => format!("What should I call this {noun}?"),
        "name" => "What's the name?".to_string(),
        "email" => "What's the email address?".to_string(),
        "phone" => "What's the phone number?".to_string(),
        "date" => format!("When should this {noun} be scheduled?"),
        "time" => format!("What time should this {noun} be?"),
        "duration" => format!("How long should this {noun} last?"),
        "location" => format!("Where should this {noun} take place?"),
        "description" => format!("Can you provide more details about this {noun}?"),
        "priority" => format!("What priority should this {noun} have?"),
        _ => format!("What {field} should I use for this {noun}?"),
    }
}

/// Human-friendly noun for an intent id.
pub fn intent_noun(intent_id: &str) -> String {
    let known = match intent_id {
        "CREATE_CONTACT" | "FIND_CONTACT" | "UPDATE_CONTACT" | "DELETE_CONTACT" | "CreateContact"
        | "FindContact" => Some("contact"),
        "CREATE_EVENT" | "SCHEDULE_EVENT" | "CreateEvent" | "ScheduleEvent" => Some("event"),
        "SCHEDULE_MEETING" | "ScheduleMeeting" => Some("meeting"),
        "CREATE_TASK" | "CreateTask" => Some("task"),
        "CREATE_NOTE" | "CreateNote" => Some("note"),
        "SET_REMINDER" | "SetReminder" => Some("reminder"),
        _ => None,
    };
    known.map_or_else(|| split_identifier(intent_id), str::to_string)
}

/// `CreateContact` / `CREATE_CONTACT` -> "create contact".
fn split_identifier(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for part in identifier.split(['_', '-', ' ']).filter(|p| !p.is_empty()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for c in part.chars() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            current.extend(c.to_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words.join(" ")
}
