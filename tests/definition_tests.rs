//! Tests for form definitions, settings and saved responses on disk
//!
//! These tests verify:
//! - JSON save/load round-trips through temporary files
//! - Definition consistency checks
//! - Settings defaults for missing keys
//! - Submission delivery to a JSON file

use std::fs;

use stepform::form::{FieldSpec, FormDefinition, FormValues};
use stepform::session::{Command, FormSession};
use stepform::settings::Settings;
use stepform::sink::{JsonFileSink, Submission, SubmissionSink};
use stepform::types::{FieldKind, NavigationBounds, PhoneRequirement};
use tempfile::TempDir;

// =============================================================================
// Form Definition Tests
// =============================================================================

#[test]
fn test_definition_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.json");

    let definition = FormDefinition::builtin();
    definition.save_to_file(&path).unwrap();
    let loaded = FormDefinition::load_from_file(&path).unwrap();

    assert_eq!(loaded, definition);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_minimal_definition_uses_defaults() {
    let json = r#"{
        "title": "Newsletter",
        "sections": [
            {
                "title": "Contact",
                "fields": [
                    { "name": "email", "label": "Email", "required": true },
                    { "name": "notes", "label": "Notes", "kind": "multiline", "max_length": 0 }
                ]
            }
        ]
    }"#;
    let definition: FormDefinition = serde_json::from_str(json).unwrap();

    assert!(definition.validate().is_ok());
    assert_eq!(definition.sections[0].fields[0].kind, FieldKind::Text);
    assert!(!definition.has_phone_field());
    assert_eq!(definition.sections[0].fields[1].counter_limit(500), Some(500));
}

#[test]
fn test_definition_rejects_duplicate_names() {
    let mut definition = FormDefinition::builtin();
    definition.sections[4]
        .fields
        .push(FieldSpec::text("entry.1843290461", "Again"));
    let err = definition.validate().unwrap_err();
    assert!(err.to_string().contains("Duplicate field name"));
}

#[test]
fn test_definition_rejects_too_many_slots() {
    let mut definition = FormDefinition::builtin();
    definition.repeaters[2].slots = 7;
    let err = definition.validate().unwrap_err();
    assert!(err.to_string().contains("between 1 and 6 slots"));
}

#[test]
fn test_definition_rejects_unhosted_repeater() {
    let mut definition = FormDefinition::builtin();
    definition.sections[3].repeater = None;
    assert!(definition.validate().is_err());
}

#[test]
fn test_definition_rejects_non_phone_phone_field() {
    let mut definition = FormDefinition::builtin();
    definition.phone_field = "entry.1843290461".to_string();
    let err = definition.validate().unwrap_err();
    assert!(err.to_string().contains("must have kind 'phone'"));
}

#[test]
fn test_definition_rejects_empty_form() {
    let mut definition = FormDefinition::builtin();
    definition.sections.clear();
    definition.repeaters.clear();
    assert!(definition.validate().is_err());
}

#[test]
fn test_entry_fields_resolve_to_templates() {
    let definition = FormDefinition::builtin();
    let field = definition.resolve_field("education.8.level").unwrap();
    assert_eq!(field.kind, FieldKind::Select);
    assert!(field.required);
    assert!(definition.resolve_field("education.9.level").is_none());
}

// =============================================================================
// Settings Tests
// =============================================================================

#[test]
fn test_settings_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let settings = Settings {
        navigation: NavigationBounds::Unbounded,
        counter_warning_threshold: 25,
        ..Settings::default()
    };
    settings.save_to_file(&path).unwrap();
    assert_eq!(Settings::load_from_file(&path).unwrap(), settings);
}

#[test]
fn test_partial_settings_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "phone_policy": { "submission": "when-present" } }"#).unwrap();

    let settings = Settings::load_from_file(&path).unwrap();
    assert_eq!(settings.navigation, NavigationBounds::Clamped);
    assert_eq!(settings.phone_policy.navigation, PhoneRequirement::WhenPresent);
    assert_eq!(settings.phone_policy.submission, PhoneRequirement::WhenPresent);
    assert_eq!(settings.default_max_length, 500);
}

#[test]
fn test_settings_reject_zero_default_length() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "default_max_length": 0 }"#).unwrap();
    assert!(Settings::load_from_file(&path).is_err());
}

#[test]
fn test_settings_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(Settings::load_from_file(dir.path().join("absent.json")).is_err());
}

// =============================================================================
// Responses and Submission Tests
// =============================================================================

#[test]
fn test_saved_responses_fill_a_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("responses.json");
    fs::write(
        &path,
        r#"{
            "entry.1843290461": "Abebe Kebede",
            "entry.297979220": "+251912345678",
            "entry.1204572839": "abebe@example.com",
            "education.1.level": "Master",
            "education.1.institution": "Bahir Dar University",
            "experience.1.employer": "Ethiopian Airlines",
            "experience.1.position": "Analyst",
            "experience.2.employer": "Safaricom",
            "experience.2.position": "Engineer",
            "entry.917338560": "Growth."
        }"#,
    )
    .unwrap();

    let values = FormValues::load_from_file(&path).unwrap();
    let session =
        FormSession::with_values(FormDefinition::builtin(), Settings::default(), &values).unwrap();
    let transition = session.apply(Command::Submit).unwrap();

    let submission = transition.submission().expect("all steps valid");
    assert_eq!(submission.values["experience.2.employer"], "Safaricom");
    assert!(!submission.values.contains_key("experience.3.employer"));
}

#[test]
fn test_saved_responses_reject_unknown_fields() {
    let mut values = FormValues::new();
    values.set("entry.999", "value");
    assert!(
        FormSession::with_values(FormDefinition::builtin(), Settings::default(), &values).is_err()
    );
}

#[test]
fn test_json_sink_writes_submission() {
    let dir = TempDir::new().unwrap();
    let sink = JsonFileSink::new(dir.path().join("out.json"));
    let submission = Submission::new(
        "Job Application Form",
        [("entry.1843290461".to_string(), "Abebe".to_string())].into(),
    );

    sink.deliver(&submission).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sink.path()).unwrap()).unwrap();
    assert_eq!(written["form"], "Job Application Form");
    assert_eq!(written["values"]["entry.1843290461"], "Abebe");
}
