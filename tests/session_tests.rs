//! Tests for form session transitions
//!
//! These tests drive a `FormSession` through the public command API and
//! verify:
//! - Step validation gating navigation
//! - Progress after advancing and retreating
//! - Submission ordering (first invalid step, then the phone gate)
//! - Counter updates through edits
//! - Entry add/remove flows including confirmation

use stepform::effect::Effect;
use stepform::error::FormError;
use stepform::form::{DEFAULT_PHONE_FIELD, FormDefinition, FormValues};
use stepform::repeater::RepeaterError;
use stepform::session::{Command, FormSession, PHONE_GATE_NOTICE, SUBMIT_BLOCKED_NOTICE};
use stepform::settings::Settings;
use stepform::types::{CounterLevel, NavigationBounds, PhonePolicy, PhoneRequirement, RepeatGroup};
use stepform::validation::{PHONE_MESSAGE, REQUIRED_MESSAGE, STEP_INVALID_NOTICE};

// =============================================================================
// Helpers
// =============================================================================

fn settings(bounds: NavigationBounds) -> Settings {
    Settings {
        navigation: bounds,
        ..Settings::default()
    }
}

fn new_session() -> FormSession {
    FormSession::new(FormDefinition::builtin(), settings(NavigationBounds::Unbounded))
}

fn edit(session: FormSession, field: &str, value: &str) -> FormSession {
    session
        .apply(Command::Edit {
            field: field.to_string(),
            value: value.to_string(),
        })
        .expect("known field")
        .session
}

fn fill_personal(session: FormSession) -> FormSession {
    let session = edit(session, "entry.1843290461", "Abebe Kebede");
    let session = edit(session, DEFAULT_PHONE_FIELD, "0912345678");
    edit(session, "entry.1204572839", "abebe@example.com")
}

fn fill_education(session: FormSession) -> FormSession {
    let session = edit(session, "education.1.level", "Bachelor");
    edit(session, "education.1.institution", "Addis Ababa University")
}

fn fill_experience(session: FormSession) -> FormSession {
    let session = edit(session, "experience.1.employer", "Ethio Telecom");
    edit(session, "experience.1.position", "Network Engineer")
}

fn fill_motivation(session: FormSession) -> FormSession {
    edit(session, "entry.917338560", "I enjoy solving hard problems.")
}

fn fill_all(session: FormSession) -> FormSession {
    fill_motivation(fill_experience(fill_education(fill_personal(session))))
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_advance_with_filled_step_moves_forward() {
    let session = fill_personal(new_session());
    let transition = session.apply(Command::Next).unwrap();

    assert_eq!(transition.session.wizard().current(), 1);
    assert!(transition.notices().is_empty());
    let progress = transition.session.wizard().progress();
    assert_eq!(progress.completed, vec![true, true, false, false, false]);
    assert_eq!(progress.percent, 25.0);
    assert!(transition.effects.contains(&Effect::ShowSection { index: Some(1) }));
    assert!(transition.effects.contains(&Effect::ScrollToTop));
}

#[test]
fn test_advance_with_empty_required_field_stays() {
    let session = edit(new_session(), "entry.1843290461", "Abebe Kebede");
    let transition = session.apply(Command::Next).unwrap();

    assert_eq!(transition.session.wizard().current(), 0);
    assert_eq!(transition.notices(), vec![STEP_INVALID_NOTICE]);
    assert_eq!(
        transition.session.marks().message(DEFAULT_PHONE_FIELD),
        Some(REQUIRED_MESSAGE)
    );
    assert!(!transition.session.marks().is_marked("entry.1843290461"));
    assert!(transition.effects.contains(&Effect::ScrollIntoView {
        field: DEFAULT_PHONE_FIELD.to_string()
    }));
}

#[test]
fn test_advance_with_malformed_phone_stays() {
    let session = edit(fill_personal(new_session()), DEFAULT_PHONE_FIELD, "0812345678");
    let transition = session.apply(Command::Next).unwrap();

    assert_eq!(transition.session.wizard().current(), 0);
    assert_eq!(
        transition.session.marks().message(DEFAULT_PHONE_FIELD),
        Some(PHONE_MESSAGE)
    );
}

#[test]
fn test_repeated_failures_reuse_marks() {
    let session = new_session();
    let first = session.apply(Command::Next).unwrap().session;
    let second = first.apply(Command::Next).unwrap().session;
    assert_eq!(first.marks(), second.marks());
    assert_eq!(second.marks().len(), 3);
}

#[test]
fn test_fixing_field_clears_mark_on_next_attempt() {
    let session = new_session().apply(Command::Next).unwrap().session;
    assert!(session.marks().is_marked("entry.1843290461"));

    let session = fill_personal(session);
    let transition = session.apply(Command::Next).unwrap();
    assert!(transition.session.marks().is_empty());
    assert!(transition.effects.contains(&Effect::ClearField {
        field: "entry.1843290461".to_string()
    }));
}

#[test]
fn test_optional_step_advances_without_input() {
    let session = new_session().apply(Command::JumpTo(3)).unwrap().session;
    let transition = session.apply(Command::Next).unwrap();
    assert_eq!(transition.session.wizard().current(), 4);
}

#[test]
fn test_retreat_is_never_validated() {
    let session = new_session().apply(Command::JumpTo(2)).unwrap().session;
    let transition = session.apply(Command::Previous).unwrap();
    assert_eq!(transition.session.wizard().current(), 1);
    assert!(transition.notices().is_empty());
    assert!(transition.session.marks().is_empty());
}

#[test]
fn test_unbounded_navigation_leaves_section_list() {
    let session = new_session().apply(Command::JumpTo(4)).unwrap().session;
    let session = fill_motivation(session);
    let transition = session.apply(Command::Next).unwrap();
    assert_eq!(transition.session.wizard().current(), 5);
    assert!(transition.effects.contains(&Effect::ShowSection { index: None }));

    // A step without a section validates trivially
    let transition = transition.session.apply(Command::Next).unwrap();
    assert_eq!(transition.session.wizard().current(), 6);
}

#[test]
fn test_clamped_navigation_stays_in_range() {
    let session = FormSession::new(FormDefinition::builtin(), settings(NavigationBounds::Clamped));
    let transition = session.apply(Command::Previous).unwrap();
    assert_eq!(transition.session.wizard().current(), 0);

    let session = fill_motivation(transition.session.apply(Command::JumpTo(99)).unwrap().session);
    assert_eq!(session.wizard().current(), 4);
    let transition = session.apply(Command::Next).unwrap();
    assert_eq!(transition.session.wizard().current(), 4);
}

// =============================================================================
// Submission
// =============================================================================

#[test]
fn test_submit_with_invalid_step_two_jumps_there() {
    let session = fill_motivation(fill_education(fill_personal(new_session())));
    let transition = session.apply(Command::Submit).unwrap();

    assert!(transition.submission().is_none());
    assert!(!transition.session.is_submitted());
    assert_eq!(transition.session.wizard().current(), 2);
    assert_eq!(transition.session.wizard().progress().percent, 50.0);
    assert_eq!(
        transition.notices(),
        vec![STEP_INVALID_NOTICE, SUBMIT_BLOCKED_NOTICE]
    );
    assert!(transition.session.marks().is_marked("experience.1.employer"));
}

#[test]
fn test_submit_stops_at_first_invalid_step() {
    let transition = new_session().apply(Command::Submit).unwrap();
    assert_eq!(transition.session.wizard().current(), 0);
    // Later steps are not validated, so their fields stay unmarked
    assert!(!transition.session.marks().is_marked("education.1.level"));
}

#[test]
fn test_submit_with_everything_valid_emits_submission() {
    let session = fill_all(new_session());
    let transition = session.apply(Command::Submit).unwrap();

    let submission = transition.submission().expect("accepted");
    assert_eq!(submission.form, "Job Application Form");
    assert_eq!(submission.values["entry.1843290461"], "Abebe Kebede");
    assert_eq!(submission.values[DEFAULT_PHONE_FIELD], "0912345678");
    assert!(transition.notices().is_empty());
    assert!(transition.session.is_submitted());
}

#[test]
fn test_submission_omits_hidden_entries() {
    let transition = fill_all(new_session()).apply(Command::Submit).unwrap();
    let submission = transition.submission().unwrap();
    assert!(submission.values.contains_key("education.1.level"));
    assert!(!submission.values.contains_key("education.2.level"));
    assert!(!submission.values.contains_key("training.6.course"));
}

#[test]
fn test_submit_phone_gate_rejects_empty_optional_phone() {
    // With the phone optional during navigation, an empty phone passes every
    // step but not the final gate
    let mut definition = FormDefinition::builtin();
    definition.sections[0].fields[1].required = false;
    let session = FormSession::new(definition, settings(NavigationBounds::Unbounded));
    let session = edit(session, "entry.1843290461", "Abebe Kebede");
    let session = edit(session, "entry.1204572839", "abebe@example.com");
    let session = fill_motivation(fill_experience(fill_education(session)));
    let session = session.apply(Command::JumpTo(4)).unwrap().session;

    let transition = session.apply(Command::Submit).unwrap();
    assert!(transition.submission().is_none());
    assert_eq!(transition.session.wizard().current(), 0);
    assert_eq!(transition.notices(), vec![PHONE_GATE_NOTICE]);
    assert!(!transition.session.marks().is_marked(DEFAULT_PHONE_FIELD));
}

#[test]
fn test_lenient_submission_policy_accepts_empty_optional_phone() {
    let mut definition = FormDefinition::builtin();
    definition.sections[0].fields[1].required = false;
    let lenient = Settings {
        navigation: NavigationBounds::Unbounded,
        phone_policy: PhonePolicy {
            navigation: PhoneRequirement::WhenPresent,
            submission: PhoneRequirement::WhenPresent,
        },
        ..Settings::default()
    };
    let session = FormSession::new(definition, lenient);
    let session = edit(session, "entry.1843290461", "Abebe Kebede");
    let session = edit(session, "entry.1204572839", "abebe@example.com");
    let session = fill_motivation(fill_experience(fill_education(session)));

    let transition = session.apply(Command::Submit).unwrap();
    assert!(transition.submission().is_some());
}

// =============================================================================
// Counters
// =============================================================================

#[test]
fn test_counter_updates_on_edit() {
    let session = edit(new_session(), "entry.917338560", &"a".repeat(451));
    let reading = session.counter("entry.917338560").unwrap();
    assert_eq!(reading.remaining, 49);
    assert_eq!(reading.level, CounterLevel::Warning);
    assert_eq!(reading.label(), "49 characters remaining");
}

#[test]
fn test_counter_truncates_and_rewrites_value() {
    let transition = new_session()
        .apply(Command::Edit {
            field: "entry.917338560".to_string(),
            value: "b".repeat(501),
        })
        .unwrap();

    assert_eq!(transition.session.value("entry.917338560"), "b".repeat(500));
    assert_eq!(
        transition.effects[0],
        Effect::SetValue {
            field: "entry.917338560".to_string(),
            value: "b".repeat(500)
        }
    );
    assert!(matches!(
        &transition.effects[1],
        Effect::Counter { reading, .. } if reading.level == CounterLevel::LimitReached
    ));
}

#[test]
fn test_fields_without_counter_emit_nothing() {
    let transition = new_session()
        .apply(Command::Edit {
            field: "entry.730158923".to_string(),
            value: "Hawassa".to_string(),
        })
        .unwrap();
    assert!(transition.effects.is_empty());
    assert!(transition.session.counter("entry.730158923").is_none());
}

#[test]
fn test_unknown_field_is_an_error() {
    let result = new_session().apply(Command::Edit {
        field: "entry.123".to_string(),
        value: String::new(),
    });
    assert!(result.is_err());
    let result = new_session().apply(Command::Blur {
        field: "education.9.level".to_string(),
    });
    assert!(result.is_err());
}

// =============================================================================
// Entries through the session
// =============================================================================

#[test]
fn test_add_entry_below_max_reveals_one() {
    let transition = new_session()
        .apply(Command::AddEntry(RepeatGroup::Experience))
        .unwrap();
    assert_eq!(
        transition.effects,
        vec![Effect::RevealEntry {
            group: RepeatGroup::Experience,
            position: 2
        }]
    );
    let state = transition.session.repeaters().get(RepeatGroup::Experience).unwrap();
    assert_eq!(state.count(), 2);
}

#[test]
fn test_add_entry_at_max_notifies_and_keeps_state() {
    let mut session = new_session();
    for _ in 1..6 {
        session = session.apply(Command::AddEntry(RepeatGroup::Training)).unwrap().session;
    }
    let transition = session.apply(Command::AddEntry(RepeatGroup::Training)).unwrap();

    assert_eq!(
        transition.notices(),
        vec!["Maximum of 6 training entries allowed"]
    );
    assert_eq!(transition.session.repeaters(), session.repeaters());
}

#[test]
fn test_remove_first_entry_is_silently_ignored() {
    let transition = new_session()
        .apply(Command::RemoveEntry {
            group: RepeatGroup::Education,
            position: 1,
        })
        .unwrap();
    assert!(transition.effects.is_empty());
    assert!(transition.session.pending_removal().is_none());
}

#[test]
fn test_accepted_removal_clears_entry() {
    let session = new_session().apply(Command::AddEntry(RepeatGroup::Education)).unwrap().session;
    let session = edit(session, "education.2.institution", "Jimma University");
    let session = session.apply(Command::JumpTo(1)).unwrap().session;
    let session = session.apply(Command::Next).unwrap().session;
    assert!(session.marks().is_marked("education.2.level"));

    let transition = session
        .apply(Command::RemoveEntry {
            group: RepeatGroup::Education,
            position: 2,
        })
        .unwrap();
    assert_eq!(
        transition.effects,
        vec![Effect::ConfirmRemoval {
            group: RepeatGroup::Education,
            position: 2,
            prompt: "Remove this education entry?".to_string()
        }]
    );

    let transition = transition
        .session
        .apply(Command::ResolveRemoval { accept: true })
        .unwrap();
    let session = transition.session;
    assert_eq!(session.repeaters().get(RepeatGroup::Education).unwrap().count(), 1);
    assert_eq!(session.value("education.2.institution"), "");
    assert!(!session.marks().is_marked("education.2.level"));
    assert!(transition.effects.contains(&Effect::HideEntry {
        group: RepeatGroup::Education,
        position: 2
    }));

    // Re-adding brings back a clean entry at the same position
    let transition = session.apply(Command::AddEntry(RepeatGroup::Education)).unwrap();
    assert!(transition.effects.contains(&Effect::RevealEntry {
        group: RepeatGroup::Education,
        position: 2
    }));
    assert_eq!(transition.session.value("education.2.institution"), "");
}

#[test]
fn test_hidden_entry_fields_reject_edits() {
    let session = new_session();
    let result = session.apply(Command::Edit {
        field: "education.2.institution".to_string(),
        value: "Unity University".to_string(),
    });
    assert!(matches!(
        result,
        Err(FormError::Repeater(RepeaterError::EntryNotVisible {
            group: RepeatGroup::Education,
            position: 2
        }))
    ));

    // The entry is revealed empty
    let session = session.apply(Command::AddEntry(RepeatGroup::Education)).unwrap().session;
    assert_eq!(session.value("education.2.institution"), "");
    let session = edit(session, "education.2.institution", "Unity University");
    assert_eq!(session.value("education.2.institution"), "Unity University");
}

#[test]
fn test_removed_entry_fields_reject_edits() {
    let session = new_session().apply(Command::AddEntry(RepeatGroup::Training)).unwrap().session;
    let session = session
        .apply(Command::RemoveEntry {
            group: RepeatGroup::Training,
            position: 2,
        })
        .unwrap()
        .session
        .apply(Command::ResolveRemoval { accept: true })
        .unwrap()
        .session;
    assert!(session.edit("training.2.course", "CCNA").is_err());
}

#[test]
fn test_visible_entry_required_fields_gate_step() {
    let session = fill_education(new_session());
    let session = session.apply(Command::AddEntry(RepeatGroup::Education)).unwrap().session;
    let session = session.apply(Command::JumpTo(1)).unwrap().session;

    let transition = session.apply(Command::Next).unwrap();
    assert_eq!(transition.session.wizard().current(), 1);
    assert!(transition.effects.contains(&Effect::ScrollIntoView {
        field: "education.2.level".to_string()
    }));
}

#[test]
fn test_blur_through_apply() {
    let session = edit(new_session(), DEFAULT_PHONE_FIELD, "+251 912 345 678");
    let transition = session
        .apply(Command::Blur {
            field: DEFAULT_PHONE_FIELD.to_string(),
        })
        .unwrap();
    assert!(transition.effects.is_empty());

    let session = edit(transition.session, DEFAULT_PHONE_FIELD, "25191234567");
    let transition = session
        .apply(Command::Blur {
            field: DEFAULT_PHONE_FIELD.to_string(),
        })
        .unwrap();
    assert_eq!(
        transition.effects,
        vec![Effect::MarkField {
            field: DEFAULT_PHONE_FIELD.to_string(),
            message: PHONE_MESSAGE.to_string()
        }]
    );
}

#[test]
fn test_prefilled_session_replays_entries() {
    let values: FormValues = serde_json::from_str(
        r#"{
            "entry.1843290461": "Abebe Kebede",
            "training.3.course": "Cisco CCNA"
        }"#,
    )
    .unwrap();
    let session =
        FormSession::with_values(FormDefinition::builtin(), Settings::default(), &values).unwrap();

    assert_eq!(session.repeaters().get(RepeatGroup::Training).unwrap().count(), 3);
    assert_eq!(session.value("entry.1843290461"), "Abebe Kebede");
    let reveals = session
        .start()
        .into_iter()
        .filter(|e| matches!(e, Effect::RevealEntry { .. }))
        .count();
    assert_eq!(reveals, 2);
}
