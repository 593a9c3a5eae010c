//! Validation engine
//!
//! Checks the required fields of a step and the phone number format rule,
//! producing a [`StepReport`]. Inline error marks are tracked by
//! [`FieldMarks`]: a mark is created once per field and reused on repeated
//! failures, and cleared when the field passes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::effect::Effect;
use crate::form::{FormDefinition, FormValues};
use crate::repeater::Repeaters;
use crate::types::PhoneRequirement;

/// Inline message for an empty required field
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Inline message for a malformed phone number
pub const PHONE_MESSAGE: &str = "Please enter a valid Ethiopian phone number (+2519... or 09...)";

/// Blocking notice raised whenever a step fails validation
pub const STEP_INVALID_NOTICE: &str =
    "Please fill in all required fields correctly before continuing.";

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+251|0)(9[0-9]{8})$").expect("phone pattern is a valid regex")
});

/// Whether a phone number matches `+2519XXXXXXXX` or `09XXXXXXXX`.
/// Whitespace anywhere in the input is ignored.
pub fn is_valid_phone(raw: &str) -> bool {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERN.is_match(&compact)
}

/// Kind of a field-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingValue,
    MalformedPhone,
}

/// A failing field and the message attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl FieldIssue {
    fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: IssueKind::MissingValue,
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    fn malformed_phone(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: IssueKind::MalformedPhone,
            message: PHONE_MESSAGE.to_string(),
        }
    }
}

/// Result of validating one step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: i32,
    /// Failing fields, in display order
    pub issues: Vec<FieldIssue>,
    /// Required fields that passed; their marks get cleared
    pub passed: Vec<String>,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// First invalid field, scrolled into view
    pub fn focus(&self) -> Option<&str> {
        self.issues.first().map(|i| i.field.as_str())
    }
}

/// Phone check under a requirement; `None` when the value is acceptable
pub fn phone_issue(field: &str, value: &str, requirement: PhoneRequirement) -> Option<FieldIssue> {
    let checked = match requirement {
        PhoneRequirement::WhenPresent => !value.is_empty(),
        PhoneRequirement::Always => true,
    };
    (checked && !is_valid_phone(value)).then(|| FieldIssue::malformed_phone(field))
}

/// Inline check run when the phone field loses focus
pub fn check_phone_on_blur(field: &str, value: &str) -> Option<FieldIssue> {
    phone_issue(field, value, PhoneRequirement::WhenPresent)
}

/// Validate one step.
///
/// Every required field shown on the step must have a non-blank value. On
/// step 0 the phone field (wherever it lives) must also satisfy the phone
/// rule under `phone`. A step index without a section validates trivially.
pub fn validate_step(
    definition: &FormDefinition,
    values: &FormValues,
    repeaters: &Repeaters,
    step: i32,
    phone: PhoneRequirement,
) -> StepReport {
    let mut report = StepReport {
        step,
        ..StepReport::default()
    };

    for name in definition.step_fields(step, repeaters) {
        let Some(spec) = definition.resolve_field(&name) else {
            continue;
        };
        if !spec.required {
            continue;
        }
        if values.get(&name).trim().is_empty() {
            report.issues.push(FieldIssue::missing(&name));
        } else {
            report.passed.push(name);
        }
    }

    if step == 0 && definition.has_phone_field() {
        let field = definition.phone_field.as_str();
        let already_failed = report.issues.iter().any(|i| i.field == field);
        if !already_failed {
            if let Some(issue) = phone_issue(field, values.get(field), phone) {
                report.issues.push(issue);
            }
        }
    }

    report
}

/// Inline error marks currently shown, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMarks(BTreeMap<String, String>);

impl FieldMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a field. An existing mark keeps its original message.
    /// Returns true when a new mark was created.
    pub fn mark(&mut self, field: &str, message: &str) -> bool {
        if self.0.contains_key(field) {
            return false;
        }
        self.0.insert(field.to_string(), message.to_string());
        true
    }

    /// Remove a field's mark. Returns true when one existed.
    pub fn clear(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_marked(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply a report: clear marks of passing fields, then mark failing ones
    pub fn apply(&mut self, report: &StepReport) -> Vec<Effect> {
        let mut effects = Vec::new();
        for field in &report.passed {
            if self.clear(field) {
                effects.push(Effect::ClearField {
                    field: field.clone(),
                });
            }
        }
        for issue in &report.issues {
            self.mark(&issue.field, &issue.message);
            effects.push(Effect::MarkField {
                field: issue.field.clone(),
                message: self.message(&issue.field).unwrap_or(&issue.message).to_string(),
            });
        }
        effects
    }
}
