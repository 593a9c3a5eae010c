//! Form session
//!
//! `FormSession` is the single value holding everything a form instance
//! knows: current step, field values, inline marks, counter readings,
//! repeatable entries and a pending removal. Every operation takes the
//! session by reference and returns a [`Transition`] carrying the next
//! session plus the effects a renderer has to apply. Nothing is mutated in
//! place and nothing is global.
//!
//! # Command flow
//!
//! ```text
//! Command ──► FormSession::apply ──► Transition { session, effects }
//!                 │
//!                 ├─ Next / Submit ──► validation::validate_step
//!                 ├─ AddEntry / RemoveEntry ──► repeater
//!                 └─ Edit ──► counter
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::counter::{CharCounter, CounterReading};
use crate::effect::Effect;
use crate::error::{FormError, Result};
use crate::form::{FormDefinition, FormValues, parse_entry_field_name};
use crate::repeater::{PendingRemoval, RepeaterError, Repeaters};
use crate::settings::Settings;
use crate::sink::Submission;
use crate::types::{PhoneRequirement, RepeatGroup};
use crate::validation::{FieldMarks, STEP_INVALID_NOTICE, StepReport, check_phone_on_blur, phone_issue, validate_step};
use crate::wizard::WizardState;

/// Notice raised when submission finds an invalid step
pub const SUBMIT_BLOCKED_NOTICE: &str = "Please fix all errors before submitting the form.";

/// Notice raised when the final phone check fails
pub const PHONE_GATE_NOTICE: &str = "Please enter a valid Ethiopian phone number.";

/// User intent, dispatched by action rather than by widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate the current step and move forward
    Next,
    /// Move back without validating
    Previous,
    /// Show a step directly
    JumpTo(i32),
    /// Replace a field's value
    Edit { field: String, value: String },
    /// A field lost focus
    Blur { field: String },
    AddEntry(RepeatGroup),
    /// Ask to remove an entry; confirmed through `ResolveRemoval`
    RemoveEntry { group: RepeatGroup, position: u8 },
    ResolveRemoval { accept: bool },
    /// Validate everything and hand the values over
    Submit,
}

/// Result of applying a command
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: FormSession,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(session: FormSession, effects: Vec<Effect>) -> Self {
        Self { session, effects }
    }

    /// Messages of every blocking notice in this transition
    pub fn notices(&self) -> Vec<&str> {
        self.effects.iter().filter_map(Effect::notice_message).collect()
    }

    /// The submission, if this transition accepted one
    pub fn submission(&self) -> Option<&Submission> {
        self.effects.iter().find_map(|e| match e {
            Effect::Submit(submission) => Some(submission),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FormSession {
    definition: Arc<FormDefinition>,
    settings: Settings,
    wizard: WizardState,
    values: FormValues,
    marks: FieldMarks,
    counters: BTreeMap<String, CounterReading>,
    repeaters: Repeaters,
    pending_removal: Option<PendingRemoval>,
    submitted: bool,
}

impl FormSession {
    /// Fresh session on the first step with every field empty
    pub fn new(definition: FormDefinition, settings: Settings) -> Self {
        let definition = Arc::new(definition);
        let mut values = FormValues::new();
        for name in definition.all_field_names() {
            values.set(name, "");
        }

        let mut session = Self {
            wizard: WizardState::new(definition.section_count(), settings.navigation),
            repeaters: Repeaters::from_definition(&definition),
            definition,
            settings,
            values,
            marks: FieldMarks::new(),
            counters: BTreeMap::new(),
            pending_removal: None,
            submitted: false,
        };
        session.refresh_counters();
        session
    }

    /// Session prefilled with saved values. Entries holding a value are
    /// revealed, and counters are evaluated (and values truncated) right away.
    pub fn with_values(
        definition: FormDefinition,
        settings: Settings,
        prefill: &FormValues,
    ) -> Result<Self> {
        let mut session = Self::new(definition, settings);

        for (name, value) in prefill.iter() {
            if session.definition.resolve_field(name).is_none() {
                return Err(FormError::unknown_field(name.as_str()));
            }
            if let Some((group, position, _)) = parse_entry_field_name(name) {
                if !value.trim().is_empty() {
                    if let Some(state) = session.repeaters.get(group) {
                        let state = state.reveal_through(position)?;
                        session.repeaters = session.repeaters.with_state(state);
                    }
                }
            }
            session.values.set(name.as_str(), value.as_str());
        }

        session.refresh_counters();
        Ok(session)
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn wizard(&self) -> WizardState {
        self.wizard
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field)
    }

    pub fn marks(&self) -> &FieldMarks {
        &self.marks
    }

    pub fn counter(&self, field: &str) -> Option<&CounterReading> {
        self.counters.get(field)
    }

    pub fn repeaters(&self) -> &Repeaters {
        &self.repeaters
    }

    pub fn pending_removal(&self) -> Option<PendingRemoval> {
        self.pending_removal
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Copy left open for another submit after the sink refused a submission
    pub fn delivery_failed(&self) -> Self {
        let mut next = self.clone();
        next.submitted = false;
        next
    }

    /// Fields shown on the current step, in display order
    pub fn current_fields(&self) -> Vec<String> {
        self.definition
            .step_fields(self.wizard.current(), &self.repeaters)
    }

    /// Effects describing the initial screen
    pub fn start(&self) -> Vec<Effect> {
        let mut effects = self.wizard.render();
        for state in self.repeaters.iter() {
            for position in state.visible_positions().filter(|p| *p > 1) {
                effects.push(Effect::RevealEntry {
                    group: state.group(),
                    position,
                });
            }
        }
        for (field, reading) in &self.counters {
            effects.push(Effect::Counter {
                field: field.clone(),
                reading: reading.clone(),
            });
        }
        effects
    }

    /// Dispatch a command
    pub fn apply(&self, command: Command) -> Result<Transition> {
        debug!("Applying {:?} at step {}", command, self.wizard.current());
        match command {
            Command::Next => Ok(self.advance()),
            Command::Previous => Ok(self.retreat()),
            Command::JumpTo(index) => Ok(self.jump_to(index)),
            Command::Edit { field, value } => self.edit(&field, &value),
            Command::Blur { field } => self.blur(&field),
            Command::AddEntry(group) => Ok(self.add_entry(group)),
            Command::RemoveEntry { group, position } => Ok(self.remove_entry(group, position)),
            Command::ResolveRemoval { accept } => Ok(self.resolve_removal(accept)),
            Command::Submit => Ok(self.submit()),
        }
    }

    /// Validate a step without changing anything
    pub fn validate_step(&self, step: i32, phone: PhoneRequirement) -> StepReport {
        validate_step(&self.definition, &self.values, &self.repeaters, step, phone)
    }

    /// Validate the current step; move forward when it passes
    pub fn advance(&self) -> Transition {
        let mut next = self.clone();
        let (valid, mut effects) = next.check_step(self.wizard.current());

        if valid {
            next.wizard = self.wizard.next();
            effects.extend(next.wizard.render());
            debug!(
                "Advanced from step {} to {}",
                self.wizard.current(),
                next.wizard.current()
            );
        }

        Transition::new(next, effects)
    }

    /// Move back one step
    pub fn retreat(&self) -> Transition {
        let mut next = self.clone();
        next.wizard = self.wizard.previous();
        let effects = next.wizard.render();
        Transition::new(next, effects)
    }

    /// Show a step directly, without validation
    pub fn jump_to(&self, index: i32) -> Transition {
        let mut next = self.clone();
        next.wizard = self.wizard.jump(index);
        let effects = next.wizard.render();
        Transition::new(next, effects)
    }

    /// Set a field's value, updating its counter. Fields of hidden entries
    /// stay empty until the entry is added.
    pub fn edit(&self, field: &str, value: &str) -> Result<Transition> {
        if self.definition.resolve_field(field).is_none() {
            return Err(FormError::unknown_field(field));
        }
        if let Some((group, position, _)) = parse_entry_field_name(field) {
            if self.repeaters.is_hidden_entry_field(field) {
                return Err(RepeaterError::EntryNotVisible { group, position }.into());
            }
        }

        let mut next = self.clone();
        let mut effects = Vec::new();
        let mut stored = value.to_string();

        if let Some(counter) = self.counter_for(field) {
            let reading = counter.evaluate(value);
            if let Some(truncated) = &reading.truncated {
                stored = truncated.clone();
                effects.push(Effect::SetValue {
                    field: field.to_string(),
                    value: stored.clone(),
                });
            }
            next.counters.insert(field.to_string(), reading.clone());
            effects.push(Effect::Counter {
                field: field.to_string(),
                reading,
            });
        }

        next.values.set(field, stored);
        Ok(Transition::new(next, effects))
    }

    /// A field lost focus. Only the phone field reacts, with the inline check.
    pub fn blur(&self, field: &str) -> Result<Transition> {
        if self.definition.resolve_field(field).is_none() {
            return Err(FormError::unknown_field(field));
        }
        if field != self.definition.phone_field {
            return Ok(Transition::new(self.clone(), Vec::new()));
        }

        let mut next = self.clone();
        let effects = match check_phone_on_blur(field, self.values.get(field)) {
            Some(issue) => {
                next.marks.mark(field, &issue.message);
                vec![Effect::MarkField {
                    field: field.to_string(),
                    message: next
                        .marks
                        .message(field)
                        .unwrap_or(&issue.message)
                        .to_string(),
                }]
            }
            None if next.marks.clear(field) => vec![Effect::ClearField {
                field: field.to_string(),
            }],
            None => Vec::new(),
        };

        Ok(Transition::new(next, effects))
    }

    /// Reveal the next entry of a group
    pub fn add_entry(&self, group: RepeatGroup) -> Transition {
        let result = match self.repeaters.get(group) {
            Some(state) => state.add_entry(),
            None => Err(RepeaterError::SlotUnavailable { group, position: 1 }),
        };

        match result {
            Ok((state, position)) => {
                let mut next = self.clone();
                next.repeaters = self.repeaters.with_state(state);
                Transition::new(next, vec![Effect::RevealEntry { group, position }])
            }
            Err(err) => {
                warn!("Cannot add {} entry: {}", group, err);
                Transition::new(self.clone(), vec![Effect::notify(err.to_string())])
            }
        }
    }

    /// Ask to remove an entry. The first entry of a group is never removable
    /// and such requests are dropped silently.
    pub fn remove_entry(&self, group: RepeatGroup, position: u8) -> Transition {
        let request = match self.repeaters.get(group) {
            Some(state) => state.request_removal(position),
            None => Err(RepeaterError::EntryNotVisible { group, position }),
        };

        match request {
            Ok(pending) => {
                let mut next = self.clone();
                next.pending_removal = Some(pending);
                let effects = vec![Effect::ConfirmRemoval {
                    group,
                    position,
                    prompt: pending.prompt(),
                }];
                Transition::new(next, effects)
            }
            Err(err) => {
                debug!("Ignoring removal request: {}", err);
                Transition::new(self.clone(), Vec::new())
            }
        }
    }

    /// Answer the pending removal question
    pub fn resolve_removal(&self, accept: bool) -> Transition {
        let Some(pending) = self.pending_removal else {
            return Transition::new(self.clone(), Vec::new());
        };

        let mut next = self.clone();
        next.pending_removal = None;
        if !accept {
            debug!("Removal of {} entry {} declined", pending.group, pending.position);
            return Transition::new(next, Vec::new());
        }

        let removed = self
            .repeaters
            .get(pending.group)
            .ok_or(RepeaterError::EntryNotVisible {
                group: pending.group,
                position: pending.position,
            })
            .and_then(|state| state.remove_entry(pending.position));
        let state = match removed {
            Ok(state) => state,
            Err(err) => {
                warn!("Pending removal no longer applies: {}", err);
                return Transition::new(next, Vec::new());
            }
        };
        next.repeaters = self.repeaters.with_state(state);

        let mut effects = vec![Effect::HideEntry {
            group: pending.group,
            position: pending.position,
        }];
        for name in self
            .definition
            .entry_field_names(pending.group, pending.position)
        {
            next.values.clear(&name);
            effects.push(Effect::SetValue {
                field: name.clone(),
                value: String::new(),
            });
            if next.marks.clear(&name) {
                effects.push(Effect::ClearField {
                    field: name.clone(),
                });
            }
            if let Some(counter) = self.counter_for(&name) {
                let reading = counter.evaluate("");
                next.counters.insert(name.clone(), reading.clone());
                effects.push(Effect::Counter {
                    field: name,
                    reading,
                });
            }
        }

        info!(
            "Removed {} entry {} ({} left)",
            pending.group,
            pending.position,
            next.repeaters.get(pending.group).map_or(0, |s| s.count())
        );
        Transition::new(next, effects)
    }

    /// Validate every step in order and, if all pass, emit the submission.
    ///
    /// The first failing step becomes the current one. After the steps, the
    /// phone field is checked once more under the submission policy, which
    /// rejects an empty value.
    pub fn submit(&self) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();

        for step in 0..self.wizard.total() as i32 {
            let (valid, step_effects) = next.check_step(step);
            if !valid {
                // Show the failing step first so its focus lands on the right field
                next.wizard = self.wizard.jump(step);
                effects.extend(next.wizard.render());
                effects.extend(step_effects);
                effects.push(Effect::notify(SUBMIT_BLOCKED_NOTICE));
                warn!("Submission blocked: step {} is invalid", step);
                return Transition::new(next, effects);
            }
            effects.extend(step_effects);
        }

        if self.definition.has_phone_field() {
            let field = self.definition.phone_field.as_str();
            let requirement = self.settings.phone_policy.submission;
            if phone_issue(field, self.values.get(field), requirement).is_some() {
                next.wizard = self.wizard.jump(0);
                effects.extend(next.wizard.render());
                effects.push(Effect::notify(PHONE_GATE_NOTICE));
                warn!("Submission blocked: phone number missing or malformed");
                return Transition::new(next, effects);
            }
        }

        let submission = Submission::new(self.definition.title.clone(), self.visible_values());
        info!(
            "Form '{}' accepted with {} values",
            submission.form,
            submission.values.len()
        );
        next.submitted = true;
        effects.push(Effect::Submit(submission));
        Transition::new(next, effects)
    }

    /// Validate a step under the navigation phone policy, updating marks.
    /// Returns whether it passed and the effects to render.
    fn check_step(&mut self, step: i32) -> (bool, Vec<Effect>) {
        let report = self.validate_step(step, self.settings.phone_policy.navigation);
        let mut effects = self.marks.apply(&report);

        if let Some(field) = report.focus() {
            effects.push(Effect::ScrollIntoView {
                field: field.to_string(),
            });
        }
        if !report.is_valid() {
            debug!("Step {} has {} invalid fields", step, report.issues.len());
            effects.push(Effect::notify(STEP_INVALID_NOTICE));
        }

        (report.is_valid(), effects)
    }

    fn counter_for(&self, field: &str) -> Option<CharCounter> {
        self.definition
            .resolve_field(field)
            .and_then(|spec| spec.counter_limit(self.settings.default_max_length))
            .map(|limit| self.settings.counter(limit))
    }

    /// Evaluate every counter once, truncating values over their limit
    fn refresh_counters(&mut self) {
        for name in self.definition.all_field_names() {
            let Some(counter) = self.counter_for(&name) else {
                continue;
            };
            let reading = counter.evaluate(self.values.get(&name));
            if let Some(truncated) = &reading.truncated {
                self.values.set(name.as_str(), truncated.as_str());
            }
            self.counters.insert(name, reading);
        }
    }

    /// Values of every field not inside a hidden entry
    fn visible_values(&self) -> BTreeMap<String, String> {
        self.definition
            .all_field_names()
            .into_iter()
            .filter(|name| !self.repeaters.is_hidden_entry_field(name))
            .map(|name| {
                let value = self.values.get(&name).to_string();
                (name, value)
            })
            .collect()
    }
}
