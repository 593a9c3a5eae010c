//! Application state definitions
//!
//! `AppState` wraps the form session with everything only the terminal front
//! end cares about: which field holds the cursor, queued notices, the removal
//! dialog and the help overlay. Session effects are folded in here so the
//! event loop stays thin.

use std::collections::VecDeque;

use log::debug;

use crate::effect::{Effect, Notice};
use crate::form::parse_entry_field_name;
use crate::session::FormSession;
use crate::sink::Submission;
use crate::types::RepeatGroup;

/// Removal confirmation dialog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmState {
    pub group: RepeatGroup,
    pub position: u8,
    pub prompt: String,
    /// false = No/Keep (left), true = Yes/Remove (right)
    pub yes_selected: bool,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current application mode
    pub mode: AppMode,
    pub session: FormSession,
    /// Index into the current step's fields
    pub focus: usize,
    /// Blocking notices, shown one at a time
    pub notices: VecDeque<Notice>,
    pub confirm: Option<ConfirmState>,
    /// Status message for user feedback
    pub status_message: String,
    /// Whether help overlay is visible
    pub help_visible: bool,
}

/// Application operating modes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Typing into the focused field
    Editing,
    /// A blocking notice is shown
    Notice,
    /// Waiting for the user to confirm an entry removal
    ConfirmRemoval,
    /// The form was accepted
    Submitted,
}

impl AppState {
    pub fn new(session: FormSession) -> Self {
        Self {
            mode: AppMode::Editing,
            session,
            focus: 0,
            notices: VecDeque::new(),
            confirm: None,
            status_message: "Fill in the form. Press F1 for help.".to_string(),
            help_visible: false,
        }
    }

    /// Fields of the current step, in display order
    pub fn fields(&self) -> Vec<String> {
        self.session.current_fields()
    }

    /// Name of the focused field
    pub fn focused_field(&self) -> Option<String> {
        self.fields().into_iter().nth(self.focus)
    }

    /// Entry the focused field belongs to
    pub fn focused_entry(&self) -> Option<(RepeatGroup, u8)> {
        let field = self.focused_field()?;
        parse_entry_field_name(&field).map(|(group, position, _)| (group, position))
    }

    pub fn focus_next(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_previous(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    fn focus_field(&mut self, field: &str) {
        if let Some(index) = self.fields().iter().position(|f| f == field) {
            self.focus = index;
        }
    }

    fn clamp_focus(&mut self) {
        let count = self.fields().len();
        self.focus = self.focus.min(count.saturating_sub(1));
    }

    /// Close the front notice, returning to the mode underneath
    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
        if self.notices.is_empty() {
            self.mode = self.resting_mode();
        }
    }

    /// Close the removal dialog
    pub fn close_confirm(&mut self) {
        self.confirm = None;
        self.mode = self.resting_mode();
    }

    fn resting_mode(&self) -> AppMode {
        if !self.notices.is_empty() {
            AppMode::Notice
        } else if self.confirm.is_some() {
            AppMode::ConfirmRemoval
        } else if self.session.is_submitted() {
            AppMode::Submitted
        } else {
            AppMode::Editing
        }
    }

    /// Fold session effects into the screen state. Returns the submission,
    /// if one was accepted, for the caller to deliver.
    pub fn apply_effects(&mut self, effects: Vec<Effect>) -> Option<Submission> {
        let mut submission = None;

        for effect in effects {
            match effect {
                Effect::ShowSection { index } => {
                    debug!("Showing section {:?}", index);
                    self.focus = 0;
                }
                Effect::ScrollToTop => self.focus = 0,
                Effect::ScrollIntoView { field } => self.focus_field(&field),
                Effect::RevealEntry { group, position } => {
                    self.status_message = format!("Added {} entry {}", group, position);
                    let first = self
                        .session
                        .definition()
                        .entry_field_names(group, position)
                        .into_iter()
                        .next();
                    if let Some(field) = first {
                        self.focus_field(&field);
                    }
                }
                Effect::HideEntry { group, position } => {
                    self.status_message = format!("Removed {} entry {}", group, position);
                    self.clamp_focus();
                }
                Effect::ConfirmRemoval {
                    group,
                    position,
                    prompt,
                } => {
                    self.confirm = Some(ConfirmState {
                        group,
                        position,
                        prompt,
                        yes_selected: false,
                    });
                }
                Effect::Notify(notice) => self.notices.push_back(notice),
                Effect::Submit(accepted) => submission = Some(accepted),
                // Marks, values, counters and progress are read straight
                // from the session when drawing
                Effect::Progress(_)
                | Effect::MarkField { .. }
                | Effect::ClearField { .. }
                | Effect::SetValue { .. }
                | Effect::Counter { .. } => {}
            }
        }

        self.mode = self.resting_mode();
        submission
    }
}
