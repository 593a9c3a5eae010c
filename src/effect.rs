//! Render instructions produced by session transitions.
//!
//! Transitions never touch a screen. They return a list of effects which a
//! rendering adapter (the terminal UI, a test, a headless checker) consumes.

use crate::counter::CounterReading;
use crate::sink::Submission;
use crate::types::RepeatGroup;
use crate::wizard::Progress;

/// Blocking notification the user must acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Make exactly this section visible; `None` hides every section
    ShowSection { index: Option<usize> },
    ScrollToTop,
    Progress(Progress),
    /// Show a field as invalid with an inline message
    MarkField { field: String, message: String },
    /// Remove a field's invalid mark and message
    ClearField { field: String },
    /// Bring a field into view, centered
    ScrollIntoView { field: String },
    /// The engine rewrote a field's value (truncation, clearing)
    SetValue { field: String, value: String },
    Counter { field: String, reading: CounterReading },
    RevealEntry { group: RepeatGroup, position: u8 },
    HideEntry { group: RepeatGroup, position: u8 },
    /// Ask the user to confirm removing an entry
    ConfirmRemoval {
        group: RepeatGroup,
        position: u8,
        prompt: String,
    },
    Notify(Notice),
    /// Hand the collected values to the submission collaborator
    Submit(Submission),
}

impl Effect {
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify(Notice::new(message))
    }

    /// Message of a `Notify` effect
    pub fn notice_message(&self) -> Option<&str> {
        match self {
            Self::Notify(notice) => Some(&notice.message),
            _ => None,
        }
    }
}
