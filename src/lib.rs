//! stepform library
//!
//! A multi-step form engine: wizard navigation with per-step validation,
//! character counters, and repeatable entry groups, plus a terminal front
//! end built on it.
//!
//! The engine is pure. [`session::FormSession`] takes a [`session::Command`]
//! and returns the next session with a list of [`effect::Effect`]s to render.

pub mod app;
pub mod cli;
pub mod components;
pub mod counter;
pub mod effect;
pub mod error;
pub mod form;
pub mod repeater;
pub mod session;
pub mod settings;
pub mod sink;
pub mod theme;
pub mod types;
pub mod ui;
pub mod validation;
pub mod wizard;

// Re-export main types for convenience
pub use counter::{CharCounter, CounterReading};
pub use effect::{Effect, Notice};
pub use error::FormError;
pub use form::{FieldSpec, FormDefinition, FormValues, RepeaterSpec, SectionSpec};
pub use repeater::{PendingRemoval, RepeaterError, RepeaterState, Repeaters};
pub use session::{Command, FormSession, Transition};
pub use settings::Settings;
pub use sink::{JsonFileSink, Submission, SubmissionSink};
pub use types::{
    CounterLevel, FieldKind, NavigationBounds, PhonePolicy, PhoneRequirement, RepeatGroup,
};
pub use validation::{FieldIssue, FieldMarks, IssueKind, StepReport, is_valid_phone};
pub use wizard::{Progress, WizardState};
