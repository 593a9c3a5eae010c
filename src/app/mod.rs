//! Application module
//!
//! Contains the event loop, key handling and the glue between the terminal
//! and the form session.
//!
//! # Module Structure
//! - `state` - Application state types (AppState, AppMode, ConfirmState)
//! - Main module - App struct and event loop

mod state;

pub use state::{AppMode, AppState, ConfirmState};

use crate::components::keybindings::{KeyAction, KeybindingContext};
use crate::session::{Command, FormSession};
use crate::sink::SubmissionSink;
use crate::types::FieldKind;
use crate::ui::UiRenderer;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info};
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;

/// Main application struct
pub struct App {
    state: AppState,
    ui_renderer: UiRenderer,
    /// Keybinding context for key dispatch and navigation hints
    keybinding_context: KeybindingContext,
    /// Receives accepted submissions
    sink: Box<dyn SubmissionSink>,
}

impl App {
    /// Create a new application instance
    pub fn new(session: FormSession, sink: Box<dyn SubmissionSink>) -> Self {
        info!("Creating new App instance");
        let mut state = AppState::new(session);
        let start = state.session.start();
        state.apply_effects(start);

        Self {
            state,
            ui_renderer: UiRenderer::new(),
            keybinding_context: KeybindingContext::new(),
            sink,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Toggle help overlay visibility
    pub fn toggle_help(&mut self) {
        self.state.help_visible = !self.state.help_visible;
    }

    /// Run the main application loop
    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        info!("Starting main application loop");

        loop {
            terminal.draw(|f| {
                self.ui_renderer
                    .render(f, &self.state, &self.keybinding_context);
            })?;

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key_event) = crossterm::event::read()? {
                    if key_event.kind == KeyEventKind::Press && self.handle_key_event(key_event)? {
                        break; // Exit requested
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle keyboard input events. Returns true when the app should exit.
    pub fn handle_key_event(
        &mut self,
        key_event: KeyEvent,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        // Help overlay swallows everything except its own toggles
        if self.state.help_visible {
            if matches!(key_event.code, KeyCode::F(1) | KeyCode::Esc) {
                self.toggle_help();
            }
            return Ok(false);
        }

        let mode = self.state.mode.clone();
        let action =
            self.keybinding_context
                .action_for(&mode, key_event.code, key_event.modifiers);

        match (mode, action) {
            (_, Some(KeyAction::Help)) => self.toggle_help(),
            (_, Some(KeyAction::Quit)) => {
                info!("Exit requested");
                return Ok(true);
            }
            (AppMode::Notice, Some(KeyAction::Dismiss)) => self.state.dismiss_notice(),
            (AppMode::ConfirmRemoval, Some(KeyAction::Toggle)) => {
                if let Some(confirm) = self.state.confirm.as_mut() {
                    confirm.yes_selected = !confirm.yes_selected;
                }
            }
            (AppMode::ConfirmRemoval, Some(KeyAction::Confirm)) => {
                let accept = self
                    .state
                    .confirm
                    .as_ref()
                    .is_some_and(|c| c.yes_selected);
                self.state.close_confirm();
                self.dispatch(Command::ResolveRemoval { accept })?;
            }
            (AppMode::ConfirmRemoval, Some(KeyAction::Cancel)) => {
                self.state.close_confirm();
                self.dispatch(Command::ResolveRemoval { accept: false })?;
            }
            (AppMode::Editing, Some(action)) => self.handle_editing_action(action)?,
            (AppMode::Editing, None) => self.handle_typing(key_event)?,
            _ => {}
        }

        Ok(false)
    }

    fn handle_editing_action(&mut self, action: KeyAction) -> Result<(), Box<dyn std::error::Error>> {
        match action {
            KeyAction::NextField => {
                self.leave_field()?;
                self.state.focus_next();
            }
            KeyAction::PreviousField => {
                self.leave_field()?;
                self.state.focus_previous();
            }
            KeyAction::NextOption => self.cycle_option(1)?,
            KeyAction::PreviousOption => self.cycle_option(-1)?,
            KeyAction::NextStep => {
                self.leave_field()?;
                self.dispatch(Command::Next)?;
            }
            KeyAction::PreviousStep => {
                self.leave_field()?;
                self.dispatch(Command::Previous)?;
            }
            KeyAction::AddEntry => self.add_entry()?,
            KeyAction::RemoveEntry => match self.state.focused_entry() {
                Some((group, position)) => {
                    self.dispatch(Command::RemoveEntry { group, position })?;
                }
                None => {
                    self.state.status_message = "Move to an entry to remove it".to_string();
                }
            },
            KeyAction::Submit => {
                self.leave_field()?;
                self.dispatch(Command::Submit)?;
            }
            KeyAction::Newline => {
                if self.focused_kind() == Some(FieldKind::Multiline) {
                    self.type_text(|value| value.push('\n'))?;
                } else {
                    self.leave_field()?;
                    self.state.focus_next();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Printable characters and Backspace edit the focused field
    fn handle_typing(&mut self, key_event: KeyEvent) -> Result<(), Box<dyn std::error::Error>> {
        let ctrl = key_event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key_event.code {
            KeyCode::Char(c) if !ctrl && self.focused_kind() != Some(FieldKind::Select) => {
                self.type_text(|value| value.push(c))
            }
            KeyCode::Backspace => self.type_text(|value| {
                value.pop();
            }),
            _ => Ok(()),
        }
    }

    fn focused_kind(&self) -> Option<FieldKind> {
        let field = self.state.focused_field()?;
        self.state
            .session
            .definition()
            .resolve_field(&field)
            .map(|spec| spec.kind)
    }

    fn type_text(
        &mut self,
        edit: impl FnOnce(&mut String),
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(field) = self.state.focused_field() else {
            return Ok(());
        };
        let mut value = self.state.session.value(&field).to_string();
        edit(&mut value);
        self.dispatch(Command::Edit { field, value })
    }

    /// Step through a select field's options; an empty value counts as
    /// "before the first option"
    fn cycle_option(&mut self, delta: isize) -> Result<(), Box<dyn std::error::Error>> {
        let Some(field) = self.state.focused_field() else {
            return Ok(());
        };
        let options = match self.state.session.definition().resolve_field(&field) {
            Some(spec) if spec.kind == FieldKind::Select && !spec.options.is_empty() => {
                spec.options.clone()
            }
            _ => return Ok(()),
        };

        let len = options.len() as isize;
        let current = options
            .iter()
            .position(|o| o == self.state.session.value(&field))
            .map(|i| i as isize);
        let next = match current {
            Some(i) => (i + delta).rem_euclid(len),
            None if delta > 0 => 0,
            None => len - 1,
        };
        let value = options[next as usize].clone();
        self.dispatch(Command::Edit { field, value })
    }

    fn add_entry(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let current = self.state.session.wizard().current();
        let group = self
            .state
            .session
            .definition()
            .section(current)
            .and_then(|s| s.repeater);
        match group {
            Some(group) => self.dispatch(Command::AddEntry(group)),
            None => {
                self.state.status_message = "This section has no repeatable entries".to_string();
                Ok(())
            }
        }
    }

    /// Dispatch `Blur` when the cursor leaves the phone field
    fn leave_field(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        match self.state.focused_field() {
            Some(field) if field == self.state.session.definition().phone_field => {
                self.dispatch(Command::Blur { field })
            }
            _ => Ok(()),
        }
    }

    /// Apply a command to the session and render its effects
    fn dispatch(&mut self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        let transition = self.state.session.apply(command)?;
        debug!("Transition produced {} effects", transition.effects.len());
        self.state.session = transition.session;

        if let Some(submission) = self.state.apply_effects(transition.effects) {
            match self.sink.deliver(&submission) {
                Ok(()) => {
                    self.state.status_message =
                        format!("Submitted {} values", submission.values.len());
                }
                Err(e) => {
                    error!("Failed to deliver submission: {}", e);
                    self.state.session = self.state.session.delivery_failed();
                    self.state.status_message = format!("Submission failed: {}", e);
                    self.state
                        .notices
                        .push_back(crate::effect::Notice::new(e.to_string()));
                    self.state.mode = AppMode::Notice;
                }
            }
        }
        Ok(())
    }
}
