//! Keybinding system for context-aware keyboard shortcuts
//!
//! Provides a registry of keybindings that change based on the current
//! application mode. Plain character keys are never bound while editing, so
//! they always reach the focused field.

use crate::app::AppMode;
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NextField,
    PreviousField,
    NextOption,
    PreviousOption,
    NextStep,
    PreviousStep,
    AddEntry,
    RemoveEntry,
    Submit,
    Newline,
    Confirm,
    Cancel,
    Toggle,
    Dismiss,
    Help,
    Quit,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn ctrl(c: char, action: KeyAction, description: &str) -> Self {
        Self::with_modifiers(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
            action,
            &format!("Ctrl+{}", c.to_ascii_uppercase()),
            description,
        )
    }

    /// Whether a key event triggers this binding. Shift is ignored so that
    /// BackTab and shifted characters match regardless of terminal quirks.
    pub fn matches(&self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.key == key && modifiers.difference(KeyModifiers::SHIFT) == self.modifiers
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    /// Mode-specific keybindings
    mode_bindings: HashMap<AppMode, Vec<Keybinding>>,
    /// Global keybindings (available in all modes)
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            mode_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    /// Register default keybindings for all modes
    fn register_defaults(&mut self) {
        self.global_bindings = vec![
            Keybinding::new(KeyCode::F(1), KeyAction::Help, "F1", "Help"),
            Keybinding::ctrl('q', KeyAction::Quit, "Quit"),
        ];

        self.mode_bindings.insert(
            AppMode::Editing,
            vec![
                Keybinding::new(KeyCode::Tab, KeyAction::NextField, "Tab", "Next field"),
                Keybinding::new(KeyCode::Down, KeyAction::NextField, "Down", "Next field"),
                Keybinding::new(KeyCode::BackTab, KeyAction::PreviousField, "S-Tab", "Previous field"),
                Keybinding::new(KeyCode::Up, KeyAction::PreviousField, "Up", "Previous field"),
                Keybinding::new(KeyCode::Right, KeyAction::NextOption, "Right", "Next option"),
                Keybinding::new(KeyCode::Left, KeyAction::PreviousOption, "Left", "Previous option"),
                Keybinding::new(KeyCode::PageDown, KeyAction::NextStep, "PgDn", "Next section"),
                Keybinding::ctrl('n', KeyAction::NextStep, "Next section"),
                Keybinding::new(KeyCode::PageUp, KeyAction::PreviousStep, "PgUp", "Previous section"),
                Keybinding::ctrl('p', KeyAction::PreviousStep, "Previous section"),
                Keybinding::ctrl('a', KeyAction::AddEntry, "Add entry"),
                Keybinding::ctrl('d', KeyAction::RemoveEntry, "Remove entry"),
                Keybinding::ctrl('s', KeyAction::Submit, "Submit"),
                Keybinding::new(KeyCode::Enter, KeyAction::Newline, "Enter", "New line / next field"),
            ],
        );

        self.mode_bindings.insert(
            AppMode::Notice,
            vec![
                Keybinding::new(KeyCode::Enter, KeyAction::Dismiss, "Enter", "Close"),
                Keybinding::new(KeyCode::Esc, KeyAction::Dismiss, "Esc", "Close"),
            ],
        );

        self.mode_bindings.insert(
            AppMode::ConfirmRemoval,
            vec![
                Keybinding::new(KeyCode::Left, KeyAction::Toggle, "Left", "Select No"),
                Keybinding::new(KeyCode::Right, KeyAction::Toggle, "Right", "Select Yes"),
                Keybinding::new(KeyCode::Tab, KeyAction::Toggle, "Tab", "Toggle selection"),
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Confirm"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Keep entry"),
            ],
        );

        self.mode_bindings.insert(
            AppMode::Submitted,
            vec![
                Keybinding::new(KeyCode::Enter, KeyAction::Quit, "Enter", "Exit"),
                Keybinding::new(KeyCode::Esc, KeyAction::Quit, "Esc", "Exit"),
            ],
        );
    }

    /// Get keybindings for a specific mode (includes global bindings)
    pub fn get_bindings(&self, mode: &AppMode) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();

        if let Some(mode_bindings) = self.mode_bindings.get(mode) {
            bindings.extend(mode_bindings.iter());
        }
        bindings.extend(self.global_bindings.iter());

        bindings
    }

    /// Action bound to a key in a mode, if any
    pub fn action_for(
        &self,
        mode: &AppMode,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Option<KeyAction> {
        self.get_bindings(mode)
            .into_iter()
            .find(|b| b.matches(key, modifiers))
            .map(|b| b.action)
    }

    /// Get navigation bar items for display
    pub fn get_nav_items(&self, mode: &AppMode) -> Vec<NavBarItem> {
        let bindings = self.get_bindings(mode);

        let priority_actions = match mode {
            AppMode::Editing => vec![
                KeyAction::NextField,
                KeyAction::NextStep,
                KeyAction::PreviousStep,
                KeyAction::AddEntry,
                KeyAction::RemoveEntry,
                KeyAction::Submit,
                KeyAction::Help,
            ],
            AppMode::Notice => vec![KeyAction::Dismiss],
            AppMode::ConfirmRemoval => vec![KeyAction::Toggle, KeyAction::Confirm, KeyAction::Cancel],
            AppMode::Submitted => vec![KeyAction::Quit],
        };

        let mut items: Vec<NavBarItem> = Vec::new();
        for action in priority_actions {
            // Combine Tab/Up/Down into a single item for cleaner display
            if action == KeyAction::NextField {
                items.push(NavBarItem {
                    key_display: "Tab/Up/Dn".to_string(),
                    action_label: "Move".to_string(),
                });
                continue;
            }
            if let Some(binding) = bindings.iter().find(|b| b.action == action) {
                items.push(NavBarItem {
                    key_display: binding.display.clone(),
                    action_label: binding.description.clone(),
                });
            }
        }

        items
    }

    /// Get full help content for a mode (for help overlay)
    pub fn get_help_content(&self, mode: &AppMode) -> Vec<HelpSection> {
        let groups: [(&str, &[KeyAction]); 4] = [
            (
                "Fields",
                &[
                    KeyAction::NextField,
                    KeyAction::PreviousField,
                    KeyAction::NextOption,
                    KeyAction::PreviousOption,
                    KeyAction::Newline,
                ],
            ),
            (
                "Sections",
                &[
                    KeyAction::NextStep,
                    KeyAction::PreviousStep,
                    KeyAction::AddEntry,
                    KeyAction::RemoveEntry,
                    KeyAction::Submit,
                ],
            ),
            (
                "Dialogs",
                &[
                    KeyAction::Toggle,
                    KeyAction::Confirm,
                    KeyAction::Cancel,
                    KeyAction::Dismiss,
                ],
            ),
            ("General", &[KeyAction::Help, KeyAction::Quit]),
        ];

        let bindings = self.get_bindings(mode);
        groups
            .iter()
            .filter_map(|(title, actions)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| actions.contains(&b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: title.to_string(),
                    items,
                })
            })
            .collect()
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_characters_are_unbound_while_editing() {
        let ctx = KeybindingContext::new();
        for c in ['a', 'q', 'n', '?', ' ', 'B'] {
            assert_eq!(
                ctx.action_for(&AppMode::Editing, KeyCode::Char(c), KeyModifiers::NONE),
                None
            );
        }
    }

    #[test]
    fn test_control_shortcuts() {
        let ctx = KeybindingContext::new();
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::Char('s'), KeyModifiers::CONTROL),
            Some(KeyAction::Submit)
        );
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::PageDown, KeyModifiers::NONE),
            Some(KeyAction::NextStep)
        );
        assert_eq!(
            ctx.action_for(&AppMode::Notice, KeyCode::Char('q'), KeyModifiers::CONTROL),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn test_escape_does_not_quit_while_editing() {
        let ctx = KeybindingContext::new();
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::Esc, KeyModifiers::NONE),
            None
        );
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::Char('q'), KeyModifiers::CONTROL),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn test_back_tab_matches_with_shift() {
        let ctx = KeybindingContext::new();
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::BackTab, KeyModifiers::SHIFT),
            Some(KeyAction::PreviousField)
        );
    }

    #[test]
    fn test_mode_specific_bindings() {
        let ctx = KeybindingContext::new();
        assert_eq!(
            ctx.action_for(&AppMode::ConfirmRemoval, KeyCode::Tab, KeyModifiers::NONE),
            Some(KeyAction::Toggle)
        );
        assert_eq!(
            ctx.action_for(&AppMode::Editing, KeyCode::Tab, KeyModifiers::NONE),
            Some(KeyAction::NextField)
        );
    }

    #[test]
    fn test_help_content_groups() {
        let ctx = KeybindingContext::new();
        let sections = ctx.get_help_content(&AppMode::Editing);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Fields", "Sections", "General"]);
    }

    #[test]
    fn test_nav_items_for_editing() {
        let ctx = KeybindingContext::new();
        let items = ctx.get_nav_items(&AppMode::Editing);
        assert_eq!(items[0].action_label, "Move");
        assert!(items.iter().any(|i| i.key_display == "Ctrl+S"));
    }
}
