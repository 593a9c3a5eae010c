//! Centralized theme and styling for the form screen
//!
//! Single source of truth for the colors, styles and layout constants used by
//! the terminal front end.
//!
//! # Usage
//! ```rust
//! use stepform::theme::{Colors, Styles, Theme};
//! use stepform::types::CounterLevel;
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let counter_style = Theme::counter_style(CounterLevel::Warning);
//! ```

use ratatui::style::{Color, Modifier, Style};

use crate::types::CounterLevel;

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors
    // -------------------------------------------------------------------------

    /// Dialog background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Removal confirmation background
    pub const BG_DANGER: Color = Color::Rgb(30, 20, 20);

    /// Gauge background
    pub const BG_GAUGE: Color = Color::Rgb(40, 40, 50);

    pub const FG_PRIMARY: Color = Color::White;
    pub const FG_SECONDARY: Color = Color::Gray;
    pub const FG_MUTED: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Borders, titles, focused field
    pub const PRIMARY: Color = Color::Cyan;

    /// Emphasis, required markers
    pub const SECONDARY: Color = Color::Yellow;

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // -------------------------------------------------------------------------
    // UI Element Colors
    // -------------------------------------------------------------------------

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    /// Selected button text (for contrast on light bg)
    pub const SELECTED_FG: Color = Color::Black;

    pub const HEADER: Color = Color::Cyan;

    /// Progress bar fill
    pub const PROGRESS: Color = Color::Green;

    pub const NAV_HINT: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Step markers
    // -------------------------------------------------------------------------

    pub const STEP_ACTIVE: Color = Color::Yellow;
    pub const STEP_COMPLETE: Color = Color::Green;
    pub const STEP_PENDING: Color = Color::Gray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Section and entry headings
    pub fn header() -> Style {
        Style::default()
            .fg(Colors::HEADER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    pub fn panel_bg_danger() -> Style {
        Style::default().bg(Colors::BG_DANGER)
    }

    /// Label of the field holding the cursor
    pub fn focused() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Required field marker
    pub fn required() -> Style {
        Style::default().fg(Colors::SECONDARY)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    /// Inline error message under an invalid field
    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    /// Confirm/Yes button (selected)
    pub fn button_confirm() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    /// Danger button (selected)
    pub fn button_danger() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .bg(Colors::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_inactive() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn progress() -> Style {
        Style::default()
            .fg(Colors::PROGRESS)
            .bg(Colors::BG_GAUGE)
    }

    /// Navigation hint (keybindings)
    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Style of a character counter label
    pub fn counter_style(level: CounterLevel) -> Style {
        match level {
            CounterLevel::Normal => Style::default().fg(Colors::FG_MUTED),
            CounterLevel::Warning => Style::default().fg(Colors::WARNING),
            CounterLevel::LimitReached => Style::default()
                .fg(Colors::ERROR)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Style of a step marker in the progress row
    pub fn step_style(completed: bool, active: bool) -> Style {
        if active {
            Style::default()
                .fg(Colors::STEP_ACTIVE)
                .add_modifier(Modifier::BOLD)
        } else if completed {
            Style::default().fg(Colors::STEP_COMPLETE)
        } else {
            Style::default().fg(Colors::STEP_PENDING)
        }
    }
}

// =============================================================================
// UI CONSTANTS
// =============================================================================

/// Layout constants
pub struct UiConstants;

impl UiConstants {
    pub const DIALOG_WIDTH_PCT: u16 = 60;
    pub const DIALOG_MAX_WIDTH: u16 = 80;
    pub const DIALOG_MIN_WIDTH: u16 = 40;
    pub const DIALOG_HEIGHT: u16 = 9;

    pub const NAV_BAR_HEIGHT: u16 = 1;

    /// Title + step markers + gauge
    pub const HEADER_HEIGHT: u16 = 6;

    pub const STATUS_BAR_HEIGHT: u16 = 3;
}

// =============================================================================
// TEXT CONSTANTS
// =============================================================================

/// Common UI text strings
pub struct UiText;

impl UiText {
    pub const BTN_REMOVE: &'static str = "[ Yes / Remove ]";
    pub const BTN_KEEP: &'static str = "[ No / Keep ]";
    pub const PRESS_ENTER: &'static str = "Press Enter to continue";
    pub const SUBMITTED: &'static str = "Form submitted";
}
