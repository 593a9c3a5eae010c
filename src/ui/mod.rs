//! User interface rendering module
//!
//! This module is organized into submodules:
//! - `header` - Title, step markers, progress gauge, status and nav bars
//! - `section` - The active section with its fields and entries
//! - `dialogs` - Notice and removal confirmation dialogs

mod dialogs;
mod header;
mod section;

use crate::app::{AppMode, AppState};
use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::KeybindingContext;
use crate::theme::UiConstants;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

pub use header::HeaderRenderer;

/// UI renderer for the application
///
/// Main entry point for UI rendering. Delegates to the submodules for the
/// different parts of the screen.
pub struct UiRenderer {
    header: HeaderRenderer,
}

impl Default for UiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRenderer {
    pub fn new() -> Self {
        Self {
            header: HeaderRenderer::new(),
        }
    }

    /// Render the complete UI
    pub fn render(&self, f: &mut Frame, state: &AppState, keybinding_ctx: &KeybindingContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(UiConstants::HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(UiConstants::STATUS_BAR_HEIGHT),
                Constraint::Length(UiConstants::NAV_BAR_HEIGHT),
            ])
            .split(f.area());

        self.header.render(f, chunks[0], &state.session);
        section::render_section(f, chunks[1], state);
        header::render_status_bar(f, chunks[2], &state.status_message);
        header::render_nav_bar(f, chunks[3], &state.mode, keybinding_ctx);

        match state.mode {
            AppMode::Notice => {
                if let Some(notice) = state.notices.front() {
                    dialogs::render_notice(f, &notice.message, state.notices.len());
                }
            }
            AppMode::ConfirmRemoval => {
                if let Some(ref confirm) = state.confirm {
                    dialogs::render_confirm_removal(f, confirm);
                }
            }
            AppMode::Submitted => dialogs::render_submitted(f, &state.status_message),
            AppMode::Editing => {}
        }

        // Help goes on top of everything
        if state.help_visible {
            HelpOverlay::new(&state.mode, keybinding_ctx).render(f, f.area());
        }
    }
}

/// Rect of `height` rows and `percent_x` of the width, centered in `area`
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let min_width = UiConstants::DIALOG_MIN_WIDTH.min(area.width);
    let max_width = UiConstants::DIALOG_MAX_WIDTH.min(area.width).max(min_width);
    let scaled = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let width = scaled.clamp(min_width, max_width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}
