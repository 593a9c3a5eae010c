//! Header and common widget rendering
//!
//! Form title, step markers, the progress gauge, the status bar and the
//! navigation bar of key hints.

use crate::app::AppMode;
use crate::components::keybindings::KeybindingContext;
use crate::session::FormSession;
use crate::theme::{Colors, Styles, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Header renderer: title, step markers and progress gauge
#[derive(Debug, Default)]
pub struct HeaderRenderer;

impl HeaderRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the header for the session's current step
    pub fn render(&self, f: &mut Frame, area: Rect, session: &FormSession) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(2), // Step markers
                Constraint::Length(3), // Gauge
            ])
            .split(area);

        let title = Paragraph::new(session.definition().title.as_str())
            .alignment(Alignment::Center)
            .style(Styles::title());
        f.render_widget(title, chunks[0]);

        f.render_widget(
            Paragraph::new(Self::step_markers(session)).alignment(Alignment::Center),
            chunks[1],
        );

        render_progress_bar(f, chunks[2], session);
    }

    /// One marker per section: `✓` completed, `●` active, `○` pending
    fn step_markers(session: &FormSession) -> Line<'static> {
        let wizard = session.wizard();
        let progress = wizard.progress();
        let active = wizard.active_section();

        let mut spans = Vec::new();
        for (index, section) in session.definition().sections.iter().enumerate() {
            let completed = progress.completed.get(index).copied().unwrap_or(false);
            let is_active = active == Some(index);
            let symbol = if is_active {
                "●"
            } else if completed {
                "✓"
            } else {
                "○"
            };
            if index > 0 {
                spans.push(Span::styled(" ─ ", Styles::text_muted()));
            }
            spans.push(Span::styled(
                format!("{} {}", symbol, section.title),
                Theme::step_style(completed, is_active),
            ));
        }
        Line::from(spans)
    }
}

/// Render the progress gauge
pub fn render_progress_bar(f: &mut Frame, area: Rect, session: &FormSession) {
    let wizard = session.wizard();
    let progress = wizard.progress();
    let label = match wizard.active_section() {
        Some(index) => format!(
            "Step {} of {} ({:.0}%)",
            index + 1,
            wizard.total(),
            progress.percent
        ),
        None => format!("No section shown ({:.0}%)", progress.percent),
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Styles::progress())
        .ratio(progress.ratio())
        .label(label);
    f.render_widget(gauge, area);
}

/// Render the status message
pub fn render_status_bar(f: &mut Frame, area: Rect, message: &str) {
    let status = Paragraph::new(message.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_inactive()),
        )
        .style(Style::default().fg(Colors::FG_SECONDARY));
    f.render_widget(status, area);
}

/// Render the navigation bar
pub fn render_nav_bar(f: &mut Frame, area: Rect, mode: &AppMode, keybinding_ctx: &KeybindingContext) {
    let mut spans = Vec::new();
    for (i, item) in keybinding_ctx.get_nav_items(mode).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Styles::nav_hint()));
        }
        spans.push(Span::styled(item.key_display, Styles::focused()));
        spans.push(Span::styled(format!(" {}", item.action_label), Styles::nav_hint()));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
