//! Dialog rendering module
//!
//! Blocking notices, the entry removal confirmation and the submission
//! summary. Every dialog clears the area beneath it before drawing.

use super::centered_rect;
use crate::app::ConfirmState;
use crate::theme::{Colors, Styles, UiConstants, UiText};
use ratatui::{
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the front notice. `queued` counts it and any behind it.
pub fn render_notice(f: &mut Frame, message: &str, queued: usize) {
    let area = centered_rect(
        UiConstants::DIALOG_WIDTH_PCT,
        UiConstants::DIALOG_HEIGHT,
        f.area(),
    );
    f.render_widget(Clear, area);

    let title = if queued > 1 {
        format!(" Notice (1 of {}) ", queued)
    } else {
        " Notice ".to_string()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Styles::text())),
        Line::from(""),
        Line::from(Span::styled(UiText::PRESS_ENTER, Styles::text_muted())),
    ];
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Colors::WARNING))
                .style(Styles::panel_bg()),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(dialog, area);
}

/// Render the removal confirmation with its two buttons
pub fn render_confirm_removal(f: &mut Frame, confirm: &ConfirmState) {
    let area = centered_rect(
        UiConstants::DIALOG_WIDTH_PCT,
        UiConstants::DIALOG_HEIGHT,
        f.area(),
    );
    f.render_widget(Clear, area);

    let (keep_style, remove_style) = if confirm.yes_selected {
        (Styles::button_inactive(), Styles::button_danger())
    } else {
        (Styles::button_confirm(), Styles::button_inactive())
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(confirm.prompt.clone(), Styles::text())),
        Line::from(Span::styled(
            format!("{} #{}", confirm.group.heading(), confirm.position),
            Styles::text_muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(UiText::BTN_KEEP, keep_style),
            Span::raw("    "),
            Span::styled(UiText::BTN_REMOVE, remove_style),
        ]),
    ];
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Remove entry ")
                .border_style(Style::default().fg(Colors::ERROR))
                .style(Styles::panel_bg_danger()),
        )
        .alignment(Alignment::Center);
    f.render_widget(dialog, area);
}

/// Render the submission summary shown after a successful submit
pub fn render_submitted(f: &mut Frame, status: &str) {
    let area = centered_rect(
        UiConstants::DIALOG_WIDTH_PCT,
        UiConstants::DIALOG_HEIGHT,
        f.area(),
    );
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(UiText::SUBMITTED, Styles::success())),
        Line::from(Span::styled(status.to_string(), Styles::text())),
        Line::from(""),
        Line::from(Span::styled("Press Enter to exit", Styles::text_muted())),
    ];
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Done ")
                .border_style(Styles::border_active())
                .style(Styles::panel_bg()),
        )
        .alignment(Alignment::Center);
    f.render_widget(dialog, area);
}
