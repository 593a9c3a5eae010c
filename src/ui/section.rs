//! Active section rendering
//!
//! Lists the section's own fields followed by every visible entry of its
//! repeatable group. Invalid fields carry their inline message, counted
//! fields their counter label. The view scrolls so the focused field sits in
//! the middle.

use crate::app::AppState;
use crate::form::{FieldSpec, parse_entry_field_name};
use crate::theme::{Styles, Theme};
use crate::types::FieldKind;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the current step
pub fn render_section(f: &mut Frame, area: Rect, state: &AppState) {
    let session = &state.session;
    let current = session.wizard().current();

    let Some(section) = session.definition().section(current) else {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No section is shown.", Styles::warning())),
            Line::from(Span::styled(
                "Use PgUp / PgDn to return to the form.",
                Styles::text_muted(),
            )),
        ])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(message, area);
        return;
    };

    let (lines, focus_line) = section_lines(state, &section.description);
    let visible = area.height.saturating_sub(2);
    let scroll = (focus_line as u16).saturating_sub(visible / 2);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(Span::styled(format!(" {} ", section.title), Styles::header())),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

/// Lines of the section body and the index of the focused field's line
fn section_lines(state: &AppState, description: &str) -> (Vec<Line<'static>>, usize) {
    let session = &state.session;
    let definition = session.definition();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut focus_line = 0;

    if !description.is_empty() {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Styles::text_secondary(),
        )));
        lines.push(Line::from(""));
    }

    let mut current_entry = None;
    for (index, name) in state.fields().iter().enumerate() {
        let Some(spec) = definition.resolve_field(name) else {
            continue;
        };

        if let Some((group, position, _)) = parse_entry_field_name(name) {
            if current_entry != Some((group, position)) {
                current_entry = Some((group, position));
                let removable = if position > 1 { "  (Ctrl+D to remove)" } else { "" };
                lines.push(Line::from(vec![
                    Span::styled(format!("{} #{}", group.heading(), position), Styles::header()),
                    Span::styled(removable, Styles::text_muted()),
                ]));
            }
        }

        let focused = index == state.focus;
        if focused {
            focus_line = lines.len();
        }
        lines.push(field_line(spec, session.value(name), focused));

        // Multiline values continue below the label
        if spec.kind == FieldKind::Multiline {
            for extra in session.value(name).split('\n').skip(1) {
                lines.push(Line::from(format!("      {}", extra)));
            }
        }

        if let Some(message) = session.marks().message(name) {
            lines.push(Line::from(Span::styled(
                format!("      {}", message),
                Styles::error(),
            )));
        }
        if let Some(reading) = session.counter(name) {
            lines.push(Line::from(Span::styled(
                format!("      {}", reading.label()),
                Theme::counter_style(reading.level),
            )));
        }
    }

    if let Some(group) = session
        .definition()
        .section(session.wizard().current())
        .and_then(|s| s.repeater)
    {
        if let Some(repeater) = session.repeaters().get(group) {
            lines.push(Line::from(""));
            let hint = if repeater.can_add() {
                format!(
                    "{} of {} entries. Ctrl+A adds another.",
                    repeater.count(),
                    repeater.max()
                )
            } else {
                format!("{} of {} entries.", repeater.count(), repeater.max())
            };
            lines.push(Line::from(Span::styled(hint, Styles::text_muted())));
        }
    }

    (lines, focus_line)
}

fn field_line(spec: &FieldSpec, value: &str, focused: bool) -> Line<'static> {
    let cursor = if focused { "> " } else { "  " };
    let label_style = if focused { Styles::focused() } else { Styles::text() };

    let mut spans = vec![
        Span::styled(cursor, Styles::focused()),
        Span::styled(spec.label.clone(), label_style),
    ];
    if spec.required {
        spans.push(Span::styled(" *", Styles::required()));
    }
    spans.push(Span::raw(": "));

    let first_line = value.split('\n').next().unwrap_or("");
    let shown = match spec.kind {
        FieldKind::Select if value.is_empty() => "< choose >".to_string(),
        FieldKind::Select => format!("< {} >", value),
        _ if focused => format!("{}_", first_line),
        _ => first_line.to_string(),
    };
    spans.push(Span::styled(shown, Styles::text()));

    Line::from(spans)
}
