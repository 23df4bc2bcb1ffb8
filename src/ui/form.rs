//! Form Overlay
//!
//! Create/edit form over the list, and the full-screen sign-in view.

use super::centered_rect;
use crate::app::{App, FormState};
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tshop::form::FieldKind;

pub fn render(f: &mut Frame, app: &App) {
    let Some(form) = &app.form else {
        return;
    };
    let popup_area = centered_rect(60, 80, f.area());
    render_form(f, form, popup_area);
}

pub fn render_sign_in(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 50, f.area());
    f.render_widget(Clear, f.area());

    let mut form = app.sign_in.clone();
    form.title = format!("tshop v{} - {}", VERSION, app.ctx.client.base_url());
    render_form(f, &form, area);
}

fn field_lines(form: &FormState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, field) in form.draft.fields().iter().enumerate() {
        let focused = idx == form.focused;
        let marker = if field.is_required() { "*" } else { " " };

        let label_style = if focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut value = form.display_value(field);
        let hint = match field.kind {
            FieldKind::Bool | FieldKind::Select | FieldKind::Reference if focused => " ←/→",
            FieldKind::Slug if !form.draft.is_overridden(&field.name) => " (auto)",
            _ => "",
        };
        if focused && !matches!(
            field.kind,
            FieldKind::Bool | FieldKind::Select | FieldKind::Reference
        ) {
            value.push('_');
        }
        if value.is_empty() {
            value.push('-');
        }

        let value_style = if focused {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {}{:<18}", marker, field.label), label_style),
            Span::styled(value, value_style),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]));

        if let Some(error) = form.draft.error(&field.name) {
            lines.push(Line::from(Span::styled(
                format!("   {}", error),
                Style::default().fg(Color::Red),
            )));
        }
    }

    lines
}

fn render_form(f: &mut Frame, form: &FormState, area: Rect) {
    f.render_widget(Clear, area);

    let border_color = if form.draft.errors().is_empty() {
        Color::Cyan
    } else {
        Color::Red
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", form.title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let mut lines = vec![Line::from("")];
    lines.extend(field_lines(form));
    lines.push(Line::from(""));

    if let Some(message) = &form.message {
        lines.push(Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let footer = if form.submitting {
        Span::styled(" Saving...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Tab: next field | Enter: submit | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )
    };
    lines.push(Line::from(footer));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
