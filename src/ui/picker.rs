//! Reference Picker
//!
//! Overlay for filtering a list by a referenced record (product, variant).

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(picker) = &app.picker else {
        return;
    };

    let popup_area = centered_rect(50, 80, area);
    f.render_widget(Clear, popup_area);

    let title = match picker.field() {
        Some((_, label)) if picker.fields.len() > 1 => {
            format!(" Filter by {} (Tab: next field) ", label)
        },
        Some((_, label)) => format!(" Filter by {} ", label),
        None => " Filter ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let search = Paragraph::new(Line::from(vec![
        Span::styled(" Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}_", picker.search_text),
            Style::default().fg(Color::Yellow),
        ),
    ]));
    f.render_widget(search, chunks[0]);

    let current = picker
        .field()
        .and_then(|(field, _)| app.filter_state().selections.get(field).cloned())
        .unwrap_or_default();

    let items: Vec<ListItem> = picker
        .filtered
        .iter()
        .filter_map(|&i| picker.options.get(i))
        .map(|(id, label)| {
            let style = if *id == current {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Span::styled(format!("  {}", label), style))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(picker.selected));

    f.render_stateful_widget(list, chunks[1], &mut state);
}
