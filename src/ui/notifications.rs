//! Notifications Panel UI
//!
//! Renders the notifications history panel overlay.

use super::{severity_color, truncate_string};
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

/// Render the notifications history panel as an overlay
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Center the panel (80% width, 70% height)
    let popup_width = (area.width as f32 * 0.8) as u16;
    let popup_height = (area.height as f32 * 0.7) as u16;
    let popup_x = (area.width - popup_width) / 2;
    let popup_y = (area.height - popup_height) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let history = app.notifications.snapshot();
    let title = format!(" Notifications History [{}] ", history.len());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(popup_area);
    f.render_widget(block, popup_area);

    if history.is_empty() {
        let msg = Paragraph::new("No notifications yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(msg, inner_area);
        return;
    }

    let header_cells = [" ", " ACTION", " RESOURCE", " MESSAGE", " TIME"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells).height(1);

    let rows = history.iter().map(|notif| {
        let resource = if notif.resource_type.is_empty() {
            "-"
        } else {
            notif.resource_type.as_str()
        };

        Row::new(vec![
            Cell::from(format!(" {}", notif.severity.icon()))
                .style(Style::default().fg(severity_color(notif.severity))),
            Cell::from(format!(" {}", notif.operation_type.display_name())),
            Cell::from(format!(" {}", resource)),
            Cell::from(format!(" {}", truncate_string(&notif.message, 60))),
            Cell::from(format!(
                " {} ({})",
                notif.timestamp.format("%H:%M:%S"),
                notif.age_display()
            )),
        ])
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Min(20),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    state.select(Some(app.notifications_selected.min(history.len() - 1)));

    f.render_stateful_widget(table, inner_area, &mut state);

    let help_area = Rect::new(
        popup_area.x + 1,
        popup_area.y + popup_area.height.saturating_sub(1),
        popup_area.width.saturating_sub(2),
        1,
    );
    let help = Line::from(vec![
        Span::styled("j/k", Style::default().fg(Color::Yellow)),
        Span::raw(": navigate  "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(": clear all  "),
        Span::styled("q/Esc", Style::default().fg(Color::Yellow)),
        Span::raw(": close"),
    ]);
    f.render_widget(Paragraph::new(help).alignment(Alignment::Center), help_area);
}
