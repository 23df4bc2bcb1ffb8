//! Header Component
//!
//! Displays API, user, resource and filter information.

use crate::app::App;
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" tshop v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Row 1: API and signed-in user
    let user = app
        .user()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "-".to_string());
    let api_user = Line::from(vec![
        Span::styled(" API: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.ctx.client.base_url().to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("User: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            user,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(api_user), rows[0]);

    // Row 2: Current resource and count
    let resource_info = if let Some(resource) = app.current_resource() {
        Line::from(vec![
            Span::styled(" Resource: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                resource.display_name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled("Count: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", app.page.matching),
                Style::default().fg(Color::White),
            ),
            if app.page.total != app.page.matching {
                Span::styled(
                    format!(" (filtered from {})", app.page.total),
                    Style::default().fg(Color::DarkGray),
                )
            } else {
                Span::raw("")
            },
        ])
    } else {
        Line::from(vec![Span::styled(
            " No resource selected",
            Style::default().fg(Color::Red),
        )])
    };
    f.render_widget(Paragraph::new(resource_info), rows[1]);

    // Row 3: Active filters
    let summary = app.filter_state().summary();
    let filter_line = if summary.is_empty() {
        Line::from(Span::styled(
            " Filters: none",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(" Filters: ", Style::default().fg(Color::DarkGray)),
            Span::styled(summary, Style::default().fg(Color::Magenta)),
        ])
    };
    f.render_widget(Paragraph::new(filter_line), rows[2]);

    // Row 4: Help hint
    let help_line = Line::from(vec![
        Span::styled(
            " ?:help  ::cmd  /:search  n:new  e:edit  x:toggle  D:delete  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
        if app.readonly {
            Span::styled(
                "  [READ-ONLY]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(help_line), rows[3]);
}
