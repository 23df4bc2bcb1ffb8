//! Help Overlay
//!
//! Shows keyboard shortcuts and help information.

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, ↑/↓", "Move up/down"),
            ("gg / G", "Go to top/bottom"),
            ("[/]", "Previous/next page"),
            ("1-9", "Jump to row"),
        ],
    ),
    (
        "Views",
        &[
            ("Enter", "View record details"),
            ("b/Backspace", "Go back"),
            ("R", "Refresh current view"),
            (":", "Command mode"),
            (":notifications", "Notification history"),
        ],
    ),
    (
        "Filtering",
        &[
            ("/", "Search"),
            ("s", "Cycle status filter"),
            ("f", "Filter by reference (Tab switches field)"),
            ("t", "Filter by date (YYYY-MM-DD)"),
            ("c", "Clear all filters"),
        ],
    ),
    (
        "Changes",
        &[
            ("n", "New record"),
            ("e", "Edit record"),
            ("x", "Toggle status"),
            ("D/Delete", "Delete record (asks first)"),
        ],
    ),
    (
        "Forms",
        &[
            ("Tab/Shift+Tab", "Next/previous field"),
            ("←/→, Space", "Change choice"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
    ),
];

pub fn render(f: &mut Frame, _app: &App) {
    let area = f.area();
    let popup_area = centered_rect(70, 85, area);

    f.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (section, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            *section,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, description) in keys.iter() {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ]));
        }
        help_text.push(Line::from(""));
    }

    help_text.push(Line::from(vec![
        Span::styled(format!("  {:<14}", "?/Esc"), Style::default().fg(Color::Yellow)),
        Span::raw("Close help"),
    ]));
    help_text.push(Line::from(vec![
        Span::styled(format!("  {:<14}", "q"), Style::default().fg(Color::Yellow)),
        Span::raw("Quit application"),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, popup_area);
}
