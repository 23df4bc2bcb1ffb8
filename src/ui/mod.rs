//! Terminal User Interface rendering module
//!
//! This module handles all UI rendering for tshop using the ratatui framework.
//! List views are drawn as a table of the current page with vim-style
//! navigation; everything else is an overlay.
//!
//! # Architecture
//!
//! - `header` - Header bar with API, user and filter info
//! - `help` - Help overlay showing keybindings
//! - `dialog` - Delete confirmation and warning dialogs
//! - `command_box` - Command mode input (`:` key)
//! - `form` - Create/edit form and the sign-in view
//! - `picker` - Dependency filter picker
//! - `notifications` - Notification history panel
//!
//! # JSON Highlighting
//!
//! The describe view provides syntax highlighting for JSON output:
//! - Keys in cyan
//! - Strings in green
//! - Numbers in light blue
//! - Booleans in magenta
//! - Null values in dark gray

mod command_box;
mod dialog;
mod form;
mod header;
mod help;
mod notifications;
mod picker;

use crate::app::{App, Mode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};
use tshop::notification::Severity;
use tshop::resource::{get_color_for_value, ColumnDef};

pub fn render(f: &mut Frame, app: &mut App) {
    if app.mode == Mode::SignIn {
        form::render_sign_in(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header (multi-line)
            Constraint::Min(1),    // Main content (table or describe)
            Constraint::Length(1), // Footer/crumb
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);

    match app.mode {
        Mode::Describe => render_describe_view(f, app, chunks[1]),
        _ => render_main_content(f, app, chunks[1]),
    }

    render_crumb(f, app, chunks[2]);

    // Overlays
    match app.mode {
        Mode::Help => help::render(f, app),
        Mode::Confirm | Mode::Warning => dialog::render(f, app),
        Mode::Command => command_box::render(f, app),
        Mode::Notifications => notifications::render(f, app),
        Mode::Form => form::render(f, app),
        Mode::Picker => picker::render(f, app, chunks[1]),
        Mode::DateInput => dialog::render_date_input(f, app),
        _ => {},
    }
}

fn render_main_content(f: &mut Frame, app: &mut App, area: Rect) {
    let show_filter = app.filter_active || !app.filter_text.is_empty();

    if show_filter {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_filter_bar(f, app, chunks[0]);
        render_dynamic_table(f, app, chunks[1]);
    } else {
        render_dynamic_table(f, app, area);
    }
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor_style = if app.filter_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_display = if app.filter_active {
        format!("/{}_", app.filter_text)
    } else {
        format!("/{}", app.filter_text)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(filter_display, cursor_style)]));
    f.render_widget(paragraph, area);
}

/// Render the current page of the list view
fn render_dynamic_table(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(resource) = app.current_resource() else {
        let msg = Paragraph::new("Unknown resource").style(Style::default().fg(Color::Red));
        f.render_widget(msg, area);
        return;
    };

    let title = {
        let page = &app.page;
        let count = if page.matching == page.total {
            format!("[{}]", page.total)
        } else {
            format!("[{}/{}]", page.matching, page.total)
        };
        let page_info = if page.page_count > 1 {
            format!(" pg.{}/{}", page.page, page.page_count)
        } else {
            String::new()
        };
        let scope = app
            .parent_context
            .as_ref()
            .map(|p| format!("({})", p.display_name))
            .unwrap_or_default();
        format!(" {}{}{}{} ", resource.display_name, scope, count, page_info)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    if app.page.rows.is_empty() {
        let text = if app.load_failed && !app.page.loaded {
            format!("Could not load {} (R to retry)", resource.display_name.to_lowercase())
        } else if app.page.loading || !app.page.loaded {
            format!("Loading {}...", resource.display_name.to_lowercase())
        } else if app.page.total > 0 {
            "No records match the current filters".to_string()
        } else {
            format!("No {} yet", resource.display_name.to_lowercase())
        };
        let msg = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(msg, inner_area);
        return;
    }

    // Account for header row
    let visible_height = (inner_area.height as usize).saturating_sub(1);
    app.update_viewport(visible_height);
    app.ensure_visible();

    let total_rows = app.page.rows.len();
    let needs_scrollbar = total_rows > visible_height;

    let table_area = if needs_scrollbar {
        Rect {
            width: inner_area.width.saturating_sub(1),
            ..inner_area
        }
    } else {
        inner_area
    };

    let range = app.visible_range();

    let header_cells: Vec<Cell> = resource
        .columns
        .iter()
        .map(|col| {
            Cell::from(format!(" {}", col.header)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app.page.rows[range.clone()]
        .iter()
        .map(|row| {
            let cells: Vec<Cell> = resource
                .columns
                .iter()
                .zip(row.cells.iter())
                .map(|(col, value)| {
                    Cell::from(format!(" {}", truncate_string(value, 38)))
                        .style(get_cell_style(value, col))
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = resource
        .columns
        .iter()
        .map(|col| Constraint::Percentage(col.width))
        .collect();

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Adjust selected index for virtual scrolling
    let mut state = TableState::default();
    if app.selected >= range.start && app.selected < range.end {
        state.select(Some(app.selected - range.start));
    }

    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_rows.saturating_sub(visible_height))
            .position(app.scroll_offset);

        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Get cell style based on value and column definition
fn get_cell_style(value: &str, col: &ColumnDef) -> Style {
    if let Some(ref color_map_name) = col.color_map {
        if let Some([r, g, b]) = get_color_for_value(color_map_name, value) {
            return Style::default().fg(Color::Rgb(r, g, b));
        }
    }
    Style::default()
}

/// Truncate string for display (Unicode-safe)
pub(crate) fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Rectangle centered in `r`, sized in percent of it
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn render_describe_view(f: &mut Frame, app: &App, area: Rect) {
    let json = app
        .selected_item_json()
        .unwrap_or_else(|| "No record selected".to_string());

    let lines: Vec<Line> = json.lines().map(highlight_json_line).collect();
    let total_lines = lines.len();

    let title = match app.current_resource() {
        Some(resource) => format!(" {} Details ", resource.singular),
        None => " Details ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let visible_lines = inner_area.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.describe_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(paragraph, inner_area);

    if total_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll + visible_lines).position(scroll);
        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Apply JSON syntax highlighting to a single line
fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = line.chars();
    let mut current = String::new();
    let mut is_key = true;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }

                let mut string_content = String::from("\"");
                while let Some(next_c) = chars.next() {
                    string_content.push(next_c);
                    if next_c == '"' {
                        break;
                    }
                    if next_c == '\\' {
                        if let Some(escaped) = chars.next() {
                            string_content.push(escaped);
                        }
                    }
                }

                let style = if is_key {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Green)
                };
                spans.push(Span::styled(string_content, style));
            },
            ':' => {
                current.push(c);
                spans.push(Span::styled(
                    std::mem::take(&mut current),
                    Style::default().fg(Color::White),
                ));
                is_key = false;
            },
            ',' | '{' | '}' | '[' | ']' | ' ' | '\t' => {
                if !current.is_empty() {
                    let style = get_json_value_style(&current);
                    spans.push(Span::styled(std::mem::take(&mut current), style));
                }
                let style = match c {
                    ',' => Style::default().fg(Color::White),
                    ' ' | '\t' => Style::default(),
                    _ => Style::default().fg(Color::Yellow),
                };
                spans.push(Span::styled(c.to_string(), style));
                match c {
                    ',' | '{' => is_key = true,
                    '[' => is_key = false,
                    _ => {},
                }
            },
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        let style = get_json_value_style(&current);
        spans.push(Span::styled(current, style));
    }

    Line::from(spans)
}

/// Get style for JSON values (numbers, booleans, null)
fn get_json_value_style(value: &str) -> Style {
    let trimmed = value.trim();
    if trimmed == "null" {
        Style::default().fg(Color::DarkGray)
    } else if trimmed == "true" || trimmed == "false" {
        Style::default().fg(Color::Magenta)
    } else if trimmed.parse::<f64>().is_ok() {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::White)
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Info => Color::Cyan,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

fn render_crumb(f: &mut Frame, app: &App, area: Rect) {
    let crumb_display = app.get_breadcrumb().join(" > ");

    let shortcuts_hint = match app.current_resource() {
        Some(resource) if !resource.sub_resources.is_empty() && app.mode == Mode::Normal => {
            let hints: Vec<String> = resource
                .sub_resources
                .iter()
                .map(|s| format!("{}:{}", s.shortcut, s.display_name))
                .collect();
            format!(" | {}", hints.join(" "))
        },
        _ => String::new(),
    };

    let pagination_hint = if app.page.page_count > 1 {
        let mut hints = Vec::new();
        if app.page.page > 1 {
            hints.push("[:prev");
        }
        if app.page.page < app.page.page_count {
            hints.push("]:next");
        }
        format!(" | {}", hints.join(" "))
    } else {
        String::new()
    };

    let (toast, notification_count) = {
        let manager = app.notifications.lock();
        let toast = manager
            .current_toast()
            .map(|n| (n.toast_message(manager.detail_level), n.severity));
        (toast, manager.notifications.len())
    };

    let notification_indicator = if notification_count > 0 {
        " [n]".to_string()
    } else {
        String::new()
    };

    let (status_text, style) = if let Some(err) = &app.error_message {
        (
            format!("Error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if let Some((message, severity)) = toast {
        (message, Style::default().fg(severity_color(severity)))
    } else if app.page.mutating {
        ("Saving...".to_string(), Style::default().fg(Color::Yellow))
    } else if app.page.loading {
        ("Loading...".to_string(), Style::default().fg(Color::Yellow))
    } else if app.mode == Mode::Describe {
        (
            "j/k: scroll | q/Esc: back".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else if app.filter_active {
        (
            "Type to search | Enter: apply | Esc: clear".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            format!("{}{}", shortcuts_hint, pagination_hint),
            Style::default().fg(Color::DarkGray),
        )
    };

    let crumb = Line::from(vec![
        Span::styled(
            format!("<{}>", crumb_display),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(status_text, style),
        Span::styled(notification_indicator, Style::default().fg(Color::DarkGray)),
    ]);

    f.render_widget(Paragraph::new(crumb), area);
}
