//! Command palette
//!
//! The `:` prompt at the bottom of the screen. Resource entries show their
//! display name, and sub-resources of the open list show the row shortcut
//! that opens them scoped to the selected record.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use tshop::resource::{get_resource, ResourceDef};

const MAX_ROWS: usize = 8;
const NAME_WIDTH: usize = 22;

/// What a palette entry does, shown next to its name
fn describe(current: Option<&ResourceDef>, command: &str) -> (String, Option<String>) {
    let builtin = match command {
        "back" => Some("Return to the parent list"),
        "help" => Some("Key bindings"),
        "notifications" => Some("Notification history"),
        "notifications clear" => Some("Clear notification history"),
        "signout" => Some("End the session"),
        "q" => Some("Quit"),
        _ => None,
    };
    if let Some(text) = builtin {
        return (text.to_string(), None);
    }

    let Some(def) = get_resource(command) else {
        return (String::new(), None);
    };
    let shortcut = current.and_then(|parent| {
        parent
            .sub_resources
            .iter()
            .find(|sub| sub.resource_key == command)
            .map(|sub| format!("[{}] per {}", sub.shortcut, parent.singular))
    });
    (def.display_name.clone(), shortcut)
}

/// Typed text followed by the dimmed remainder of the selected suggestion
fn input_line(app: &App) -> Line<'_> {
    let mut spans = vec![
        Span::styled(":", Style::default().fg(Color::Cyan)),
        Span::styled(app.command_text.as_str(), Style::default().fg(Color::White)),
    ];
    let completion = app
        .command_preview
        .as_deref()
        .and_then(|preview| preview.strip_prefix(app.command_text.as_str()));
    if let Some(rest) = completion.filter(|rest| !rest.is_empty()) {
        spans.push(Span::styled(rest, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn suggestion_item<'a>(current: Option<&ResourceDef>, command: &'a str, selected: bool) -> ListItem<'a> {
    let (description, shortcut) = describe(current, command);
    let (name_style, detail_style) = if selected {
        let base = Style::default().fg(Color::Black).bg(Color::Cyan);
        (base.add_modifier(Modifier::BOLD), base)
    } else {
        (Style::default().fg(Color::White), Style::default().fg(Color::DarkGray))
    };

    let mut spans = vec![
        Span::styled(format!(" {:<width$}", command, width = NAME_WIDTH), name_style),
        Span::styled(description, detail_style),
    ];
    if let Some(shortcut) = shortcut {
        spans.push(Span::styled(
            format!("  {}", shortcut),
            if selected { detail_style } else { Style::default().fg(Color::Yellow) },
        ));
    }
    ListItem::new(Line::from(spans))
}

pub fn render(f: &mut Frame, app: &App) {
    let rows = app.command_suggestions.len().clamp(1, MAX_ROWS) as u16;
    let [_, palette] = Layout::vertical([Constraint::Min(1), Constraint::Length(rows + 5)]).areas(f.area());
    f.render_widget(Clear, palette);

    let [input_area, list_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(palette);

    let input = Paragraph::new(input_line(app)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Go to ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(input, input_area);

    render_suggestions(f, app, list_area);
}

fn render_suggestions(f: &mut Frame, app: &App, area: Rect) {
    let current = app.current_resource();

    // Keep the selection visible once it scrolls past the first page
    let offset = app.command_suggestion_selected.saturating_sub(MAX_ROWS - 1);
    let items: Vec<ListItem> = app
        .command_suggestions
        .iter()
        .enumerate()
        .skip(offset)
        .take(MAX_ROWS)
        .map(|(i, cmd)| suggestion_item(current, cmd, i == app.command_suggestion_selected))
        .collect();

    let title = if items.is_empty() {
        " No matching resource or command ".to_string()
    } else {
        format!(
            " {}/{}  Tab complete  Enter open  Esc cancel ",
            app.command_suggestion_selected + 1,
            app.command_suggestions.len()
        )
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(title, Style::default().fg(Color::DarkGray))),
    );
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_builtin() {
        assert_eq!(describe(None, "signout").0, "End the session");
    }

    #[test]
    fn test_describe_sub_resource_shortcut() {
        let products = get_resource("products");
        let parent = products.unwrap();
        let sub = &parent.sub_resources[0];

        let (name, shortcut) = describe(products, &sub.resource_key);
        assert_eq!(name, get_resource(&sub.resource_key).unwrap().display_name);
        assert_eq!(shortcut, Some(format!("[{}] per product", sub.shortcut)));

        let (_, unrelated) = describe(get_resource("tags"), &sub.resource_key);
        assert_eq!(unrelated, None);
    }

    #[test]
    fn test_describe_unknown() {
        assert_eq!(describe(None, "nope"), (String::new(), None));
    }
}
