//! Event Handling
//!
//! Keyboard handling for tshop.

use crate::app::{App, FormState, Mode};
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use std::time::Duration;

/// Handle events, returns true if app should quit
pub fn handle_events(app: &mut App) -> Result<bool> {
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            return Ok(handle_key_event(app, key.code, key.modifiers));
        }
    }
    Ok(false)
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // Inline errors last until the next key
    app.error_message = None;

    match app.mode {
        Mode::SignIn => handle_sign_in_mode(app, code, modifiers),
        Mode::Normal => handle_normal_mode(app, code, modifiers),
        Mode::Command => handle_command_mode(app, code, modifiers),
        Mode::Help => handle_help_mode(app, code),
        Mode::Confirm => handle_confirm_mode(app, code),
        Mode::Warning => handle_warning_mode(app, code),
        Mode::Form => handle_form_mode(app, code, modifiers),
        Mode::Picker => handle_picker_mode(app, code, modifiers),
        Mode::DateInput => handle_date_mode(app, code, modifiers),
        Mode::Describe => handle_describe_mode(app, code, modifiers),
        Mode::Notifications => handle_notifications_mode(app, code),
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Double-g goes to top
    if code == KeyCode::Char('g') {
        if let Some((KeyCode::Char('g'), time)) = app.last_key_press {
            if time.elapsed() < Duration::from_millis(1000) {
                app.go_to_top();
                app.last_key_press = None;
                return false;
            }
        }
        app.last_key_press = Some((code, std::time::Instant::now()));
        return false;
    }

    app.last_key_press = None;

    // Search input takes the keyboard while active
    if app.filter_active {
        match code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Enter => app.filter_active = false,
            KeyCode::Backspace => {
                app.filter_text.pop();
                app.apply_filter();
            },
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.filter_text.push(c);
                app.apply_filter();
            },
            _ => {},
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,

        // Navigation - vim style + accessible alternatives
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Home => app.go_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.go_to_bottom(),

        // Pages
        KeyCode::Char(']') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('[') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => app.next_page(),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.prev_page(),

        // Quick jump to row 1-9
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.page.rows.len() {
                app.selected = idx;
            }
        },

        KeyCode::Char('R') => app.refresh_current(),
        KeyCode::Enter => app.enter_describe_mode(),

        // Filters
        KeyCode::Char('/') => app.filter_active = true,
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('f') => app.enter_picker_mode(),
        KeyCode::Char('t') => app.enter_date_mode(),
        KeyCode::Char('c') => app.clear_all_filters(),

        // Mutations
        KeyCode::Char('n') => app.start_create(),
        KeyCode::Char('e') => app.start_edit(),
        KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Delete | KeyCode::Char('D') => app.request_delete(),

        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Char('?') => app.enter_help_mode(),

        // Back navigation
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('b') => {
            if app.parent_context.is_some() {
                app.navigate_back();
            }
        },

        // Sub-resource shortcuts
        KeyCode::Char(c) => {
            let sub = app.current_resource().and_then(|resource| {
                resource
                    .sub_resources
                    .iter()
                    .find(|s| s.shortcut == c.to_string())
            });

            if let Some(sub_def) = sub {
                if app.selected_row().is_some() {
                    let key = sub_def.resource_key.clone();
                    app.navigate_to_sub_resource(&key);
                }
            }
        },

        _ => {},
    }

    false
}

fn handle_command_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Enter => return app.execute_command(),
        KeyCode::Backspace => {
            app.command_text.pop();
            app.update_command_suggestions();
        },
        KeyCode::Tab | KeyCode::Right => app.apply_suggestion(),
        KeyCode::Down => app.next_suggestion(),
        KeyCode::Up => app.prev_suggestion(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_text.push(c);
            app.update_command_suggestions();
        },
        _ => {},
    }
    false
}

fn handle_help_mode(app: &mut App, code: KeyCode) -> bool {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter
    ) {
        app.exit_mode();
    }
    false
}

fn handle_confirm_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.confirm_delete(false),
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(ref mut pending) = app.pending_delete {
                pending.selected_yes = true;
            }
        },
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(ref mut pending) = app.pending_delete {
                pending.selected_yes = false;
            }
        },
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(true),
        KeyCode::Enter => {
            let yes = app
                .pending_delete
                .as_ref()
                .map(|p| p.selected_yes)
                .unwrap_or(false);
            app.confirm_delete(yes);
        },
        _ => {},
    }
    false
}

fn handle_warning_mode(app: &mut App, code: KeyCode) -> bool {
    if matches!(code, KeyCode::Esc | KeyCode::Enter) {
        app.warning_message = None;
        app.exit_mode();
    }
    false
}

/// Keys shared by the create/edit form and the sign-in form.
/// Returns true when the form should be submitted.
fn edit_form(form: &mut FormState, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Enter => return true,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_option(false),
        KeyCode::Right => form.cycle_option(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => form.input_char(c),
        _ => {},
    }
    false
}

fn handle_form_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if code == KeyCode::Esc {
        app.cancel_form();
        return false;
    }

    let Some(form) = app.form.as_mut() else {
        app.exit_mode();
        return false;
    };
    if form.submitting {
        return false;
    }

    if edit_form(form, code, modifiers) {
        app.submit_form();
    }
    false
}

fn handle_sign_in_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if code == KeyCode::Esc {
        return true;
    }
    if app.sign_in.submitting {
        return false;
    }

    if edit_form(&mut app.sign_in, code, modifiers) {
        app.submit_sign_in();
    }
    false
}

fn handle_picker_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Enter => app.select_picker_option(),
        KeyCode::Tab => app.next_picker_field(),
        KeyCode::Down => app.picker_next(),
        KeyCode::Up => app.picker_previous(),
        KeyCode::Backspace => {
            if let Some(picker) = app.picker.as_mut() {
                picker.search_text.pop();
                picker.apply_search();
            }
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(picker) = app.picker.as_mut() {
                picker.search_text.push(c);
                picker.apply_search();
            }
        },
        _ => {},
    }
    false
}

fn handle_date_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Enter => app.apply_date_input(),
        KeyCode::Backspace => {
            app.date_text.pop();
        },
        KeyCode::Char(c)
            if !modifiers.contains(KeyModifiers::CONTROL) && (c.is_ascii_digit() || c == '-') =>
        {
            app.date_text.push(c);
        },
        _ => {},
    }
    false
}

fn handle_describe_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => app.exit_mode(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.describe_scroll = app.describe_scroll.saturating_add(1);
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.describe_scroll = app.describe_scroll.saturating_sub(1);
        },
        KeyCode::PageDown => {
            app.describe_scroll = app.describe_scroll.saturating_add(10);
        },
        KeyCode::PageUp => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.describe_scroll = app.describe_scroll.saturating_add(10);
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('g') | KeyCode::Home => {
            app.describe_scroll = 0;
        },
        KeyCode::Char('G') | KeyCode::End => {
            app.describe_scroll_to_bottom(30); // Approximate visible lines
        },
        _ => {},
    }
    false
}

fn handle_notifications_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.exit_mode(),
        KeyCode::Char('j') | KeyCode::Down => {
            let count = app.notifications.len();
            if count > 0 {
                app.notifications_selected = (app.notifications_selected + 1).min(count - 1);
            }
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.notifications_selected = app.notifications_selected.saturating_sub(1);
        },
        KeyCode::Char('c') => app.clear_notifications(),
        _ => {},
    }
    false
}
