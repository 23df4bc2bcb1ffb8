//! Application State
//!
//! Central application state for the tshop console. List views are
//! `Box<dyn ResourceView>` handles; loads and mutations run as spawned tasks
//! and report back through [`AppEvent`]s drained on every tick.

use chrono::NaiveDate;
use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;
use tokio::sync::mpsc;
use tshop::api::{AdminUser, ApiError};
use tshop::config::Config;
use tshop::entity::{open_view, ViewContext};
use tshop::form::{FieldKind, FormDraft, FormFieldDef};
use tshop::notification::{Notification, OperationType, SharedNotifications};
use tshop::resource::{
    get_all_resource_keys, get_resource, sign_in_fields, DeleteRequest, FilterState, LoadOutcome,
    PageView, ResourceDef, ResourceView, RowView, SubmitOutcome,
};

// =========================================================================
// Configuration Constants
// =========================================================================

/// Default viewport height (will be updated during render based on terminal size)
const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/// Resource opened when nothing else is configured
pub const DEFAULT_RESOURCE: &str = "products";

const READONLY_MESSAGE: &str = "Read-only mode: changes are disabled";

/// Built-in commands offered next to the resource keys
const BUILTIN_COMMANDS: &[&str] = &[
    "back",
    "help",
    "notifications",
    "notifications clear",
    "signout",
    "q",
];

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SignIn,        // Credentials form, shown while signed out
    Normal,        // Viewing list
    Command,       // : command input
    Help,          // ? help popup
    Confirm,       // Delete confirmation
    Warning,       // Warning/info dialog (OK only)
    Form,          // Create/edit overlay
    Picker,        // Dependency filter picker
    DateInput,     // Date filter input
    Describe,      // Viewing JSON details of selected record
    Notifications, // Notifications history panel
}

/// Results of spawned tasks, delivered back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    Loaded { generation: u64, outcome: LoadOutcome },
    Submitted { generation: u64, outcome: SubmitOutcome },
    SignedIn(Result<AdminUser, ApiError>),
    /// A toggle or delete finished (the manager reloads on its own)
    MutationDone,
}

/// Delete awaiting confirmation
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub request: DeleteRequest,
    pub selected_yes: bool,
}

/// Parent context for hierarchical navigation
#[derive(Debug, Clone)]
pub struct ParentContext {
    pub resource_key: String,
    /// Scope the parent list itself was opened with
    pub scope: Option<(String, String)>,
    pub id: String,
    pub display_name: String,
}

/// Form overlay (create, edit and sign-in)
#[derive(Debug, Clone)]
pub struct FormState {
    pub title: String,
    pub draft: FormDraft,
    pub focused: usize,
    /// Record being edited; `None` creates
    pub editing_id: Option<String>,
    pub submitting: bool,
    /// (id, label) choices per reference field
    pub options: HashMap<String, Vec<(String, String)>>,
    /// Error not tied to a field
    pub message: Option<String>,
}

impl FormState {
    pub fn new(
        title: impl Into<String>,
        draft: FormDraft,
        editing_id: Option<String>,
        options: HashMap<String, Vec<(String, String)>>,
    ) -> Self {
        Self {
            title: title.into(),
            draft,
            focused: 0,
            editing_id,
            submitting: false,
            options,
            message: None,
        }
    }

    pub fn focused_field(&self) -> Option<&FormFieldDef> {
        self.draft.fields().get(self.focused)
    }

    pub fn next_field(&mut self) {
        let count = self.draft.fields().len();
        if count > 0 {
            self.focused = (self.focused + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.draft.fields().len();
        if count > 0 {
            self.focused = (self.focused + count - 1) % count;
        }
    }

    /// Typed character; choice fields cycle on space instead
    pub fn input_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let (name, kind) = (field.name.clone(), field.kind);

        match kind {
            FieldKind::Bool | FieldKind::Select | FieldKind::Reference => {
                if c == ' ' {
                    self.cycle_option(true);
                }
            },
            _ => {
                let mut value = self.draft.value(&name).to_string();
                value.push(c);
                self.draft.set(&name, value);
            },
        }
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let (name, kind) = (field.name.clone(), field.kind);

        match kind {
            FieldKind::Bool => {},
            FieldKind::Select | FieldKind::Reference => self.draft.set(&name, ""),
            _ => {
                let mut value = self.draft.value(&name).to_string();
                value.pop();
                self.draft.set(&name, value);
            },
        }
    }

    fn choices(&self, field: &FormFieldDef) -> Vec<String> {
        if field.kind == FieldKind::Bool {
            return vec!["true".to_string(), "false".to_string()];
        }

        let mut choices = Vec::new();
        if !field.is_required() {
            choices.push(String::new());
        }
        match field.kind {
            FieldKind::Select => choices.extend(field.options.iter().cloned()),
            FieldKind::Reference => choices.extend(
                self.options
                    .get(&field.name)
                    .into_iter()
                    .flatten()
                    .map(|(id, _)| id.clone()),
            ),
            _ => return Vec::new(),
        }
        choices
    }

    /// Step a bool, select or reference field through its choices
    pub fn cycle_option(&mut self, forward: bool) {
        let Some(field) = self.focused_field().cloned() else {
            return;
        };
        let choices = self.choices(&field);
        if choices.is_empty() {
            return;
        }

        let current = choices
            .iter()
            .position(|c| c == self.draft.value(&field.name));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % choices.len(),
            (Some(i), false) => (i + choices.len() - 1) % choices.len(),
        };
        self.draft.set(&field.name, choices[next].clone());
    }

    /// On-screen text of a field
    pub fn display_value(&self, field: &FormFieldDef) -> String {
        let raw = self.draft.value(&field.name);
        match field.kind {
            FieldKind::Password => "*".repeat(raw.chars().count()),
            FieldKind::Bool => (if raw == "true" { "yes" } else { "no" }).to_string(),
            FieldKind::Reference if !raw.is_empty() => self
                .options
                .get(&field.name)
                .and_then(|opts| opts.iter().find(|(id, _)| id == raw))
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| raw.to_string()),
            _ => raw.to_string(),
        }
    }
}

/// Dependency filter picker
#[derive(Debug, Clone)]
pub struct PickerState {
    /// Filterable foreign-key fields; `field_index` picks the active one
    pub fields: Vec<(String, String)>,
    pub field_index: usize,
    /// (id, label); the empty id clears the filter
    pub options: Vec<(String, String)>,
    pub search_text: String,
    pub filtered: Vec<usize>,
    pub selected: usize,
}

impl PickerState {
    pub fn field(&self) -> Option<&(String, String)> {
        self.fields.get(self.field_index)
    }

    pub fn apply_search(&mut self) {
        let needle = self.search_text.to_lowercase();
        self.filtered = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, (id, label))| {
                needle.is_empty()
                    || id.is_empty()
                    || label.to_lowercase().contains(&needle)
                    || id.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
    }

    pub fn current(&self) -> Option<&(String, String)> {
        self.filtered
            .get(self.selected)
            .and_then(|&i| self.options.get(i))
    }
}

/// Main application state
pub struct App {
    // API access
    pub ctx: ViewContext,
    pub notifications: SharedNotifications,
    pub config: Config,
    pub readonly: bool,

    // Current list view
    pub current_resource_key: String,
    pub view: Option<Box<dyn ResourceView>>,
    view_generation: u64,
    pub page: PageView,
    /// Latest load of the current view failed
    pub load_failed: bool,
    /// Resource to open once signed in
    pending_resource: String,
    /// Record to re-select after the next load
    reselect_id: Option<String>,

    // Navigation state
    pub selected: usize,
    pub mode: Mode,
    pub filter_text: String,
    pub filter_active: bool,
    pub last_key_press: Option<(KeyCode, Instant)>,

    // Hierarchical navigation
    pub parent_context: Option<ParentContext>,
    pub navigation_stack: Vec<ParentContext>,

    // Command input
    pub command_text: String,
    pub command_suggestions: Vec<String>,
    pub command_suggestion_selected: usize,
    pub command_preview: Option<String>,

    // Overlays
    pub sign_in: FormState,
    pub form: Option<FormState>,
    form_generation: u64,
    pub picker: Option<PickerState>,
    pub date_text: String,
    pub pending_delete: Option<PendingDelete>,
    pub warning_message: Option<String>,
    pub error_message: Option<String>,
    pub describe_id: Option<String>,
    pub describe_scroll: usize,
    pub notifications_selected: usize,

    // Virtual scrolling
    pub scroll_offset: usize,
    pub viewport_height: usize,

    // Task results
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(
        ctx: ViewContext,
        notifications: SharedNotifications,
        config: Config,
        readonly: bool,
        initial_resource: &str,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            ctx,
            notifications,
            config,
            readonly,
            current_resource_key: initial_resource.to_string(),
            view: None,
            view_generation: 0,
            page: PageView::default(),
            load_failed: false,
            pending_resource: initial_resource.to_string(),
            reselect_id: None,
            selected: 0,
            mode: Mode::Normal,
            filter_text: String::new(),
            filter_active: false,
            last_key_press: None,
            parent_context: None,
            navigation_stack: Vec::new(),
            command_text: String::new(),
            command_suggestions: Vec::new(),
            command_suggestion_selected: 0,
            command_preview: None,
            sign_in: Self::sign_in_form(),
            form: None,
            form_generation: 0,
            picker: None,
            date_text: String::new(),
            pending_delete: None,
            warning_message: None,
            error_message: None,
            describe_id: None,
            describe_scroll: 0,
            notifications_selected: 0,
            scroll_offset: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            events_tx,
            events_rx,
        };

        if app.signed_in() {
            app.navigate_to_resource(initial_resource);
        } else {
            app.enter_sign_in();
        }
        app
    }

    fn sign_in_form() -> FormState {
        FormState::new(
            "Sign in",
            FormDraft::new(sign_in_fields().to_vec()),
            None,
            HashMap::new(),
        )
    }

    pub fn signed_in(&self) -> bool {
        self.ctx.client.session().is_active()
    }

    pub fn user(&self) -> Option<AdminUser> {
        self.ctx.client.session().user()
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Apply finished task results and refresh the page snapshot
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
        }

        // A 401 anywhere tears the session down; send the user to sign-in
        if self.mode != Mode::SignIn && !self.signed_in() {
            self.enter_sign_in();
        }

        self.sync_page();
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded {
                generation,
                outcome,
            } => {
                if generation != self.view_generation {
                    return;
                }
                tracing::debug!("{} load finished: {:?}", self.current_resource_key, outcome);
                match outcome {
                    LoadOutcome::SignedOut => self.enter_sign_in(),
                    LoadOutcome::Applied => {
                        self.load_failed = false;
                        self.sync_page();
                        if let Some(id) = self.reselect_id.take() {
                            if let Some(idx) = self.page.rows.iter().position(|r| r.id == id) {
                                self.selected = idx;
                            }
                        }
                    },
                    LoadOutcome::Failed => self.load_failed = true,
                    LoadOutcome::Discarded => {},
                }
            },
            AppEvent::Submitted {
                generation,
                outcome,
            } => {
                if generation != self.form_generation {
                    return;
                }
                match outcome {
                    SubmitOutcome::Saved => {
                        self.form = None;
                        if self.mode == Mode::Form {
                            self.mode = Mode::Normal;
                        }
                    },
                    SubmitOutcome::Rejected(draft) => {
                        if let Some(form) = self.form.as_mut() {
                            form.draft = draft;
                            form.submitting = false;
                        }
                    },
                }
            },
            AppEvent::SignedIn(result) => self.finish_sign_in(result),
            AppEvent::MutationDone => self.sync_page(),
        }
    }

    /// Re-read the current page from the manager
    pub fn sync_page(&mut self) {
        self.page = match &self.view {
            Some(view) => view.page_view(),
            None => PageView::default(),
        };
        let rows = self.page.rows.len();
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }

    fn spawn_load(&self) {
        let Some(view) = &self.view else {
            return;
        };
        let future = view.load();
        let tx = self.events_tx.clone();
        let generation = self.view_generation;
        tokio::spawn(async move {
            let outcome = future.await;
            let _ = tx.send(AppEvent::Loaded {
                generation,
                outcome,
            });
        });
    }

    // =========================================================================
    // Resource Helpers
    // =========================================================================

    pub fn current_resource(&self) -> Option<&'static ResourceDef> {
        get_resource(&self.current_resource_key)
    }

    pub fn get_available_commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = get_all_resource_keys()
            .into_iter()
            .map(String::from)
            .collect();
        commands.extend(BUILTIN_COMMANDS.iter().map(|c| c.to_string()));
        commands
    }

    pub fn selected_row(&self) -> Option<&RowView> {
        self.page.rows.get(self.selected)
    }

    pub fn selected_item_json(&self) -> Option<String> {
        let id = self.describe_id.as_deref()?;
        let value = self.view.as_ref()?.record_json(id)?;
        serde_json::to_string_pretty(&value).ok()
    }

    pub fn describe_line_count(&self) -> usize {
        self.selected_item_json()
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    pub fn describe_scroll_to_bottom(&mut self, visible_lines: usize) {
        self.describe_scroll = self.describe_line_count().saturating_sub(visible_lines);
    }

    // =========================================================================
    // Row Navigation
    // =========================================================================

    pub fn next(&mut self) {
        if !self.page.rows.is_empty() {
            self.selected = (self.selected + 1).min(self.page.rows.len() - 1);
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn go_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn go_to_bottom(&mut self) {
        if !self.page.rows.is_empty() {
            self.selected = self.page.rows.len() - 1;
        }
    }

    pub fn next_page(&mut self) {
        if let Some(view) = &self.view {
            view.set_page(self.page.page + 1);
            self.selected = 0;
            self.scroll_offset = 0;
            self.sync_page();
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(view) = &self.view {
            view.set_page(self.page.page.saturating_sub(1).max(1));
            self.selected = 0;
            self.scroll_offset = 0;
            self.sync_page();
        }
    }

    pub fn refresh_current(&mut self) {
        if let Some(row) = self.selected_row() {
            self.reselect_id = Some(row.id.clone());
        }
        self.spawn_load();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    fn update_filter(&mut self, change: impl FnOnce(&mut FilterState)) {
        let Some(view) = &self.view else {
            return;
        };
        let mut filter = view.filter_state();
        change(&mut filter);
        view.set_filter(filter);
        self.selected = 0;
        self.scroll_offset = 0;
        self.sync_page();
    }

    /// Push the search bar text into the filter
    pub fn apply_filter(&mut self) {
        let search = self.filter_text.clone();
        self.update_filter(|f| f.search = search);
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.apply_filter();
    }

    /// Drop every filter, keeping the parent scope
    pub fn clear_all_filters(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.update_filter(|f| *f = FilterState::default());
    }

    pub fn filter_state(&self) -> FilterState {
        self.view
            .as_ref()
            .map(|v| v.filter_state())
            .unwrap_or_default()
    }

    /// Step the status filter: all -> each status -> all
    pub fn cycle_status_filter(&mut self) {
        let Some(def) = self.current_resource() else {
            return;
        };
        let options = def.status_options();
        if options.is_empty() {
            self.show_warning(&format!("{} have no status", def.display_name));
            return;
        }

        let current = self.filter_state().status;
        let next = match current {
            None => options.first().cloned(),
            Some(status) => options
                .iter()
                .position(|o| *o == status)
                .and_then(|i| options.get(i + 1))
                .cloned(),
        };
        self.update_filter(|f| f.status = next);
    }

    pub fn enter_picker_mode(&mut self) {
        let Some(def) = self.current_resource() else {
            return;
        };
        let scope = self.view.as_ref().map(|v| v.scope()).unwrap_or_default();
        let fields: Vec<(String, String)> = def
            .dependencies
            .iter()
            .filter(|d| !scope.iter().any(|(param, _)| *param == d.field))
            .map(|d| {
                let label = get_resource(&d.resource_key)
                    .map(|r| r.singular.clone())
                    .unwrap_or_else(|| d.resource_key.clone());
                (d.field.clone(), label)
            })
            .collect();

        if fields.is_empty() {
            self.show_warning(&format!("{} have no reference filters", def.display_name));
            return;
        }

        let mut picker = PickerState {
            fields,
            field_index: 0,
            options: Vec::new(),
            search_text: String::new(),
            filtered: Vec::new(),
            selected: 0,
        };
        self.load_picker_options(&mut picker);
        self.picker = Some(picker);
        self.mode = Mode::Picker;
    }

    fn load_picker_options(&self, picker: &mut PickerState) {
        let Some((field, _)) = picker.field().cloned() else {
            return;
        };
        let mut options = vec![(String::new(), "All".to_string())];
        if let Some(view) = &self.view {
            options.extend(view.dependency_options(&field));
        }
        let current = self.filter_state().selections.get(&field).cloned();

        picker.options = options;
        picker.search_text.clear();
        picker.selected = 0;
        picker.apply_search();
        if let Some(current) = current {
            if let Some(pos) = picker
                .filtered
                .iter()
                .position(|&i| picker.options[i].0 == current)
            {
                picker.selected = pos;
            }
        }
    }

    /// Switch the picker to the next filterable field
    pub fn next_picker_field(&mut self) {
        let Some(mut picker) = self.picker.take() else {
            return;
        };
        if !picker.fields.is_empty() {
            picker.field_index = (picker.field_index + 1) % picker.fields.len();
        }
        self.load_picker_options(&mut picker);
        self.picker = Some(picker);
    }

    pub fn picker_next(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            if !picker.filtered.is_empty() {
                picker.selected = (picker.selected + 1).min(picker.filtered.len() - 1);
            }
        }
    }

    pub fn picker_previous(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.selected = picker.selected.saturating_sub(1);
        }
    }

    pub fn select_picker_option(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        self.mode = Mode::Normal;
        let (Some((field, _)), Some((id, _))) = (picker.field(), picker.current()) else {
            return;
        };
        let (field, id) = (field.clone(), id.clone());
        self.update_filter(|f| {
            if id.is_empty() {
                f.selections.remove(&field);
            } else {
                f.selections.insert(field, id);
            }
        });
    }

    pub fn enter_date_mode(&mut self) {
        let Some(def) = self.current_resource() else {
            return;
        };
        if def.date_field.is_none() {
            self.show_warning(&format!("{} have no date to filter on", def.display_name));
            return;
        }
        self.date_text = self
            .filter_state()
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.mode = Mode::DateInput;
    }

    /// Apply the typed date; empty input clears the date filter
    pub fn apply_date_input(&mut self) {
        let text = self.date_text.trim().to_string();
        let date = if text.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    self.error_message = Some(format!("Invalid date '{}', use YYYY-MM-DD", text));
                    return;
                },
            }
        };
        self.mode = Mode::Normal;
        self.update_filter(|f| f.date = date);
    }

    // =========================================================================
    // Mode Transitions
    // =========================================================================

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_text.clear();
        self.command_suggestions = self.get_available_commands();
        self.command_suggestion_selected = 0;
        self.command_preview = None;
    }

    pub fn update_command_suggestions(&mut self) {
        let input = self.command_text.to_lowercase();
        let all_commands = self.get_available_commands();

        self.command_suggestions = rank_commands(all_commands, &input);

        if self.command_suggestion_selected >= self.command_suggestions.len() {
            self.command_suggestion_selected = 0;
        }

        self.update_preview();
    }

    fn update_preview(&mut self) {
        self.command_preview = self
            .command_suggestions
            .get(self.command_suggestion_selected)
            .cloned();
    }

    pub fn next_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            self.command_suggestion_selected =
                (self.command_suggestion_selected + 1) % self.command_suggestions.len();
            self.update_preview();
        }
    }

    pub fn prev_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            if self.command_suggestion_selected == 0 {
                self.command_suggestion_selected = self.command_suggestions.len() - 1;
            } else {
                self.command_suggestion_selected -= 1;
            }
            self.update_preview();
        }
    }

    pub fn apply_suggestion(&mut self) {
        if let Some(preview) = &self.command_preview {
            self.command_text = preview.clone();
            self.update_command_suggestions();
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn enter_describe_mode(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        self.describe_id = Some(row.id.clone());
        self.describe_scroll = 0;
        self.mode = Mode::Describe;
    }

    pub fn enter_notifications_mode(&mut self) {
        self.notifications_selected = 0;
        self.mode = Mode::Notifications;
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.lock().clear();
        self.notifications_selected = 0;
    }

    pub fn show_warning(&mut self, message: &str) {
        self.warning_message = Some(message.to_string());
        self.mode = Mode::Warning;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.pending_delete = None;
        self.picker = None;
        self.describe_id = None;
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Close the list view and show the sign-in form
    pub fn enter_sign_in(&mut self) {
        if !self.current_resource_key.is_empty() {
            self.pending_resource = self.current_resource_key.clone();
        }
        self.close_view();
        self.parent_context = None;
        self.navigation_stack.clear();
        self.form = None;
        self.picker = None;
        self.pending_delete = None;
        self.sign_in = Self::sign_in_form();
        self.mode = Mode::SignIn;
    }

    pub fn submit_sign_in(&mut self) {
        if self.sign_in.submitting {
            return;
        }
        self.sign_in.message = None;
        if !self.sign_in.draft.validate() {
            return;
        }
        self.sign_in.submitting = true;

        let client = self.ctx.client.clone();
        let email = self.sign_in.draft.value("email").trim().to_string();
        let password = self.sign_in.draft.value("password").to_string();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.sign_in(&email, &password).await;
            let _ = tx.send(AppEvent::SignedIn(result));
        });
    }

    fn finish_sign_in(&mut self, result: Result<AdminUser, ApiError>) {
        self.sign_in.submitting = false;
        match result {
            Ok(user) => {
                self.ctx.notifier.notify(Notification::success(
                    OperationType::SignIn,
                    "",
                    format!("Signed in as {}", user.display_name()),
                ));
                let key = self.pending_resource.clone();
                self.navigate_to_resource(&key);
            },
            Err(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                let message = if e.is_unauthorized() {
                    "Invalid email or password".to_string()
                } else {
                    e.user_message("Sign-in failed, check the API URL and try again")
                };
                self.sign_in.message = Some(message);
            },
        }
    }

    pub fn sign_out(&mut self) {
        self.ctx.client.sign_out();
        self.ctx.notifier.notify(Notification::info(
            OperationType::SignOut,
            "",
            "Signed out",
        ));
        self.enter_sign_in();
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Warn and return false in read-only mode
    fn check_writable(&mut self) -> bool {
        if self.readonly {
            self.show_warning(READONLY_MESSAGE);
            return false;
        }
        true
    }

    fn reference_options(
        view: &dyn ResourceView,
        draft: &FormDraft,
    ) -> HashMap<String, Vec<(String, String)>> {
        draft
            .fields()
            .iter()
            .filter(|f| f.kind == FieldKind::Reference)
            .map(|f| (f.name.clone(), view.dependency_options(&f.name)))
            .collect()
    }

    fn open_form(&mut self, form: FormState) {
        self.form_generation += 1;
        self.form = Some(form);
        self.mode = Mode::Form;
    }

    pub fn start_create(&mut self) {
        if !self.check_writable() {
            return;
        }
        let Some(view) = &self.view else {
            return;
        };
        let def = view.def();
        if !def.creatable {
            let message = format!("{} cannot be created here", def.display_name);
            self.show_warning(&message);
            return;
        }

        let draft = view.template();
        let options = Self::reference_options(view.as_ref(), &draft);
        let form = FormState::new(format!("New {}", def.singular), draft, None, options);
        self.open_form(form);
    }

    pub fn start_edit(&mut self) {
        if !self.check_writable() {
            return;
        }
        let Some(id) = self.selected_row().map(|r| r.id.clone()) else {
            return;
        };
        let Some(view) = &self.view else {
            return;
        };
        let def = view.def();
        if !def.editable {
            let message = format!("{} cannot be edited", def.display_name);
            self.show_warning(&message);
            return;
        }
        let Some(draft) = view.draft_for(&id) else {
            return;
        };

        let options = Self::reference_options(view.as_ref(), &draft);
        let form = FormState::new(format!("Edit {}", def.singular), draft, Some(id), options);
        self.open_form(form);
    }

    pub fn submit_form(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        form.submitting = true;

        let future = view.submit(form.editing_id.clone(), form.draft.clone());
        let tx = self.events_tx.clone();
        let generation = self.form_generation;
        tokio::spawn(async move {
            let outcome = future.await;
            let _ = tx.send(AppEvent::Submitted {
                generation,
                outcome,
            });
        });
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.form_generation += 1;
        self.mode = Mode::Normal;
    }

    pub fn toggle_selected(&mut self) {
        if !self.check_writable() {
            return;
        }
        let Some(id) = self.selected_row().map(|r| r.id.clone()) else {
            return;
        };
        let Some(view) = &self.view else {
            return;
        };
        if view.def().status_field.is_none() {
            let message = format!("{} have no status", view.def().display_name);
            self.show_warning(&message);
            return;
        }

        let future = view.toggle_status(id);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            future.await;
            let _ = tx.send(AppEvent::MutationDone);
        });
    }

    pub fn request_delete(&mut self) {
        if !self.check_writable() {
            return;
        }
        let Some(id) = self.selected_row().map(|r| r.id.clone()) else {
            return;
        };
        let Some(view) = &self.view else {
            return;
        };
        match view.delete_request(&id) {
            Some(request) => {
                self.pending_delete = Some(PendingDelete {
                    request,
                    selected_yes: false,
                });
                self.mode = Mode::Confirm;
            },
            None => {
                let message = format!("{} cannot be deleted", view.def().display_name);
                self.show_warning(&message);
            },
        }
    }

    /// Run the pending delete if the user said yes
    pub fn confirm_delete(&mut self, yes: bool) {
        let pending = self.pending_delete.take();
        self.mode = Mode::Normal;

        let (Some(pending), Some(view)) = (pending, &self.view) else {
            return;
        };
        if !yes {
            return;
        }

        let future = view.delete(pending.request.confirm());
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            future.await;
            let _ = tx.send(AppEvent::MutationDone);
        });
    }

    // =========================================================================
    // Resource Navigation
    // =========================================================================

    fn close_view(&mut self) {
        if let Some(view) = self.view.take() {
            view.close();
        }
        self.page = PageView::default();
        self.load_failed = false;
    }

    /// Open `key` as the current list, scoped to a parent if given
    fn open(&mut self, key: &str, scope: Option<(String, String)>) -> bool {
        if !self.signed_in() {
            self.current_resource_key = key.to_string();
            self.enter_sign_in();
            return false;
        }

        let Some(view) = open_view(key, &self.ctx, scope) else {
            self.error_message = Some(format!("Unknown resource: {}", key));
            return false;
        };

        self.close_view();
        self.view = Some(view);
        self.view_generation += 1;
        self.current_resource_key = key.to_string();
        self.selected = 0;
        self.scroll_offset = 0;
        self.filter_text.clear();
        self.filter_active = false;
        self.form = None;
        self.mode = Mode::Normal;

        self.spawn_load();
        self.sync_page();
        true
    }

    pub fn navigate_to_resource(&mut self, resource_key: &str) {
        if get_resource(resource_key).is_none() {
            self.error_message = Some(format!("Unknown resource: {}", resource_key));
            return;
        }

        self.parent_context = None;
        self.navigation_stack.clear();
        self.reselect_id = None;

        if self.open(resource_key, None) {
            if let Err(e) = self.config.set_last_resource(resource_key) {
                tracing::warn!("Failed to save last resource: {:#}", e);
            }
        }
    }

    pub fn navigate_to_sub_resource(&mut self, sub_resource_key: &str) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        let Some(view) = &self.view else {
            return;
        };

        let Some(sub) = view
            .def()
            .sub_resources
            .iter()
            .find(|s| s.resource_key == sub_resource_key)
        else {
            self.error_message = Some(format!(
                "{} is not a sub-resource of {}",
                sub_resource_key, self.current_resource_key
            ));
            return;
        };

        let parent_value = view
            .record_field(&row.id, &sub.parent_field)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| row.id.clone());
        let scope = (sub.filter_param.clone(), parent_value);
        let parent_scope = view.scope().into_iter().next();

        if let Some(ctx) = self.parent_context.take() {
            self.navigation_stack.push(ctx);
        }
        self.parent_context = Some(ParentContext {
            resource_key: self.current_resource_key.clone(),
            scope: parent_scope,
            id: row.id.clone(),
            display_name: row.label.clone(),
        });

        self.reselect_id = None;
        self.open(sub_resource_key, Some(scope));
    }

    pub fn navigate_back(&mut self) {
        if let Some(parent) = self.parent_context.take() {
            self.parent_context = self.navigation_stack.pop();
            self.reselect_id = Some(parent.id.clone());
            self.open(&parent.resource_key, parent.scope);
        }
    }

    pub fn get_breadcrumb(&self) -> Vec<String> {
        let mut path = Vec::new();

        for ctx in &self.navigation_stack {
            path.push(format!("{}:{}", ctx.resource_key, ctx.display_name));
        }

        if let Some(ctx) = &self.parent_context {
            path.push(format!("{}:{}", ctx.resource_key, ctx.display_name));
        }

        path.push(self.current_resource_key.clone());
        path
    }

    // =========================================================================
    // Command Execution
    // =========================================================================

    /// Run the command line; returns true to quit
    pub fn execute_command(&mut self) -> bool {
        // Typed text wins when it is a complete command, else the suggestion
        let typed = self.command_text.trim().to_string();
        let command_text = match &self.command_preview {
            Some(preview) if typed.is_empty() || !self.get_available_commands().contains(&typed) => {
                preview.clone()
            },
            _ => typed,
        };

        let parts: Vec<&str> = command_text.split_whitespace().collect();
        let Some(&cmd) = parts.first() else {
            return false;
        };

        self.mode = Mode::Normal;
        match cmd {
            "q" | "quit" => return true,
            "back" => self.navigate_back(),
            "help" => self.enter_help_mode(),
            "signout" | "logout" => self.sign_out(),
            "notifications" => {
                if parts.get(1) == Some(&"clear") {
                    self.clear_notifications();
                } else {
                    self.enter_notifications_mode();
                }
            },
            _ => {
                if get_resource(cmd).is_some() {
                    let is_sub = self
                        .current_resource()
                        .map(|r| r.sub_resources.iter().any(|s| s.resource_key == cmd))
                        .unwrap_or(false);
                    if is_sub && self.selected_row().is_some() {
                        self.navigate_to_sub_resource(cmd);
                    } else {
                        self.navigate_to_resource(cmd);
                    }
                } else {
                    self.error_message = Some(format!("Unknown command: {}", cmd));
                }
            },
        }

        false
    }

    // =========================================================================
    // Virtual Scrolling
    // =========================================================================

    /// Update the viewport height (called from UI during render)
    pub fn update_viewport(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    /// Ensure the selected row is visible in the viewport
    pub fn ensure_visible(&mut self) {
        self.scroll_offset = scroll_for(
            self.selected,
            self.scroll_offset,
            self.viewport_height,
            self.page.rows.len(),
        );
    }

    /// Get the range of visible rows based on scroll offset and viewport
    pub fn visible_range(&self) -> Range<usize> {
        visible_range(self.scroll_offset, self.viewport_height, self.page.rows.len())
    }
}

/// Keep `selected` at least two rows from the viewport edges
fn scroll_for(selected: usize, offset: usize, height: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let margin = 2;

    let offset = if selected < offset + margin {
        selected.saturating_sub(margin)
    } else if selected >= offset + height.saturating_sub(margin) {
        selected.saturating_sub(height.saturating_sub(margin + 1))
    } else {
        offset
    };

    offset.min(len.saturating_sub(height))
}

fn visible_range(offset: usize, height: usize, len: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = (offset + height).min(len);
    start..end
}

/// Order matching commands: prefix matches, then substring, then fuzzy
fn rank_commands(commands: Vec<String>, input: &str) -> Vec<String> {
    if input.is_empty() {
        return commands;
    }

    let mut ranked: Vec<(u8, String)> = commands
        .into_iter()
        .filter_map(|cmd| {
            let rank = if cmd.starts_with(input) {
                0
            } else if cmd.contains(input) {
                1
            } else if is_subsequence(input, &cmd) {
                2
            } else {
                return None;
            };
            Some((rank, cmd))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}
