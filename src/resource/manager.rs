//! Generic resource manager
//!
//! One [`ResourceManager`] drives one REST-backed collection: it loads the
//! collection and its dependency lookups, filters and paginates in memory,
//! and issues create/update/patch/toggle/delete calls, re-fetching after
//! every successful mutation. Failures are reported through the
//! [`Notifier`] and never propagate to the caller; prior state is kept.

use super::confirm::{ConfirmedDelete, DeleteRequest};
use super::fetcher::{fetch_collection, fetch_lookup, Lookup};
use super::filter::{apply_filters, FilterState};
use super::guard::FetchGuard;
use super::paginate::{page_count, paginate, PageResetPolicy};
use super::registry::{get_resource, ResourceDef};
use crate::api::{ApiClient, ApiError};
use crate::entity::{FieldValue, Record};
use crate::form::FormDraft;
use crate::notification::{Notification, Notifier, OperationType};
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Settings applied uniformly to every manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerSettings {
    pub page_size: usize,
    pub page_reset: PageResetPolicy,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_reset: PageResetPolicy::Reset,
        }
    }
}

/// How a [`ResourceManager::load`] call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fresh data replaced the collection
    Applied,
    /// The call failed; the previous collection is kept
    Failed,
    /// A newer load was issued or the view was closed; nothing was written
    Discarded,
    /// No session; no request was sent
    SignedOut,
}

/// Result of submitting a form draft
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Saved,
    /// Not saved; the draft carries any field errors (client-side or conflict)
    Rejected(FormDraft),
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved)
    }
}

struct ManagerState<R> {
    items: Vec<R>,
    /// Dependency lookups keyed by foreign-key field
    lookups: HashMap<String, Lookup>,
    filter: FilterState,
    page: usize,
    loading: bool,
    mutating: bool,
    loaded: bool,
}

impl<R> Default for ManagerState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            lookups: HashMap::new(),
            filter: FilterState::default(),
            page: 1,
            loading: false,
            mutating: false,
            loaded: false,
        }
    }
}

/// Cheaply cloneable handle to one managed collection
pub struct ResourceManager<R: Record> {
    def: &'static ResourceDef,
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    settings: ManagerSettings,
    /// Query parameters scoping the collection to a parent record
    scope: Vec<(String, String)>,
    state: Arc<Mutex<ManagerState<R>>>,
    guard: FetchGuard,
}

impl<R: Record> Clone for ResourceManager<R> {
    fn clone(&self) -> Self {
        Self {
            def: self.def,
            client: self.client.clone(),
            notifier: self.notifier.clone(),
            settings: self.settings,
            scope: self.scope.clone(),
            state: self.state.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<R: Record> ResourceManager<R> {
    /// Manager for `R`; `None` when no definition is registered for `R::KEY`
    pub fn new(
        client: ApiClient,
        notifier: Arc<dyn Notifier>,
        settings: ManagerSettings,
    ) -> Option<Self> {
        let def = get_resource(R::KEY)?;
        Some(Self {
            def,
            client,
            notifier,
            settings,
            scope: Vec::new(),
            state: Arc::new(Mutex::new(ManagerState::default())),
            guard: FetchGuard::new(),
        })
    }

    /// Scope the collection by a query parameter (`productId=p1`)
    pub fn with_scope(mut self, param: &str, value: &str) -> Self {
        self.scope.push((param.to_string(), value.to_string()));
        self
    }

    pub fn def(&self) -> &'static ResourceDef {
        self.def
    }

    pub fn scope(&self) -> &[(String, String)] {
        &self.scope
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState<R>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the collection and its dependency lookups in parallel.
    ///
    /// Without a session nothing is sent. A response that is no longer the
    /// latest issued, or that arrives after [`close`](Self::close), is
    /// dropped. On failure one notification is shown (none for 401, which
    /// the client already reported) and the previous items are kept.
    pub async fn load(&self) -> LoadOutcome {
        if !self.client.session().is_active() {
            tracing::debug!("No session, skipping load of {}", self.def.path);
            return LoadOutcome::SignedOut;
        }
        if !self.guard.is_open() {
            return LoadOutcome::Discarded;
        }

        let ticket = self.guard.issue();
        self.lock().loading = true;

        let client = &self.client;
        let primary = fetch_collection::<R>(client, self.def, &self.scope);
        let dependencies = join_all(self.def.dependencies.iter().filter_map(|dep| {
            let dep_def = get_resource(&dep.resource_key)?;
            Some(async move {
                let lookup = fetch_lookup(client, dep_def, &dep.fallback_label).await;
                (dep.field.clone(), lookup)
            })
        }));

        let (primary, dependencies) = tokio::select! {
            _ = self.guard.scope().cancelled() => {
                tracing::debug!("{} view closed, dropping load", self.def.path);
                return LoadOutcome::Discarded;
            }
            results = async { tokio::join!(primary, dependencies) } => results,
        };

        if !self.guard.is_current(ticket) {
            tracing::debug!("Discarding stale {} response #{}", self.def.path, ticket.seq());
            return LoadOutcome::Discarded;
        }

        let failure = {
            let mut state = self.lock();
            state.loading = false;

            for (field, lookup) in dependencies {
                match lookup {
                    Ok(lookup) => {
                        state.lookups.insert(field, lookup);
                    }
                    Err(e) => tracing::warn!("Failed to load lookup for {}: {}", field, e),
                }
            }

            match primary {
                Ok(items) => {
                    state.items = items;
                    state.loaded = true;
                    let pages = self.page_count_of(&state);
                    state.page = state.page.clamp(1, pages.max(1));
                    None
                }
                Err(e) => Some(e),
            }
        };

        match failure {
            None => LoadOutcome::Applied,
            Some(e) => {
                tracing::warn!("Failed to load {}: {}", self.def.path, e);
                if !e.is_unauthorized() {
                    let fallback = format!("Failed to load {}", self.def.display_name.to_lowercase());
                    self.notify(Notification::error(
                        OperationType::Load,
                        R::KEY,
                        e.user_message(&fallback),
                    ));
                }
                LoadOutcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_mutating(&self) -> bool {
        self.lock().mutating
    }

    /// Whether at least one load has succeeded
    pub fn has_loaded(&self) -> bool {
        self.lock().loaded
    }

    /// Tear down the view scope; in-flight work skips its state writes
    pub fn close(&self) {
        self.guard.close();
    }

    pub fn is_closed(&self) -> bool {
        !self.guard.is_open()
    }

    // =========================================================================
    // Filtering and pagination
    // =========================================================================

    /// Full in-memory collection
    pub fn items(&self) -> Vec<R> {
        self.lock().items.clone()
    }

    pub fn find(&self, id: &str) -> Option<R> {
        self.lock().items.iter().find(|r| r.id() == id).cloned()
    }

    /// Items matching the current filter
    pub fn filtered(&self) -> Vec<R> {
        let state = self.lock();
        apply_filters(&state.items, &state.filter.predicates(self.def))
    }

    /// Items on the current page of the filtered collection
    pub fn page_items(&self) -> Vec<R> {
        let state = self.lock();
        let filtered = apply_filters(&state.items, &state.filter.predicates(self.def));
        paginate(&filtered, state.page, self.settings.page_size).to_vec()
    }

    pub fn filter_state(&self) -> FilterState {
        self.lock().filter.clone()
    }

    /// Replace the filter; the page follows the configured reset policy
    pub fn set_filter(&self, filter: FilterState) {
        let mut state = self.lock();
        if state.filter == filter {
            return;
        }
        state.filter = filter;
        let pages = self.page_count_of(&state);
        state.page = self.settings.page_reset.next_page(state.page, pages);
    }

    /// Go to `page`, clamped to the available pages
    pub fn set_page(&self, page: usize) {
        let mut state = self.lock();
        let pages = self.page_count_of(&state);
        state.page = page.clamp(1, pages.max(1));
    }

    pub fn current_page(&self) -> usize {
        self.lock().page
    }

    pub fn page_count(&self) -> usize {
        let state = self.lock();
        self.page_count_of(&state)
    }

    pub fn page_size(&self) -> usize {
        self.settings.page_size
    }

    fn page_count_of(&self, state: &ManagerState<R>) -> usize {
        let predicates = state.filter.predicates(self.def);
        let filtered = state
            .items
            .iter()
            .filter(|item| predicates.iter().all(|p| p.matches(*item)))
            .count();
        page_count(filtered, self.settings.page_size)
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Display text of `field`, resolving foreign keys to labels
    pub fn display(&self, record: &R, field: &str) -> String {
        let state = self.lock();
        self.display_with(&state, record, field)
    }

    fn display_with(&self, state: &ManagerState<R>, record: &R, field: &str) -> String {
        let value = record.field(field);
        match self.def.dependency_for(field) {
            Some(dep) => match (&value, state.lookups.get(field)) {
                (FieldValue::Missing, _) => dep.fallback_label.clone(),
                (_, Some(lookup)) => lookup.resolve(&value.as_input()).to_string(),
                (_, None) => dep.fallback_label.clone(),
            },
            None => value.display(),
        }
    }

    /// Identifying label of a record (used in confirmations and messages)
    pub fn label_of(&self, record: &R) -> String {
        let state = self.lock();
        self.label_with(&state, record)
    }

    fn label_with(&self, state: &ManagerState<R>, record: &R) -> String {
        let label = self.display_with(state, record, &self.def.label_field);
        if label.is_empty() || label == "-" {
            record.id().to_string()
        } else {
            label
        }
    }

    /// Row cells for the configured columns, alongside id and label
    pub fn rows(&self, records: &[R]) -> Vec<(String, String, Vec<String>)> {
        let state = self.lock();
        records
            .iter()
            .map(|record| {
                let cells = self
                    .def
                    .columns
                    .iter()
                    .map(|c| self.display_with(&state, record, &c.field))
                    .collect();
                (record.id().to_string(), self.label_with(&state, record), cells)
            })
            .collect()
    }

    /// (id, label) options of a dependency collection
    pub fn dependency_options(&self, field: &str) -> Vec<(String, String)> {
        self.lock()
            .lookups
            .get(field)
            .map(|l| l.options().to_vec())
            .unwrap_or_default()
    }

    /// Label for a foreign-key value, if the lookup knows it
    pub fn dependency_label(&self, field: &str, id: &str) -> Option<String> {
        self.lock()
            .lookups
            .get(field)
            .map(|l| l.resolve(id).to_string())
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Empty draft for a new record, pre-filled with the parent scope
    pub fn template(&self) -> FormDraft {
        let mut draft = FormDraft::new(self.def.form.clone());
        for (param, value) in &self.scope {
            if draft.field(param).is_some() {
                draft.preset(param, value.clone());
            }
        }
        draft
    }

    /// Draft pre-filled from the record with `id`
    pub fn draft_for(&self, id: &str) -> Option<FormDraft> {
        let record = self.find(id)?;
        Some(FormDraft::prefilled(self.def.form.clone(), |name| {
            record.field(name).as_input()
        }))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn capitalized_singular(&self) -> String {
        let mut chars = self.def.singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Mark a mutation as in flight; refuses (with a warning) if one already is
    fn begin_mutation(&self, op: &OperationType) -> bool {
        {
            let mut state = self.lock();
            if !state.mutating {
                state.mutating = true;
                return true;
            }
        }
        tracing::debug!("Refusing {} while another change is in flight", op.display_name());
        self.notify(Notification::warning(
            op.clone(),
            R::KEY,
            "Another change is still being saved",
        ));
        false
    }

    fn end_mutation(&self) {
        self.lock().mutating = false;
    }

    /// Re-fetch after a successful mutation, unless the view is gone
    async fn refresh_after_mutation(&self) {
        if self.guard.is_open() {
            self.load().await;
        }
    }

    fn report_failure(&self, op: OperationType, err: &ApiError, fallback: &str) {
        tracing::warn!("{} {} failed: {}", op.display_name(), self.def.singular, err);
        if !err.is_unauthorized() {
            self.notify(Notification::error(op, R::KEY, err.user_message(fallback)));
        }
    }

    /// Label for success messages: the draft's label field, resolved
    /// through a dependency lookup when it is a foreign key
    fn draft_label(&self, draft: &FormDraft) -> String {
        let raw = draft.value(&self.def.label_field);
        if raw.is_empty() {
            return self.def.singular.clone();
        }
        self.dependency_label(&self.def.label_field, raw)
            .unwrap_or_else(|| raw.to_string())
    }

    /// Field a 409 should be attached to: the field the server named, or a
    /// unique field its message mentions
    fn conflict_field(&self, err: &ApiError, draft: &FormDraft) -> Option<String> {
        let ApiError::Conflict { message, field } = err else {
            return None;
        };

        if let Some(field) = field.as_deref().filter(|f| draft.field(f).is_some()) {
            return Some(field.to_string());
        }

        let message = message.as_deref()?.to_lowercase();
        self.def
            .unique_fields
            .iter()
            .find(|f| message.contains(&f.to_lowercase()) && draft.field(f).is_some())
            .cloned()
    }

    pub async fn create(&self, draft: FormDraft) -> SubmitOutcome {
        self.submit(None, draft).await
    }

    pub async fn update(&self, id: &str, draft: FormDraft) -> SubmitOutcome {
        self.submit(Some(id), draft).await
    }

    /// Validate and send a draft (POST without `id`, PUT with one).
    ///
    /// An invalid draft is returned with its field errors and nothing is
    /// sent.
    pub async fn submit(&self, id: Option<&str>, mut draft: FormDraft) -> SubmitOutcome {
        let op = if id.is_some() {
            OperationType::Update
        } else {
            OperationType::Create
        };

        if !draft.validate() {
            tracing::debug!("{} draft has {} invalid field(s)", self.def.singular, draft.errors().len());
            return SubmitOutcome::Rejected(draft);
        }

        let allowed = match id {
            Some(_) => self.def.editable,
            None => self.def.creatable,
        };
        if !allowed {
            self.notify(Notification::warning(
                op.clone(),
                R::KEY,
                format!("{} cannot be {}", self.def.display_name, op.past_tense().to_lowercase()),
            ));
            return SubmitOutcome::Rejected(draft);
        }

        if !self.begin_mutation(&op) {
            return SubmitOutcome::Rejected(draft);
        }

        let body = draft.to_body();
        let result = match id {
            Some(id) if self.def.partial_update => {
                tracing::info!("Patching {} {}", self.def.singular, id);
                self.client
                    .patch(&ApiClient::record_path(&self.def.path, id), &body)
                    .await
            }
            Some(id) => {
                tracing::info!("Updating {} {}", self.def.singular, id);
                self.client
                    .put(&ApiClient::record_path(&self.def.path, id), &body)
                    .await
            }
            None => {
                tracing::info!("Creating {}", self.def.singular);
                self.client.post(&self.def.path, &body).await
            }
        };
        self.end_mutation();

        match result {
            Ok(_) => {
                self.notify(Notification::success(
                    op.clone(),
                    R::KEY,
                    format!(
                        "{} '{}' {}",
                        self.capitalized_singular(),
                        self.draft_label(&draft),
                        op.past_tense().to_lowercase()
                    ),
                ));
                self.refresh_after_mutation().await;
                SubmitOutcome::Saved
            }
            Err(err) => {
                if let Some(field) = self.conflict_field(&err, &draft) {
                    let label = draft
                        .field(&field)
                        .map(|f| f.label.clone())
                        .unwrap_or_else(|| field.clone());
                    let message = err.user_message(&format!("{} already exists", label));
                    tracing::warn!("Conflict on {}.{}: {}", self.def.singular, field, message);
                    draft.set_error(&field, message);
                } else {
                    let verb = if id.is_some() { "update" } else { "create" };
                    self.report_failure(op, &err, &format!("Failed to {} {}", verb, self.def.singular));
                }
                SubmitOutcome::Rejected(draft)
            }
        }
    }

    /// Partial update (PATCH) with an arbitrary body, then re-fetch
    pub async fn patch(&self, id: &str, body: Value) -> bool {
        self.patch_as(OperationType::Update, id, body, None).await
    }

    async fn patch_as(
        &self,
        op: OperationType,
        id: &str,
        body: Value,
        success: Option<String>,
    ) -> bool {
        if !self.begin_mutation(&op) {
            return false;
        }
        tracing::info!("Patching {} {}", self.def.singular, id);
        let result = self
            .client
            .patch(&ApiClient::record_path(&self.def.path, id), &body)
            .await;
        self.end_mutation();

        match result {
            Ok(_) => {
                let message = success
                    .unwrap_or_else(|| format!("{} updated", self.capitalized_singular()));
                self.notify(Notification::success(op, R::KEY, message));
                self.refresh_after_mutation().await;
                true
            }
            Err(err) => {
                let fallback = match op {
                    OperationType::Toggle => "Failed to update status".to_string(),
                    _ => format!("Failed to update {}", self.def.singular),
                };
                self.report_failure(op, &err, &fallback);
                false
            }
        }
    }

    /// Flip (or, for enumerated statuses, advance) the status of `id`.
    ///
    /// Only the status field is sent; the list is re-fetched afterwards
    /// rather than patched locally.
    pub async fn toggle_status(&self, id: &str) -> bool {
        let Some(field) = self.def.status_field.as_deref() else {
            return false;
        };
        let Some(record) = self.find(id) else {
            tracing::debug!("toggle_status: no {} with id {}", self.def.singular, id);
            return false;
        };

        let (next_value, next_label) = if self.def.has_boolean_status() {
            let current = record.field(field).as_bool().unwrap_or(false);
            let next = !current;
            (json!(next), if next { "active" } else { "inactive" }.to_string())
        } else {
            let options = self.def.status_options();
            let current = record.field(field).status_key().unwrap_or_default();
            let next = options
                .iter()
                .position(|o| o.eq_ignore_ascii_case(&current))
                .map(|i| options[(i + 1) % options.len()].clone())
                .or_else(|| options.first().cloned());
            let Some(next) = next else {
                return false;
            };
            (json!(next), next)
        };

        let label = self.label_of(&record);
        let message = format!("{} '{}' set to {}", self.capitalized_singular(), label, next_label);
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), next_value);

        self.patch_as(OperationType::Toggle, id, Value::Object(body), Some(message))
            .await
    }

    /// Start the delete flow for `id`; the returned request must be confirmed
    pub fn delete_request(&self, id: &str) -> Option<DeleteRequest> {
        if !self.def.deletable {
            return None;
        }
        let record = self.find(id)?;
        Some(DeleteRequest {
            resource_key: R::KEY.to_string(),
            id: record.id().to_string(),
            label: self.label_of(&record),
            singular: self.def.singular.clone(),
        })
    }

    /// Delete a confirmed record, then re-fetch
    pub async fn delete(&self, confirmed: ConfirmedDelete) -> bool {
        if confirmed.resource_key() != R::KEY {
            tracing::warn!(
                "Confirmed delete for {} handed to {} manager",
                confirmed.resource_key(),
                R::KEY
            );
            return false;
        }

        let op = OperationType::Delete;
        if !self.begin_mutation(&op) {
            return false;
        }
        tracing::info!("Deleting {} {}", self.def.singular, confirmed.id());
        let result = self
            .client
            .delete(&ApiClient::record_path(&self.def.path, confirmed.id()))
            .await;
        self.end_mutation();

        match result {
            Ok(_) => {
                self.notify(Notification::success(
                    op,
                    R::KEY,
                    format!("{} '{}' deleted", self.capitalized_singular(), confirmed.label()),
                ));
                self.refresh_after_mutation().await;
                true
            }
            Err(err) => {
                self.report_failure(op, &err, &format!("Failed to delete {}", self.def.singular));
                false
            }
        }
    }
}
