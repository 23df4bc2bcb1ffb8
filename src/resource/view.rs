//! Type-erased list view over a [`ResourceManager`]
//!
//! The console holds the open view as `Box<dyn ResourceView>` so it can
//! switch between entity types; everything crossing this boundary is plain
//! strings and JSON.

use super::confirm::{ConfirmedDelete, DeleteRequest};
use super::filter::FilterState;
use super::manager::{LoadOutcome, ResourceManager, SubmitOutcome};
use super::registry::ResourceDef;
use crate::entity::Record;
use crate::form::FormDraft;
use futures::future::BoxFuture;
use serde_json::Value;

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: String,
    pub label: String,
    /// Display text per configured column
    pub cells: Vec<String>,
}

/// Everything the table needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub rows: Vec<RowView>,
    pub page: usize,
    pub page_count: usize,
    /// Size of the full collection
    pub total: usize,
    /// Size after filtering
    pub matching: usize,
    pub loading: bool,
    pub mutating: bool,
    pub loaded: bool,
}

pub trait ResourceView: Send + Sync {
    fn key(&self) -> &'static str;
    fn def(&self) -> &'static ResourceDef;
    fn page_view(&self) -> PageView;
    fn filter_state(&self) -> FilterState;
    fn set_filter(&self, filter: FilterState);
    fn set_page(&self, page: usize);
    fn dependency_options(&self, field: &str) -> Vec<(String, String)>;
    /// Raw record as JSON, for the details view
    fn record_json(&self, id: &str) -> Option<Value>;
    /// Value of a record field as form input text
    fn record_field(&self, id: &str, field: &str) -> Option<String>;
    fn template(&self) -> FormDraft;
    fn draft_for(&self, id: &str) -> Option<FormDraft>;
    fn delete_request(&self, id: &str) -> Option<DeleteRequest>;
    fn scope(&self) -> Vec<(String, String)>;
    fn is_busy(&self) -> bool;

    fn load(&self) -> BoxFuture<'static, LoadOutcome>;
    fn submit(&self, id: Option<String>, draft: FormDraft) -> BoxFuture<'static, SubmitOutcome>;
    fn toggle_status(&self, id: String) -> BoxFuture<'static, bool>;
    fn delete(&self, confirmed: ConfirmedDelete) -> BoxFuture<'static, bool>;
    fn close(&self);
}

impl<R: Record> ResourceView for ResourceManager<R> {
    fn key(&self) -> &'static str {
        R::KEY
    }

    fn def(&self) -> &'static ResourceDef {
        ResourceManager::def(self)
    }

    fn page_view(&self) -> PageView {
        let total = self.items().len();
        let filtered = self.filtered();
        let page_count = self.page_count();
        let page = self.current_page();
        let records = super::paginate::paginate(&filtered, page, self.page_size());

        let rows = self
            .rows(records)
            .into_iter()
            .map(|(id, label, cells)| RowView { id, label, cells })
            .collect();

        PageView {
            rows,
            page,
            page_count,
            total,
            matching: filtered.len(),
            loading: self.is_loading(),
            mutating: self.is_mutating(),
            loaded: self.has_loaded(),
        }
    }

    fn filter_state(&self) -> FilterState {
        ResourceManager::filter_state(self)
    }

    fn set_filter(&self, filter: FilterState) {
        ResourceManager::set_filter(self, filter)
    }

    fn set_page(&self, page: usize) {
        ResourceManager::set_page(self, page)
    }

    fn dependency_options(&self, field: &str) -> Vec<(String, String)> {
        ResourceManager::dependency_options(self, field)
    }

    fn record_json(&self, id: &str) -> Option<Value> {
        self.find(id).and_then(|r| serde_json::to_value(r).ok())
    }

    fn record_field(&self, id: &str, field: &str) -> Option<String> {
        self.find(id).map(|r| r.field(field).as_input())
    }

    fn template(&self) -> FormDraft {
        ResourceManager::template(self)
    }

    fn draft_for(&self, id: &str) -> Option<FormDraft> {
        ResourceManager::draft_for(self, id)
    }

    fn delete_request(&self, id: &str) -> Option<DeleteRequest> {
        ResourceManager::delete_request(self, id)
    }

    fn scope(&self) -> Vec<(String, String)> {
        ResourceManager::scope(self).to_vec()
    }

    fn is_busy(&self) -> bool {
        self.is_mutating()
    }

    fn load(&self) -> BoxFuture<'static, LoadOutcome> {
        let manager = self.clone();
        Box::pin(async move { manager.load().await })
    }

    fn submit(&self, id: Option<String>, draft: FormDraft) -> BoxFuture<'static, SubmitOutcome> {
        let manager = self.clone();
        Box::pin(async move { manager.submit(id.as_deref(), draft).await })
    }

    fn toggle_status(&self, id: String) -> BoxFuture<'static, bool> {
        let manager = self.clone();
        Box::pin(async move { manager.toggle_status(&id).await })
    }

    fn delete(&self, confirmed: ConfirmedDelete) -> BoxFuture<'static, bool> {
        let manager = self.clone();
        Box::pin(async move { manager.delete(confirmed).await })
    }

    fn close(&self) {
        ResourceManager::close(self)
    }
}
