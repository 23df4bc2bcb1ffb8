//! Resource abstraction layer
//!
//! A data-driven approach to managing the shop's admin collections.
//! Resource definitions (paths, columns, filters, forms) are loaded from JSON
//! files at compile time; one generic [`ResourceManager`] per typed record
//! does the loading, filtering, pagination and mutations.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Fetches collections and dependency lookups
//! - [`filter`] - Pure client-side filter predicates
//! - [`paginate`] - Page slicing and the page reset policy
//! - [`guard`] - Fetch sequence numbers and view-lifetime cancellation
//! - [`confirm`] - Confirmation gate in front of deletes
//! - [`manager`] - The generic [`ResourceManager`]
//! - [`view`] - Object-safe [`ResourceView`] used by the console
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `common.json` - Color maps and the sign-in form
//! - `catalog.json` - Products, variants, tags, pricing, SEO, gallery
//! - `content.json` - FAQs
//! - `orders.json` - Order history, returns, replacements
//!
//! # Example
//!
//! ```ignore
//! use tshop::entity::Tag;
//! use tshop::resource::{ManagerSettings, ResourceManager};
//!
//! async fn list_tags(client: ApiClient, notifier: Arc<dyn Notifier>) {
//!     let tags = ResourceManager::<Tag>::new(client, notifier, ManagerSettings::default()).unwrap();
//!     tags.load().await;
//!     for tag in tags.page_items() {
//!         println!("{}", tag.name);
//!     }
//! }
//! ```

pub mod confirm;
pub mod fetcher;
pub mod filter;
pub mod guard;
pub mod manager;
pub mod paginate;
pub mod registry;
pub mod view;

pub use confirm::{ConfirmedDelete, DeleteRequest};
pub use fetcher::{extract_json_value, fetch_collection, fetch_lookup, Lookup};
pub use filter::{apply_filters, FilterState, Predicate};
pub use manager::{LoadOutcome, ManagerSettings, ResourceManager, SubmitOutcome};
pub use paginate::{page_count, paginate, PageResetPolicy};
pub use registry::*;
pub use view::{PageView, ResourceView, RowView};
