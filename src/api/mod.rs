//! Admin REST API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Main client: URL building, bearer token, 401 handling
//! - [`http`] - HTTP utilities for REST API calls
//! - [`session`] - Session context and credential storage
//! - [`error`] - Transport error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use tshop::api::client::ApiClient;
//!
//! async fn example(client: &ApiClient) -> Result<(), tshop::api::ApiError> {
//!     let tags = client.get("tags", &[]).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod session;

pub use client::ApiClient;
pub use error::ApiError;
pub use session::{AdminUser, CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionContext};
