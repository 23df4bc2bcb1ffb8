//! tshop - terminal admin console for an e-commerce REST API
//!
//! The library half of the console: the REST transport, the session gate,
//! typed entity records and the generic [`resource::ResourceManager`] that
//! every list view is built on. The terminal front-end lives in the binary.
//!
//! # Module Structure
//!
//! - [`api`] - HTTP client, error taxonomy and session context
//! - [`config`] - Persistent user configuration
//! - [`entity`] - Typed records for every managed collection
//! - [`form`] - Form drafts, validation rules and slug derivation
//! - [`notification`] - Toast and history notifications
//! - [`resource`] - Registry, loader, filters, pagination and the manager

pub mod api;
pub mod config;
pub mod entity;
pub mod form;
pub mod notification;
pub mod resource;
