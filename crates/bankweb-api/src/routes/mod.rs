//! Route modules for the API server
//!
//! Modules with several endpoints are split the same way:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page and partial rendering

pub mod accounts;
pub mod dashboard;
pub mod dialogs;
pub mod not_found;
pub mod settings;
