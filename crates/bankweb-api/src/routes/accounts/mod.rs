//! Account routes - Account table and operation history
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page and HTMX partials

pub mod api;
pub mod page;

pub use api::{api_accounts, api_history};
pub use page::{htmx_account_history, htmx_accounts_list, page_accounts, render_accounts_table, render_history};
