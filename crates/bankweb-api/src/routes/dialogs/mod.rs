//! Dialog routes - Deposit and withdrawal modals

pub mod page;

pub use page::{htmx_dialog_cancel, htmx_dialog_submit, htmx_open_deposit, htmx_open_withdrawal, render_modal};
