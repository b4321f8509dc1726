//! Dashboard page rendering

use crate::AppState;
use bankweb_core::LoadState;

/// Welcome page with figures from the last loaded account list,
/// loading it when nothing was fetched yet
pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    if matches!(state.view.items_state(), LoadState::Idle) {
        // errors are logged by the view; the page shows what it has
        let _ = state.view.refresh_list().await;
    }
    let items = state.view.items();
    let total: i64 = items.iter().map(|a| a.current_balance).sum();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Welcome to the bank account kata</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 gap-4 mb-6'>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Accounts</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Total balance</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <p class='text-gray-600'>Figures come from the last account list loaded from the bank API.</p>
            <a href='/accounts' class='inline-block mt-4 px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Go to accounts</a>
        </div>"#,
        items.len(),
        state.money(total),
    );

    axum::response::Html(crate::page_response(&headers, "Kata : Bank Account", "/dashboard", &inner_content))
}
