//! Accounts page rendering - Full page and HTMX partials

use crate::AppState;
use axum::extract::Path;
use axum::response::Html;
use bankweb_utils::{escape_html, format_timestamp};

/// Accounts page; reloads the list from the bank API first
pub async fn page_accounts(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    // a failed load is logged by the view and the last snapshot is shown
    let _ = state.view.refresh_list().await;

    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <h2 class='text-2xl font-bold'>Accounts</h2>
            <button hx-get='/accounts/list' hx-target='#accounts-table' class='px-3 py-1 text-sm border rounded-lg hover:bg-gray-100'>Refresh view</button>
        </div>
        <div id='accounts-table' class='bg-white rounded-xl shadow-sm p-6 mb-6'>{}</div>
        <div id='history-panel' class='bg-white rounded-xl shadow-sm p-6'>{}</div>"#,
        render_accounts_table(&state),
        render_history(&state)
    );

    Html(crate::page_response(&headers, "Kata : Accounts", "/accounts", &inner_content))
}

/// Table partial from the current snapshot
pub async fn htmx_accounts_list(state: axum::extract::State<AppState>) -> Html<String> {
    Html(render_accounts_table(&state))
}

/// Load one account's history and render the history panel
pub async fn htmx_account_history(
    state: axum::extract::State<AppState>,
    Path(number): Path<String>,
) -> Html<String> {
    // on failure the previously displayed history stays
    let _ = state.view.show_operation_history(&number).await;
    Html(render_history(&state))
}

pub fn render_accounts_table(state: &AppState) -> String {
    let items = state.view.items();
    if items.is_empty() {
        return "<p class='text-gray-500 text-center py-8'>No accounts</p>".to_string();
    }

    let rows: Vec<String> = items
        .iter()
        .map(|account| {
            let number = escape_html(&account.account_number);
            let path = urlencoding::encode(&account.account_number);
            let balance_class = if account.current_balance < 0 { "text-red-600" } else { "text-gray-900" };
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='py-2 px-3 font-mono text-sm'>{number}</td>
                    <td class='py-2 px-3'>{owner}</td>
                    <td class='py-2 px-3 text-right font-medium {balance_class}'>{balance}</td>
                    <td class='py-2 px-3 text-sm text-gray-500'>{created}</td>
                    <td class='py-2 px-3 text-right space-x-2'>
                        <button hx-get='/accounts/{path}/history' hx-target='#history-panel' class='px-2 py-1 text-sm border rounded hover:bg-gray-100'>History</button>
                        <button hx-get='/accounts/{path}/deposit' hx-target='#modal' class='px-2 py-1 text-sm bg-green-600 text-white rounded hover:bg-green-700'>Deposit</button>
                        <button hx-get='/accounts/{path}/withdrawal' hx-target='#modal' class='px-2 py-1 text-sm bg-red-600 text-white rounded hover:bg-red-700'>Withdrawal</button>
                    </td>
                </tr>"#,
                number = number,
                owner = escape_html(&account.owner_name),
                balance_class = balance_class,
                balance = state.money(account.current_balance),
                created = account.created_at.as_ref().map(format_timestamp).unwrap_or_default(),
                path = path,
            )
        })
        .collect();

    format!(
        r#"<table class='w-full'>
            <thead><tr class='text-left text-sm text-gray-500 border-b'>
                <th class='py-2 px-3'>Account number</th>
                <th class='py-2 px-3'>Owner</th>
                <th class='py-2 px-3 text-right'>Current balance</th>
                <th class='py-2 px-3'>Created at</th>
                <th class='py-2 px-3'></th>
            </tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        rows.join("")
    )
}

pub fn render_history(state: &AppState) -> String {
    let Some(account_number) = state.view.history_account() else {
        return "<p class='text-gray-500 text-center py-8'>Select an account to see its operations</p>".to_string();
    };
    let operations = state.view.operation_history();

    let rows: Vec<String> = operations
        .iter()
        .map(|op| {
            let (label, class) = match op.operation {
                Some(kind) => (
                    kind.label(),
                    if kind == bankweb_core::OperationKind::Deposit { "text-green-600" } else { "text-red-600" },
                ),
                None => ("", "text-gray-900"),
            };
            format!(
                r#"<tr class='border-b'>
                    <td class='py-2 px-3 text-sm text-gray-500'>{}</td>
                    <td class='py-2 px-3'>{}</td>
                    <td class='py-2 px-3 text-right font-medium {}'>{}</td>
                    <td class='py-2 px-3 text-right'>{}</td>
                    <td class='py-2 px-3'>{}</td>
                </tr>"#,
                op.transaction_at.as_ref().map(format_timestamp).unwrap_or_default(),
                label,
                class,
                op.amount.map(|a| state.money(a)).unwrap_or_default(),
                op.account_balance.map(|b| state.money(b)).unwrap_or_default(),
                escape_html(op.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let body = if rows.is_empty() {
        "<tr><td colspan='5' class='py-8 text-center text-gray-500'>No operations</td></tr>".to_string()
    } else {
        rows.join("")
    };

    format!(
        r#"<h3 class='text-lg font-semibold mb-4'>Operations of <span class='font-mono'>{}</span></h3>
        <table class='w-full'>
            <thead><tr class='text-left text-sm text-gray-500 border-b'>
                <th class='py-2 px-3'>Date</th>
                <th class='py-2 px-3'>Operation</th>
                <th class='py-2 px-3 text-right'>Amount</th>
                <th class='py-2 px-3 text-right'>Balance</th>
                <th class='py-2 px-3'>Description</th>
            </tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        escape_html(&account_number),
        body
    )
}
