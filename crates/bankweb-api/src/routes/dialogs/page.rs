//! Dialog rendering - Deposit and withdrawal modals
//!
//! The modal is swapped into `#modal`. A successful submit or a cancel
//! answers with an empty modal plus the refreshed account table swapped
//! out-of-band.

use crate::routes::accounts::render_accounts_table;
use crate::{ApiError, AppState};
use axum::extract::Path;
use axum::response::Html;
use axum::Form;
use bankweb_core::{DialogId, DialogOutcome, OperationDialog, OperationForm, OperationKind};
use bankweb_utils::escape_html;

pub async fn htmx_open_deposit(
    state: axum::extract::State<AppState>,
    Path(number): Path<String>,
) -> Result<Html<String>, ApiError> {
    open_dialog(&state, &number, OperationKind::Deposit)
}

pub async fn htmx_open_withdrawal(
    state: axum::extract::State<AppState>,
    Path(number): Path<String>,
) -> Result<Html<String>, ApiError> {
    open_dialog(&state, &number, OperationKind::Withdrawal)
}

fn open_dialog(state: &AppState, number: &str, kind: OperationKind) -> Result<Html<String>, ApiError> {
    let account = state.view.find_account(number).map_err(ApiError::from_core)?;
    let dialog = match kind {
        OperationKind::Deposit => state.view.open_deposit_dialog(&account),
        OperationKind::Withdrawal => state.view.open_withdrawal_dialog(&account),
    };
    let id = state.dialogs.open(dialog.clone());
    Ok(Html(render_modal(state, id, &dialog)))
}

pub async fn htmx_dialog_submit(
    state: axum::extract::State<AppState>,
    Path(id): Path<DialogId>,
    Form(form): Form<OperationForm>,
) -> Result<Html<String>, ApiError> {
    let gateway = state.view.operation_gateway();
    match state.dialogs.submit(id, &form, gateway.as_ref()).await {
        Ok(outcome) => Ok(Html(close_dialog(&state, &outcome).await)),
        // still open: show it again with the error
        Err((_, Some(dialog))) => Ok(Html(render_modal(&state, id, &dialog))),
        Err((error, None)) => Err(ApiError::from_core(error)),
    }
}

pub async fn htmx_dialog_cancel(
    state: axum::extract::State<AppState>,
    Path(id): Path<DialogId>,
) -> Result<Html<String>, ApiError> {
    let outcome = state.dialogs.cancel(id).map_err(ApiError::from_core)?;
    Ok(Html(close_dialog(&state, &outcome).await))
}

async fn close_dialog(state: &AppState, outcome: &DialogOutcome) -> String {
    state.view.dialog_closed(outcome).await;
    format!(
        "<div id='accounts-table' hx-swap-oob='innerHTML'>{}</div>",
        render_accounts_table(state)
    )
}

pub fn render_modal(state: &AppState, id: DialogId, dialog: &OperationDialog) -> String {
    let account = dialog.account();
    let kind = dialog.kind();
    let (accent, hover) = match kind {
        OperationKind::Deposit => ("bg-green-600", "hover:bg-green-700"),
        OperationKind::Withdrawal => ("bg-red-600", "hover:bg-red-700"),
    };
    let error = dialog
        .last_error()
        .map(|e| {
            format!(
                "<div class='mb-4 p-3 bg-red-50 border border-red-200 text-red-700 text-sm rounded-lg'>{}</div>",
                escape_html(e)
            )
        })
        .unwrap_or_default();
    let form = dialog.form();

    format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-40 flex items-center justify-center z-50'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-full max-w-md'>
        <h3 class='text-lg font-semibold mb-1'>{label}</h3>
        <p class='text-sm text-gray-500 mb-4'>{owner} · current balance {balance}</p>
        {error}
        <form hx-post='/dialogs/{id}/submit' hx-target='#modal' class='space-y-4'>
            <div>
                <label class='block text-sm text-gray-600 mb-1'>Account number</label>
                <input name='account_number' value='{number}' readonly class='w-full px-3 py-2 border rounded-lg bg-gray-100 font-mono'>
            </div>
            <div>
                <label class='block text-sm text-gray-600 mb-1'>Amount (cents)</label>
                <input name='amount_in_cents' type='number' step='1' value='{amount}' class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <div>
                <label class='block text-sm text-gray-600 mb-1'>Description</label>
                <input name='description' type='text' value='{description}' class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <div class='flex justify-end gap-2 pt-2'>
                <button type='button' hx-post='/dialogs/{id}/cancel' hx-target='#modal' class='px-4 py-2 border rounded-lg hover:bg-gray-100'>Cancel</button>
                <button type='submit' class='px-4 py-2 text-white rounded-lg {accent} {hover}'>{label}<span class='htmx-indicator'> …</span></button>
            </div>
        </form>
    </div>
</div>"#,
        label = kind.label(),
        owner = escape_html(&account.owner_name),
        balance = state.money(account.current_balance),
        error = error,
        id = id,
        number = escape_html(&account.account_number),
        amount = escape_html(&form.amount_in_cents),
        description = escape_html(&form.description),
        accent = accent,
        hover = hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankweb_config::Config;
    use bankweb_core::{Account, AccountGateway, CoreResult, OperationGateway, OperationRecord, OperationRequest};
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait::async_trait]
    impl AccountGateway for Unreachable {
        async fn load_all_accounts(&self) -> CoreResult<Vec<Account>> {
            Ok(vec![])
        }
    }

    #[async_trait::async_trait]
    impl OperationGateway for Unreachable {
        async fn load_history_for(&self, _account_number: &str) -> CoreResult<Vec<OperationRecord>> {
            Ok(vec![])
        }

        async fn deposit(&self, _request: &OperationRequest) -> CoreResult<OperationRecord> {
            Ok(OperationRecord::default())
        }

        async fn withdrawal(&self, _request: &OperationRequest) -> CoreResult<OperationRecord> {
            Ok(OperationRecord::default())
        }
    }

    fn account() -> Account {
        Account {
            account_number: "ACC-'1".to_string(),
            owner_name: "Bob & Co".to_string(),
            current_balance: -1,
            created_at: None,
        }
    }

    #[test]
    fn test_modal_escapes_account_fields() {
        let state = AppState::new(Config::default(), Arc::new(Unreachable), Arc::new(Unreachable));
        let html = render_modal(&state, 7, &OperationDialog::withdrawal(account()));

        assert!(html.contains("hx-post='/dialogs/7/submit'"));
        assert!(html.contains("hx-post='/dialogs/7/cancel'"));
        assert!(html.contains("value='ACC-&#39;1'"));
        assert!(html.contains("Bob &amp; Co"));
        assert!(html.contains("-0.01€"));
        assert!(html.contains("Withdrawal"));
        assert!(!html.contains("bg-red-50"));
    }
}
