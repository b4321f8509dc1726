//! Accounts API endpoints - JSON API

use crate::AppState;
use axum::Json;
use bankweb_core::{Account, LoadState, OperationRecord};
use serde::Serialize;

/// Current account snapshot and how it was obtained
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub items: Vec<Account>,
    pub state: LoadState,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_number: Option<String>,
    pub operations: Vec<OperationRecord>,
    pub state: LoadState,
}

/// Last loaded account list; does not call the bank API
pub async fn api_accounts(state: axum::extract::State<AppState>) -> Json<AccountsResponse> {
    let snapshot = state.view.snapshot();
    Json(AccountsResponse {
        items: snapshot.items,
        state: snapshot.items_state,
    })
}

/// Currently displayed operation history
pub async fn api_history(state: axum::extract::State<AppState>) -> Json<HistoryResponse> {
    let snapshot = state.view.snapshot();
    Json(HistoryResponse {
        account_number: snapshot.history_account,
        operations: snapshot.operation_history,
        state: snapshot.history_state,
    })
}
