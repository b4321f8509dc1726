//! Accounts view state
//!
//! Holds the account list and the currently displayed operation history.
//! Both are immutable snapshots replaced wholesale when a fetch completes;
//! a failed fetch keeps the previous snapshot visible. Locks are never held
//! across a gateway call.

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dialog::{DialogOutcome, OperationDialog};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::gateway::{AccountGateway, OperationGateway};
use crate::models::{Account, OperationRecord};
use crate::types::{LoadState, RefreshPolicy};

/// One fetched collection plus the bookkeeping that orders fetches
#[derive(Debug)]
struct Slot<T> {
    data: Arc<Vec<T>>,
    state: LoadState,
    /// Last ticket handed out
    issued: u64,
    /// Ticket of the fetch whose outcome is currently shown
    applied: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            data: Arc::new(Vec::new()),
            state: LoadState::Idle,
            issued: 0,
            applied: 0,
        }
    }
}

impl<T> Slot<T> {
    fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.state = LoadState::Loading;
        self.issued
    }

    /// Apply a finished fetch; returns false when a newer one already landed
    fn complete(&mut self, ticket: u64, result: Result<Vec<T>, String>) -> bool {
        if ticket < self.applied {
            return false;
        }
        self.applied = ticket;
        let latest = ticket == self.issued;
        match result {
            Ok(items) => {
                self.data = Arc::new(items);
                if latest {
                    self.state = LoadState::Loaded;
                }
            }
            Err(message) => {
                if latest {
                    self.state = LoadState::Failed { message };
                }
            }
        }
        true
    }
}

#[derive(Debug, Default)]
struct ViewState {
    items: Slot<Account>,
    history: Slot<OperationRecord>,
    history_account: Option<String>,
}

/// Serializable copy of the view, for the JSON API
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub items: Vec<Account>,
    pub items_state: LoadState,
    pub operation_history: Vec<OperationRecord>,
    pub history_state: LoadState,
    pub history_account: Option<String>,
}

/// Accounts page orchestration: list, history and refresh after dialogs
pub struct AccountsView {
    accounts: Arc<dyn AccountGateway>,
    operations: Arc<dyn OperationGateway>,
    policy: RefreshPolicy,
    logger: Arc<dyn ErrorLogger>,
    state: RwLock<ViewState>,
}

impl AccountsView {
    pub fn new(accounts: Arc<dyn AccountGateway>, operations: Arc<dyn OperationGateway>) -> Self {
        Self {
            accounts,
            operations,
            policy: RefreshPolicy::default(),
            logger: Arc::new(DefaultErrorLogger),
            state: RwLock::new(ViewState::default()),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Gateway used by dialogs opened from this view
    pub fn operation_gateway(&self) -> Arc<dyn OperationGateway> {
        Arc::clone(&self.operations)
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Account list ====================

    /// Initial load of the page
    pub async fn init(&self) -> CoreResult<Arc<Vec<Account>>> {
        self.refresh_list().await
    }

    /// Reload the account list.
    ///
    /// On success `items` becomes exactly the returned sequence. On failure
    /// the error is logged and `items` keeps its previous value.
    pub async fn refresh_list(&self) -> CoreResult<Arc<Vec<Account>>> {
        let ticket = self.write().items.begin();

        let result = self.accounts.load_all_accounts().await;

        let mut state = self.write();
        match result {
            Ok(accounts) => {
                if !state.items.complete(ticket, Ok(accounts)) {
                    self.logger.log_debug(
                        "discarded stale account list",
                        &ErrorContext::new("load_all_accounts"),
                    );
                }
                Ok(Arc::clone(&state.items.data))
            }
            Err(error) => {
                self.logger
                    .log_error(&error, &ErrorContext::new("load_all_accounts"));
                state.items.complete(ticket, Err(error.to_string()));
                Err(error)
            }
        }
    }

    /// Current account snapshot
    pub fn items(&self) -> Arc<Vec<Account>> {
        Arc::clone(&self.read().items.data)
    }

    pub fn items_state(&self) -> LoadState {
        self.read().items.state.clone()
    }

    /// Look up an account in the current snapshot
    pub fn find_account(&self, account_number: &str) -> CoreResult<Account> {
        self.read()
            .items
            .data
            .iter()
            .find(|a| a.account_number == account_number)
            .cloned()
            .ok_or_else(|| CoreError::AccountNotFound {
                account_number: account_number.to_string(),
            })
    }

    // ==================== Operation history ====================

    /// Fetch and display the history of one account.
    ///
    /// No caching: every call hits the backend. A failure keeps the
    /// previously displayed history.
    pub async fn show_operation_history(
        &self,
        account_number: &str,
    ) -> CoreResult<Arc<Vec<OperationRecord>>> {
        let ticket = self.write().history.begin();

        let result = self.operations.load_history_for(account_number).await;

        let mut state = self.write();
        match result {
            Ok(records) => {
                log::debug!("loaded {} operations for {}", records.len(), account_number);
                if state.history.complete(ticket, Ok(records)) {
                    state.history_account = Some(account_number.to_string());
                }
                Ok(Arc::clone(&state.history.data))
            }
            Err(error) => {
                self.logger.log_error(
                    &error,
                    &ErrorContext::new("load_history_for").with_account(account_number),
                );
                state.history.complete(ticket, Err(error.to_string()));
                Err(error)
            }
        }
    }

    /// Currently displayed history
    pub fn operation_history(&self) -> Arc<Vec<OperationRecord>> {
        Arc::clone(&self.read().history.data)
    }

    pub fn history_state(&self) -> LoadState {
        self.read().history.state.clone()
    }

    /// Account whose history is currently displayed
    pub fn history_account(&self) -> Option<String> {
        self.read().history_account.clone()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.read();
        ViewSnapshot {
            items: state.items.data.as_ref().clone(),
            items_state: state.items.state.clone(),
            operation_history: state.history.data.as_ref().clone(),
            history_state: state.history.state.clone(),
            history_account: state.history_account.clone(),
        }
    }

    // ==================== Dialogs ====================

    pub fn open_deposit_dialog(&self, account: &Account) -> OperationDialog {
        OperationDialog::deposit(account.clone()).with_logger(Arc::clone(&self.logger))
    }

    pub fn open_withdrawal_dialog(&self, account: &Account) -> OperationDialog {
        OperationDialog::withdrawal(account.clone()).with_logger(Arc::clone(&self.logger))
    }

    /// React to a closed dialog.
    ///
    /// Returns whether a reload was attempted. Under [`RefreshPolicy::Always`]
    /// a cancelled dialog reloads too.
    pub async fn dialog_closed(&self, outcome: &DialogOutcome) -> bool {
        let refresh = match self.policy {
            RefreshPolicy::Always => true,
            RefreshPolicy::OnSubmit => outcome.is_submitted(),
        };
        if refresh {
            // failures are already logged by refresh_list
            let _ = self.refresh_list().await;
        }
        refresh
    }
}
