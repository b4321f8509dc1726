//! Deposit and withdrawal dialogs
//!
//! A dialog collects an amount and a description for one account, submits
//! them through the [`OperationGateway`] and closes with a [`DialogOutcome`].
//! A failed submission keeps the dialog open so the user can retry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::gateway::OperationGateway;
use crate::models::{Account, OperationRecord, OperationRequest};
use crate::types::OperationKind;

pub type DialogId = u64;

/// Values posted by the dialog form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationForm {
    #[serde(default)]
    pub amount_in_cents: String,
    #[serde(default)]
    pub description: String,
    /// Read-only in the form; the dialog's own account is always used
    #[serde(default)]
    pub account_number: Option<String>,
}

impl OperationForm {
    pub fn new(amount_in_cents: &str, description: &str) -> Self {
        Self {
            amount_in_cents: amount_in_cents.to_string(),
            description: description.to_string(),
            account_number: None,
        }
    }
}

/// How a dialog was closed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "lowercase")]
pub enum DialogOutcome {
    /// The backend accepted the operation and answered with this record
    Submitted(OperationRecord),
    Cancelled,
}

impl DialogOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, DialogOutcome::Submitted(_))
    }

    pub fn record(&self) -> Option<&OperationRecord> {
        match self {
            DialogOutcome::Submitted(record) => Some(record),
            DialogOutcome::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    Open,
    Closed(DialogOutcome),
}

/// One open deposit or withdrawal dialog
#[derive(Clone)]
pub struct OperationDialog {
    kind: OperationKind,
    account: Account,
    form: OperationForm,
    last_error: Option<String>,
    state: DialogState,
    logger: Arc<dyn ErrorLogger>,
}

impl std::fmt::Debug for OperationDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDialog")
            .field("kind", &self.kind)
            .field("account", &self.account.account_number)
            .field("form", &self.form)
            .field("last_error", &self.last_error)
            .field("state", &self.state)
            .finish()
    }
}

impl OperationDialog {
    pub fn new(kind: OperationKind, account: Account) -> Self {
        let form = OperationForm {
            account_number: Some(account.account_number.clone()),
            ..OperationForm::default()
        };
        Self {
            kind,
            account,
            form,
            last_error: None,
            state: DialogState::Open,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Report failed submissions through `logger`
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn deposit(account: Account) -> Self {
        Self::new(OperationKind::Deposit, account)
    }

    pub fn withdrawal(account: Account) -> Self {
        Self::new(OperationKind::Withdrawal, account)
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Last values entered, shown again when the modal is re-rendered
    pub fn form(&self) -> &OperationForm {
        &self.form
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    /// Build the request for `form`, with `operation` left for the gateway
    pub fn build_request(&self, form: &OperationForm) -> CoreResult<OperationRequest> {
        let raw = form.amount_in_cents.trim();
        if raw.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Amount is required".to_string(),
            });
        }
        let amount_in_cents = raw.parse::<i64>().map_err(|_| CoreError::ValidationError {
            message: format!("Amount must be a whole number of cents, got '{}'", raw),
        })?;

        Ok(OperationRequest::new(
            &self.account.account_number,
            amount_in_cents,
            &form.description,
        ))
    }

    /// Submit the form. On success the dialog closes with the returned
    /// record; on failure it stays open and remembers the error.
    pub async fn submit(
        &mut self,
        gateway: &dyn OperationGateway,
        form: &OperationForm,
    ) -> CoreResult<DialogOutcome> {
        if !self.is_open() {
            return Err(CoreError::DialogClosed);
        }
        self.form = OperationForm {
            account_number: Some(self.account.account_number.clone()),
            ..form.clone()
        };

        let result = match self.build_request(form) {
            Ok(request) => gateway.submit(self.kind, &request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(record) => {
                log::info!(
                    "{} of {} cents on {} accepted",
                    self.kind.label(),
                    form.amount_in_cents.trim(),
                    self.account.account_number
                );
                let outcome = DialogOutcome::Submitted(record);
                self.last_error = None;
                self.state = DialogState::Closed(outcome.clone());
                Ok(outcome)
            }
            Err(error) => {
                self.logger.log_error(
                    &error,
                    &ErrorContext::new(self.kind.slug()).with_account(&self.account.account_number),
                );
                self.last_error = Some(user_message(&error));
                Err(error)
            }
        }
    }

    /// Close without submitting
    pub fn cancel(&mut self) -> CoreResult<DialogOutcome> {
        if !self.is_open() {
            return Err(CoreError::DialogClosed);
        }
        self.state = DialogState::Closed(DialogOutcome::Cancelled);
        Ok(DialogOutcome::Cancelled)
    }
}

/// Message shown in the modal: the backend's own wording when it sent one
fn user_message(error: &CoreError) -> String {
    match error {
        CoreError::Backend { message, .. } | CoreError::ValidationError { message } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

const DEFAULT_DIALOG_TTL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_MAX_OPEN_DIALOGS: usize = 256;

#[derive(Debug)]
struct OpenDialog {
    opened_at: Instant,
    dialog: OperationDialog,
}

/// Dialogs currently open in the browser.
///
/// A browser may drop a dialog without submitting or cancelling it, so
/// opening a dialog first discards the ones older than the TTL, then the
/// oldest ones while the registry is at capacity.
#[derive(Debug)]
pub struct DialogRegistry {
    next_id: AtomicU64,
    ttl: Duration,
    capacity: usize,
    // ids grow monotonically, so key order is opening order
    dialogs: Mutex<BTreeMap<DialogId, OpenDialog>>,
}

impl Default for DialogRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_DIALOG_TTL, DEFAULT_MAX_OPEN_DIALOGS)
    }
}

impl DialogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            ttl,
            capacity: capacity.max(1),
            dialogs: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<DialogId, OpenDialog>> {
        self.dialogs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, dialog: OperationDialog) -> DialogId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!(
            "opened {} dialog {} for {}",
            dialog.kind().slug(),
            id,
            dialog.account().account_number
        );

        let mut dialogs = self.lock();
        let before = dialogs.len();
        dialogs.retain(|_, open| open.opened_at.elapsed() < self.ttl);
        while dialogs.len() >= self.capacity {
            if dialogs.pop_first().is_none() {
                break;
            }
        }
        let evicted = before - dialogs.len();
        if evicted > 0 {
            log::debug!("discarded {} abandoned dialogs", evicted);
        }

        dialogs.insert(
            id,
            OpenDialog {
                opened_at: Instant::now(),
                dialog,
            },
        );
        id
    }

    /// Copy of an open dialog
    pub fn get(&self, id: DialogId) -> CoreResult<OperationDialog> {
        self.lock()
            .get(&id)
            .map(|open| open.dialog.clone())
            .ok_or(CoreError::DialogNotFound { id })
    }

    /// Submit an open dialog.
    ///
    /// The submission runs on a copy so the registry is not locked while the
    /// request is in flight. A closed dialog is removed; a failed one is
    /// stored back with its error and returned alongside it.
    pub async fn submit(
        &self,
        id: DialogId,
        form: &OperationForm,
        gateway: &dyn OperationGateway,
    ) -> Result<DialogOutcome, (CoreError, Option<OperationDialog>)> {
        let mut dialog = self.get(id).map_err(|e| (e, None))?;

        match dialog.submit(gateway, form).await {
            Ok(outcome) => {
                self.lock().remove(&id);
                Ok(outcome)
            }
            Err(error) => {
                let mut dialogs = self.lock();
                // a concurrent submit may have closed it meanwhile
                if let Some(open) = dialogs.get_mut(&id) {
                    open.dialog = dialog.clone();
                }
                Err((error, Some(dialog)))
            }
        }
    }

    pub fn cancel(&self, id: DialogId) -> CoreResult<DialogOutcome> {
        let mut open = self
            .lock()
            .remove(&id)
            .ok_or(CoreError::DialogNotFound { id })?;
        open.dialog.cancel()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
