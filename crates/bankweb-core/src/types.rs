//! Basic types for the accounts view

use serde::{Deserialize, Serialize};

/// Kind of operation sent to `POST /accounts/transactions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Deposit,
    Withdrawal,
}

impl OperationKind {
    /// Label used in page titles and buttons
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "Deposit",
            OperationKind::Withdrawal => "Withdrawal",
        }
    }

    /// Lowercase path segment (`deposit` / `withdrawal`)
    pub fn slug(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdrawal => "withdrawal",
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(OperationKind::Deposit),
            "withdrawal" => Ok(OperationKind::Withdrawal),
            _ => Err(format!("Invalid operation: {}", s)),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Deposit => write!(f, "DEPOSIT"),
            OperationKind::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

/// State of one fetched snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Loaded,
    /// The last fetch failed; the previous data is still shown
    Failed { message: String },
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// When closing a dialog reloads the account list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Reload after every close, cancelled or not
    Always,
    /// Reload only after a successful submission
    OnSubmit,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        RefreshPolicy::Always
    }
}

impl RefreshPolicy {
    /// Map the `view.refresh_on_cancel` setting
    pub fn from_refresh_on_cancel(refresh_on_cancel: bool) -> Self {
        if refresh_on_cancel {
            RefreshPolicy::Always
        } else {
            RefreshPolicy::OnSubmit
        }
    }
}
