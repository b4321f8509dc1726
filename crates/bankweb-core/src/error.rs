//! Error types for bankweb-core
//!
//! Every failure of a gateway call ends up as a [`CoreError`]: transport
//! problems, non-success statuses and messages reported by the backend are
//! kept apart so they can be logged with the right code, but callers treat
//! them the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Connection failure, timeout or malformed request
    Transport,
    /// Non-success HTTP status without a backend message
    HttpStatus,
    /// Failure reported by the backend in its response body
    Backend,
    /// Response body could not be decoded
    Decode,
    /// Form input could not be turned into a request
    ValidationError,
    /// Account not present in the current snapshot
    AccountNotFound,
    /// Unknown dialog id
    DialogNotFound,
    /// Dialog already submitted or cancelled
    DialogClosed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Transport => write!(f, "TRANSPORT"),
            ErrorCode::HttpStatus => write!(f, "HTTP_STATUS"),
            ErrorCode::Backend => write!(f, "BACKEND"),
            ErrorCode::Decode => write!(f, "DECODE"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::DialogNotFound => write!(f, "DIALOG_NOT_FOUND"),
            ErrorCode::DialogClosed => write!(f, "DIALOG_CLOSED"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status returned by the backend (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            status: None,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl ErrorSeverity {
    /// Level used when an error of this severity is logged
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for bankweb-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Invalid response body: {message}")]
    Decode { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Account not found: {account_number}")]
    AccountNotFound { account_number: String },

    #[error("Dialog not found: {id}")]
    DialogNotFound { id: u64 },

    #[error("Dialog already closed")]
    DialogClosed,
}

impl CoreError {
    /// Classify a non-success response.
    ///
    /// A JSON body with a non-empty `message` is a backend-reported failure;
    /// anything else is reported by status, using the body's `error` field
    /// or the canonical reason phrase.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(message) = field("message") {
            return CoreError::Backend { status, message };
        }

        let reason = field("error").unwrap_or_else(|| {
            hyper::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown status")
                .to_string()
        });
        CoreError::HttpStatus { status, reason }
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::HttpStatus { status, .. } | CoreError::Backend { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Transport { .. } => ErrorCode::Transport,
            CoreError::HttpStatus { .. } => ErrorCode::HttpStatus,
            CoreError::Backend { .. } => ErrorCode::Backend,
            CoreError::Decode { .. } => ErrorCode::Decode,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::DialogNotFound { .. } => ErrorCode::DialogNotFound,
            CoreError::DialogClosed => ErrorCode::DialogClosed,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Transport { .. } => ErrorSeverity::Error,
            CoreError::HttpStatus { status, .. } if *status >= 500 => ErrorSeverity::Error,
            CoreError::HttpStatus { .. } => ErrorSeverity::Warning,
            CoreError::Backend { .. } => ErrorSeverity::Warning,
            CoreError::Decode { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::AccountNotFound { .. } => ErrorSeverity::Info,
            CoreError::DialogNotFound { .. } => ErrorSeverity::Info,
            CoreError::DialogClosed => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());
        if let Some(status) = self.status() {
            details = details.with_status(status);
        }

        match self {
            CoreError::Transport { .. } => {
                details = details.with_suggestion(
                    "Check that the bank API is running and api.base_url points at it.".to_string(),
                );
            }
            CoreError::Backend { message, .. } => {
                details = details.with_detail(serde_json::json!({ "backend_message": message }));
            }
            CoreError::Decode { message } => {
                details = details.with_detail(serde_json::json!({ "decode_message": message }));
                details = details.with_suggestion(
                    "The bank API answered with an unexpected payload; check its version.".to_string(),
                );
            }
            CoreError::AccountNotFound { .. } => {
                details = details.with_suggestion(
                    "Reload the accounts page to refresh the account list.".to_string(),
                );
            }
            CoreError::DialogNotFound { .. } | CoreError::DialogClosed => {
                details = details.with_suggestion(
                    "Open the dialog again from the accounts page.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Account involved (if any)
    pub account_number: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            account_number: None,
        }
    }

    pub fn with_account(mut self, account_number: &str) -> Self {
        self.account_number = Some(account_number.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let severity = error.severity();
        log::log!(
            target: "bankweb::error",
            severity.log_level(),
            "{} [{}] {} - Operation: {} - Account: {:?}",
            severity.to_string().to_uppercase(),
            error.code(),
            error,
            context.operation,
            context.account_number
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "bankweb::error",
            "DEBUG: {} - Operation: {} - Account: {:?}",
            message,
            context.operation,
            context.account_number
        );
    }
}

// ==================== Tests ====================
