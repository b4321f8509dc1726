//! Bank API access and accounts view logic

pub mod dialog;
pub mod error;
pub mod gateway;
pub mod models;
pub mod transport;
pub mod types;
pub mod view;

pub use dialog::{DialogId, DialogOutcome, DialogRegistry, DialogState, OperationDialog, OperationForm};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity,
};
pub use gateway::{AccountGateway, HttpAccountGateway, HttpOperationGateway, OperationGateway};
pub use models::{Account, OperationRecord, OperationRequest};
pub use transport::{HttpTransport, HyperTransport};
pub use types::{LoadState, OperationKind, RefreshPolicy};
pub use view::{AccountsView, ViewSnapshot};
