//! Gateways to the bank REST API
//!
//! - [`AccountGateway`]: `GET /accounts`
//! - [`OperationGateway`]: `GET /accounts/{number}/transactions` and
//!   `POST /accounts/transactions`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::models::{Account, OperationRecord, OperationRequest};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::OperationKind;

/// Lists accounts
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Every account known to the backend, in backend order
    async fn load_all_accounts(&self) -> CoreResult<Vec<Account>>;
}

/// Reads history and submits operations
#[async_trait]
pub trait OperationGateway: Send + Sync {
    /// Transaction history of one account
    async fn load_history_for(&self, account_number: &str) -> CoreResult<Vec<OperationRecord>>;

    /// Submit `request` as a deposit, whatever its `operation` says
    async fn deposit(&self, request: &OperationRequest) -> CoreResult<OperationRecord>;

    /// Submit `request` as a withdrawal, whatever its `operation` says
    async fn withdrawal(&self, request: &OperationRequest) -> CoreResult<OperationRecord>;

    /// Dispatch to [`deposit`](Self::deposit) or [`withdrawal`](Self::withdrawal)
    async fn submit(
        &self,
        kind: OperationKind,
        request: &OperationRequest,
    ) -> CoreResult<OperationRecord> {
        match kind {
            OperationKind::Deposit => self.deposit(request).await,
            OperationKind::Withdrawal => self.withdrawal(request).await,
        }
    }
}

/// Send a request and decode a JSON success body
async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    request: HttpRequest,
) -> CoreResult<T> {
    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(CoreError::from_response(response.status, &response.body));
    }
    serde_json::from_slice(&response.body).map_err(|e| CoreError::Decode {
        message: e.to_string(),
    })
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// [`AccountGateway`] over HTTP
#[derive(Clone)]
pub struct HttpAccountGateway {
    transport: Arc<dyn HttpTransport>,
    accounts_url: String,
}

impl HttpAccountGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            accounts_url: format!("{}/accounts", normalize_base_url(base_url)),
        }
    }
}

#[async_trait]
impl AccountGateway for HttpAccountGateway {
    async fn load_all_accounts(&self) -> CoreResult<Vec<Account>> {
        fetch_json(
            self.transport.as_ref(),
            HttpRequest::get(self.accounts_url.clone()),
        )
        .await
    }
}

/// [`OperationGateway`] over HTTP
#[derive(Clone)]
pub struct HttpOperationGateway {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl HttpOperationGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
        }
    }

    fn history_url(&self, account_number: &str) -> String {
        format!(
            "{}/accounts/{}/transactions",
            self.base_url,
            urlencoding::encode(account_number)
        )
    }

    fn transactions_url(&self) -> String {
        format!("{}/accounts/transactions", self.base_url)
    }

    async fn post_operation(
        &self,
        kind: OperationKind,
        request: &OperationRequest,
    ) -> CoreResult<OperationRecord> {
        let outgoing = request.with_operation(kind);
        let body = serde_json::to_vec(&outgoing).map_err(|e| CoreError::ValidationError {
            message: e.to_string(),
        })?;
        fetch_json(
            self.transport.as_ref(),
            HttpRequest::post_json(self.transactions_url(), body),
        )
        .await
    }
}

#[async_trait]
impl OperationGateway for HttpOperationGateway {
    async fn load_history_for(&self, account_number: &str) -> CoreResult<Vec<OperationRecord>> {
        fetch_json(
            self.transport.as_ref(),
            HttpRequest::get(self.history_url(account_number)),
        )
        .await
    }

    async fn deposit(&self, request: &OperationRequest) -> CoreResult<OperationRecord> {
        self.post_operation(OperationKind::Deposit, request).await
    }

    async fn withdrawal(&self, request: &OperationRequest) -> CoreResult<OperationRecord> {
        self.post_operation(OperationKind::Withdrawal, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpMethod, HttpResponse};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records requests and answers from a queue of canned responses
    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<CoreResult<HttpResponse>>>,
    }

    impl RecordingTransport {
        fn respond(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses.lock().unwrap().push_back(Err(CoreError::Transport {
                message: message.to_string(),
            }));
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn sent_json(&self, index: usize) -> serde_json::Value {
            let requests = self.requests();
            serde_json::from_slice(requests[index].body.as_ref().unwrap()).unwrap()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> CoreResult<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no canned response left")
        }
    }

    const BASE: &str = "http://bank:8080/api/v1/";

    const ACCOUNTS: &str = r#"[
        {"accountNumber":"ACC-002","ownerName":"Zoe","currentBalance":"10.00€","createdAt":"01/11/2022 12:05:20"},
        {"accountNumber":"ACC-001","ownerName":"Alice","currentBalance":5000}
    ]"#;

    const RECORD: &str = r#"{"txRef":"t1","accountBalance":"65.00€","amount":"15.00€","description":"test","accountNumber":"ACC-001","operation":"DEPOSIT"}"#;

    #[tokio::test]
    async fn test_load_all_accounts_keeps_backend_order() {
        let transport = Arc::new(RecordingTransport::default().respond(200, ACCOUNTS));
        let gateway = HttpAccountGateway::new(transport.clone(), BASE);

        let accounts = gateway.load_all_accounts().await.unwrap();
        let numbers: Vec<&str> = accounts.iter().map(|a| a.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["ACC-002", "ACC-001"]);
        assert_eq!(accounts[0].current_balance, 1000);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "http://bank:8080/api/v1/accounts");
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn test_load_all_accounts_transport_failure() {
        let transport = Arc::new(RecordingTransport::default().fail("connection refused"));
        let gateway = HttpAccountGateway::new(transport, BASE);
        let error = gateway.load_all_accounts().await.unwrap_err();
        assert!(matches!(error, CoreError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_load_all_accounts_non_success_status() {
        let transport = Arc::new(RecordingTransport::default().respond(500, ""));
        let gateway = HttpAccountGateway::new(transport, BASE);
        let error = gateway.load_all_accounts().await.unwrap_err();
        assert_eq!(error.status(), Some(500));
    }

    #[tokio::test]
    async fn test_load_all_accounts_undecodable_body() {
        let transport = Arc::new(RecordingTransport::default().respond(200, "<html>"));
        let gateway = HttpAccountGateway::new(transport, BASE);
        let error = gateway.load_all_accounts().await.unwrap_err();
        assert!(matches!(error, CoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_load_history_url_and_decoding() {
        let body = format!("[{}]", RECORD);
        let transport = Arc::new(RecordingTransport::default().respond(200, &body));
        let gateway = HttpOperationGateway::new(transport.clone(), BASE);

        let history = gateway.load_history_for("ACC-001").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, Some(1500));
        assert_eq!(
            transport.requests()[0].url,
            "http://bank:8080/api/v1/accounts/ACC-001/transactions"
        );
    }

    #[tokio::test]
    async fn test_load_history_encodes_account_number() {
        let transport = Arc::new(RecordingTransport::default().respond(200, "[]"));
        let gateway = HttpOperationGateway::new(transport.clone(), BASE);
        gateway.load_history_for("a/b c").await.unwrap();
        assert_eq!(
            transport.requests()[0].url,
            "http://bank:8080/api/v1/accounts/a%2Fb%20c/transactions"
        );
    }

    #[tokio::test]
    async fn test_load_history_unknown_account_passes_backend_error() {
        let transport = Arc::new(RecordingTransport::default().respond(
            404,
            r#"{"status":404,"error":"Not Found","message":"No account ACC-999"}"#,
        ));
        let gateway = HttpOperationGateway::new(transport, BASE);
        let error = gateway.load_history_for("ACC-999").await.unwrap_err();
        assert_eq!(
            error,
            CoreError::Backend {
                status: 404,
                message: "No account ACC-999".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_deposit_forces_operation() {
        let transport = Arc::new(RecordingTransport::default().respond(201, RECORD));
        let gateway = HttpOperationGateway::new(transport.clone(), BASE);

        let request = OperationRequest {
            operation: Some(OperationKind::Withdrawal),
            ..OperationRequest::new("ACC-001", 1500, "test")
        };
        let record = gateway.deposit(&request).await.unwrap();
        assert_eq!(record.account_balance, Some(6500));

        let sent = transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "http://bank:8080/api/v1/accounts/transactions");
        assert_eq!(
            transport.sent_json(0),
            serde_json::json!({
                "accountNumber": "ACC-001",
                "amountInCents": 1500,
                "description": "test",
                "operation": "DEPOSIT"
            })
        );
        // caller-owned request is never mutated
        assert_eq!(request.operation, Some(OperationKind::Withdrawal));
    }

    #[tokio::test]
    async fn test_withdrawal_forces_operation() {
        let transport = Arc::new(
            RecordingTransport::default()
                .respond(201, RECORD)
                .respond(201, RECORD),
        );
        let gateway = HttpOperationGateway::new(transport.clone(), BASE);

        let unset = OperationRequest::new("ACC-001", 200, "cash");
        let deposit_flagged = unset.with_operation(OperationKind::Deposit);
        gateway.withdrawal(&unset).await.unwrap();
        gateway.withdrawal(&deposit_flagged).await.unwrap();

        assert_eq!(transport.sent_json(0)["operation"], "WITHDRAWAL");
        assert_eq!(transport.sent_json(1)["operation"], "WITHDRAWAL");
        assert_eq!(unset.operation, None);
    }

    #[tokio::test]
    async fn test_submit_dispatches_on_kind() {
        let transport = Arc::new(
            RecordingTransport::default()
                .respond(201, RECORD)
                .respond(201, RECORD),
        );
        let gateway = HttpOperationGateway::new(transport.clone(), BASE);
        let request = OperationRequest::new("ACC-001", 1, "");

        gateway.submit(OperationKind::Withdrawal, &request).await.unwrap();
        gateway.submit(OperationKind::Deposit, &request).await.unwrap();

        assert_eq!(transport.sent_json(0)["operation"], "WITHDRAWAL");
        assert_eq!(transport.sent_json(1)["operation"], "DEPOSIT");
    }

    #[tokio::test]
    async fn test_rejected_operation_is_backend_error() {
        let transport = Arc::new(RecordingTransport::default().respond(
            400,
            r#"{"status":400,"error":"Bad Request","message":"Insufficient balance"}"#,
        ));
        let gateway = HttpOperationGateway::new(transport, BASE);
        let error = gateway
            .withdrawal(&OperationRequest::new("ACC-001", 1_000_000, "too much"))
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::Backend { status: 400, .. }));
    }
}
