//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: Welcome page
//! - routes::accounts: Account table and operation history
//! - routes::dialogs: Deposit and withdrawal modals
//! - routes::settings: Configuration display
//! - routes::not_found: Fallback page

pub mod error;
pub mod routes;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use bankweb_config::{Config, SymbolPosition};
use bankweb_core::{AccountGateway, AccountsView, DialogRegistry, OperationGateway, RefreshPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub view: Arc<AccountsView>,
    pub dialogs: Arc<DialogRegistry>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        accounts: Arc<dyn AccountGateway>,
        operations: Arc<dyn OperationGateway>,
    ) -> Self {
        let policy = RefreshPolicy::from_refresh_on_cancel(config.view.refresh_on_cancel);
        Self {
            view: Arc::new(AccountsView::new(accounts, operations).with_policy(policy)),
            dialogs: Arc::new(DialogRegistry::with_limits(
                Duration::from_secs(config.view.dialog_ttl_secs),
                config.view.max_open_dialogs,
            )),
            config,
        }
    }

    /// Format cents with the configured currency symbol
    pub fn money(&self, cents: i64) -> String {
        let currency = &self.config.currency;
        bankweb_utils::format_cents_with(
            cents,
            &currency.symbol,
            currency.symbol_position == SymbolPosition::Before,
        )
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{api_accounts, api_history, htmx_account_history, htmx_accounts_list, page_accounts};
    use routes::dashboard::page_dashboard;
    use routes::dialogs::{htmx_dialog_cancel, htmx_dialog_submit, htmx_open_deposit, htmx_open_withdrawal};
    use routes::not_found::page_not_found;
    use routes::settings::api_settings;

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/accounts", get(api_accounts))
        .route("/api/history", get(api_history))
        .route("/api/settings", get(api_settings))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(api)
        // HTMX page routes
        .route("/", get(index_page))
        .route("/dashboard", get(page_dashboard))
        .route("/accounts", get(page_accounts))
        // HTMX partial routes
        .route("/accounts/list", get(htmx_accounts_list))
        .route("/accounts/:number/history", get(htmx_account_history))
        .route("/accounts/:number/deposit", get(htmx_open_deposit))
        .route("/accounts/:number/withdrawal", get(htmx_open_withdrawal))
        .route("/dialogs/:id/submit", post(htmx_dialog_submit))
        .route("/dialogs/:id/cancel", post(htmx_dialog_cancel))
        .fallback(page_not_found)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn index_page() -> Redirect {
    Redirect::to("/dashboard")
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        bankweb_utils::escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [("/dashboard", "Dashboard", "🏦"), ("/accounts", "Accounts", "💶")];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Bank Kata</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, icon) in &links {
        let active_class = if current_path.starts_with(path) {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>
<div id='modal'></div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    log::info!("Starting bankweb server on http://{}", addr);
    log::info!("Bank API at {}", state.config.api_base_url());
    log::info!("Available routes:");
    log::info!("  - /dashboard (Welcome page)");
    log::info!("  - /accounts (Accounts and operation history)");
    log::info!("  - /api/* (JSON API endpoints)");

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use bankweb_core::{Account, CoreError, CoreResult, OperationKind, OperationRecord, OperationRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Serves a fixed account list and counts calls
    struct FakeAccounts {
        accounts: Mutex<Vec<Account>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AccountGateway for FakeAccounts {
        async fn load_all_accounts(&self) -> CoreResult<Vec<Account>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.accounts.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct FakeOperations {
        sent: Mutex<Vec<OperationRequest>>,
    }

    #[async_trait]
    impl OperationGateway for FakeOperations {
        async fn load_history_for(&self, account_number: &str) -> CoreResult<Vec<OperationRecord>> {
            if account_number != "ACC-001" {
                return Err(CoreError::Backend {
                    status: 404,
                    message: format!("No account {}", account_number),
                });
            }
            Ok(vec![OperationRecord {
                amount: Some(1500),
                account_balance: Some(6500),
                description: Some("<b>salary</b>".to_string()),
                operation: Some(OperationKind::Deposit),
                ..OperationRecord::default()
            }])
        }

        async fn deposit(&self, request: &OperationRequest) -> CoreResult<OperationRecord> {
            let outgoing = request.with_operation(OperationKind::Deposit);
            self.sent.lock().unwrap().push(outgoing);
            Ok(OperationRecord::default())
        }

        async fn withdrawal(&self, request: &OperationRequest) -> CoreResult<OperationRecord> {
            let outgoing = request.with_operation(OperationKind::Withdrawal);
            self.sent.lock().unwrap().push(outgoing);
            Ok(OperationRecord::default())
        }
    }

    struct Harness {
        state: AppState,
        accounts: Arc<FakeAccounts>,
        operations: Arc<FakeOperations>,
    }

    fn harness() -> Harness {
        let accounts = Arc::new(FakeAccounts {
            accounts: Mutex::new(vec![Account {
                account_number: "ACC-001".to_string(),
                owner_name: "Alice".to_string(),
                current_balance: 5000,
                created_at: None,
            }]),
            calls: AtomicUsize::new(0),
        });
        let operations = Arc::new(FakeOperations::default());
        let state = AppState::new(Config::default(), accounts.clone(), operations.clone());
        Harness {
            state,
            accounts,
            operations,
        }
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_dashboard() {
        let h = harness();
        let response = create_router(h.state.clone()).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_not_found() {
        let h = harness();
        let (status, body) = send(&h.state, get("/no/such/page")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<title>404</title>"));
    }

    #[tokio::test]
    async fn test_dashboard_title() {
        let h = harness();
        let (status, body) = send(&h.state, get("/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Kata : Bank Account</title>"));
        // first visit loads the list itself
        assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 1);
        assert!(body.contains(">1</p>"));
        assert!(body.contains("50.00€"));

        send(&h.state, get("/dashboard")).await;
        assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_dialogs_are_capped_by_config() {
        let mut config = Config::default();
        config.view.max_open_dialogs = 3;
        let h = harness();
        let state = AppState::new(config, h.accounts.clone(), h.operations.clone());
        send(&state, get("/accounts")).await;

        for _ in 0..20 {
            let (status, _) = send(&state, get("/accounts/ACC-001/deposit")).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(state.dialogs.len(), 3);
    }

    #[tokio::test]
    async fn test_accounts_page_loads_list() {
        let h = harness();
        let (status, body) = send(&h.state, get("/accounts")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Kata : Accounts</title>"));
        assert!(body.contains("ACC-001"));
        assert!(body.contains("50.00€"));
        assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_htmx_request_gets_partial() {
        let h = harness();
        let request = Request::builder()
            .uri("/accounts")
            .header("HX-Request", "true")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&h.state, request).await;
        assert!(!body.contains("<html"));
        assert!(body.contains("ACC-001"));
    }

    #[tokio::test]
    async fn test_history_partial_escapes_description() {
        let h = harness();
        let (status, body) = send(&h.state, get("/accounts/ACC-001/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("&lt;b&gt;salary&lt;/b&gt;"));
        assert!(body.contains("65.00€"));

        // unknown account keeps the previous history on screen
        let (status, body) = send(&h.state, get("/accounts/ACC-999/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("salary"));
        assert_eq!(h.state.view.history_account().as_deref(), Some("ACC-001"));
    }

    #[tokio::test]
    async fn test_deposit_flow_refreshes_once() {
        let h = harness();
        send(&h.state, get("/accounts")).await;

        let (status, body) = send(&h.state, get("/accounts/ACC-001/deposit")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/dialogs/1/submit"));

        let (status, body) = send(
            &h.state,
            post_form(
                "/dialogs/1/submit",
                "amount_in_cents=1500&description=test&account_number=ACC-001",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hx-swap-oob"));
        assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            h.operations.sent.lock().unwrap()[0],
            OperationRequest::new("ACC-001", 1500, "test").with_operation(OperationKind::Deposit)
        );
        assert!(h.state.dialogs.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_amount_rerenders_modal() {
        let h = harness();
        send(&h.state, get("/accounts")).await;
        send(&h.state, get("/accounts/ACC-001/withdrawal")).await;

        let (status, body) = send(
            &h.state,
            post_form("/dialogs/1/submit", "amount_in_cents=ten&description=rent"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Amount must be a whole number of cents"));
        assert!(body.contains("value='ten'"));
        assert!(h.operations.sent.lock().unwrap().is_empty());
        assert_eq!(h.state.dialogs.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_applies_refresh_policy() {
        let h = harness();
        send(&h.state, get("/accounts")).await;
        send(&h.state, get("/accounts/ACC-001/deposit")).await;

        let (status, body) = send(&h.state, post_form("/dialogs/1/cancel", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hx-swap-oob"));
        assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_dialog_and_account() {
        let h = harness();
        let (status, _) = send(&h.state, post_form("/dialogs/99/cancel", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&h.state, get("/accounts/ACC-404/deposit")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_endpoints() {
        let h = harness();
        let (_, body) = send(&h.state, get("/api/health")).await;
        assert_eq!(body, "OK");

        send(&h.state, get("/accounts")).await;
        let (status, body) = send(&h.state, get("/api/accounts")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["items"][0]["accountNumber"], "ACC-001");
        assert_eq!(json["state"]["state"], "loaded");

        let (_, body) = send(&h.state, get("/api/settings")).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["server"]["port"], 4200);
    }

    #[test]
    fn test_money_uses_configured_symbol() {
        let mut h = harness();
        assert_eq!(h.state.money(-1), "-0.01€");
        h.state.config.currency.symbol = "$".to_string();
        h.state.config.currency.symbol_position = SymbolPosition::Before;
        assert_eq!(h.state.money(1000), "$10.00");
    }
}
