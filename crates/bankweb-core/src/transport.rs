//! HTTP transport under the gateways
//!
//! Gateways only build URLs and decode bodies; sending bytes is delegated to
//! an [`HttpTransport`] so tests can record requests without a network.

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// One JSON request to the bank API
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            body: None,
        }
    }

    pub fn post_json(url: String, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and returns the raw response.
///
/// Implementations report connection failures and timeouts as
/// [`CoreError::Transport`]; any status code is a successful exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> CoreResult<HttpResponse>;
}

/// Plain-HTTP transport backed by the hyper client
pub struct HyperTransport {
    client: Client<HttpConnector>,
    timeout: Duration,
}

impl HyperTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub fn from_config(config: &bankweb_config::Config) -> Self {
        Self::new(Duration::from_secs(config.api.timeout_secs))
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn send(&self, request: HttpRequest) -> CoreResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let target = format!("{} {}", request.method, request.url);
        log::debug!("-> {}", target);

        let hyper_request = Request::builder()
            .method(method)
            .uri(request.url.as_str())
            .header(header::CONTENT_TYPE, JSON)
            .header(header::ACCEPT, JSON)
            .body(request.body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| CoreError::Transport {
                message: format!("invalid request {}: {}", target, e),
            })?;

        let exchange = async {
            let response = self.client.request(hyper_request).await?;
            let status = response.status().as_u16();
            let body = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>(HttpResponse {
                status,
                body: body.to_vec(),
            })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => {
                log::debug!("<- {} {}", response.status, target);
                Ok(response)
            }
            Ok(Err(e)) => Err(CoreError::Transport {
                message: format!("{} failed: {}", target, e),
            }),
            Err(_) => Err(CoreError::Transport {
                message: format!("{} timed out after {}s", target, self.timeout.as_secs()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 201, body: vec![] };
        let redirect = HttpResponse { status: 302, body: vec![] };
        let missing = HttpResponse { status: 404, body: vec![] };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!missing.is_success());
    }

    #[test]
    fn test_request_builders() {
        let get = HttpRequest::get("http://bank/accounts".to_string());
        assert_eq!(get.method, HttpMethod::Get);
        assert!(get.body.is_none());

        let post = HttpRequest::post_json("http://bank/accounts/transactions".to_string(), b"{}".to_vec());
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.body.as_deref(), Some(&b"{}"[..]));
        assert_eq!(post.method.to_string(), "POST");
    }

    #[tokio::test]
    async fn test_hyper_transport_reports_invalid_uri() {
        let transport = HyperTransport::new(Duration::from_secs(1));
        let result = transport.send(HttpRequest::get("not a uri".to_string())).await;
        assert!(matches!(result, Err(CoreError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_hyper_transport_reports_refused_connection() {
        // Port 9 (discard) is not expected to accept HTTP on the loopback
        let transport = HyperTransport::new(Duration::from_secs(2));
        let result = transport
            .send(HttpRequest::get("http://127.0.0.1:9/accounts".to_string()))
            .await;
        assert!(matches!(result, Err(CoreError::Transport { .. })));
    }
}
