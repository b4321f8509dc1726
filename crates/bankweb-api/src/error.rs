//! Error types for bankweb-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use bankweb_core::{CoreError, ErrorDetails};
use bankweb_utils::escape_html;
use thiserror::Error;

/// A core error classified by the HTTP status it answers with
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(CoreError),

    #[error("Bad request: {0}")]
    BadRequest(CoreError),

    #[error("Conflict: {0}")]
    Conflict(CoreError),

    #[error("Bank API error: {0}")]
    Upstream(CoreError),
}

impl ApiError {
    /// Errors about the request itself map to 4xx, backend failures to 502
    pub fn from_core(error: CoreError) -> Self {
        match error {
            CoreError::AccountNotFound { .. } | CoreError::DialogNotFound { .. } => {
                ApiError::NotFound(error)
            }
            CoreError::DialogClosed => ApiError::Conflict(error),
            CoreError::ValidationError { .. } => ApiError::BadRequest(error),
            other => ApiError::Upstream(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn core(&self) -> &CoreError {
        match self {
            ApiError::NotFound(e) | ApiError::BadRequest(e) | ApiError::Conflict(e) | ApiError::Upstream(e) => e,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        ApiError::from_core(error)
    }
}

fn render_details(title: &str, details: &ErrorDetails) -> String {
    let mut html = format!(
        "<div class='p-4 bg-red-50 border border-red-200 text-red-700 rounded-lg'><p class='font-medium'>{}</p><p class='text-xs text-red-500 mt-1'>{}</p>",
        escape_html(title),
        details.code
    );
    if let Some(extra) = &details.details {
        html.push_str(&format!(
            "<pre class='mt-2 text-xs whitespace-pre-wrap'>{}</pre>",
            escape_html(&extra.to_string())
        ));
    }
    if !details.suggestions.is_empty() {
        html.push_str("<ul class='mt-2 text-sm list-disc list-inside'>");
        for suggestion in &details.suggestions {
            html.push_str(&format!("<li>{}</li>", escape_html(suggestion)));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = self.core().to_details();
        log::log!(
            self.core().severity().log_level(),
            "{} -> {}\n{}",
            self,
            status,
            details
        );
        (status, Html(render_details(&self.to_string(), &details))).into_response()
    }
}
