//! Fallback page for unknown paths

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Html;

pub async fn page_not_found(uri: Uri, headers: HeaderMap) -> (StatusCode, Html<String>) {
    log::debug!("no route for {}", uri.path());
    let inner_content = format!(
        r#"<div class='flex flex-col items-center justify-center h-full py-24'>
            <h2 class='text-6xl font-bold text-gray-300'>404</h2>
            <p class='mt-4 text-gray-600'>Nothing lives at <code>{}</code>.</p>
            <a href='/dashboard' class='mt-6 px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Back to the dashboard</a>
        </div>"#,
        bankweb_utils::escape_html(uri.path())
    );
    (
        StatusCode::NOT_FOUND,
        Html(crate::page_response(&headers, "404", uri.path(), &inner_content)),
    )
}
