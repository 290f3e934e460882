use axum::response::Html;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Single-page dashboard. It only talks to the JSON endpoints under `/api`.
pub async fn handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
