use askama::Template;
use axum::response::IntoResponse;

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {}

/// The upload page: credential field, file picker, and the result panel.
pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}
