//! Embedded static assets
//!
//! Falls back to the `ui/` directory on disk so the page can be edited
//! without rebuilding.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

const UI_DIR: &str = "ui";

fn with_mime(path: &str, content: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        content,
    )
        .into_response()
}

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    if path.split('/').any(|segment| segment == "..") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    if let Some(content) = Assets::get(path) {
        return with_mime(path, content.data.into_owned());
    }

    let fs_path = PathBuf::from(UI_DIR).join(path);
    if let Ok(content) = tokio::fs::read(&fs_path).await {
        return with_mime(path, content);
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.into_owned()).ok();
    }

    std::fs::read_to_string(PathBuf::from(UI_DIR).join("index.html")).ok()
}
