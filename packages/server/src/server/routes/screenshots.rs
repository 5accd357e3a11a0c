use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::server::app::AppState;

/// Serve a stored capture for the review UI.
///
/// Filenames are single path components; anything path-like is a 404,
/// never a filesystem traversal.
pub async fn screenshot_handler(
    Extension(state): Extension<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if !safe_filename(&filename) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.screenshot_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.to_string())],
                bytes,
            )
                .into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_like_filenames_are_rejected() {
        assert!(safe_filename("abc.png"));
        assert!(!safe_filename("../secrets"));
        assert!(!safe_filename("a/b.png"));
        assert!(!safe_filename("a\\b.png"));
        assert!(!safe_filename(""));
    }
}
