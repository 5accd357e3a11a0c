use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::drafts::post_draft;
use crate::server::app::AppState;

fn internal_error(context: &str, e: anyhow::Error) -> Response {
    tracing::error!(error = %e, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": context})),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "no such draft"})),
    )
        .into_response()
}

/// All pending drafts, newest first.
pub async fn list_drafts_handler(Extension(state): Extension<AppState>) -> Response {
    match state.drafts.list().await {
        Ok(drafts) => Json(drafts).into_response(),
        Err(e) => internal_error("failed to list drafts", e),
    }
}

pub async fn get_draft_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.drafts.get(&id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error("failed to read draft", e),
    }
}

/// Drive the draft through the publishers; only platforms missing from
/// `posted_to` are attempted. The response carries per-platform detail so
/// the review UI can show what still needs a retry.
pub async fn post_draft_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Response {
    match post_draft(
        &state.drafts,
        &state.publishers,
        state.screenshots.as_ref(),
        &id,
    )
    .await
    {
        Ok(Some(outcome)) => Json(outcome).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error("failed to post draft", e),
    }
}

/// Reject a draft: remove the record and reclaim its screenshot.
pub async fn delete_draft_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.drafts.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => internal_error("failed to delete draft", e),
    }
}
