use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    draft_store: DraftStoreHealth,
}

#[derive(Serialize)]
pub struct DraftStoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Verifies the draft store is readable. Returns 200 OK when healthy,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.drafts.list(),
    )
    .await
    {
        Ok(Ok(drafts)) => DraftStoreHealth {
            status: "ok".to_string(),
            pending: Some(drafts.len()),
            error: None,
        },
        Ok(Err(e)) => DraftStoreHealth {
            status: "error".to_string(),
            pending: None,
            error: Some(e.to_string()),
        },
        Err(_) => DraftStoreHealth {
            status: "error".to_string(),
            pending: None,
            error: Some("draft store timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            draft_store: store_health,
        }),
    )
}
