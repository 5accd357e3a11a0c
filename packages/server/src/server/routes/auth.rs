use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct RequestCodeResponse {
    sent: bool,
}

/// Issue a login code and deliver it out-of-band via DM.
///
/// The code never appears in the response.
pub async fn request_code_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<RequestCodeResponse>) {
    let code = state.codes.issue().await;
    let message = format!("Your login code is {code}. It expires in 10 minutes.");

    match state.alerts.send_dm(&state.admin_handle, &message).await {
        Ok(()) => {
            tracing::info!("login code delivered");
            (StatusCode::OK, Json(RequestCodeResponse { sent: true }))
        }
        Err(e) => {
            tracing::error!(error = %e, "login code delivery failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(RequestCodeResponse { sent: false }),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    code: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum VerifyCodeResponse {
    Ok {
        token: String,
        expires: DateTime<Utc>,
    },
    Invalid {
        error: String,
    },
}

/// Exchange a valid one-time code for a session token.
pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> (StatusCode, Json<VerifyCodeResponse>) {
    if !state.codes.consume(&body.code).await {
        return (
            StatusCode::UNAUTHORIZED,
            Json(VerifyCodeResponse::Invalid {
                error: "invalid or expired code".to_string(),
            }),
        );
    }

    let session = state.sessions.create_session().await;
    (
        StatusCode::OK,
        Json(VerifyCodeResponse::Ok {
            token: session.token,
            expires: session.expires,
        }),
    )
}
