use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::server::auth::SessionStore;

/// Bearer-token gate for the review API.
///
/// A missing or malformed header is 401; a well-formed token that is
/// unknown or expired is 403 (and an expired session is evicted by the
/// lookup itself).
pub async fn require_auth(
    State(sessions): State<Arc<SessionStore>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;

    if !sessions.validate(token).await {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}
