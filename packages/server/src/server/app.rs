//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::drafts::DraftStore;
use crate::domains::publish::Publisher;
use crate::kernel::alerts::AlertSender;
use crate::kernel::screenshot::Screenshotter;
use crate::server::auth::{LoginCodeStore, SessionStore};
use crate::server::middleware::require_auth;
use crate::server::routes::{
    delete_draft_handler, get_draft_handler, health_handler, list_drafts_handler,
    post_draft_handler, request_code_handler, screenshot_handler, verify_code_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub codes: Arc<LoginCodeStore>,
    pub drafts: DraftStore,
    pub publishers: Arc<Vec<Arc<dyn Publisher>>>,
    pub screenshots: Arc<dyn Screenshotter>,
    pub alerts: Arc<dyn AlertSender>,
    pub admin_handle: String,
    pub screenshot_dir: PathBuf,
}

/// Build the Axum application router
///
/// Everything except the two auth endpoints and the health check sits
/// behind the bearer-session middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let protected = Router::new()
        .route("/api/drafts", get(list_drafts_handler))
        .route(
            "/api/drafts/:id",
            get(get_draft_handler).delete(delete_draft_handler),
        )
        .route("/api/drafts/:id/post", post(post_draft_handler))
        .route("/screenshots/:filename", get(screenshot_handler))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_auth,
        ));

    Router::new()
        .route("/api/auth/request-code", post(request_code_handler))
        .route("/api/auth/verify-code", post(verify_code_handler))
        .route("/health", get(health_handler))
        .merge(protected)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Purge expired sessions and login codes once a minute.
pub fn spawn_auth_sweeper(
    sessions: Arc<SessionStore>,
    codes: Arc<LoginCodeStore>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            sessions.cleanup_expired().await;
            codes.cleanup_expired().await;
        }
    })
}
