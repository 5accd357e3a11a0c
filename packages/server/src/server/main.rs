// Main entry point for the edit-mirror service

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::drafts::DraftStore;
use server_core::domains::publish::{BlueskyPublisher, MastodonPublisher, Publisher};
use server_core::domains::screening::{AnalyzerClient, AuditLog, ScreeningGate};
use server_core::kernel::{
    BlueskyAlerts, DispatcherConfig, EventDispatcher, EventSource, HttpScreenshotter,
    JsonlEventSource, Pipeline, RepeatSuppressor, StaticGeoLookup,
};
use server_core::server::{build_app, spawn_auth_sweeper, AppState};
use server_core::server::auth::{LoginCodeStore, SessionStore};
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting edit-mirror service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Collaborators
    let geo = Arc::new(match &config.geoip_table_path {
        Some(path) => StaticGeoLookup::from_file(path)
            .with_context(|| format!("Failed to load geo table {path}"))?,
        None => StaticGeoLookup::empty(),
    });
    let screenshots = Arc::new(HttpScreenshotter::new(
        config.screenshot_service_url.clone(),
        &config.screenshot_dir,
    ));
    let alerts = Arc::new(BlueskyAlerts::new(
        config.bluesky_service.clone(),
        config.bluesky_identifier.clone(),
        config.bluesky_password.clone(),
    ));

    // Stores
    let drafts = DraftStore::open(&config.draft_dir, &config.screenshot_dir)
        .await
        .context("Failed to open draft store")?;
    let audit = AuditLog::new(&config.audit_log_path);

    // Publishers
    let publishers: Vec<Arc<dyn Publisher>> = vec![
        Arc::new(BlueskyPublisher::new(
            config.bluesky_service.clone(),
            config.bluesky_identifier.clone(),
            config.bluesky_password.clone(),
        )),
        Arc::new(MastodonPublisher::new(
            config.mastodon_base_url.clone(),
            config.mastodon_access_token.clone(),
        )),
    ];

    // Screening gate
    let analyzer = Arc::new(AnalyzerClient::new(config.analyzer_url.clone()));
    let gate = Arc::new(
        ScreeningGate::new(
            &config.user_agent,
            analyzer,
            config.blocked_entity_types.clone(),
            drafts.clone(),
            audit,
            alerts.clone(),
            config.alert_handles.clone(),
        )
        .context("Failed to build screening gate")?,
    );

    // Event pipeline behind a bounded dispatcher
    let pipeline = Arc::new(Pipeline::new(
        config.status_template.clone(),
        geo,
        gate,
        publishers.clone(),
        screenshots.clone(),
        config.repeat_suppression.then(RepeatSuppressor::new),
    ));
    let dispatcher = Arc::new(EventDispatcher::spawn(
        pipeline,
        DispatcherConfig {
            max_concurrency: config.dispatch_max_concurrency,
            ..Default::default()
        },
    ));

    // Feed events from the change-event source (line-delimited JSON on
    // stdin); the dispatch loop never awaits an event's pipeline.
    let source_dispatcher = dispatcher.clone();
    tokio::spawn(async move {
        let mut source = JsonlEventSource::stdin();
        while let Some(event) = source.next_event().await {
            if let Err(e) = source_dispatcher.dispatch(event).await {
                tracing::error!(error = %e, "event dispatch failed");
                break;
            }
        }
        tracing::info!("event source ended");
    });

    // Admin review API
    let sessions = Arc::new(SessionStore::new());
    let codes = Arc::new(LoginCodeStore::new());
    spawn_auth_sweeper(sessions.clone(), codes.clone());

    let app = build_app(AppState {
        sessions,
        codes,
        drafts,
        publishers: Arc::new(publishers),
        screenshots,
        alerts,
        admin_handle: config.admin_handle.clone(),
        screenshot_dir: config.screenshot_dir.clone().into(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting admin server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
