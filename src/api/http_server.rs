// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers::{bypass_handler, health_handler, index_handler, service_worker_handler};
use super::rate_limiter::{rate_limit_middleware, ClientRateLimiter, PRUNE_INTERVAL};
use crate::blocklist::Blocklist;
use crate::config::AppConfig;
use crate::fetch::SecureFetcher;
use crate::guard::UrlGuard;
use crate::retrieval::RetrievalOrchestrator;

/// Shared state for every route
pub struct AppState {
    pub guard: Arc<UrlGuard>,
    pub orchestrator: Arc<RetrievalOrchestrator>,
    pub rate_limiter: Arc<ClientRateLimiter>,
    pub static_dir: PathBuf,
    pub index_template: PathBuf,
    pub service_worker: PathBuf,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl AppState {
    /// Build state resolving hosts through the operating system
    pub fn new(config: &AppConfig, blocklist: Blocklist) -> Self {
        Self::with_guard(config, blocklist, UrlGuard::new())
    }

    /// Build state around a specific guard (custom resolver, loopback policy)
    pub fn with_guard(config: &AppConfig, blocklist: Blocklist, guard: UrlGuard) -> Self {
        let guard = Arc::new(guard);
        let fetcher = Arc::new(SecureFetcher::new(guard.clone(), config.fetch.clone()));
        let orchestrator =
            RetrievalOrchestrator::new(&config.retrieval, fetcher, Arc::new(blocklist));

        Self {
            guard,
            orchestrator: Arc::new(orchestrator),
            rate_limiter: Arc::new(ClientRateLimiter::new(config.server.rate_limit_per_minute)),
            static_dir: config.server.static_dir.clone(),
            index_template: config.server.index_template.clone(),
            service_worker: config.server.service_worker.clone(),
            request_timeout: config.server.request_timeout(),
            shutdown_timeout: config.server.shutdown_timeout(),
        }
    }
}

const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=()",
    ),
];

/// Build the router with all routes and layers
pub fn create_app(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/yeet", get(bypass_handler))
        .route("/health", get(health_handler))
        .route("/service-worker.js", get(service_worker_handler))
        .route_service(
            "/manifest.json",
            ServeFile::new(state.static_dir.join("manifest.json")),
        )
        .route_service(
            "/favicon.ico",
            ServeFile::new(state.static_dir.join("favicon.ico")),
        )
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(*name),
            HeaderValue::from_static(*value),
        ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests
///
/// Requests still running once the shutdown deadline passes are dropped.
pub async fn start_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let pruner = state.rate_limiter.spawn_pruning(PRUNE_INTERVAL);
    let deadline = state.shutdown_timeout;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting Hidewall server on {}", addr);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stop_rx.changed().await;
        })
        .await
    });

    tokio::select! {
        result = &mut server => {
            pruner.abort();
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!("Shutdown requested, draining for up to {:?}", deadline);
    let _ = stop_tx.send(true);
    match tokio::time::timeout(deadline, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            warn!("Shutdown deadline passed, dropping in-flight requests");
            server.abort();
        }
    }

    pruner.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down server...");
}
