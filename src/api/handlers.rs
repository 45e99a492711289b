// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use super::pages::{FALLBACK_INDEX, FALLBACK_SERVICE_WORKER};
use crate::version;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BypassParams {
    /// Target URL
    pub y: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build: String,
    pub date: String,
    pub features: Vec<String>,
    pub flagged_sites: usize,
}

/// `GET /yeet?y=<url>`: retrieve and clean a page
pub async fn bypass_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BypassParams>,
) -> Result<Html<String>, ApiError> {
    let raw = params
        .y
        .as_deref()
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .ok_or_else(|| {
            info!("Bypass request received without URL");
            ApiError::MissingUrl
        })?;

    let target = state.guard.validate(raw).await.map_err(|e| {
        info!("Bypass request received with invalid URL: {} ({})", raw, e);
        ApiError::InvalidUrl(e)
    })?;

    let clean = target.without_query();
    info!("Bypass request for {}", clean);

    state
        .orchestrator
        .retrieve(&target)
        .await
        .map(Html)
        .map_err(|error| ApiError::Retrieval { url: clean, error })
}

/// `GET /`: the landing page, or a built-in form when the template is missing
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    match tokio::fs::read_to_string(&state.index_template).await {
        Ok(page) => Html(page),
        Err(e) => {
            warn!(
                "Template file not found: {} ({}), serving fallback HTML",
                state.index_template.display(),
                e
            );
            Html(FALLBACK_INDEX.to_string())
        }
    }
}

pub async fn service_worker_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let script = match tokio::fs::read_to_string(&state.service_worker).await {
        Ok(script) => script,
        Err(_) => {
            warn!(
                "Service worker file not found: {}, serving fallback",
                state.service_worker.display()
            );
            FALLBACK_SERVICE_WORKER.to_string()
        }
    };
    ([(header::CONTENT_TYPE, "application/javascript")], script)
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        build: version::VERSION.to_string(),
        date: version::BUILD_DATE.to_string(),
        features: version::FEATURES.iter().map(|f| f.to_string()).collect(),
        flagged_sites: state.orchestrator.blocklist().len(),
    })
}
