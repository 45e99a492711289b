// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::fmt;
use tracing::warn;

use super::pages;
use crate::fetch::FetchError;
use crate::guard::ValidationError;
use crate::retrieval::RetrievalError;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

#[derive(Debug, Clone)]
pub enum ApiError {
    /// `y` parameter absent or blank
    MissingUrl,
    /// Target rejected by the guard
    InvalidUrl(ValidationError),
    RateLimitExceeded {
        retry_after: u64,
    },
    /// Retrieval of a valid target failed
    Retrieval {
        url: String,
        error: RetrievalError,
    },
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl(_) => 400,
            ApiError::RateLimitExceeded { .. } => 429,
            ApiError::Retrieval { error, .. } => retrieval_status(error),
        }
    }

    /// Heading of the rendered error page
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl(_) => "Invalid Request",
            ApiError::RateLimitExceeded { .. } => "Too Many Requests",
            ApiError::Retrieval { error, .. } => match retrieval_status(error) {
                503 => "Paywall Bypass Failed",
                502 => "Site Access Error",
                504 => "Request Timeout",
                400 => "Request Blocked",
                _ => "Unexpected Error",
            },
        }
    }
}

fn retrieval_status(error: &RetrievalError) -> u16 {
    match error {
        RetrievalError::AllStrategiesFailed => 503,
        RetrievalError::Validation(_) => 400,
        RetrievalError::Fetch(fetch) => match fetch {
            FetchError::HttpStatus { .. } => 502,
            FetchError::Timeout { .. } => 504,
            FetchError::Blocked(_) | FetchError::BlockedRedirect { .. } => 400,
            _ => 500,
        },
        _ => 500,
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingUrl => write!(f, "Error: No URL provided."),
            ApiError::InvalidUrl(reason) => write!(
                f,
                "Error: Invalid URL format. Please provide a valid HTTP or HTTPS URL. ({})",
                reason
            ),
            ApiError::RateLimitExceeded { .. } => write!(f, "{}", RATE_LIMIT_MESSAGE),
            ApiError::Retrieval { url, error } => write!(f, "Error fetching '{}': {}", url, error),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            ApiError::RateLimitExceeded { retry_after } => {
                let mut response = (status, RATE_LIMIT_MESSAGE).into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            ApiError::MissingUrl | ApiError::InvalidUrl(_) => {
                let page = pages::error_page(self.title(), &pages::invalid_request_body(&self.to_string()));
                (status, Html(page)).into_response()
            }
            ApiError::Retrieval { url, error } => {
                warn!("Error fetching '{}': {}", url, error);
                let body = match status.as_u16() {
                    503 => pages::bypass_failed_body(url),
                    502 => pages::site_error_body(url),
                    504 => pages::timeout_body(url),
                    _ => pages::unexpected_error_body(url),
                };
                (status, Html(pages::error_page(self.title(), &body))).into_response()
            }
        }
    }
}
