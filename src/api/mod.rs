// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod pages;
pub mod rate_limiter;

pub use errors::ApiError;
pub use handlers::{BypassParams, HealthResponse};
pub use http_server::{create_app, start_server, AppState};
pub use rate_limiter::{client_key, ClientRateLimiter};
