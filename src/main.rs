// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use hidewall::{
    api::{start_server, AppState},
    blocklist::Blocklist,
    cli::Args,
    config::AppConfig,
    version,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;

    println!("Starting {}", version::get_version_string());

    let blocklist = Blocklist::load(&config.blocklist_path, config.blocklist_match)?;
    let state = Arc::new(AppState::new(&config, blocklist));

    let orchestrator = &state.orchestrator;
    let chain: Vec<&str> = orchestrator.strategies().iter().map(|s| s.name).collect();
    info!(
        "{} flagged sites ({:?} matching), fallback chain [{}], {} archive mirrors, rate limit {}/min",
        orchestrator.blocklist().len(),
        orchestrator.blocklist().mode(),
        chain.join(" -> "),
        config.retrieval.archive_mirrors.len(),
        config.server.rate_limit_per_minute
    );
    start_server(config.server.socket_addr(), state).await
}
