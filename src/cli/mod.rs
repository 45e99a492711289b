// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::blocklist::MatchMode;
use crate::config::AppConfig;

/// Hidewall paywall bypass service
#[derive(Parser, Debug, Default)]
#[command(name = "hidewall")]
#[command(version)]
#[command(about = "Fetch pages through archive, proxy and referrer fallbacks", long_about = None)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// File listing sites that need the fallback chain
    #[arg(long, env = "BLOCKLIST_PATH")]
    pub blocklist: Option<PathBuf>,

    /// How blocklist entries are matched: substring or host
    #[arg(long, env = "BLOCKLIST_MATCH")]
    pub blocklist_match: Option<MatchMode>,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of environment configuration
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = self.blocklist {
            config.blocklist_path = path;
        }
        if let Some(mode) = self.blocklist_match {
            config.blocklist_match = mode;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
    }
}
