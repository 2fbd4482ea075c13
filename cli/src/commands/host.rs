// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `gotag host`: run a Bailiff until interrupted.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use gotag_core::domain::node_config::HostConfigManifest;

use crate::server;

#[derive(Args, Debug, Default)]
pub struct HostArgs {
    /// Room this host is located in
    #[arg(long)]
    pub room: Option<String>,

    /// User running this host
    #[arg(long)]
    pub user: Option<String>,

    /// Address to bind the HTTP API to
    #[arg(long)]
    pub bind: Option<String>,

    /// HTTP API port
    #[arg(long)]
    pub port: Option<u16>,

    /// Peer Bailiff URL Dexters may roam to (repeatable, replaces configured peers)
    #[arg(long = "peer", value_name = "URL")]
    pub peers: Vec<String>,

    /// Dexters to start on this host
    #[arg(long, default_value_t = 0)]
    pub dexters: usize,

    /// How many of those Dexters start out as it
    #[arg(long, default_value_t = 0)]
    pub it: usize,

    /// Log tag state of resident agents while roaming
    #[arg(long)]
    pub debug: bool,
}

impl HostArgs {
    /// Command-line flags take precedence over file and environment.
    pub fn apply(&self, config: &mut HostConfigManifest) {
        let host = &mut config.spec.host;
        if let Some(room) = &self.room {
            host.room = room.clone();
        }
        if let Some(user) = &self.user {
            host.user = user.clone();
        }
        if let Some(bind) = &self.bind {
            host.bind = bind.clone();
        }
        if let Some(port) = self.port {
            host.port = port;
        }
        if self.debug {
            host.debug = true;
        }
        if !self.peers.is_empty() {
            config.spec.peers = self.peers.clone();
        }
    }
}

pub async fn handle_command(args: HostArgs, config_override: Option<PathBuf>) -> Result<()> {
    if args.it > args.dexters {
        bail!("--it ({}) cannot exceed --dexters ({})", args.it, args.dexters);
    }

    let mut config = HostConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    args.apply(&mut config);
    config
        .validate()
        .context("Configuration validation failed")?;

    server::run(config, args.dexters, args.it).await
}
