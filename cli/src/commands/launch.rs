// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `gotag launch`: create Dexters outside any Bailiff and send them roaming.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gotag_core::domain::discovery::Discovery;
use gotag_core::domain::node_config::HostConfigManifest;
use gotag_sdk::discovery_from_urls;
use gotag_swarm::application::dexter::{new_dexter, roam};
use gotag_swarm::domain::roaming::RoamingConfig;

use crate::server::shutdown_signal;

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Number of Dexters to launch
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// How many of them start out as it
    #[arg(long, default_value_t = 0)]
    pub it: usize,

    /// Bailiff URL to roam to (repeatable, replaces configured peers)
    #[arg(long = "peer", value_name = "URL")]
    pub peers: Vec<String>,

    /// Log tag state of resident agents while roaming
    #[arg(long)]
    pub debug: bool,
}

pub async fn handle_command(args: LaunchArgs, config_override: Option<PathBuf>) -> Result<()> {
    if args.it > args.count {
        bail!("--it ({}) cannot exceed --count ({})", args.it, args.count);
    }

    let config = HostConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    let peers = if args.peers.is_empty() {
        config.spec.peers.clone()
    } else {
        args.peers.clone()
    };
    if peers.is_empty() {
        bail!("No Bailiffs to roam to; pass --peer or configure spec.peers");
    }

    let discovery: Arc<dyn Discovery> = Arc::new(
        discovery_from_urls(peers.as_slice(), config.spec.roaming.request_timeout())
            .context("Failed to build peer discovery")?,
    );
    let roaming = RoamingConfig::from(&config.spec.roaming);
    let shutdown = CancellationToken::new();

    let mut dexters = JoinSet::new();
    for i in 0..args.count {
        let dexter = Arc::new(new_dexter(i < args.it).with_debug(args.debug));
        info!(agent_id = %dexter.id(), is_it = dexter.is_it(), "dexter launched");
        let discovery = Arc::clone(&discovery);
        let roaming = roaming.clone();
        let shutdown = shutdown.clone();
        dexters.spawn(async move {
            let destination = roam(Arc::clone(&dexter), discovery, roaming, shutdown).await;
            (dexter, destination)
        });
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    let mut departed = 0;
    while let Some(joined) = dexters.join_next().await {
        match joined {
            Ok((dexter, Some(destination))) => {
                departed += 1;
                println!("{} {} -> {}", "✓".green(), dexter, destination);
            }
            Ok((dexter, None)) => println!("{} {} stayed home", "✗".yellow(), dexter),
            Err(e) => warn!("Dexter task failed: {}", e),
        }
    }

    println!("{} of {} dexters left for a Bailiff", departed, args.count);
    Ok(())
}
