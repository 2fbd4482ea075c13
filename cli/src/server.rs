// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bailiff host runner: wires configuration, the Dexter catalog, the HTTP
//! router and process signals together.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use gotag_core::{
    application::bailiff::Bailiff,
    domain::{
        entry::{AgentCatalog, ArgValue},
        host::HostIdentity,
        node_config::{HostConfigManifest, HostSettings},
    },
    infrastructure::event_bus::EventBus,
    presentation::api::app,
};
use gotag_sdk::discovery_from_urls;
use gotag_swarm::{
    application::dexter::{new_dexter, register_dexter, TOP_LEVEL},
    domain::roaming::RoamingConfig,
};

pub fn host_identity(settings: &HostSettings) -> HostIdentity {
    let identity = HostIdentity::local(settings.room.clone(), settings.user.clone());
    match &settings.advertise_address {
        Some(address) => identity.with_address(address.clone()),
        None => identity,
    }
}

/// Build a Bailiff that can run Dexters. Dexters roam over the configured
/// peers and stop roaming once `shutdown` is cancelled.
pub fn build_bailiff(
    config: &HostConfigManifest,
    shutdown: CancellationToken,
) -> Result<Arc<Bailiff>> {
    let timeout = config.spec.roaming.request_timeout();
    let discovery = discovery_from_urls(config.spec.peers.as_slice(), timeout)
        .context("Failed to build peer discovery")?;

    let mut catalog = AgentCatalog::new();
    register_dexter(
        &mut catalog,
        Arc::new(discovery),
        RoamingConfig::from(&config.spec.roaming),
        shutdown,
    );

    let bailiff = Bailiff::new(
        host_identity(&config.spec.host),
        catalog,
        EventBus::with_default_capacity(),
    );
    Ok(Arc::new(bailiff))
}

/// Start `count` Dexters on `bailiff`; the first `tagged` of them are it.
pub fn launch_local(bailiff: &Bailiff, count: usize, tagged: usize, debug: bool) -> Result<()> {
    for i in 0..count {
        let is_it = i < tagged;
        let dexter = new_dexter(is_it).with_debug(debug);
        let id = dexter.id();
        bailiff
            .admit(dexter, TOP_LEVEL, vec![ArgValue::Bool(is_it)])
            .with_context(|| format!("Failed to start dexter {}", id))?;
        info!(agent_id = %id, is_it, "dexter launched");
    }
    Ok(())
}

pub fn install_metrics_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Prometheus metrics on port {}", port);
    Ok(())
}

/// Serve `bailiff` on `listener` until `signal` resolves, then withdraw it
/// and stop resident Dexters from roaming further.
pub async fn serve<F>(
    listener: TcpListener,
    bailiff: Arc<Bailiff>,
    shutdown: CancellationToken,
    signal: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(Arc::clone(&bailiff)))
        .with_graceful_shutdown(signal)
        .await
        .context("HTTP server failed")?;

    bailiff.shutdown();
    shutdown.cancel();
    Ok(())
}

/// Run a Bailiff as described by `config` until Ctrl+C or SIGTERM.
pub async fn run(config: HostConfigManifest, dexters: usize, tagged: usize) -> Result<()> {
    if let Some(port) = config.spec.observability.as_ref().and_then(|o| o.metrics_port) {
        install_metrics_exporter(port)?;
    }

    let shutdown = CancellationToken::new();
    let bailiff = build_bailiff(&config, shutdown.clone())?;

    let addr = format!("{}:{}", config.spec.host.bind, config.spec.host.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("{} Listening on {}", bailiff, addr);
    if config.spec.peers.is_empty() {
        warn!("No peers configured; dexters will have nowhere to go");
    }

    launch_local(&bailiff, dexters, tagged, config.spec.host.debug)?;
    serve(listener, bailiff, shutdown, shutdown_signal()).await?;

    info!("Bailiff shut down");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
