// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! The Dexter agent kind: a tag-game player that roams between Bailiffs.
//!
//! On arrival a Dexter adopts the "it" status it was migrated with, then
//! starts roaming again. It leaves the Bailiff as soon as another one accepts
//! it, so its residency on any host is short.

use anyhow::Context;
use gotag_core::domain::agent::{Agent, AgentKind};
use gotag_core::domain::discovery::Discovery;
use gotag_core::domain::entry::{AgentCatalog, ArgKind, ArgValue, EntryContext, EntrySignature};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::roaming::RoamingController;
use crate::domain::roaming::RoamingConfig;

pub use crate::domain::roaming::TOP_LEVEL;

pub const DEXTER_KIND: &str = "dexter";

pub fn dexter_kind() -> AgentKind {
    AgentKind::new(DEXTER_KIND)
}

pub fn new_dexter(is_it: bool) -> Agent {
    Agent::new(dexter_kind()).with_tag(is_it)
}

pub fn top_level_signature() -> EntrySignature {
    EntrySignature::new(TOP_LEVEL, vec![ArgKind::Bool])
}

/// Make Dexters runnable on a Bailiff using `catalog`.
///
/// Resident Dexters stop roaming once `shutdown` is cancelled.
pub fn register_dexter(
    catalog: &mut AgentCatalog,
    discovery: Arc<dyn Discovery>,
    config: RoamingConfig,
    shutdown: CancellationToken,
) {
    catalog.register(dexter_kind(), top_level_signature(), move |ctx, args| {
        let discovery = Arc::clone(&discovery);
        let config = config.clone();
        let shutdown = shutdown.clone();
        async move { top_level(ctx, args, discovery, config, shutdown).await }
    });
}

async fn top_level(
    ctx: EntryContext,
    args: Vec<ArgValue>,
    discovery: Arc<dyn Discovery>,
    config: RoamingConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let is_it = args
        .first()
        .and_then(ArgValue::as_bool)
        .context("top_level expects the tag status as its only argument")?;
    ctx.agent.tag().adopt(is_it);
    info!(
        agent_id = %ctx.agent.id(),
        is_it,
        host = %ctx.host.host_name,
        room = %ctx.host.room,
        "dexter arrived"
    );

    roam(ctx.agent, discovery, config, shutdown).await;
    Ok(())
}

/// Roam from wherever `agent` currently is until a Bailiff accepts it or
/// `shutdown` fires. Also used to launch Dexters outside any Bailiff.
pub async fn roam(
    agent: Arc<Agent>,
    discovery: Arc<dyn Discovery>,
    config: RoamingConfig,
    shutdown: CancellationToken,
) -> Option<String> {
    RoamingController::new(agent, discovery, config)
        .run_until_cancelled(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_resolves_top_level_bool_only() {
        let mut catalog = AgentCatalog::new();
        register_dexter(
            &mut catalog,
            Arc::new(gotag_core::infrastructure::discovery::StaticDiscovery::default()),
            RoamingConfig::default(),
            CancellationToken::new(),
        );

        assert!(catalog.resolve(&dexter_kind(), TOP_LEVEL, &[ArgValue::Bool(true)]).is_ok());
        assert!(catalog.resolve(&dexter_kind(), TOP_LEVEL, &[]).is_err());
        assert!(catalog.resolve(&dexter_kind(), "topLevel", &[ArgValue::Bool(true)]).is_err());
        assert_eq!(catalog.signatures(&dexter_kind()), vec![top_level_signature()]);
    }

    #[test]
    fn test_new_dexter_carries_tag() {
        assert!(new_dexter(true).is_it());
        assert!(!new_dexter(false).is_it());
        assert_eq!(new_dexter(false).kind().as_str(), "dexter");
    }
}
