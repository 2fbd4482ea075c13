// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Roaming Controller
//!
//! Client-side state machine run by one agent while it decides where to go
//! next. Every remote failure is handled locally: a Bailiff that fails a
//! probe or rejects a migration is dropped from the candidate set, and an
//! exhausted set sends the controller back to discovery. Nothing short of
//! cancellation ends the loop before a migration succeeds.

use gotag_core::domain::agent::{Agent, AgentId};
use gotag_core::domain::bailiff::BailiffHandle;
use gotag_core::domain::discovery::Discovery;
use gotag_core::domain::entry::ArgValue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::roaming::{CandidateSet, RoamState, RoamingConfig};

pub struct RoamingController {
    agent: Arc<Agent>,
    discovery: Arc<dyn Discovery>,
    config: RoamingConfig,
    state: RoamState,
    candidates: CandidateSet,
    selected: Option<usize>,
    empty_rounds: u64,
    rng: StdRng,
    destination: Option<String>,
}

impl RoamingController {
    pub fn new(agent: Arc<Agent>, discovery: Arc<dyn Discovery>, config: RoamingConfig) -> Self {
        Self {
            agent,
            discovery,
            config,
            state: RoamState::Discovering,
            candidates: CandidateSet::default(),
            selected: None,
            empty_rounds: 0,
            rng: StdRng::from_os_rng(),
            destination: None,
        }
    }

    /// Deterministic candidate and tag-target picks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn state(&self) -> RoamState {
        self.state
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Consecutive discovery rounds that found nothing.
    pub fn empty_rounds(&self) -> u64 {
        self.empty_rounds
    }

    /// Endpoint of the Bailiff that accepted the agent, once migrated.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Roam until a migration succeeds. Returns the destination endpoint.
    pub async fn run(&mut self) -> String {
        loop {
            if self.step().await == RoamState::Migrated {
                return self.destination.clone().unwrap_or_default();
            }
        }
    }

    /// As [`run`](Self::run), but gives up at the next suspension point once
    /// `token` is cancelled. Returns `None` when cancelled.
    pub async fn run_until_cancelled(&mut self, token: CancellationToken) -> Option<String> {
        let outcome = tokio::select! {
            destination = self.run() => Some(destination),
            _ = token.cancelled() => None,
        };
        if outcome.is_none() {
            info!(agent_id = %self.agent.id(), state = %self.state, "roaming cancelled");
        }
        outcome
    }

    /// Perform one transition and return the state reached.
    pub async fn step(&mut self) -> RoamState {
        self.state = match self.state {
            RoamState::Discovering => self.discover().await,
            RoamState::Selecting => self.select(),
            RoamState::Probing => self.probe().await,
            RoamState::TagResolution => self.resolve_tag().await,
            RoamState::Migrating => self.migrate().await,
            RoamState::Migrated => RoamState::Migrated,
        };
        self.state
    }

    async fn discover(&mut self) -> RoamState {
        let pause = if self.empty_rounds == 0 {
            debug!("entering restraint sleep");
            self.config.restraint_sleep
        } else {
            debug!(rounds = self.empty_rounds, "no bailiffs detected, sleeping");
            self.config.retry_interval
        };
        tokio::time::sleep(pause).await;

        let mut found = self.discovery.find(&self.config.capability).await;
        found.truncate(self.config.max_matches);
        if found.is_empty() {
            self.empty_rounds += 1;
            return RoamState::Discovering;
        }

        debug!(found = found.len(), "found bailiffs");
        self.empty_rounds = 0;
        self.candidates = CandidateSet::new(found);
        RoamState::Selecting
    }

    fn select(&mut self) -> RoamState {
        let count = self.candidates.len();
        if count == 0 {
            return RoamState::Discovering;
        }
        let index = if count > 1 {
            self.rng.random_range(0..count)
        } else {
            0
        };
        self.selected = Some(index);
        RoamState::Probing
    }

    fn target(&self) -> Option<BailiffHandle> {
        self.selected
            .and_then(|index| self.candidates.get(index))
            .cloned()
    }

    /// Remove the selected candidate and pick the next state.
    fn drop_selected(&mut self) -> RoamState {
        if let Some(index) = self.selected.take() {
            self.candidates.remove(index);
        }
        if self.candidates.is_empty() {
            debug!("they were all bad");
            RoamState::Discovering
        } else {
            RoamState::Selecting
        }
    }

    async fn probe(&mut self) -> RoamState {
        let Some(target) = self.target() else {
            return self.drop_selected();
        };

        match target.ping().await {
            Ok(echo) => {
                debug!(endpoint = %target.endpoint(), "{}", echo);
                if self.agent.is_it() {
                    RoamState::TagResolution
                } else {
                    RoamState::Migrating
                }
            }
            Err(e) => {
                debug!(endpoint = %target.endpoint(), error = %e, "ping failed, not accepted");
                self.drop_selected()
            }
        }
    }

    /// Best effort: try to hand the tag to an agent resident on the target.
    /// Makes at most `residents - 1` attempts; picking ourselves uses one up.
    async fn resolve_tag(&mut self) -> RoamState {
        let Some(target) = self.target() else {
            return self.drop_selected();
        };

        let residents = match target.list_agents().await {
            Ok(residents) => residents,
            Err(e) => {
                debug!(endpoint = %target.endpoint(), error = %e, "could not list residents");
                return RoamState::Migrating;
            }
        };

        if self.agent.debug() {
            for resident in &residents {
                match target.is_it(*resident).await {
                    Ok(it) => debug!(resident = %resident, is_it = it, "resident agent"),
                    Err(_) => debug!(resident = %resident, "resident agent"),
                }
            }
        }

        let me = self.agent.id();
        let attempts = residents.len().saturating_sub(1);
        for _ in 0..attempts {
            if !self.agent.is_it() {
                break;
            }
            let candidate: AgentId = residents[self.rng.random_range(0..residents.len())];
            if candidate == me {
                continue;
            }
            match target.agent_has_it(candidate).await {
                Ok(true) => {
                    self.agent.tag().hand_off();
                    info!(agent_id = %me, tagged = %candidate, "tag handed off");
                }
                Ok(false) => debug!(candidate = %candidate, "tag refused"),
                Err(e) => debug!(candidate = %candidate, error = %e, "tag attempt failed"),
            }
        }

        RoamState::Migrating
    }

    async fn migrate(&mut self) -> RoamState {
        let Some(target) = self.target() else {
            return self.drop_selected();
        };

        let is_it = self.agent.tag().begin_migration();
        let mut record = self.agent.to_record();
        record.is_it = is_it;

        match target
            .migrate(record, &self.config.entry_operation, vec![ArgValue::Bool(is_it)])
            .await
        {
            Ok(()) => {
                let endpoint = target.endpoint();
                info!(agent_id = %self.agent.id(), destination = %endpoint, is_it, "migrated");
                metrics::counter!("gotag_migrations_total", "outcome" => "departed").increment(1);
                self.destination = Some(endpoint);
                self.candidates.clear();
                self.selected = None;
                RoamState::Migrated
            }
            Err(e) => {
                self.agent.tag().abort_migration();
                warn!(
                    agent_id = %self.agent.id(),
                    endpoint = %target.endpoint(),
                    error = %e,
                    "didn't make the jump"
                );
                metrics::counter!("gotag_migrations_total", "outcome" => "failed").increment(1);
                self.drop_selected()
            }
        }
    }
}
