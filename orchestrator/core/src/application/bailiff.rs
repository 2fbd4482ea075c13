// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Bailiff
//!
//! The execution host. Owns the host identity, the property store, the agent
//! registry and the execution engine, and answers the boundary operations of
//! [`BailiffInterface`] on top of them.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::application::engine::{AdmissionHandle, ExecutionEngine};
use crate::application::registry::AgentRegistry;
use crate::domain::agent::{Agent, AgentId, AgentRecord};
use crate::domain::bailiff::{BailiffError, BailiffHandle, BailiffInterface};
use crate::domain::discovery::BAILIFF_CAPABILITY;
use crate::domain::entry::{AgentCatalog, ArgValue};
use crate::domain::events::AgentEvent;
use crate::domain::host::{HostIdentity, Properties};
use crate::infrastructure::discovery::{InMemoryLookup, RegistrationId};
use crate::infrastructure::event_bus::EventBus;

pub struct Bailiff {
    identity: HostIdentity,
    properties: Properties,
    registry: Arc<AgentRegistry>,
    engine: ExecutionEngine,
    events: EventBus,
    accepting: AtomicBool,
    registrations: Mutex<Vec<(Weak<InMemoryLookup>, RegistrationId)>>,
}

impl Bailiff {
    pub fn new(identity: HostIdentity, catalog: AgentCatalog, events: EventBus) -> Self {
        let registry = Arc::new(AgentRegistry::new(events.clone()));
        let engine = ExecutionEngine::new(
            Arc::new(catalog),
            Arc::clone(&registry),
            events.clone(),
            identity.clone(),
        );

        Self {
            properties: Properties::for_host(&identity),
            identity,
            registry,
            engine,
            events,
            accepting: AtomicBool::new(true),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Register this Bailiff with a lookup service under the `"bailiff"`
    /// capability, advertising its room and host as attributes.
    pub fn join(self: &Arc<Self>, lookup: &Arc<InMemoryLookup>) -> RegistrationId {
        let attributes = BTreeMap::from([
            ("room".to_string(), self.identity.room.clone()),
            ("hostname".to_string(), self.identity.host_name.clone()),
            ("user".to_string(), self.identity.user.clone()),
        ]);
        let handle: BailiffHandle = Arc::clone(self) as BailiffHandle;
        let id = lookup.register(BAILIFF_CAPABILITY, attributes, handle);
        self.registrations.lock().push((Arc::downgrade(lookup), id));
        info!(registration = %id, "{} joined lookup", self);
        id
    }

    /// Withdraw from every lookup and stop accepting migrations.
    /// Resident agents keep running.
    pub fn shutdown(&self) {
        if !self.accepting.swap(false, Ordering::AcqRel) {
            return;
        }

        let registrations = std::mem::take(&mut *self.registrations.lock());
        for (lookup, id) in registrations {
            if let Some(lookup) = lookup.upgrade() {
                lookup.withdraw(id);
            }
        }
        info!(resident = self.registry.len(), "{} shut down", self);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Run an agent on this host without going through `migrate`, e.g. for
    /// agents launched locally.
    pub fn admit(
        &self,
        agent: Agent,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<AdmissionHandle, BailiffError> {
        if !self.is_accepting() {
            return Err(BailiffError::unavailable("bailiff is shutting down"));
        }
        self.engine.admit(agent, entry, args)
    }

    pub fn identity(&self) -> &HostIdentity {
        &self.identity
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn reject(&self, agent_id: AgentId, error: BailiffError) -> BailiffError {
        warn!(agent_id = %agent_id, error = %error, "migration rejected");
        metrics::counter!("gotag_migrations_total", "outcome" => "rejected").increment(1);
        self.events.publish(AgentEvent::MigrationRejected {
            agent_id,
            reason: error.to_string(),
            rejected_at: Utc::now(),
        });
        error
    }

    fn resident(&self, agent_id: AgentId) -> Result<Arc<Agent>, BailiffError> {
        self.registry
            .get(agent_id)
            .ok_or(BailiffError::AgentNotFound { agent_id })
    }
}

#[async_trait]
impl BailiffInterface for Bailiff {
    fn endpoint(&self) -> String {
        format!("local://{}/{}", self.identity.host_name, self.identity.room)
    }

    async fn ping(&self) -> Result<HostIdentity, BailiffError> {
        debug!("ping");
        Ok(self.identity.clone())
    }

    async fn get_property(&self, key: &str) -> Result<Option<String>, BailiffError> {
        Ok(self.properties.get(key))
    }

    async fn set_property(&self, key: &str, value: &str) -> Result<(), BailiffError> {
        self.properties.set(key, value);
        Ok(())
    }

    async fn migrate(
        &self,
        agent: AgentRecord,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<(), BailiffError> {
        let agent_id = agent.id;
        if !self.is_accepting() {
            let refusal = BailiffError::unavailable("bailiff is shutting down");
            return Err(self.reject(agent_id, refusal));
        }

        match self.engine.admit(Agent::from_record(agent), entry, args) {
            Ok(handle) => {
                info!(agent_id = %agent_id, entry = %handle.signature(), "agent accepted");
                metrics::counter!("gotag_migrations_total", "outcome" => "accepted").increment(1);
                Ok(())
            }
            Err(e) => Err(self.reject(agent_id, e)),
        }
    }

    async fn list_agents(&self) -> Result<Vec<AgentId>, BailiffError> {
        Ok(self.registry.list_active())
    }

    async fn is_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        Ok(self.resident(agent_id)?.is_it())
    }

    async fn agent_has_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        let agent = self.resident(agent_id)?;
        let tagged = agent.agent_has_it();
        if tagged {
            info!(agent_id = %agent_id, "tag handed to resident agent");
            metrics::counter!("gotag_tag_handoffs_total").increment(1);
            self.events.publish(AgentEvent::TagTransferred {
                agent_id,
                transferred_at: Utc::now(),
            });
        }
        Ok(tagged)
    }
}

impl fmt::Display for Bailiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bailiff for user {} in room {} on host {}.",
            self.identity.user, self.identity.room, self.identity.host_name
        )
    }
}
