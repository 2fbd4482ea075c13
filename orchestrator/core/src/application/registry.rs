// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Registry
//!
//! Per-host directory of resident agents and the admission gate in front of it.
//!
//! At most one entry per [`AgentId`] exists at any instant. An arrival whose id
//! is still resident (a retried migration racing a draining execution) waits
//! until that entry is released, then re-checks. Releases wake every waiter;
//! there is no FIFO guarantee among waiters for the same id.
//!
//! ```text
//! enter(a) ──▶ a resident? ──no──▶ insert ──▶ Residency(a)
//!                  │yes                             │ drop
//!                  ▼                                ▼
//!            wait for release ◀──── notify_waiters ◀─ remove
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::debug;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::entry::EntrySignature;
use crate::domain::events::AgentEvent;
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Clone)]
pub struct ResidentAgent {
    pub agent: Arc<Agent>,
    pub signature: EntrySignature,
    pub admitted_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AgentRegistry {
    resident: Mutex<HashMap<AgentId, ResidentAgent>>,
    released: Notify,
    events: EventBus,
}

impl AgentRegistry {
    pub fn new(events: EventBus) -> Self {
        Self {
            resident: Mutex::new(HashMap::new()),
            released: Notify::new(),
            events,
        }
    }

    /// Wait until `agent`'s id is free, then record it as resident.
    ///
    /// The entry stays until the returned [`Residency`] is dropped.
    pub async fn enter(
        self: &Arc<Self>,
        agent: Arc<Agent>,
        signature: EntrySignature,
    ) -> Residency {
        let agent_id = agent.id();
        let mut announced = false;

        loop {
            // Registered before the check so a release in between is not missed.
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            {
                let mut resident = self.resident.lock();
                if !resident.contains_key(&agent_id) {
                    resident.insert(
                        agent_id,
                        ResidentAgent {
                            agent: Arc::clone(&agent),
                            signature: signature.clone(),
                            admitted_at: Utc::now(),
                        },
                    );
                    let resident_count = resident.len();
                    drop(resident);

                    metrics::gauge!("gotag_resident_agents").set(resident_count as f64);
                    self.events.publish(AgentEvent::Admitted {
                        agent_id,
                        resident_count,
                        admitted_at: Utc::now(),
                    });
                    return Residency {
                        registry: Arc::clone(self),
                        agent_id,
                    };
                }
            }

            if !announced {
                debug!(
                    agent_id = %agent_id,
                    "previous instance still resident, waiting for release"
                );
                self.events.publish(AgentEvent::AdmissionPending {
                    agent_id,
                    pending_at: Utc::now(),
                });
                announced = true;
            }

            released.await;
        }
    }

    fn leave(&self, agent_id: AgentId) {
        let resident_count = {
            let mut resident = self.resident.lock();
            resident.remove(&agent_id);
            resident.len()
        };
        self.released.notify_waiters();

        metrics::gauge!("gotag_resident_agents").set(resident_count as f64);
        self.events.publish(AgentEvent::Departed {
            agent_id,
            departed_at: Utc::now(),
        });
    }

    /// Snapshot of resident ids; may be stale as soon as it returns.
    pub fn list_active(&self) -> Vec<AgentId> {
        self.resident.lock().keys().copied().collect()
    }

    pub fn get(&self, agent_id: AgentId) -> Option<Arc<Agent>> {
        self.resident.lock().get(&agent_id).map(|r| Arc::clone(&r.agent))
    }

    pub fn resident(&self, agent_id: AgentId) -> Option<ResidentAgent> {
        self.resident.lock().get(&agent_id).cloned()
    }

    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.resident.lock().contains_key(&agent_id)
    }

    pub fn len(&self) -> usize {
        self.resident.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resident.lock().is_empty()
    }
}

/// Proof of residency. Dropping it removes the entry and wakes waiters.
#[derive(Debug)]
pub struct Residency {
    registry: Arc<AgentRegistry>,
    agent_id: AgentId,
}

impl Residency {
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }
}

impl Drop for Residency {
    fn drop(&mut self) {
        self.registry.leave(self.agent_id);
    }
}
