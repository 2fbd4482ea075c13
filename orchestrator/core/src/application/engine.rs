// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Execution engine: one task per admitted agent.
//!
//! [`ExecutionEngine::admit`] resolves the entry operation before anything is
//! spawned, so an unknown operation is reported to the caller immediately and
//! leaves the registry untouched. Once spawned, the task passes the admission
//! gate, runs the entry operation to completion, and releases its residency
//! whether the operation returned, failed or panicked. Entry failures are
//! logged and published as events; they never reach the caller of `admit`.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::application::registry::AgentRegistry;
use crate::domain::agent::{Agent, AgentId};
use crate::domain::bailiff::BailiffError;
use crate::domain::entry::{AgentCatalog, ArgValue, EntryContext, EntrySignature};
use crate::domain::events::AgentEvent;
use crate::domain::host::HostIdentity;
use crate::infrastructure::event_bus::EventBus;

pub struct ExecutionEngine {
    catalog: Arc<AgentCatalog>,
    registry: Arc<AgentRegistry>,
    events: EventBus,
    host: HostIdentity,
}

impl ExecutionEngine {
    pub fn new(
        catalog: Arc<AgentCatalog>,
        registry: Arc<AgentRegistry>,
        events: EventBus,
        host: HostIdentity,
    ) -> Self {
        Self {
            catalog,
            registry,
            events,
            host,
        }
    }

    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    /// Schedule `agent` to run `entry(args)` on this host.
    ///
    /// Returns as soon as the task is spawned; the task itself may still be
    /// waiting for a previous instance of the same agent to leave.
    pub fn admit(
        &self,
        agent: Agent,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<AdmissionHandle, BailiffError> {
        let entry_point = self.catalog.resolve(agent.kind(), entry, &args)?;
        let signature = EntrySignature::of_call(entry, &args);

        let agent = Arc::new(agent);
        let agent_id = agent.id();
        let registry = Arc::clone(&self.registry);
        let events = self.events.clone();
        let context = EntryContext {
            agent: Arc::clone(&agent),
            host: self.host.clone(),
        };
        let span =
            info_span!("agent", agent_id = %agent_id, kind = %agent.kind(), entry = %signature);
        let task_signature = signature.clone();

        let task = tokio::spawn(
            async move {
                let debug_agent = agent.debug();
                let _residency = registry.enter(agent, task_signature.clone()).await;
                metrics::counter!("gotag_agents_admitted_total").increment(1);
                events.publish(AgentEvent::EntryStarted {
                    agent_id,
                    signature: task_signature,
                    started_at: Utc::now(),
                });
                if debug_agent {
                    debug!("entry operation starting");
                }

                let started = Instant::now();
                let outcome = AssertUnwindSafe(async move { entry_point(context, args).await })
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(Ok(())) => {
                        info!("entry operation returned");
                        events.publish(AgentEvent::EntryCompleted {
                            agent_id,
                            duration_ms: started.elapsed().as_millis() as u64,
                            completed_at: Utc::now(),
                        });
                    }
                    Ok(Err(e)) => {
                        warn!(error = %format!("{e:#}"), "entry operation failed, agent is inert");
                        metrics::counter!("gotag_agent_entry_failures_total").increment(1);
                        events.publish(AgentEvent::EntryFailed {
                            agent_id,
                            reason: format!("{e:#}"),
                            failed_at: Utc::now(),
                        });
                    }
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        warn!(panic = %reason, "entry operation panicked, agent is inert");
                        metrics::counter!("gotag_agent_entry_failures_total").increment(1);
                        events.publish(AgentEvent::EntryFailed {
                            agent_id,
                            reason,
                            failed_at: Utc::now(),
                        });
                    }
                }
            }
            .instrument(span),
        );

        Ok(AdmissionHandle {
            agent_id,
            signature,
            task,
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Handle to a scheduled agent execution. Dropping it detaches the task.
#[derive(Debug)]
pub struct AdmissionHandle {
    agent_id: AgentId,
    signature: EntrySignature,
    task: JoinHandle<()>,
}

impl AdmissionHandle {
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    pub fn signature(&self) -> &EntrySignature {
        &self.signature
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the execution to end and its residency to be released.
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            warn!(agent_id = %self.agent_id, error = %e, "agent task did not complete");
        }
    }
}
