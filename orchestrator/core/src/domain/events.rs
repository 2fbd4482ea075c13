// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::entry::EntrySignature;

/// Lifecycle of an agent on one Bailiff, from arrival to departure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A previous instance with the same id is still resident; the new
    /// arrival is waiting for it to leave.
    AdmissionPending {
        agent_id: AgentId,
        pending_at: DateTime<Utc>,
    },
    Admitted {
        agent_id: AgentId,
        resident_count: usize,
        admitted_at: DateTime<Utc>,
    },
    EntryStarted {
        agent_id: AgentId,
        signature: EntrySignature,
        started_at: DateTime<Utc>,
    },
    EntryCompleted {
        agent_id: AgentId,
        duration_ms: u64,
        completed_at: DateTime<Utc>,
    },
    EntryFailed {
        agent_id: AgentId,
        reason: String,
        failed_at: DateTime<Utc>,
    },
    Departed {
        agent_id: AgentId,
        departed_at: DateTime<Utc>,
    },
    TagTransferred {
        agent_id: AgentId,
        transferred_at: DateTime<Utc>,
    },
    MigrationRejected {
        agent_id: AgentId,
        reason: String,
        rejected_at: DateTime<Utc>,
    },
}

impl AgentEvent {
    pub fn agent_id(&self) -> AgentId {
        match self {
            AgentEvent::AdmissionPending { agent_id, .. }
            | AgentEvent::Admitted { agent_id, .. }
            | AgentEvent::EntryStarted { agent_id, .. }
            | AgentEvent::EntryCompleted { agent_id, .. }
            | AgentEvent::EntryFailed { agent_id, .. }
            | AgentEvent::Departed { agent_id, .. }
            | AgentEvent::TagTransferred { agent_id, .. }
            | AgentEvent::MigrationRejected { agent_id, .. } => *agent_id,
        }
    }
}
