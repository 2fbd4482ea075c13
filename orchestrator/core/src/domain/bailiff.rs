// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Bailiff Boundary Interface
//!
//! The operations a Bailiff offers to remote callers, and the error taxonomy
//! they share. The same trait is implemented by the in-process
//! [`Bailiff`](crate::application::bailiff::Bailiff) and by remote-invocation
//! clients, so a roaming controller never knows which one it is talking to.
//!
//! | Error | Meaning | Caller reaction |
//! |-------|---------|-----------------|
//! | `EntryNotFound` | entry operation / argument shape unknown | migration rejected |
//! | `AgentNotFound` | agent not resident (anymore) | try another candidate |
//! | `RemoteUnavailable` | unreachable, timed out or shutting down | drop this Bailiff |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::agent::{AgentId, AgentKind, AgentRecord};
use crate::domain::entry::{ArgValue, EntrySignature};
use crate::domain::host::HostIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum BailiffError {
    #[error("no entry operation {signature} for agent kind {agent_kind}")]
    EntryNotFound {
        agent_kind: AgentKind,
        signature: EntrySignature,
    },

    #[error("agent {agent_id} is not resident on this bailiff")]
    AgentNotFound { agent_id: AgentId },

    #[error("bailiff unavailable: {reason}")]
    RemoteUnavailable { reason: String },
}

impl BailiffError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        BailiffError::RemoteUnavailable {
            reason: reason.into(),
        }
    }

    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, BailiffError::RemoteUnavailable { .. })
    }
}

/// Boundary operations of a Bailiff.
#[async_trait]
pub trait BailiffInterface: Send + Sync {
    /// Where this Bailiff is reached, for diagnostics.
    fn endpoint(&self) -> String;

    /// Liveness probe. No state change.
    async fn ping(&self) -> Result<HostIdentity, BailiffError>;

    async fn get_property(&self, key: &str) -> Result<Option<String>, BailiffError>;

    async fn set_property(&self, key: &str, value: &str) -> Result<(), BailiffError>;

    /// Hand an agent over for execution in its entry operation `entry`.
    ///
    /// Returns once the entry operation is resolved and execution is
    /// scheduled. Failures inside the entry operation are never reported
    /// back to the caller.
    async fn migrate(
        &self,
        agent: AgentRecord,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<(), BailiffError>;

    /// Snapshot of the resident agents.
    async fn list_agents(&self) -> Result<Vec<AgentId>, BailiffError>;

    async fn is_it(&self, agent_id: AgentId) -> Result<bool, BailiffError>;

    /// Try to make a resident agent "it". `Ok(false)` is a refusal.
    async fn agent_has_it(&self, agent_id: AgentId) -> Result<bool, BailiffError>;
}

pub type BailiffHandle = Arc<dyn BailiffInterface>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_wire_shape() {
        let id = AgentId::new();
        let json = serde_json::to_value(BailiffError::AgentNotFound { agent_id: id }).unwrap();
        assert_eq!(json["error"], "agent_not_found");
        assert_eq!(json["agent_id"], id.to_string());

        let back: BailiffError = serde_json::from_value(json).unwrap();
        assert_eq!(back, BailiffError::AgentNotFound { agent_id: id });
    }

    #[test]
    fn test_entry_not_found_message() {
        let err = BailiffError::EntryNotFound {
            agent_kind: AgentKind::new("dexter"),
            signature: EntrySignature::of_call("top_level", &[ArgValue::Text("x".into())]),
        };
        assert_eq!(err.to_string(), "no entry operation top_level(text) for agent kind dexter");
        assert!(!err.is_remote_unavailable());
    }
}
