// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Domain Types
//!
//! - [`AgentId`]: identity minted once per agent and kept across every migration.
//! - [`AgentKind`]: selects the entry table an [`AgentCatalog`](crate::domain::entry::AgentCatalog) resolves against.
//! - [`Agent`]: a live agent resident on (or launched from) one Bailiff.
//! - [`AgentRecord`]: the serialised form an agent travels as.
//!
//! Code never travels with an agent: each Bailiff carries the entry points of
//! every kind it can run, and rebuilds the live agent from its record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::tag::TagState;

/// Unique identifier of a mobile agent. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Agent kind name, e.g. `"dexter"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentKind(String);

impl AgentKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire form of an agent in transit between Bailiffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub kind: AgentKind,
    pub is_it: bool,
    #[serde(default)]
    pub debug: bool,
}

/// A live mobile agent.
///
/// Exactly one Bailiff executes a given agent at a time. The tag state is
/// shared between the agent's own roaming controller and the Bailiff that
/// answers `isIt`/`agentHasIt` queries about it.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    kind: AgentKind,
    tag: TagState,
    debug: bool,
}

impl Agent {
    /// Mint a new agent with a fresh identity.
    pub fn new(kind: AgentKind) -> Self {
        Self {
            id: AgentId::new(),
            kind,
            tag: TagState::default(),
            debug: false,
        }
    }

    pub fn with_tag(mut self, is_it: bool) -> Self {
        self.tag = TagState::new(is_it);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Rebuild an arriving agent. The migrating guard always starts clear.
    pub fn from_record(record: AgentRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            tag: TagState::new(record.is_it),
            debug: record.debug,
        }
    }

    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            id: self.id,
            kind: self.kind.clone(),
            is_it: self.tag.is_it(),
            debug: self.debug,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn tag(&self) -> &TagState {
        &self.tag
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn is_it(&self) -> bool {
        self.tag.is_it()
    }

    pub fn agent_has_it(&self) -> bool {
        self.tag.agent_has_it()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_identity_and_tag() {
        let agent = Agent::new(AgentKind::new("dexter")).with_tag(true).with_debug(true);
        let record = agent.to_record();
        assert_eq!(record.id, agent.id());
        assert!(record.is_it);

        let arrived = Agent::from_record(record);
        assert_eq!(arrived.id(), agent.id());
        assert_eq!(arrived.kind().as_str(), "dexter");
        assert!(arrived.is_it());
        assert!(arrived.debug());
    }

    #[test]
    fn test_arrival_clears_migrating_guard() {
        let agent = Agent::new(AgentKind::new("dexter"));
        agent.tag().begin_migration();
        assert!(!agent.agent_has_it());

        let arrived = Agent::from_record(agent.to_record());
        assert!(!arrived.tag().is_migrating());
        assert!(arrived.agent_has_it());
    }

    #[test]
    fn test_agent_id_serializes_as_plain_uuid() {
        let id = AgentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
        assert_eq!(id.to_string().parse::<AgentId>().unwrap(), id);
    }
}
