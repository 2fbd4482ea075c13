// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Discovery Collaborators
//!
//! - [`InMemoryLookup`]: an in-process lookup service. Bailiffs `join` it under
//!   the `"bailiff"` capability and withdraw on shutdown.
//! - [`StaticDiscovery`]: a fixed set of handles, typically remote clients for
//!   the peer URLs listed in the host config.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

use crate::domain::bailiff::BailiffHandle;
use crate::domain::discovery::{Discovery, BAILIFF_CAPABILITY};

/// Lookup results are capped at this many handles per query.
pub const DEFAULT_MAX_MATCHES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct Registration {
    capability: String,
    attributes: BTreeMap<String, String>,
    handle: BailiffHandle,
}

pub struct InMemoryLookup {
    registrations: RwLock<HashMap<RegistrationId, Registration>>,
    max_matches: usize,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::with_max_matches(DEFAULT_MAX_MATCHES)
    }

    pub fn with_max_matches(max_matches: usize) -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            max_matches: max_matches.max(1),
        }
    }

    pub fn register(
        &self,
        capability: &str,
        attributes: BTreeMap<String, String>,
        handle: BailiffHandle,
    ) -> RegistrationId {
        let id = RegistrationId::new();
        tracing::debug!(
            registration = %id,
            capability,
            endpoint = %handle.endpoint(),
            "service registered"
        );
        self.registrations.write().insert(
            id,
            Registration {
                capability: capability.to_string(),
                attributes,
                handle,
            },
        );
        id
    }

    /// Returns whether the registration was still present.
    pub fn withdraw(&self, id: RegistrationId) -> bool {
        let removed = self.registrations.write().remove(&id).is_some();
        if removed {
            tracing::debug!(registration = %id, "service withdrawn");
        }
        removed
    }

    /// Attributes of every registration offering `capability`.
    pub fn attributes(&self, capability: &str) -> Vec<BTreeMap<String, String>> {
        self.registrations
            .read()
            .values()
            .filter(|r| r.capability == capability)
            .map(|r| r.attributes.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}

impl Default for InMemoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discovery for InMemoryLookup {
    async fn find(&self, capability: &str) -> Vec<BailiffHandle> {
        self.registrations
            .read()
            .values()
            .filter(|r| r.capability == capability)
            .take(self.max_matches)
            .map(|r| r.handle.clone())
            .collect()
    }
}

/// Fixed set of Bailiffs, answered for the `"bailiff"` capability only.
#[derive(Clone, Default)]
pub struct StaticDiscovery {
    handles: Vec<BailiffHandle>,
}

impl StaticDiscovery {
    pub fn new(handles: Vec<BailiffHandle>) -> Self {
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn find(&self, capability: &str) -> Vec<BailiffHandle> {
        if capability == BAILIFF_CAPABILITY {
            self.handles.clone()
        } else {
            Vec::new()
        }
    }
}
