// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Roaming Domain Types
//!
//! - [`RoamState`]: where a [`RoamingController`](crate::application::roaming::RoamingController) is in its cycle.
//! - [`CandidateSet`]: Bailiffs still worth trying from the last discovery round.
//! - [`RoamingConfig`]: timings and names the controller works with.
//!
//! ```text
//! Discovering ──found──▶ Selecting ──▶ Probing ──ok, it──▶ TagResolution ──▶ Migrating ──ok──▶ Migrated
//!     ▲   │ empty: back off        ▲         │ ok, not it ──────────────────────▶ │
//!     │   ▼                        │         │ failed: drop candidate             │ failed: drop candidate
//!     └───┘                        └─────────┴────────────────────────────────────┘
//!                                   (set exhausted ─▶ Discovering)
//! ```

use gotag_core::domain::bailiff::BailiffHandle;
use gotag_core::domain::discovery::BAILIFF_CAPABILITY;
use gotag_core::domain::node_config::RoamingSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Entry operation a Dexter is started in on every Bailiff.
pub const TOP_LEVEL: &str = "top_level";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoamState {
    Discovering,
    Selecting,
    Probing,
    TagResolution,
    Migrating,
    /// Terminal: the agent now runs on another Bailiff.
    Migrated,
}

impl fmt::Display for RoamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoamState::Discovering => "discovering",
            RoamState::Selecting => "selecting",
            RoamState::Probing => "probing",
            RoamState::TagResolution => "tag_resolution",
            RoamState::Migrating => "migrating",
            RoamState::Migrated => "migrated",
        })
    }
}

/// Remaining candidates of one discovery round. Order is not preserved.
#[derive(Clone, Default)]
pub struct CandidateSet {
    candidates: Vec<BailiffHandle>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<BailiffHandle>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BailiffHandle> {
        self.candidates.get(index)
    }

    /// Drop a candidate by moving the last one into its slot.
    pub fn remove(&mut self, index: usize) -> Option<BailiffHandle> {
        (index < self.candidates.len()).then(|| self.candidates.swap_remove(index))
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.endpoint()).collect()
    }
}

impl fmt::Debug for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.endpoints()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct RoamingConfig {
    /// Pause before every discovery round.
    pub restraint_sleep: Duration,
    /// Pause between discovery rounds that found nothing.
    pub retry_interval: Duration,
    /// Capability Bailiffs are looked up by.
    pub capability: String,
    /// Entry operation requested on the destination.
    pub entry_operation: String,
    /// Most Bailiffs kept from one discovery round.
    pub max_matches: usize,
}

impl Default for RoamingConfig {
    fn default() -> Self {
        Self {
            restraint_sleep: Duration::from_secs(5),
            retry_interval: Duration::from_secs(20),
            capability: BAILIFF_CAPABILITY.to_string(),
            entry_operation: TOP_LEVEL.to_string(),
            max_matches: 8,
        }
    }
}

impl From<&RoamingSettings> for RoamingConfig {
    fn from(settings: &RoamingSettings) -> Self {
        Self {
            restraint_sleep: settings.restraint_sleep(),
            retry_interval: settings.retry_interval(),
            max_matches: settings.max_matches.max(1),
            ..Self::default()
        }
    }
}
