// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service discovery contract used by roaming agents to find Bailiffs.

use async_trait::async_trait;

use crate::domain::bailiff::BailiffHandle;

/// Capability name every Bailiff registers under.
pub const BAILIFF_CAPABILITY: &str = "bailiff";

/// Finds Bailiffs offering a capability.
///
/// Results are unordered, may be empty and may be stale the moment they are
/// returned. Lookup failures are reported as an empty result.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn find(&self, capability: &str) -> Vec<BailiffHandle>;
}
