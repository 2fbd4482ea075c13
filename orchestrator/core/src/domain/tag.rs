// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Tag Game State
//!
//! The per-agent "it" flag of the tag game, plus the `migrating` guard that
//! stops a departing agent from being tagged mid-flight.
//!
//! Both flags share one atomic word so that every transition is a single
//! compare-and-set. In particular [`TagState::begin_migration`] raises the
//! migrating bit and observes the "it" bit in the same atomic step, so the
//! value shipped with a migration is exactly the value the agent holds once
//! no peer can hand it the tag any more.
//!
//! | Operation | Transition | Refused when |
//! |-----------|------------|--------------|
//! | [`agent_has_it`](TagState::agent_has_it) | not it → it | already it, or migrating |
//! | [`hand_off`](TagState::hand_off) | it → not it | not it |
//! | [`begin_migration`](TagState::begin_migration) | raise migrating | never |
//! | [`abort_migration`](TagState::abort_migration) | clear migrating | not migrating |

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const IT: u8 = 0b01;
const MIGRATING: u8 = 0b10;

/// Atomic tag-game status of one agent.
pub struct TagState {
    bits: AtomicU8,
}

impl TagState {
    pub fn new(is_it: bool) -> Self {
        Self {
            bits: AtomicU8::new(if is_it { IT } else { 0 }),
        }
    }

    /// Point-in-time snapshot of the "it" status.
    pub fn is_it(&self) -> bool {
        self.bits.load(Ordering::Acquire) & IT != 0
    }

    pub fn is_migrating(&self) -> bool {
        self.bits.load(Ordering::Acquire) & MIGRATING != 0
    }

    /// A peer tries to make this agent "it".
    ///
    /// Succeeds for exactly one caller among concurrent attempts on an agent
    /// that is not "it". Always refuses, without attempting the exchange,
    /// while the agent is migrating.
    pub fn agent_has_it(&self) -> bool {
        if self.is_migrating() {
            return false;
        }
        self.bits
            .compare_exchange(0, IT, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Drop the "it" status after a peer accepted it. Returns whether this
    /// call performed the transition.
    pub fn hand_off(&self) -> bool {
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (bits & IT != 0).then_some(bits & !IT)
            })
            .is_ok()
    }

    /// Set the "it" status carried in by a migration. A no-op when the state
    /// already matches.
    pub fn adopt(&self, is_it: bool) -> bool {
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let current = bits & IT != 0;
                (current != is_it).then_some(if is_it { bits | IT } else { bits & !IT })
            })
            .is_ok()
    }

    /// Raise the migrating guard and return the "it" status observed at
    /// that instant.
    pub fn begin_migration(&self) -> bool {
        self.bits.fetch_or(MIGRATING, Ordering::AcqRel) & IT != 0
    }

    /// Clear the migrating guard after a failed migration attempt.
    pub fn abort_migration(&self) -> bool {
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (bits & MIGRATING != 0).then_some(bits & !MIGRATING)
            })
            .is_ok()
    }
}

impl Default for TagState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for TagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagState")
            .field("is_it", &self.is_it())
            .field("migrating", &self.is_migrating())
            .finish()
    }
}
