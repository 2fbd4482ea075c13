// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `gotag-swarm`: Roaming Agents
//!
//! The client side of the platform: how an agent finds, probes and moves to
//! the next Bailiff, and the Dexter tag-game agent built on top of it.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `RoamState`, `CandidateSet`, `RoamingConfig` |
//! | [`application`] | Application | `RoamingController`, the Dexter kind |
//!
//! ## Key Concepts
//!
//! - **Roaming**: discover Bailiffs, pick one at random, ping it, migrate.
//!   Failures drop the candidate; an exhausted candidate set means discovering again.
//! - **Tag hand-off**: an agent that is "it" tries to pass the status to an
//!   agent already resident on its destination before it leaves.

pub mod domain;
pub mod application;

pub use domain::*;
